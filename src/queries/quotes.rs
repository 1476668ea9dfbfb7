use sqlx::{Postgres, QueryBuilder, types::Json};
use uuid::Uuid;

use crate::{
    DbConn,
    error::{Error, Result},
    models::{
        pagination::{Page, PageRequest, Pagination, like_pattern},
        quotes::{NewQuoteRequest, QuoteFilter, QuoteRequest, QuoteStatus},
    },
};

const QUOTE_COLUMNS: &str = "id, first_name, last_name, country, city, services, photos, \
    budget, available_dates, phone, email, status, created_at, updated_at";

/// Creates a new quote request.
pub async fn create_quote_request(conn: &mut DbConn, new_quote: NewQuoteRequest) -> Result<QuoteRequest> {
    let services: Vec<String> = new_quote.services.iter().map(|s| s.to_string()).collect();

    let quote = sqlx::query_as::<_, QuoteRequest>(&format!(
        r#"
        INSERT INTO quote_requests
            (id, first_name, last_name, country, city, services, photos, budget,
             available_dates, phone, email)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {QUOTE_COLUMNS}
        "#
    ))
    .bind(Uuid::now_v7())
    .bind(&new_quote.first_name)
    .bind(&new_quote.last_name)
    .bind(&new_quote.country)
    .bind(&new_quote.city)
    .bind(&services)
    .bind(Json(&new_quote.photos))
    .bind(&new_quote.budget)
    .bind(&new_quote.available_dates)
    .bind(&new_quote.phone)
    .bind(&new_quote.email)
    .fetch_one(conn)
    .await?;

    Ok(quote)
}

/// Gets a quote request by id. The quote may not exist.
pub async fn get_quote_request_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<QuoteRequest>> {
    let quote = sqlx::query_as::<_, QuoteRequest>(&format!(
        "SELECT {QUOTE_COLUMNS} FROM quote_requests WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(quote)
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &QuoteFilter) {
    builder.push(" WHERE TRUE");

    if let Some(search) = filter.search.as_deref() {
        let pattern = like_pattern(search);
        builder.push(" AND (");
        {
            let mut columns = builder.separated(" OR ");
            for column in ["first_name", "last_name", "email", "country", "city"] {
                columns.push(format!("{column} ILIKE "));
                columns.push_bind_unseparated(pattern.clone());
            }
        }
        builder.push(")");
    }

    if let Some(status) = filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status.to_string());
    }
}

/// Lists quote requests matching the filter, newest first.
pub async fn list_quote_requests(
    conn: &mut DbConn,
    filter: &QuoteFilter,
    page: PageRequest,
) -> Result<Page<QuoteRequest>> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM quote_requests");
    push_filters(&mut count, filter);
    let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

    let mut select = QueryBuilder::<Postgres>::new(format!(
        "SELECT {QUOTE_COLUMNS} FROM quote_requests"
    ));
    push_filters(&mut select, filter);
    select.push(" ORDER BY created_at DESC, id DESC LIMIT ");
    select.push_bind(page.limit());
    select.push(" OFFSET ");
    select.push_bind(page.offset());

    let items = select
        .build_query_as::<QuoteRequest>()
        .fetch_all(&mut *conn)
        .await?;

    Ok(Page {
        items,
        pagination: Pagination::new(page, total),
    })
}

/// Sets the processing status of a quote request.
pub async fn update_quote_status(conn: &mut DbConn, id: Uuid, status: QuoteStatus) -> Result<QuoteRequest> {
    let quote = sqlx::query_as::<_, QuoteRequest>(&format!(
        r#"
        UPDATE quote_requests
        SET status = $1, updated_at = now()
        WHERE id = $2
        RETURNING {QUOTE_COLUMNS}
        "#
    ))
    .bind(status.to_string())
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| Error::NotFound("Demande non trouvée".to_string()))?;

    Ok(quote)
}

/// Deletes a quote request by id.
pub async fn delete_quote_request(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query("DELETE FROM quote_requests WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?
        .rows_affected();

    Ok(rows_affected)
}
