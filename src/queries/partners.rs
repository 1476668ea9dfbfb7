use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    DbConn,
    error::{Error, Result},
    models::{
        pagination::{Page, PageRequest, Pagination, like_pattern},
        partners::{NewPartner, Partner, PartnerFilter},
    },
};

const PARTNER_COLUMNS: &str = "id, name, specialty, phone, address, photo_url, storage_id, \
    description, website, facebook, instagram, twitter, is_active, rating, services, \
    created_at, updated_at";

/// Creates a new partner.
pub async fn create_partner(conn: &mut DbConn, new_partner: NewPartner) -> Result<Partner> {
    let partner = sqlx::query_as::<_, Partner>(&format!(
        r#"
        INSERT INTO partners
            (id, name, specialty, phone, address, photo_url, storage_id, description,
             website, facebook, instagram, twitter, is_active, rating, services)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING {PARTNER_COLUMNS}
        "#
    ))
    .bind(Uuid::now_v7())
    .bind(&new_partner.name)
    .bind(&new_partner.specialty)
    .bind(&new_partner.phone)
    .bind(&new_partner.address)
    .bind(&new_partner.photo_url)
    .bind(&new_partner.storage_id)
    .bind(&new_partner.description)
    .bind(&new_partner.website)
    .bind(&new_partner.social_media.facebook)
    .bind(&new_partner.social_media.instagram)
    .bind(&new_partner.social_media.twitter)
    .bind(new_partner.is_active)
    .bind(new_partner.rating)
    .bind(&new_partner.services)
    .fetch_one(conn)
    .await?;

    Ok(partner)
}

/// Gets a partner by id. The partner may not exist.
pub async fn get_partner_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<Partner>> {
    let partner = sqlx::query_as::<_, Partner>(&format!(
        "SELECT {PARTNER_COLUMNS} FROM partners WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(partner)
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &PartnerFilter) {
    builder.push(" WHERE TRUE");

    if let Some(search) = filter.search.as_deref() {
        let pattern = like_pattern(search);
        builder.push(" AND (");
        {
            let mut columns = builder.separated(" OR ");
            for column in ["name", "specialty", "description"] {
                columns.push(format!("{column} ILIKE "));
                columns.push_bind_unseparated(pattern.clone());
            }
        }
        builder.push(")");
    }

    if let Some(specialty) = filter.specialty.as_deref() {
        builder.push(" AND specialty ILIKE ");
        builder.push_bind(like_pattern(specialty));
    }

    if let Some(is_active) = filter.is_active {
        builder.push(" AND is_active = ");
        builder.push_bind(is_active);
    }
}

/// Lists partners matching the filter, newest first.
pub async fn list_partners(
    conn: &mut DbConn,
    filter: &PartnerFilter,
    page: PageRequest,
) -> Result<Page<Partner>> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM partners");
    push_filters(&mut count, filter);
    let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

    let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {PARTNER_COLUMNS} FROM partners"));
    push_filters(&mut select, filter);
    select.push(" ORDER BY created_at DESC, id DESC LIMIT ");
    select.push_bind(page.limit());
    select.push(" OFFSET ");
    select.push_bind(page.offset());

    let items = select
        .build_query_as::<Partner>()
        .fetch_all(&mut *conn)
        .await?;

    Ok(Page {
        items,
        pagination: Pagination::new(page, total),
    })
}

/// Writes every editable column of a partner.
pub async fn update_partner(conn: &mut DbConn, partner: &Partner) -> Result<Partner> {
    let updated = sqlx::query_as::<_, Partner>(&format!(
        r#"
        UPDATE partners
        SET name = $1, specialty = $2, phone = $3, address = $4, photo_url = $5,
            storage_id = $6, description = $7, website = $8, facebook = $9,
            instagram = $10, twitter = $11, is_active = $12, rating = $13,
            services = $14, updated_at = now()
        WHERE id = $15
        RETURNING {PARTNER_COLUMNS}
        "#
    ))
    .bind(&partner.name)
    .bind(&partner.specialty)
    .bind(&partner.phone)
    .bind(&partner.address)
    .bind(&partner.photo_url)
    .bind(&partner.storage_id)
    .bind(&partner.description)
    .bind(&partner.website)
    .bind(&partner.social_media.facebook)
    .bind(&partner.social_media.instagram)
    .bind(&partner.social_media.twitter)
    .bind(partner.is_active)
    .bind(partner.rating)
    .bind(&partner.services)
    .bind(partner.id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| Error::NotFound("Partenaire non trouvé".to_string()))?;

    Ok(updated)
}

/// Deletes a partner by id.
pub async fn delete_partner(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query("DELETE FROM partners WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?
        .rows_affected();

    Ok(rows_affected)
}
