use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    DbConn,
    error::{Error, Result},
    models::{
        pagination::{Page, PageRequest, Pagination, like_pattern},
        participants::{NewParticipant, Participant, ParticipantFilter},
    },
    queries::is_unique_violation,
};

pub const DUPLICATE_EMAIL_MESSAGE: &str = "Cet email est déjà inscrit à notre plateforme";

const PARTICIPANT_COLUMNS: &str = "id, first_name, last_name, email, phone, age, city, \
    description, image_url, storage_id, selected, status, notes, created_at, updated_at";

/// Inserts a participant. A concurrent submission that slipped past the
/// application-level email check surfaces here as a unique violation and
/// is reported as a conflict, not a server fault.
pub async fn create_participant(conn: &mut DbConn, new_participant: NewParticipant) -> Result<Participant> {
    let participant = sqlx::query_as::<_, Participant>(&format!(
        r#"
        INSERT INTO participants
            (id, first_name, last_name, email, phone, age, city, description, image_url, storage_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {PARTICIPANT_COLUMNS}
        "#
    ))
    .bind(Uuid::now_v7())
    .bind(&new_participant.first_name)
    .bind(&new_participant.last_name)
    .bind(&new_participant.email)
    .bind(&new_participant.phone)
    .bind(new_participant.age)
    .bind(&new_participant.city)
    .bind(&new_participant.description)
    .bind(&new_participant.image_url)
    .bind(&new_participant.storage_id)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            Error::Conflict(DUPLICATE_EMAIL_MESSAGE.to_string())
        } else {
            Error::Sqlx(e)
        }
    })?;

    Ok(participant)
}

/// Gets a participant by id. The participant may not exist.
pub async fn get_participant_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<Participant>> {
    let participant = sqlx::query_as::<_, Participant>(&format!(
        "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(participant)
}

/// Gets a participant by normalized email. The participant may not exist.
pub async fn get_participant_by_email(conn: &mut DbConn, email: &str) -> Result<Option<Participant>> {
    let participant = sqlx::query_as::<_, Participant>(&format!(
        "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(conn)
    .await?;

    Ok(participant)
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ParticipantFilter) {
    builder.push(" WHERE TRUE");

    if let Some(search) = filter.search.as_deref() {
        let pattern = like_pattern(search);
        builder.push(" AND (");
        {
            let mut columns = builder.separated(" OR ");
            for column in ["first_name", "last_name", "email", "city"] {
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

    if let Some(selected) = filter.selected {
        builder.push(" AND selected = ");
        builder.push_bind(selected);
    }
}

/// Lists participants matching the filter, newest first.
pub async fn list_participants(
    conn: &mut DbConn,
    filter: &ParticipantFilter,
    page: PageRequest,
) -> Result<Page<Participant>> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM participants");
    push_filters(&mut count, filter);
    let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

    let mut select = QueryBuilder::<Postgres>::new(format!(
        "SELECT {PARTICIPANT_COLUMNS} FROM participants"
    ));
    push_filters(&mut select, filter);
    select.push(" ORDER BY created_at DESC, id DESC LIMIT ");
    select.push_bind(page.limit());
    select.push(" OFFSET ");
    select.push_bind(page.offset());

    let items = select
        .build_query_as::<Participant>()
        .fetch_all(&mut *conn)
        .await?;

    Ok(Page {
        items,
        pagination: Pagination::new(page, total),
    })
}

/// Persists the administrator-managed fields of a participant.
pub async fn update_participant_review(conn: &mut DbConn, participant: &Participant) -> Result<Participant> {
    let updated = sqlx::query_as::<_, Participant>(&format!(
        r#"
        UPDATE participants
        SET selected = $1, status = $2, notes = $3, updated_at = now()
        WHERE id = $4
        RETURNING {PARTICIPANT_COLUMNS}
        "#
    ))
    .bind(participant.selected)
    .bind(participant.status.to_string())
    .bind(&participant.notes)
    .bind(participant.id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| Error::NotFound("Participant non trouvé".to_string()))?;

    Ok(updated)
}

/// Deletes a participant by id.
pub async fn delete_participant(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query("DELETE FROM participants WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?
        .rows_affected();

    Ok(rows_affected)
}
