use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{sync::Once, time::Duration};

static INIT: Once = Once::new();

const ALPHANUMERIC: [char; 36] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Initialize test database
///
/// Reads `GLOWUP__DATABASE__URL` (or `DATABASE_URL`), connects and applies
/// migrations. Panics when no database is configured or reachable.
pub async fn init_test_db() -> PgPool {
    INIT.call_once(|| {
        dotenvy::dotenv().ok();
    });

    let url = std::env::var("GLOWUP__DATABASE__URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("GLOWUP__DATABASE__URL or DATABASE_URL must point at the test database");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Unique lowercase tag used to namespace the rows a test creates.
pub fn unique_tag(test_name: &str) -> String {
    format!("{}{}", test_name.replace('_', ""), nanoid::nanoid!(8, &ALPHANUMERIC))
}

/// Removes every row whose email or name starts with `tag`.
pub async fn cleanup_tag(pool: &PgPool, tag: &str) {
    let pattern = format!("{}%", tag);
    let statements = [
        "DELETE FROM participants WHERE email LIKE $1",
        "DELETE FROM quote_requests WHERE email LIKE $1",
        "DELETE FROM partners WHERE name LIKE $1",
        "DELETE FROM admins WHERE email LIKE $1",
    ];
    for statement in statements {
        let _ = sqlx::query(statement).bind(&pattern).execute(pool).await;
    }
}

/// Number of participants with the given email.
pub async fn count_participants_with_email(pool: &PgPool, email: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM participants WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await
        .expect("Failed to count participants")
}
