//! Common test utilities for fees-service integration tests.

use chrono::NaiveDate;
use fees_service::config::{DatabaseConfig, FeesConfig};
use fees_service::startup::Application;
use rust_decimal::Decimal;
use service_core::config::Config as CommonConfig;
use sqlx::PgPool;
use std::sync::Once;
use uuid::Uuid;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,fees_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub struct TestApp {
    pub address: String,
    pub pool: PgPool,
    pub client: reqwest::Client,
}

/// Spawn a test application against TEST_DATABASE_URL. Returns `None` when
/// the variable is unset so the suite can run without a database.
pub async fn spawn_app() -> Option<TestApp> {
    init_tracing();

    let database_url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL not set; skipping integration test");
            return None;
        }
    };

    let config = FeesConfig {
        common: CommonConfig { port: 0 },
        service_name: "fees-service-test".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: database_url.clone(),
            max_connections: 2,
            min_connections: 1,
        },
    };

    let app = Application::build(config)
        .await
        .expect("Failed to build application");
    let port = app.port();

    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect seeding pool");

    Some(TestApp {
        address: format!("http://127.0.0.1:{}", port),
        pool,
        client: reqwest::Client::new(),
    })
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// GET with gateway identity headers.
    pub async fn get(&self, path: &str, role: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .header("X-User-ID", Uuid::new_v4().to_string())
            .header("X-User-Role", role)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// POST a JSON body with gateway identity headers.
    pub async fn post_json(
        &self,
        path: &str,
        role: &str,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("X-User-ID", Uuid::new_v4().to_string())
            .header("X-User-Role", role)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

pub async fn create_class(pool: &PgPool) -> Uuid {
    let class_id = Uuid::new_v4();
    sqlx::query("INSERT INTO school_classes (class_id, name) VALUES ($1, $2)")
        .bind(class_id)
        .bind(format!("Class {}", &class_id.to_string()[..8]))
        .execute(pool)
        .await
        .expect("Failed to create class");
    class_id
}

/// Return the current academic year, creating one when the database has none.
pub async fn ensure_current_academic_year(pool: &PgPool) -> Uuid {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT academic_year_id FROM academic_years WHERE is_current")
            .fetch_optional(pool)
            .await
            .expect("Failed to query academic years");
    if let Some((id,)) = existing {
        return id;
    }

    let year_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO academic_years (academic_year_id, name, starts_on, ends_on, is_current)
        VALUES ($1, $2, $3, $4, TRUE)
        "#,
    )
    .bind(year_id)
    .bind(format!("AY {}", &year_id.to_string()[..8]))
    .bind(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap())
    .bind(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap())
    .execute(pool)
    .await
    .expect("Failed to create academic year");
    year_id
}

pub async fn create_student(pool: &PgPool, class_id: Uuid) -> Uuid {
    let student_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO students (student_id, admission_no, full_name, class_id, active)
        VALUES ($1, $2, $3, $4, TRUE)
        "#,
    )
    .bind(student_id)
    .bind(format!("ADM-{}", &student_id.to_string()[..8]))
    .bind("Test Student")
    .bind(class_id)
    .execute(pool)
    .await
    .expect("Failed to create student");
    student_id
}

pub async fn create_fee_structure(
    pool: &PgPool,
    academic_year_id: Uuid,
    class_id: Option<Uuid>,
    fee_type: &str,
    base_amount: Decimal,
    frequency: &str,
) -> Uuid {
    let structure_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO fee_structures (structure_id, academic_year_id, class_id, fee_type, base_amount, frequency)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(structure_id)
    .bind(academic_year_id)
    .bind(class_id)
    .bind(fee_type)
    .bind(base_amount)
    .bind(frequency)
    .execute(pool)
    .await
    .expect("Failed to create fee structure");
    structure_id
}

#[allow(clippy::too_many_arguments)]
pub async fn create_concession(
    pool: &PgPool,
    student_id: Uuid,
    structure_id: Uuid,
    percentage: Option<Decimal>,
    amount: Option<Decimal>,
    valid_from: NaiveDate,
    valid_to: NaiveDate,
) -> Uuid {
    let concession_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO fee_concessions (concession_id, student_id, structure_id, percentage, amount, valid_from, valid_to)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(concession_id)
    .bind(student_id)
    .bind(structure_id)
    .bind(percentage)
    .bind(amount)
    .bind(valid_from)
    .bind(valid_to)
    .execute(pool)
    .await
    .expect("Failed to create concession");
    concession_id
}

/// A month string unlikely to collide with other runs, so receipt sequences
/// within a test stay predictable.
pub fn unique_payment_date() -> NaiveDate {
    let n = Uuid::new_v4().as_u128();
    let year = 3000 + (n % 6000) as i32;
    let month = 1 + ((n >> 64) % 12) as u32;
    let day = 1 + ((n >> 96) % 28) as u32;
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn unique_for_month() -> String {
    let n = Uuid::new_v4().as_u128();
    let year = 3000 + (n % 6000) as u32;
    let month = 1 + ((n >> 64) % 12) as u32;
    format!("{:04}-{:02}", year, month)
}
