use std::sync::{Arc, OnceLock};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    Router,
};
use sqlx::PgPool;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::api;
use crate::core::security::{self, Role};
use crate::core::{config::Settings, state::AppState, time::primitive_now_utc};
use crate::db::models::Student;
use crate::db::types::StudentStatus;
use crate::repositories;

pub(crate) const TEST_SECRET_KEY: &str = "test-secret";
pub(crate) const TEST_TEACHER_USERNAME: &str = "muellim";
pub(crate) const TEST_TEACHER_PASSWORD: &str = "muellim-2025";
pub(crate) const TEST_STUDENT_PASSWORD: &str = "sagird-2025";

const TEST_DATABASE_URL_ENV: &str = "RIYAZIYYAT_TEST_DATABASE_URL";

pub(crate) struct TestContext {
    pub(crate) state: AppState,
    pub(crate) app: Router,
    _guard: OwnedMutexGuard<()>,
}

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn set_test_env() {
    std::env::set_var("RIYAZIYYAT_ENV", "test");
    std::env::set_var("RIYAZIYYAT_STRICT_CONFIG", "0");
    std::env::set_var("SECRET_KEY", TEST_SECRET_KEY);
    std::env::set_var("TEACHER_USERNAME", TEST_TEACHER_USERNAME);
    std::env::set_var("TEACHER_PASSWORD", TEST_TEACHER_PASSWORD);
    std::env::set_var("PROMETHEUS_ENABLED", "0");
    std::env::remove_var("RIYAZIYYAT_HOST");
    std::env::remove_var("RIYAZIYYAT_PORT");
    std::env::remove_var("API_PREFIX");
    std::env::remove_var("PROJECT_NAME");
    std::env::remove_var("VERSION");
    std::env::remove_var("ALGORITHM");
    std::env::remove_var("SUBMIT_GRACE_SECONDS");
    std::env::remove_var("SEED_DEMO_DATA");
    std::env::remove_var("BACKEND_CORS_ORIGINS");
    match std::env::var(TEST_DATABASE_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => std::env::set_var("DATABASE_URL", url),
        _ => std::env::remove_var("DATABASE_URL"),
    }
}

/// Returns `None` when no test database is configured; callers skip the test.
pub(crate) async fn setup_test_context() -> Option<TestContext> {
    let guard = env_lock().await;
    set_test_env();

    if std::env::var(TEST_DATABASE_URL_ENV).map(|url| url.trim().is_empty()).unwrap_or(true) {
        eprintln!("{TEST_DATABASE_URL_ENV} is not set; skipping database test");
        return None;
    }

    let settings = Settings::load().expect("settings");
    let db = prepare_db(&settings).await;

    let state = AppState::new(settings, db);
    let app = api::router::router(state.clone());

    Some(TestContext { state, app, _guard: guard })
}

async fn prepare_db(settings: &Settings) -> PgPool {
    let db = crate::db::init_pool(settings).await.expect("db pool");
    reset_public_schema(&db).await.expect("reset schema");
    crate::db::run_migrations(&db).await.expect("migrations");
    db
}

async fn reset_public_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("DROP SCHEMA IF EXISTS public CASCADE").execute(pool).await?;
    sqlx::query("CREATE SCHEMA public").execute(pool).await?;
    Ok(())
}

pub(crate) async fn insert_group(pool: &PgPool, name: &str) {
    repositories::groups::create(pool, &Uuid::new_v4().to_string(), name, primitive_now_utc())
        .await
        .expect("insert group");
}

pub(crate) async fn insert_student(pool: &PgPool, email: &str, group: &str, status: StudentStatus) -> Student {
    repositories::students::create(
        pool,
        repositories::students::CreateStudent {
            id: &Uuid::new_v4().to_string(),
            name: "Aynur",
            surname: "Məmmədova",
            email,
            hashed_password: security::hash_password(TEST_STUDENT_PASSWORD).expect("hash password"),
            group_name: group,
            class_name: "10a",
            parent_contact: "+994501234568",
            status,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .expect("insert student")
}

pub(crate) fn bearer_token(subject: &str, role: Role, settings: &Settings) -> String {
    security::create_access_token(subject, role, settings, None).expect("token")
}

pub(crate) fn teacher_token(settings: &Settings) -> String {
    bearer_token(TEST_TEACHER_USERNAME, Role::Teacher, settings)
}

pub(crate) fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    if let Some(body) = body {
        let bytes = serde_json::to_vec(&body).expect("serialize body");
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .expect("request body")
    } else {
        builder.body(Body::empty()).expect("request body")
    }
}

pub(crate) async fn read_json(response: axum::response::Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    serde_json::from_slice(&body).unwrap_or_else(|err| {
        let body_text = String::from_utf8_lossy(&body);
        panic!("json parse: {err}; body: {body_text}");
    })
}
