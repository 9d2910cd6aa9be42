use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::security::{self, Claims, Role};
use crate::core::state::AppState;
use crate::db::models::Student;
use crate::repositories;

/// The configured teacher account. Carries the username from the token.
pub(crate) struct CurrentTeacher(pub(crate) String);

pub(crate) struct CurrentStudent(pub(crate) Student);

pub(crate) enum CurrentPrincipal {
    Teacher(String),
    Student(Student),
}

async fn bearer_claims(parts: &mut Parts, state: &AppState) -> Result<(AppState, Claims), ApiError> {
    let State(app_state) = State::<AppState>::from_request_parts(parts, state)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

    let token = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

    let claims = security::verify_token(token, app_state.settings())
        .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

    Ok((app_state, claims))
}

async fn load_student(state: &AppState, id: &str) -> Result<Student, ApiError> {
    let student = repositories::students::find_by_id(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load student"))?
        .ok_or(ApiError::Unauthorized("Student not found"))?;

    if !student.is_active() {
        return Err(ApiError::Forbidden("Account is disabled"));
    }

    Ok(student)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentTeacher {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let (_, claims) = bearer_claims(parts, state).await?;

        match claims.role {
            Role::Teacher => Ok(CurrentTeacher(claims.sub)),
            Role::Student => Err(ApiError::Forbidden("Teacher access required")),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentStudent {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let (app_state, claims) = bearer_claims(parts, state).await?;

        match claims.role {
            Role::Student => Ok(CurrentStudent(load_student(&app_state, &claims.sub).await?)),
            Role::Teacher => Err(ApiError::Forbidden("Student access required")),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let (app_state, claims) = bearer_claims(parts, state).await?;

        match claims.role {
            Role::Teacher => Ok(CurrentPrincipal::Teacher(claims.sub)),
            Role::Student => Ok(CurrentPrincipal::Student(load_student(&app_state, &claims.sub).await?)),
        }
    }
}
