use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentPrincipal;
use crate::core::security::{self, Role};
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::auth::{LoginRequest, Profile, TeacherProfile, TokenResponse};
use crate::schemas::student::StudentResponse;

const BAD_CREDENTIALS: &str = "Incorrect username or password";

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/login", post(login)).route("/me", get(me))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let username = payload.username.trim();
    let settings = state.settings();

    if security::verify_teacher_credentials(settings, username, &payload.password) {
        let token = security::create_access_token(username, Role::Teacher, settings, None)
            .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;
        tracing::info!(role = Role::Teacher.as_str(), "Login succeeded");

        return Ok(Json(TokenResponse {
            access_token: token,
            token_type: "bearer".to_string(),
            user_type: Role::Teacher,
            user: Profile::Teacher(teacher_profile(&state)),
        }));
    }

    let student = repositories::students::find_by_email(state.db(), username)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load student"))?
        .ok_or(ApiError::Unauthorized(BAD_CREDENTIALS))?;

    let verified = security::verify_password(&payload.password, &student.hashed_password)
        .map_err(|e| ApiError::internal(e, "Failed to verify password"))?;
    if !verified {
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS));
    }

    if !student.is_active() {
        return Err(ApiError::Forbidden("Account is disabled"));
    }

    let token = security::create_access_token(&student.id, Role::Student, settings, None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;
    tracing::info!(role = Role::Student.as_str(), student_id = %student.id, "Login succeeded");

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        user_type: Role::Student,
        user: Profile::Student(StudentResponse::from(student)),
    }))
}

async fn me(State(state): State<AppState>, principal: CurrentPrincipal) -> Json<Profile> {
    match principal {
        CurrentPrincipal::Teacher(_) => Json(Profile::Teacher(teacher_profile(&state))),
        CurrentPrincipal::Student(student) => Json(Profile::Student(StudentResponse::from(student))),
    }
}

fn teacher_profile(state: &AppState) -> TeacherProfile {
    let teacher = state.settings().teacher();
    TeacherProfile { username: teacher.username.clone(), name: teacher.display_name.clone() }
}
