use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use super::model::{ExamDefinition, NewSubmission, SubmissionRecord};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("not authorized: {0}")]
    Unauthorized(String),
    #[error("request failed with status {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Remote operations a session needs from the exam service.
#[async_trait]
pub trait ExamService: Send + Sync {
    async fn get_exam(&self, exam_id: &str) -> Result<ExamDefinition, ServiceError>;

    async fn create_submission(&self, submission: &NewSubmission) -> Result<SubmissionRecord, ServiceError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Maps a non-success response to a [`ServiceError`], using the `detail` field when present.
pub async fn error_from_response(response: reqwest::Response) -> ServiceError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .map(|parsed| parsed.detail)
        .unwrap_or_else(|_| if body.is_empty() { status.to_string() } else { body });

    match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound(detail),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::Unauthorized(detail),
        other => ServiceError::Status { status: other.as_u16(), detail },
    }
}

#[derive(Debug, Clone)]
pub struct HttpExamService {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpExamService {
    pub fn new(base_url: &str, token: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder().connect_timeout(Duration::from_secs(10)).timeout(timeout).build()?;

        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string(), token: token.into() })
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, ServiceError> {
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|err| ServiceError::Decode(err.to_string()))
    }
}

#[async_trait]
impl ExamService for HttpExamService {
    async fn get_exam(&self, exam_id: &str) -> Result<ExamDefinition, ServiceError> {
        let response = self
            .client
            .get(format!("{}/exams/{exam_id}", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn create_submission(&self, submission: &NewSubmission) -> Result<SubmissionRecord, ServiceError> {
        let response = self
            .client
            .post(format!("{}/submissions", self.base_url))
            .bearer_auth(&self.token)
            .json(submission)
            .send()
            .await?;

        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use time::macros::datetime;

    async fn spawn_stub() -> String {
        async fn exam(Path(exam_id): Path<String>, headers: HeaderMap) -> (AxumStatus, Json<Value>) {
            if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer tok") {
                return (
                    AxumStatus::UNAUTHORIZED,
                    Json(json!({ "status": 401, "detail": "Could not validate credentials" })),
                );
            }
            if exam_id != "exam1" {
                return (AxumStatus::NOT_FOUND, Json(json!({ "status": 404, "detail": "Exam not found" })));
            }
            (
                AxumStatus::OK,
                Json(json!({
                    "id": "exam1",
                    "title": "Quiz",
                    "description": "",
                    "questionsCount": 1,
                    "questions": [
                        { "question": "2 + 2", "type": "multiple-choice", "options": ["3", "4"] }
                    ],
                    "groups": ["9A"],
                    "startTime": "2025-05-10T10:00:00Z",
                    "endTime": "2025-05-10T12:00:00Z",
                    "pointsPerQuestion": 5,
                    "status": "live"
                })),
            )
        }

        async fn submit(Json(body): Json<Value>) -> (AxumStatus, Json<Value>) {
            if body["examId"] == "closed" {
                return (
                    AxumStatus::BAD_REQUEST,
                    Json(json!({ "status": 400, "detail": "Exam submission window has closed" })),
                );
            }
            (
                AxumStatus::CREATED,
                Json(json!({
                    "id": "sub-1",
                    "examId": body["examId"],
                    "studentId": body["studentId"],
                    "answers": body["answers"],
                    "submittedAt": "2025-05-10T11:00:00Z",
                    "cheatingDetected": body["cheatingDetected"],
                    "score": 5
                })),
            )
        }

        let app = Router::new()
            .route("/api/exams/:exam_id", get(exam))
            .route("/api/submissions", post(submit));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        format!("http://{addr}/api/")
    }

    fn submission(exam_id: &str) -> NewSubmission {
        NewSubmission {
            exam_id: exam_id.to_string(),
            student_id: "student1".to_string(),
            answers: [(0, "4".to_string())].into_iter().collect(),
            submitted_at: datetime!(2025-05-10 11:00 UTC),
            cheating_detected: true,
        }
    }

    #[tokio::test]
    async fn fetches_exam_definition() {
        let base = spawn_stub().await;
        let service = HttpExamService::new(&base, "tok", Duration::from_secs(5)).expect("service");

        let exam = service.get_exam("exam1").await.expect("exam");
        assert_eq!(exam.title, "Quiz");
        assert_eq!(exam.end_time, datetime!(2025-05-10 12:00 UTC));
        assert_eq!(exam.questions[0].options.as_deref(), Some(&["3".to_string(), "4".to_string()][..]));
    }

    #[tokio::test]
    async fn maps_error_statuses() {
        let base = spawn_stub().await;
        let service = HttpExamService::new(&base, "tok", Duration::from_secs(5)).expect("service");
        let err = service.get_exam("missing").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref detail) if detail == "Exam not found"), "{err}");

        let anonymous = HttpExamService::new(&base, "wrong", Duration::from_secs(5)).expect("service");
        let err = anonymous.get_exam("exam1").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)), "{err}");

        let err = service.create_submission(&submission("closed")).await.unwrap_err();
        assert!(
            matches!(err, ServiceError::Status { status: 400, ref detail } if detail.contains("closed")),
            "{err}"
        );
    }

    #[tokio::test]
    async fn posts_submission_with_string_keyed_answers() {
        let base = spawn_stub().await;
        let service = HttpExamService::new(&base, "tok", Duration::from_secs(5)).expect("service");

        let record = service.create_submission(&submission("exam1")).await.expect("submission");
        assert_eq!(record.id, "sub-1");
        assert!(record.cheating_detected);
        assert_eq!(record.answers.get(&0).map(String::as_str), Some("4"));
        assert_eq!(record.score, Some(5));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let service =
            HttpExamService::new("http://127.0.0.1:9/api", "tok", Duration::from_millis(500)).expect("service");
        let err = service.get_exam("exam1").await.unwrap_err();
        assert!(matches!(err, ServiceError::Transport(_)), "{err}");
    }
}
