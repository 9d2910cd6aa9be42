use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::core::time::{deserialize_option_datetime_flexible, format_primitive};
use crate::db::models::{AnswerMap, CheatingReport, Submission};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmissionCreate {
    pub(crate) exam_id: String,
    pub(crate) student_id: String,
    #[serde(default)]
    pub(crate) answers: AnswerMap,
    /// Informational; the stored timestamp is the server receive time.
    #[serde(default, deserialize_with = "deserialize_option_datetime_flexible")]
    pub(crate) submitted_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub(crate) cheating_detected: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmissionResponse {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) student_id: String,
    pub(crate) answers: AnswerMap,
    pub(crate) submitted_at: String,
    pub(crate) cheating_detected: bool,
    pub(crate) score: i32,
}

impl From<Submission> for SubmissionResponse {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id,
            exam_id: submission.exam_id,
            student_id: submission.student_id,
            answers: submission.answers.0,
            submitted_at: format_primitive(submission.submitted_at),
            cheating_detected: submission.cheating_detected,
            score: submission.score,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheatingReportResponse {
    pub(crate) id: String,
    pub(crate) student_name: String,
    pub(crate) group: String,
    pub(crate) exam_title: String,
    pub(crate) submitted_at: String,
}

impl From<CheatingReport> for CheatingReportResponse {
    fn from(report: CheatingReport) -> Self {
        Self {
            id: report.id,
            student_name: format!("{} {}", report.student_name, report.student_surname),
            group: report.group_name,
            exam_title: report.exam_title,
            submitted_at: format_primitive(report.submitted_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_use_string_indexed_keys_on_the_wire() {
        let payload: SubmissionCreate = serde_json::from_value(serde_json::json!({
            "examId": "exam1",
            "studentId": "student1",
            "answers": { "0": "x = -2, x = -3", "1": "x³/3 + C" },
            "submittedAt": "2025-05-10T11:30:00Z",
            "cheatingDetected": true
        }))
        .expect("payload");

        assert_eq!(payload.answers.get(&0).map(String::as_str), Some("x = -2, x = -3"));
        assert_eq!(payload.answers.len(), 2);
        assert!(payload.cheating_detected);

        let value = serde_json::to_value(&payload.answers).expect("serialize");
        assert_eq!(value["1"], "x³/3 + C");
    }
}
