use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

use crate::core::time::{deserialize_datetime_flexible, format_primitive};
use crate::db::models::{Exam, Question};
use crate::db::types::{ExamStatus, QuestionKind};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExamPayload {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[validate(length(min = 1, message = "exam must have at least one question"))]
    pub(crate) questions: Vec<Question>,
    #[validate(length(min = 1, message = "exam must be assigned to at least one group"))]
    pub(crate) groups: Vec<String>,
    #[serde(deserialize_with = "deserialize_datetime_flexible")]
    pub(crate) start_time: OffsetDateTime,
    #[serde(deserialize_with = "deserialize_datetime_flexible")]
    pub(crate) end_time: OffsetDateTime,
    #[validate(range(min = 1, max = 1000, message = "pointsPerQuestion must be between 1 and 1000"))]
    pub(crate) points_per_question: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionView {
    pub(crate) question: String,
    #[serde(rename = "type")]
    pub(crate) kind: QuestionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) correct_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) image_url: Option<String>,
}

impl QuestionView {
    fn new(question: &Question, reveal_answer: bool) -> Self {
        Self {
            question: question.question.clone(),
            kind: question.kind,
            options: question.options.clone(),
            correct_answer: reveal_answer.then(|| question.correct_answer.clone()),
            image_url: question.image_url.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExamResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) questions_count: usize,
    pub(crate) questions: Vec<QuestionView>,
    pub(crate) groups: Vec<String>,
    pub(crate) start_time: String,
    pub(crate) end_time: String,
    pub(crate) points_per_question: i32,
    pub(crate) status: ExamStatus,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl ExamResponse {
    pub(crate) fn for_teacher(exam: &Exam, status: ExamStatus) -> Self {
        Self::build(exam, status, true)
    }

    /// Correct answers are withheld.
    pub(crate) fn for_student(exam: &Exam, status: ExamStatus) -> Self {
        Self::build(exam, status, false)
    }

    fn build(exam: &Exam, status: ExamStatus, reveal_answers: bool) -> Self {
        Self {
            id: exam.id.clone(),
            title: exam.title.clone(),
            description: exam.description.clone(),
            questions_count: exam.questions.0.len(),
            questions: exam
                .questions
                .0
                .iter()
                .map(|question| QuestionView::new(question, reveal_answers))
                .collect(),
            groups: exam.groups.clone(),
            start_time: format_primitive(exam.start_time),
            end_time: format_primitive(exam.end_time),
            points_per_question: exam.points_per_question,
            status,
            created_at: format_primitive(exam.created_at),
            updated_at: format_primitive(exam.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResultEntry {
    pub(crate) submission_id: String,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) score: i32,
    pub(crate) correct_count: usize,
    pub(crate) cheating_detected: bool,
    pub(crate) submitted_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroupResults {
    pub(crate) group: String,
    pub(crate) entries: Vec<ResultEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExamResultsResponse {
    pub(crate) exam_id: String,
    pub(crate) title: String,
    pub(crate) max_score: i32,
    pub(crate) submission_count: usize,
    pub(crate) groups: Vec<GroupResults>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exam_payload_accepts_naive_datetimes_and_question_kinds() {
        let payload: ExamPayload = serde_json::from_value(serde_json::json!({
            "title": "Kvadrat tənliklər",
            "questions": [
                {
                    "question": "x² + 5x + 6 = 0",
                    "type": "multiple-choice",
                    "options": ["x = -2, x = -3", "x = 2, x = 3"],
                    "correctAnswer": "x = -2, x = -3"
                },
                { "question": "∫x² dx", "type": "free-form", "correctAnswer": "x³/3 + C" }
            ],
            "groups": ["10(1,3)"],
            "startTime": "2025-05-10T10:00",
            "endTime": "2025-05-10T12:00:00Z",
            "pointsPerQuestion": 5
        }))
        .expect("payload");

        assert!(payload.validate().is_ok());
        assert_eq!(payload.description, "");
        assert_eq!(payload.questions[0].kind, QuestionKind::MultipleChoice);
        assert_eq!(payload.questions[1].kind, QuestionKind::FreeForm);
        assert_eq!(payload.end_time - payload.start_time, time::Duration::hours(2));
    }

    #[test]
    fn exam_payload_rejects_empty_questions_and_zero_points() {
        let payload: ExamPayload = serde_json::from_value(serde_json::json!({
            "title": "Boş",
            "questions": [],
            "groups": ["9A"],
            "startTime": "2025-05-10T10:00:00Z",
            "endTime": "2025-05-10T12:00:00Z",
            "pointsPerQuestion": 0
        }))
        .expect("payload");

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("questions"));
        assert!(fields.contains_key("points_per_question"));
    }
}
