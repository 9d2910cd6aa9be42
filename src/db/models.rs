use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{QuestionKind, StudentStatus};

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Group {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Student {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) surname: String,
    pub(crate) email: String,
    pub(crate) hashed_password: String,
    pub(crate) group_name: String,
    pub(crate) class_name: String,
    pub(crate) parent_contact: String,
    pub(crate) status: StudentStatus,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

impl Student {
    pub(crate) fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    pub(crate) fn is_active(&self) -> bool {
        self.status == StudentStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Question {
    pub(crate) question: String,
    #[serde(rename = "type")]
    pub(crate) kind: QuestionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) options: Option<Vec<String>>,
    pub(crate) correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) image_url: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Exam {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) questions: Json<Vec<Question>>,
    pub(crate) groups: Vec<String>,
    pub(crate) start_time: PrimitiveDateTime,
    pub(crate) end_time: PrimitiveDateTime,
    pub(crate) points_per_question: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

impl Exam {
    pub(crate) fn is_assigned_to(&self, group: &str) -> bool {
        self.groups.iter().any(|item| item == group)
    }
}

/// Answers keyed by question index.
pub(crate) type AnswerMap = BTreeMap<usize, String>;

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Submission {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) student_id: String,
    pub(crate) answers: Json<AnswerMap>,
    pub(crate) submitted_at: PrimitiveDateTime,
    pub(crate) cheating_detected: bool,
    pub(crate) score: i32,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct CheatingReport {
    pub(crate) id: String,
    pub(crate) student_name: String,
    pub(crate) student_surname: String,
    pub(crate) group_name: String,
    pub(crate) exam_title: String,
    pub(crate) submitted_at: PrimitiveDateTime,
}
