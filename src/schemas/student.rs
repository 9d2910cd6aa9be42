use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Exam, Student};
use crate::db::types::{StudentExamStatus, StudentStatus};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StudentCreate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: String,
    #[validate(length(min = 1, message = "surname must not be empty"))]
    pub(crate) surname: String,
    #[validate(length(min = 1, message = "email must not be empty"))]
    pub(crate) email: String,
    #[serde(alias = "pass")]
    #[validate(length(min = 6, message = "password is too short"))]
    pub(crate) password: String,
    #[validate(length(min = 1, message = "group must not be empty"))]
    pub(crate) group: String,
    #[serde(rename = "class", default)]
    pub(crate) class_name: String,
    #[serde(default)]
    pub(crate) parent_contact: String,
    #[serde(default)]
    pub(crate) status: StudentStatus,
}

/// Full replacement; an omitted password keeps the current one.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StudentUpdate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: String,
    #[validate(length(min = 1, message = "surname must not be empty"))]
    pub(crate) surname: String,
    #[validate(length(min = 1, message = "email must not be empty"))]
    pub(crate) email: String,
    #[serde(default, alias = "pass")]
    #[validate(length(min = 6, message = "password is too short"))]
    pub(crate) password: Option<String>,
    #[validate(length(min = 1, message = "group must not be empty"))]
    pub(crate) group: String,
    #[serde(rename = "class", default)]
    pub(crate) class_name: String,
    #[serde(default)]
    pub(crate) parent_contact: String,
    #[serde(default)]
    pub(crate) status: StudentStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StudentResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) surname: String,
    pub(crate) email: String,
    pub(crate) group: String,
    #[serde(rename = "class")]
    pub(crate) class_name: String,
    pub(crate) parent_contact: String,
    pub(crate) status: StudentStatus,
}

impl From<Student> for StudentResponse {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            name: student.name,
            surname: student.surname,
            email: student.email,
            group: student.group_name,
            class_name: student.class_name,
            parent_contact: student.parent_contact,
            status: student.status,
        }
    }
}

/// One row of the student dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StudentExamEntry {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) questions_count: usize,
    pub(crate) start_time: String,
    pub(crate) end_time: String,
    pub(crate) points_per_question: i32,
    pub(crate) status: StudentExamStatus,
    pub(crate) can_enter: bool,
}

impl StudentExamEntry {
    pub(crate) fn new(exam: &Exam, status: StudentExamStatus) -> Self {
        Self {
            id: exam.id.clone(),
            title: exam.title.clone(),
            description: exam.description.clone(),
            questions_count: exam.questions.0.len(),
            start_time: format_primitive(exam.start_time),
            end_time: format_primitive(exam.end_time),
            points_per_question: exam.points_per_question,
            status,
            can_enter: status == StudentExamStatus::Live,
        }
    }
}
