use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "studentstatus", rename_all = "lowercase")]
pub(crate) enum StudentStatus {
    #[default]
    Active,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum QuestionKind {
    MultipleChoice,
    FreeForm,
}

/// Derived from the exam window, as seen by the teacher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ExamStatus {
    Upcoming,
    Live,
    Finished,
}

/// Derived per student from the exam window and their own submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum StudentExamStatus {
    Cheating,
    Finished,
    Submitted,
    Upcoming,
    Live,
    Missed,
}
