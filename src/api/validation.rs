use validator::Validate;

use crate::api::errors::ApiError;
use crate::db::types::QuestionKind;
use crate::schemas::exam::ExamPayload;

/// Field-level rules come from `validator`; cross-field and per-question rules are checked here.
pub(crate) fn validate_exam_payload(payload: &ExamPayload) -> Result<(), ApiError> {
    payload.validate()?;

    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }

    if payload.end_time <= payload.start_time {
        return Err(ApiError::BadRequest("endTime must be after startTime".to_string()));
    }

    if payload.groups.iter().any(|group| group.trim().is_empty()) {
        return Err(ApiError::BadRequest("group names must not be empty".to_string()));
    }

    for (index, question) in payload.questions.iter().enumerate() {
        let number = index + 1;
        if question.question.trim().is_empty() {
            return Err(ApiError::BadRequest(format!("question {number} has no text")));
        }
        if question.correct_answer.trim().is_empty() {
            return Err(ApiError::BadRequest(format!("question {number} has no correct answer")));
        }
        if question.kind == QuestionKind::MultipleChoice {
            let has_options = question
                .options
                .as_ref()
                .is_some_and(|options| options.iter().any(|option| !option.trim().is_empty()));
            if !has_options {
                return Err(ApiError::BadRequest(format!(
                    "question {number} is multiple-choice but has no options"
                )));
            }
        }
    }

    Ok(())
}
