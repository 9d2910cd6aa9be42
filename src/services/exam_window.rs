use thiserror::Error;
use time::{Duration, PrimitiveDateTime};

use crate::db::types::{ExamStatus, StudentExamStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub(crate) enum SubmitWindowError {
    #[error("Exam has not started yet")]
    NotStarted,
    #[error("Exam submission window has closed")]
    Closed,
}

/// What a student already handed in for an exam, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OwnSubmission {
    None,
    Clean,
    Flagged,
}

/// Status over the half-open window `[start, end)`.
pub(crate) fn exam_status(
    start: PrimitiveDateTime,
    end: PrimitiveDateTime,
    now: PrimitiveDateTime,
) -> ExamStatus {
    if now < start {
        ExamStatus::Upcoming
    } else if now < end {
        ExamStatus::Live
    } else {
        ExamStatus::Finished
    }
}

pub(crate) fn student_exam_status(
    start: PrimitiveDateTime,
    end: PrimitiveDateTime,
    now: PrimitiveDateTime,
    own: OwnSubmission,
) -> StudentExamStatus {
    let window = exam_status(start, end, now);
    match (own, window) {
        (OwnSubmission::Flagged, _) => StudentExamStatus::Cheating,
        (OwnSubmission::Clean, ExamStatus::Finished) => StudentExamStatus::Finished,
        (OwnSubmission::Clean, _) => StudentExamStatus::Submitted,
        (OwnSubmission::None, ExamStatus::Upcoming) => StudentExamStatus::Upcoming,
        (OwnSubmission::None, ExamStatus::Live) => StudentExamStatus::Live,
        (OwnSubmission::None, ExamStatus::Finished) => StudentExamStatus::Missed,
    }
}

/// Submissions are accepted from `start` until `end + grace_seconds` inclusive.
pub(crate) fn check_submit_window(
    start: PrimitiveDateTime,
    end: PrimitiveDateTime,
    now: PrimitiveDateTime,
    grace_seconds: u64,
) -> Result<(), SubmitWindowError> {
    if now < start {
        return Err(SubmitWindowError::NotStarted);
    }
    let grace = Duration::seconds(i64::try_from(grace_seconds).unwrap_or(i64::MAX / 2));
    if now > end.saturating_add(grace) {
        return Err(SubmitWindowError::Closed);
    }
    Ok(())
}
