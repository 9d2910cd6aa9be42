//! Client-side exam session runtime: countdown, anti-cheat monitoring and the
//! controller that turns one attempt into exactly one submission.

mod controller;
mod host;
mod model;
mod monitor;
mod service;
mod timer;

pub use controller::{ExamSessionController, SessionConfig, SessionInput, SessionOutcome, SessionPhase};
pub use host::{ListenerId, Notification, PresentationError, Route, SessionHost};
pub use model::{
    AnswerMap, ExamDefinition, NewSubmission, QuestionDefinition, QuestionKind, SubmissionRecord,
    TerminationCause,
};
pub use monitor::{
    AntiCheatMonitor, BrowserSignal, CheatingSignal, KeyPress, MonitorGuard, MonitorState,
    SignalResponse, SuspiciousShortcut,
};
pub use service::{error_from_response, ExamService, HttpExamService, ServiceError};
pub use timer::{format_remaining, is_urgent, Clock, CountdownTimer, SystemClock, TimerTick, URGENT_THRESHOLD_SECONDS};
