use thiserror::Error;

use super::monitor::BrowserSignal;

#[derive(Debug, Error)]
pub enum PresentationError {
    #[error("full-screen presentation is not supported by this host")]
    Unsupported,
    #[error("full-screen request was rejected: {0}")]
    Rejected(String),
}

/// Handle for one registration of the session's input listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Submitted,
    TimeExpired,
    CheatingDetected,
    FetchFailed(String),
    SubmitFailed(String),
    Announcement(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    StudentDashboard,
}

/// The presentation surface a session runs in: a browser page, a terminal, or a test double.
pub trait SessionHost: Send + Sync {
    fn enter_fullscreen(&self) -> Result<(), PresentationError>;

    fn exit_fullscreen(&self) -> Result<(), PresentationError>;

    fn is_fullscreen(&self) -> bool;

    /// Starts delivering visibility, full-screen, keyboard and context-menu signals.
    fn attach_listeners(&self) -> ListenerId;

    fn detach_listeners(&self, id: ListenerId);

    /// Cancels the host's default action for a signal that was intercepted.
    fn suppress_default(&self, signal: &BrowserSignal);

    fn notify(&self, notification: Notification);

    fn show_countdown(&self, remaining_seconds: i64);

    fn navigate(&self, route: Route);
}
