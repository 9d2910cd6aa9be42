use std::future::{pending, Future};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, Interval, MissedTickBehavior};

use super::host::{Notification, Route, SessionHost};
use super::model::{AnswerMap, ExamDefinition, NewSubmission, SubmissionRecord, TerminationCause};
use super::monitor::{AntiCheatMonitor, BrowserSignal, MonitorGuard, MonitorState};
use super::service::{ExamService, ServiceError};
use super::timer::{Clock, CountdownTimer};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub exam_id: String,
    pub student_id: String,
    /// Shown once when the session becomes active.
    pub announcement: Option<String>,
    pub post_submit_delay: Duration,
    pub tick_interval: Duration,
}

impl SessionConfig {
    pub fn new(exam_id: impl Into<String>, student_id: impl Into<String>) -> Self {
        Self {
            exam_id: exam_id.into(),
            student_id: student_id.into(),
            announcement: None,
            post_submit_delay: Duration::from_secs(1),
            tick_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Answer { question: usize, text: String },
    Finish,
    Signal(BrowserSignal),
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Active,
    Finalizing,
    Terminated,
}

#[derive(Debug)]
pub enum SessionOutcome {
    Submitted { submission: SubmissionRecord, cause: TerminationCause },
    FetchFailed(ServiceError),
    Abandoned,
}

type PendingSubmit = Pin<Box<dyn Future<Output = Result<SubmissionRecord, ServiceError>> + Send>>;

/// Everything that must stop when the session ends. Dropping it detaches the listeners.
struct SessionResources {
    timer: CountdownTimer,
    ticker: Interval,
    _listeners: MonitorGuard,
}

/// Runs one exam attempt and guarantees at most one successful submission for it.
pub struct ExamSessionController {
    service: Arc<dyn ExamService>,
    host: Arc<dyn SessionHost>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    phase: SessionPhase,
    answers: AnswerMap,
    monitor: AntiCheatMonitor,
    termination: Option<TerminationCause>,
}

impl ExamSessionController {
    pub fn new(
        service: Arc<dyn ExamService>,
        host: Arc<dyn SessionHost>,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
    ) -> Self {
        Self {
            service,
            host,
            clock,
            config,
            phase: SessionPhase::Loading,
            answers: AnswerMap::new(),
            monitor: AntiCheatMonitor::new(),
            termination: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn monitor_state(&self) -> MonitorState {
        self.monitor.state()
    }

    pub async fn run(&mut self, mut inputs: mpsc::Receiver<SessionInput>) -> SessionOutcome {
        let exam = match self.service.get_exam(&self.config.exam_id).await {
            Ok(exam) => exam,
            Err(err) => {
                tracing::warn!(exam_id = %self.config.exam_id, error = %err, "Failed to load exam");
                self.host.notify(Notification::FetchFailed(err.to_string()));
                self.host.navigate(Route::StudentDashboard);
                self.phase = SessionPhase::Terminated;
                return SessionOutcome::FetchFailed(err);
            }
        };

        let mut resources = Some(self.activate(&exam));
        let mut in_flight: Option<PendingSubmit> = None;

        loop {
            tokio::select! {
                biased;
                result = poll_submission(&mut in_flight) => {
                    in_flight = None;
                    match result {
                        Ok(submission) => return self.complete(submission, resources.take()).await,
                        Err(err) => self.submission_failed(err, resources.as_mut()),
                    }
                }
                input = inputs.recv() => match input {
                    Some(SessionInput::Leave) if self.phase == SessionPhase::Finalizing => {
                        tracing::debug!(exam_id = %exam.id, "Leave ignored while submitting");
                    }
                    Some(SessionInput::Leave) | None => {
                        self.abandon(resources.take());
                        return SessionOutcome::Abandoned;
                    }
                    Some(input) => self.handle_input(input, &mut in_flight),
                },
                () = next_tick(resources.as_mut()) => {
                    if let Some(resources) = resources.as_mut() {
                        let tick = resources.timer.tick();
                        self.host.show_countdown(tick.remaining_seconds);
                        if tick.expired {
                            tracing::info!(exam_id = %exam.id, "Exam time is up");
                            self.begin_finalize(TerminationCause::Timeout, &mut in_flight);
                        }
                    }
                }
            }
        }
    }

    fn activate(&mut self, exam: &ExamDefinition) -> SessionResources {
        self.phase = SessionPhase::Active;

        if let Err(err) = self.host.enter_fullscreen() {
            tracing::warn!(error = %err, "Full-screen request failed; continuing without it");
        }

        let listeners = MonitorGuard::attach(self.host.clone());

        if let Some(announcement) = self.config.announcement.as_deref().filter(|text| !text.trim().is_empty()) {
            self.host.notify(Notification::Announcement(announcement.to_string()));
        }

        let mut ticker = interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            exam_id = %exam.id,
            student_id = %self.config.student_id,
            questions = exam.questions.len(),
            "Exam session started"
        );

        SessionResources {
            timer: CountdownTimer::new(exam.end_time, self.clock.clone()),
            ticker,
            _listeners: listeners,
        }
    }

    fn handle_input(&mut self, input: SessionInput, in_flight: &mut Option<PendingSubmit>) {
        match input {
            SessionInput::Answer { question, text } => {
                self.answers.insert(question, text);
            }
            SessionInput::Finish => self.begin_finalize(TerminationCause::Manual, in_flight),
            SessionInput::Signal(signal) => {
                let response = self.monitor.observe(&signal);
                if response.suppress_default {
                    self.host.suppress_default(&signal);
                }
                if let Some(detection) = response.detection {
                    tracing::warn!(
                        exam_id = %self.config.exam_id,
                        student_id = %self.config.student_id,
                        signal = %detection,
                        "Cheating detected"
                    );
                    self.begin_finalize(TerminationCause::Cheating, in_flight);
                }
            }
            SessionInput::Leave => {}
        }
    }

    /// Starts the single in-flight submission. Later triggers are dropped until it fails.
    fn begin_finalize(&mut self, requested: TerminationCause, in_flight: &mut Option<PendingSubmit>) {
        if let Some(active) = self.termination {
            tracing::debug!(
                requested = requested.as_str(),
                active = active.as_str(),
                "Finalize already in progress"
            );
            return;
        }

        // Once detected, cheating is reported on every later attempt.
        let cause = if self.monitor.state() == MonitorState::Detected {
            TerminationCause::Cheating
        } else {
            requested
        };

        self.termination = Some(cause);
        self.phase = SessionPhase::Finalizing;

        let submission = NewSubmission {
            exam_id: self.config.exam_id.clone(),
            student_id: self.config.student_id.clone(),
            answers: self.answers.clone(),
            submitted_at: self.clock.now(),
            cheating_detected: cause == TerminationCause::Cheating,
        };
        tracing::info!(
            exam_id = %submission.exam_id,
            cause = cause.as_str(),
            answered = submission.answers.len(),
            "Submitting exam"
        );

        let service = self.service.clone();
        *in_flight = Some(Box::pin(async move { service.create_submission(&submission).await }));
    }

    fn submission_failed(&mut self, err: ServiceError, resources: Option<&mut SessionResources>) {
        tracing::warn!(exam_id = %self.config.exam_id, error = %err, "Submission failed");
        self.host.notify(Notification::SubmitFailed(err.to_string()));
        self.termination = None;
        self.phase = SessionPhase::Active;
        if let Some(resources) = resources {
            resources.timer.rearm();
        }
    }

    async fn complete(
        &mut self,
        submission: SubmissionRecord,
        resources: Option<SessionResources>,
    ) -> SessionOutcome {
        let cause = self.termination.unwrap_or(TerminationCause::Manual);
        self.host.notify(match cause {
            TerminationCause::Manual => Notification::Submitted,
            TerminationCause::Timeout => Notification::TimeExpired,
            TerminationCause::Cheating => Notification::CheatingDetected,
        });
        tracing::info!(
            exam_id = %submission.exam_id,
            submission_id = %submission.id,
            cause = cause.as_str(),
            "Exam submitted"
        );

        self.release(resources);
        tokio::time::sleep(self.config.post_submit_delay).await;
        self.host.navigate(Route::StudentDashboard);

        SessionOutcome::Submitted { submission, cause }
    }

    fn abandon(&mut self, resources: Option<SessionResources>) {
        tracing::info!(exam_id = %self.config.exam_id, "Exam session abandoned");
        self.release(resources);
    }

    fn release(&mut self, resources: Option<SessionResources>) {
        drop(resources);
        self.monitor.release();
        if self.host.is_fullscreen() {
            if let Err(err) = self.host.exit_fullscreen() {
                tracing::warn!(error = %err, "Failed to leave full-screen");
            }
        }
        self.phase = SessionPhase::Terminated;
    }
}

async fn poll_submission(in_flight: &mut Option<PendingSubmit>) -> Result<SubmissionRecord, ServiceError> {
    match in_flight.as_mut() {
        Some(future) => future.await,
        None => pending().await,
    }
}

async fn next_tick(resources: Option<&mut SessionResources>) {
    match resources {
        Some(resources) => {
            resources.ticker.tick().await;
        }
        None => pending().await,
    }
}
