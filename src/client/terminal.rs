use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::session::{
    format_remaining, is_urgent, BrowserSignal, ExamDefinition, ExamService, KeyPress, ListenerId,
    NewSubmission, Notification, PresentationError, QuestionKind, Route, ServiceError, SessionHost,
    SessionInput, SubmissionRecord,
};

pub(crate) const HELP: &str = "\
commands: answer <n> <text> | finish | back
simulate: hide | show | exit-fullscreen | key <combo> | menu";

#[derive(Debug, Default)]
struct TerminalState {
    next_listener: u64,
    listening: Option<ListenerId>,
    last_countdown: Option<i64>,
}

/// Session host for a plain terminal. Full-screen is not available.
#[derive(Debug, Default)]
pub(crate) struct TerminalHost {
    state: Mutex<TerminalState>,
}

impl TerminalHost {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, TerminalState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Whether a countdown value is worth printing: minute marks, every ten seconds
/// once urgent, and each of the last ten seconds.
fn countdown_visible(remaining: i64, previous: Option<i64>) -> bool {
    match previous {
        None => true,
        Some(previous) if previous == remaining => false,
        Some(_) => remaining % 60 == 0 || (is_urgent(remaining) && remaining % 10 == 0) || remaining <= 10,
    }
}

impl SessionHost for TerminalHost {
    fn enter_fullscreen(&self) -> Result<(), PresentationError> {
        Err(PresentationError::Unsupported)
    }

    fn exit_fullscreen(&self) -> Result<(), PresentationError> {
        Ok(())
    }

    fn is_fullscreen(&self) -> bool {
        false
    }

    fn attach_listeners(&self) -> ListenerId {
        let mut state = self.state();
        state.next_listener += 1;
        let id = ListenerId(state.next_listener);
        state.listening = Some(id);
        id
    }

    fn detach_listeners(&self, id: ListenerId) {
        let mut state = self.state();
        if state.listening == Some(id) {
            state.listening = None;
        }
    }

    fn suppress_default(&self, signal: &BrowserSignal) {
        println!("(blocked: {signal:?})");
    }

    fn notify(&self, notification: Notification) {
        match notification {
            Notification::Submitted => println!("Exam submitted."),
            Notification::TimeExpired => println!("Time is up. Your answers were submitted."),
            Notification::CheatingDetected => {
                println!("Cheating detected. The exam was submitted and flagged.")
            }
            Notification::FetchFailed(detail) => eprintln!("Could not load the exam: {detail}"),
            Notification::SubmitFailed(detail) => {
                eprintln!("Submission failed: {detail}. Type `finish` to try again.")
            }
            Notification::Announcement(text) => println!("Announcement: {text}"),
        }
    }

    fn show_countdown(&self, remaining_seconds: i64) {
        let mut state = self.state();
        if countdown_visible(remaining_seconds, state.last_countdown) {
            let marker = if is_urgent(remaining_seconds) { "!" } else { " " };
            println!("{marker} time left {}", format_remaining(remaining_seconds));
        }
        state.last_countdown = Some(remaining_seconds);
    }

    fn navigate(&self, route: Route) {
        match route {
            Route::StudentDashboard => println!("Returning to the dashboard. Run `exams` to see your results."),
        }
    }
}

/// Parses one stdin line. Question numbers are 1-based. Empty lines yield `None`.
pub(crate) fn parse_line(line: &str) -> Result<Option<SessionInput>, String> {
    let line = line.trim();
    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let input = match command {
        "" => return Ok(None),
        "answer" => {
            let (number, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let number: usize =
                number.parse().map_err(|_| format!("`{number}` is not a question number"))?;
            if number == 0 {
                return Err("question numbers start at 1".to_string());
            }
            SessionInput::Answer { question: number - 1, text: text.trim().to_string() }
        }
        "finish" => SessionInput::Finish,
        "back" => SessionInput::Leave,
        "hide" => SessionInput::Signal(BrowserSignal::VisibilityChanged { hidden: true }),
        "show" => SessionInput::Signal(BrowserSignal::VisibilityChanged { hidden: false }),
        "exit-fullscreen" => SessionInput::Signal(BrowserSignal::FullscreenChanged { active: false }),
        "menu" => SessionInput::Signal(BrowserSignal::ContextMenu),
        "key" => {
            let press = KeyPress::parse(rest).ok_or_else(|| format!("cannot parse key combo `{rest}`"))?;
            SessionInput::Signal(BrowserSignal::KeyDown(press))
        }
        other => return Err(format!("unknown command `{other}`\n{HELP}")),
    };

    Ok(Some(input))
}

/// Forwards stdin lines to the session until EOF or the session stops listening.
pub(crate) async fn forward_stdin(inputs: mpsc::Sender<SessionInput>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read stdin");
                break;
            }
        };

        match parse_line(&line) {
            Ok(Some(input)) => {
                if inputs.send(input).await.is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(message) => eprintln!("{message}"),
        }
    }
}

/// Prints the exam paper once it has been loaded.
pub(crate) struct PrintingExamService {
    inner: Arc<dyn ExamService>,
}

impl PrintingExamService {
    pub(crate) fn new(inner: Arc<dyn ExamService>) -> Self {
        Self { inner }
    }
}

pub(crate) fn render_exam(exam: &ExamDefinition) -> String {
    let mut out = format!("{}\n", exam.title);
    if !exam.description.trim().is_empty() {
        out.push_str(&format!("{}\n", exam.description.trim()));
    }
    for (index, question) in exam.questions.iter().enumerate() {
        out.push_str(&format!("\n{}. {}\n", index + 1, question.question));
        if let Some(url) = &question.image_url {
            out.push_str(&format!("   image: {url}\n"));
        }
        if question.kind == QuestionKind::MultipleChoice {
            for option in question.options.iter().flatten() {
                out.push_str(&format!("   - {option}\n"));
            }
        }
    }
    out
}

#[async_trait]
impl ExamService for PrintingExamService {
    async fn get_exam(&self, exam_id: &str) -> Result<ExamDefinition, ServiceError> {
        let exam = self.inner.get_exam(exam_id).await?;
        println!("{}", render_exam(&exam));
        println!("{HELP}");
        Ok(exam)
    }

    async fn create_submission(&self, submission: &NewSubmission) -> Result<SubmissionRecord, ServiceError> {
        self.inner.create_submission(submission).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::QuestionDefinition;
    use time::macros::datetime;

    #[test]
    fn parses_answer_lines_with_one_based_numbers() {
        let input = parse_line("answer 1 x = -2, x = -3").expect("parse");
        assert_eq!(input, Some(SessionInput::Answer { question: 0, text: "x = -2, x = -3".to_string() }));

        assert!(parse_line("answer 0 foo").is_err());
        assert!(parse_line("answer one foo").is_err());
        assert_eq!(parse_line("   "), Ok(None));
    }

    #[test]
    fn parses_simulated_signals() {
        assert_eq!(
            parse_line("key ctrl+shift+i"),
            Ok(Some(SessionInput::Signal(BrowserSignal::KeyDown(KeyPress::ctrl_shift("i")))))
        );
        assert_eq!(
            parse_line("hide"),
            Ok(Some(SessionInput::Signal(BrowserSignal::VisibilityChanged { hidden: true })))
        );
        assert_eq!(
            parse_line("show"),
            Ok(Some(SessionInput::Signal(BrowserSignal::VisibilityChanged { hidden: false })))
        );
        assert_eq!(
            parse_line("exit-fullscreen"),
            Ok(Some(SessionInput::Signal(BrowserSignal::FullscreenChanged { active: false })))
        );
        assert_eq!(parse_line("menu"), Ok(Some(SessionInput::Signal(BrowserSignal::ContextMenu))));
        assert_eq!(parse_line("back"), Ok(Some(SessionInput::Leave)));
        assert!(parse_line("jump").unwrap_err().contains("unknown command"));

        for command in ["answer", "finish", "back", "hide", "show", "exit-fullscreen", "key", "menu"] {
            assert!(HELP.contains(command), "help does not mention {command}");
        }
    }

    #[test]
    fn countdown_prints_sparsely_until_the_end() {
        assert!(countdown_visible(3_599, None));
        assert!(!countdown_visible(3_599, Some(3_599)));
        assert!(!countdown_visible(3_598, Some(3_599)));
        assert!(countdown_visible(3_540, Some(3_541)));
        assert!(!countdown_visible(295, Some(296)));
        assert!(countdown_visible(290, Some(291)));
        assert!(countdown_visible(7, Some(8)));
    }

    #[test]
    fn terminal_host_refuses_fullscreen_and_tracks_listeners() {
        let host = TerminalHost::new();
        assert!(matches!(host.enter_fullscreen(), Err(PresentationError::Unsupported)));

        let id = host.attach_listeners();
        assert_eq!(host.state().listening, Some(id));
        host.detach_listeners(id);
        assert_eq!(host.state().listening, None);
    }

    #[test]
    fn renders_questions_with_options() {
        let exam = ExamDefinition {
            id: "exam1".to_string(),
            title: "Kvadrat tənliklər".to_string(),
            description: String::new(),
            questions: vec![QuestionDefinition {
                question: "x² + 5x + 6 = 0".to_string(),
                kind: QuestionKind::MultipleChoice,
                options: Some(vec!["x = -2, x = -3".to_string(), "x = 2, x = 3".to_string()]),
                image_url: None,
            }],
            groups: vec!["10(1,3)".to_string()],
            start_time: datetime!(2025-05-10 10:00 UTC),
            end_time: datetime!(2025-05-10 12:00 UTC),
            points_per_question: 5,
        };

        let rendered = render_exam(&exam);
        assert!(rendered.starts_with("Kvadrat tənliklər\n"));
        assert!(rendered.contains("1. x² + 5x + 6 = 0"));
        assert!(rendered.contains("   - x = 2, x = 3"));
    }
}
