use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;
use tokio::sync::mpsc;

use super::store::{ClientStore, StoredIdentity};
use super::terminal::{self, PrintingExamService, TerminalHost};
use crate::core::config::ClientSettings;
use crate::session::{
    error_from_response, format_remaining, ExamSessionController, HttpExamService, SessionConfig,
    SessionOutcome, SystemClock,
};

pub(crate) const USAGE: &str = "\
usage: exam_client <command>
  login <email> <password>
  logout
  exams
  take <exam-id>
  announce <exam-id> <text...>
  announce <exam-id> --clear";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Login { username: String, password: String },
    Logout,
    Exams,
    Take { exam_id: String },
    Announce { exam_id: String, text: Option<String> },
    Help,
}

impl Command {
    pub(crate) fn parse(args: &[String]) -> Result<Self> {
        let mut args = args.iter().map(String::as_str);
        let command = match args.next() {
            None | Some("help" | "--help" | "-h") => Self::Help,
            Some("login") => {
                let username = args.next().ok_or_else(|| anyhow!("login missing <email>"))?;
                let password = args.next().ok_or_else(|| anyhow!("login missing <password>"))?;
                Self::Login { username: username.to_string(), password: password.to_string() }
            }
            Some("logout") => Self::Logout,
            Some("exams") => Self::Exams,
            Some("take") => {
                let exam_id = args.next().ok_or_else(|| anyhow!("take missing <exam-id>"))?;
                Self::Take { exam_id: exam_id.to_string() }
            }
            Some("announce") => {
                let exam_id = args.next().ok_or_else(|| anyhow!("announce missing <exam-id>"))?;
                let rest: Vec<&str> = args.by_ref().collect();
                let text = match rest.as_slice() {
                    ["--clear"] => None,
                    [] => bail!("announce missing <text> or --clear"),
                    words => Some(words.join(" ")),
                };
                Self::Announce { exam_id: exam_id.to_string(), text }
            }
            Some(other) => bail!("Unknown command: {other}\n{USAGE}"),
        };

        if let Some(extra) = args.next() {
            bail!("Unexpected argument: {extra}");
        }

        Ok(command)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    user_type: String,
    user: LoginProfile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginProfile {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    surname: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    group: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DashboardEntry {
    id: String,
    title: String,
    questions_count: usize,
    #[serde(with = "time::serde::rfc3339")]
    start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    end_time: OffsetDateTime,
    points_per_question: i32,
    status: String,
}

pub(crate) async fn execute(command: Command, settings: &ClientSettings) -> Result<()> {
    match command {
        Command::Help => {
            println!("{USAGE}");
            Ok(())
        }
        Command::Login { username, password } => login(settings, &username, &password).await,
        Command::Logout => {
            let mut store = ClientStore::open(&settings.state_path)?;
            match store.clear_identity() {
                Some(identity) => println!("Logged out {}", identity.email),
                None => println!("Not logged in"),
            }
            store.save()?;
            Ok(())
        }
        Command::Exams => list_exams(settings).await,
        Command::Take { exam_id } => take_exam(settings, &exam_id).await,
        Command::Announce { exam_id, text } => {
            let mut store = ClientStore::open(&settings.state_path)?;
            store.set_announcement(&exam_id, text.as_deref().unwrap_or_default());
            store.save()?;
            match store.announcement(&exam_id) {
                Some(text) => println!("Announcement for {exam_id}: {text}"),
                None => println!("Announcement for {exam_id} cleared"),
            }
            Ok(())
        }
    }
}

fn http_client(settings: &ClientSettings) -> Result<Client> {
    Client::builder().timeout(settings.request_timeout).build().context("Failed to build HTTP client")
}

fn require_identity(store: &ClientStore) -> Result<StoredIdentity> {
    store.identity().cloned().ok_or_else(|| anyhow!("Not logged in; run `exam_client login` first"))
}

async fn login(settings: &ClientSettings, username: &str, password: &str) -> Result<()> {
    let response = http_client(settings)?
        .post(format!("{}/auth/login", settings.api_url))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .context("Login request failed")?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await).context("Login rejected");
    }

    let body: LoginResponse = response.json().await.context("Unexpected login response")?;
    if body.user_type != "student" {
        bail!("exam_client only supports student accounts");
    }

    let identity = StoredIdentity {
        student_id: body.user.id,
        name: body.user.name,
        surname: body.user.surname,
        email: body.user.email,
        group: body.user.group,
        access_token: body.access_token,
    };
    tracing::info!(student_id = %identity.student_id, "Student logged in");
    println!("Logged in as {} {} ({})", identity.name, identity.surname, identity.group);

    let mut store = ClientStore::open(&settings.state_path)?;
    store.set_identity(identity);
    store.save()?;
    Ok(())
}

async fn list_exams(settings: &ClientSettings) -> Result<()> {
    let store = ClientStore::open(&settings.state_path)?;
    let identity = require_identity(&store)?;

    let entries = fetch_dashboard(settings, &identity).await?;
    if entries.is_empty() {
        println!("No exams assigned to {}", identity.group);
        return Ok(());
    }

    let now = OffsetDateTime::now_utc();
    for entry in entries {
        println!("{}", dashboard_line(&entry, now));
        if let Some(text) = store.announcement(&entry.id) {
            println!("    announcement: {text}");
        }
    }

    Ok(())
}

async fn fetch_dashboard(settings: &ClientSettings, identity: &StoredIdentity) -> Result<Vec<DashboardEntry>> {
    let response = http_client(settings)?
        .get(format!("{}/students/me/exams", settings.api_url))
        .bearer_auth(&identity.access_token)
        .send()
        .await
        .context("Failed to load exams")?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await).context("Failed to load exams");
    }

    response.json().await.context("Unexpected exams response")
}

/// Only a live exam without a prior submission can be entered.
fn ensure_enterable(entries: &[DashboardEntry], exam_id: &str) -> Result<()> {
    let Some(entry) = entries.iter().find(|entry| entry.id == exam_id) else {
        bail!("Exam {exam_id} is not assigned to your group");
    };

    match entry.status.as_str() {
        "live" => Ok(()),
        "upcoming" => bail!("{} has not started yet", entry.title),
        "submitted" | "cheating" => bail!("{} was already submitted", entry.title),
        _ => bail!("{} is closed", entry.title),
    }
}

fn dashboard_line(entry: &DashboardEntry, now: OffsetDateTime) -> String {
    let timing = match entry.status.as_str() {
        "upcoming" => format!("starts in {}", format_remaining((entry.start_time - now).whole_seconds())),
        "live" => format!("{} left", format_remaining((entry.end_time - now).whole_seconds())),
        _ => format!("ended {}", entry.end_time.date()),
    };

    format!(
        "[{:<9}] {} ({}) {} questions x {} pts, {timing}",
        entry.status, entry.title, entry.id, entry.questions_count, entry.points_per_question
    )
}

async fn take_exam(settings: &ClientSettings, exam_id: &str) -> Result<()> {
    let store = ClientStore::open(&settings.state_path)?;
    let identity = require_identity(&store)?;

    let entries = fetch_dashboard(settings, &identity).await?;
    ensure_enterable(&entries, exam_id)?;

    let http = HttpExamService::new(&settings.api_url, identity.access_token.clone(), settings.request_timeout)
        .context("Failed to build exam service")?;
    let service = Arc::new(PrintingExamService::new(Arc::new(http)));
    let host = Arc::new(TerminalHost::new());

    let mut config = SessionConfig::new(exam_id, identity.student_id.clone());
    config.announcement = store.announcement(exam_id).map(str::to_string);
    config.post_submit_delay = settings.post_submit_delay;

    let mut controller = ExamSessionController::new(service, host, Arc::new(SystemClock), config);
    let (tx, rx) = mpsc::channel(32);
    let reader = tokio::spawn(terminal::forward_stdin(tx));

    let outcome = controller.run(rx).await;
    reader.abort();

    match outcome {
        SessionOutcome::Submitted { submission, cause } => {
            tracing::info!(submission_id = %submission.id, cause = cause.as_str(), "Session finished");
            if let Some(score) = submission.score {
                println!("Score: {score}");
            }
            Ok(())
        }
        SessionOutcome::FetchFailed(err) => Err(anyhow!(err).context(format!("Could not open exam {exam_id}"))),
        SessionOutcome::Abandoned => {
            println!("Left the exam without submitting");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse(&args(&[])).expect("help"), Command::Help);
        assert_eq!(
            Command::parse(&args(&["login", "nijat@example.az", "secret1"])).expect("login"),
            Command::Login { username: "nijat@example.az".to_string(), password: "secret1".to_string() }
        );
        assert_eq!(
            Command::parse(&args(&["take", "exam1"])).expect("take"),
            Command::Take { exam_id: "exam1".to_string() }
        );
        assert_eq!(
            Command::parse(&args(&["announce", "exam1", "Kalkulyator", "qadağandır"])).expect("announce"),
            Command::Announce { exam_id: "exam1".to_string(), text: Some("Kalkulyator qadağandır".to_string()) }
        );
        assert_eq!(
            Command::parse(&args(&["announce", "exam1", "--clear"])).expect("clear"),
            Command::Announce { exam_id: "exam1".to_string(), text: None }
        );
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(Command::parse(&args(&["login", "only-user"])).is_err());
        assert!(Command::parse(&args(&["take"])).is_err());
        assert!(Command::parse(&args(&["exams", "extra"])).is_err());
        assert!(Command::parse(&args(&["announce", "exam1"])).is_err());
        assert!(Command::parse(&args(&["grade"])).is_err());
    }

    #[test]
    fn dashboard_lines_show_countdowns() {
        let entry = DashboardEntry {
            id: "exam1".to_string(),
            title: "Quiz".to_string(),
            questions_count: 2,
            start_time: datetime!(2025-05-10 10:00 UTC),
            end_time: datetime!(2025-05-10 12:00 UTC),
            points_per_question: 5,
            status: "live".to_string(),
        };

        let line = dashboard_line(&entry, datetime!(2025-05-10 11:59:30 UTC));
        assert_eq!(line, "[live     ] Quiz (exam1) 2 questions x 5 pts, 00:00:30 left");

        let upcoming = DashboardEntry { status: "upcoming".to_string(), ..entry };
        let line = dashboard_line(&upcoming, datetime!(2025-05-10 09:00 UTC));
        assert!(line.ends_with("starts in 01:00:00"), "{line}");
    }

    #[test]
    fn only_live_exams_can_be_entered() {
        let entry = |id: &str, status: &str| DashboardEntry {
            id: id.to_string(),
            title: format!("Quiz {id}"),
            questions_count: 1,
            start_time: datetime!(2025-05-10 10:00 UTC),
            end_time: datetime!(2025-05-10 12:00 UTC),
            points_per_question: 1,
            status: status.to_string(),
        };
        let entries = vec![
            entry("live", "live"),
            entry("soon", "upcoming"),
            entry("done", "finished"),
            entry("missed", "missed"),
            entry("sent", "submitted"),
            entry("flagged", "cheating"),
        ];

        assert!(ensure_enterable(&entries, "live").is_ok());

        let refused = |id: &str| ensure_enterable(&entries, id).unwrap_err().to_string();
        assert_eq!(refused("soon"), "Quiz soon has not started yet");
        assert_eq!(refused("done"), "Quiz done is closed");
        assert_eq!(refused("missed"), "Quiz missed is closed");
        assert_eq!(refused("sent"), "Quiz sent was already submitted");
        assert_eq!(refused("flagged"), "Quiz flagged was already submitted");
        assert_eq!(refused("other"), "Exam other is not assigned to your group");
    }
}
