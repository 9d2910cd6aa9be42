use axum::http::{Method, StatusCode};
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;

use crate::core::time::format_primitive;
use crate::core::time::to_primitive_utc;
use crate::db::types::StudentStatus;
use crate::test_support::{self, TestContext};

fn rfc3339(value: OffsetDateTime) -> String {
    format_primitive(to_primitive_utc(value))
}

async fn send(
    ctx: &TestContext,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(method, uri, token, body))
        .await
        .expect("response");
    let status = response.status();
    (status, test_support::read_json(response).await)
}

fn exam_body(group: &str, start: OffsetDateTime, end: OffsetDateTime) -> serde_json::Value {
    serde_json::json!({
        "title": "Kvadrat tənliklər",
        "description": "Bacarıqlarınızın qiymətləndirilməsi.",
        "questions": [
            {
                "question": "x² + 5x + 6 = 0 tənliyinin köklərini tapın",
                "type": "multiple-choice",
                "options": ["x = -2, x = -3", "x = 2, x = 3"],
                "correctAnswer": "x = -2, x = -3"
            },
            {
                "question": "İnteqralı hesablayın: ∫x²dx",
                "type": "free-form",
                "correctAnswer": "x³/3 + C"
            }
        ],
        "groups": [group],
        "startTime": rfc3339(start),
        "endTime": rfc3339(end),
        "pointsPerQuestion": 10
    })
}

#[tokio::test]
async fn student_submission_flow_is_idempotent_and_reported() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    let teacher = test_support::teacher_token(ctx.state.settings());

    let (status, _) =
        send(&ctx, Method::POST, "/api/groups", Some(&teacher), Some(serde_json::json!({"name": "10B"})))
            .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, student) = send(
        &ctx,
        Method::POST,
        "/api/students",
        Some(&teacher),
        Some(serde_json::json!({
            "name": "Aynur",
            "surname": "Məmmədova",
            "email": "aynur.mammadova",
            "pass": "aynur123",
            "group": "10B",
            "class": "10a",
            "parentContact": "+994501234568"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(student.get("hashedPassword").is_none());
    let student_id = student["id"].as_str().expect("student id").to_string();

    let now = OffsetDateTime::now_utc();
    let (status, exam) = send(
        &ctx,
        Method::POST,
        "/api/exams",
        Some(&teacher),
        Some(exam_body("10B", now - Duration::minutes(10), now + Duration::hours(1))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(exam["status"], "live");
    let exam_id = exam["id"].as_str().expect("exam id").to_string();

    let (status, login) = send(
        &ctx,
        Method::POST,
        "/api/auth/login",
        None,
        Some(serde_json::json!({"email": "aynur.mammadova", "password": "aynur123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["userType"], "student");
    let token = login["accessToken"].as_str().expect("token").to_string();

    let (status, student_exam) =
        send(&ctx, Method::GET, &format!("/api/exams/{exam_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(student_exam["questions"][0].get("correctAnswer").is_none());

    let (status, dashboard) = send(&ctx, Method::GET, "/api/students/me/exams", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard[0]["status"], "live");
    assert_eq!(dashboard[0]["canEnter"], true);

    let submission = serde_json::json!({
        "examId": exam_id,
        "studentId": student_id,
        "answers": { "0": "x = -2, x = -3" },
        "submittedAt": rfc3339(now),
        "cheatingDetected": true
    });
    let (status, first) =
        send(&ctx, Method::POST, "/api/submissions", Some(&token), Some(submission.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["score"], 10);

    let (status, second) =
        send(&ctx, Method::POST, "/api/submissions", Some(&token), Some(submission)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);

    let (_, all) =
        send(&ctx, Method::GET, &format!("/api/submissions/exam/{exam_id}"), Some(&teacher), None).await;
    assert_eq!(all.as_array().map(Vec::len), Some(1));

    let (_, dashboard) = send(&ctx, Method::GET, "/api/students/me/exams", Some(&token), None).await;
    assert_eq!(dashboard[0]["status"], "cheating");

    let (status, results) =
        send(&ctx, Method::GET, &format!("/api/exams/{exam_id}/results"), Some(&teacher), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results["maxScore"], 20);
    assert_eq!(results["groups"][0]["group"], "10B");
    assert_eq!(results["groups"][0]["entries"][0]["score"], 10);

    let (_, reports) = send(&ctx, Method::GET, "/api/cheating-reports", Some(&teacher), None).await;
    assert_eq!(reports[0]["studentName"], "Aynur Məmmədova");
    assert_eq!(reports[0]["group"], "10B");
    let report_id = reports[0]["id"].as_str().expect("report id").to_string();

    let uri = format!("/api/cheating-reports/{report_id}");
    let (status, _) = send(&ctx, Method::DELETE, &uri, Some(&teacher), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&ctx, Method::DELETE, &uri, Some(&teacher), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&ctx, Method::DELETE, &format!("/api/exams/{exam_id}"), Some(&teacher), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, all) = send(&ctx, Method::GET, "/api/submissions", Some(&teacher), None).await;
    assert_eq!(all.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn submissions_outside_the_window_are_rejected() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    let teacher = test_support::teacher_token(ctx.state.settings());
    test_support::insert_group(ctx.state.db(), "9A").await;
    let student = test_support::insert_student(ctx.state.db(), "fuad.aliyev", "9A", StudentStatus::Active).await;
    let token = test_support::bearer_token(&student.id, crate::core::security::Role::Student, ctx.state.settings());

    let now = OffsetDateTime::now_utc();
    let windows = [
        (now + Duration::hours(1), now + Duration::hours(2)),
        (now - Duration::hours(2), now - Duration::minutes(6)),
    ];

    for (start, end) in windows {
        let (_, exam) =
            send(&ctx, Method::POST, "/api/exams", Some(&teacher), Some(exam_body("9A", start, end))).await;
        let (status, body) = send(
            &ctx,
            Method::POST,
            "/api/submissions",
            Some(&token),
            Some(serde_json::json!({
                "examId": exam["id"],
                "studentId": student.id,
                "answers": {}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    }

    let (_, late) = send(
        &ctx,
        Method::POST,
        "/api/exams",
        Some(&teacher),
        Some(exam_body("9A", now - Duration::hours(2), now - Duration::minutes(2))),
    )
    .await;
    let (status, _) = send(
        &ctx,
        Method::POST,
        "/api/submissions",
        Some(&token),
        Some(serde_json::json!({ "examId": late["id"], "studentId": student.id, "answers": {} })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn groups_with_students_cannot_be_deleted_and_renames_move_members() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    let teacher = test_support::teacher_token(ctx.state.settings());
    test_support::insert_group(ctx.state.db(), "11S").await;
    let student = test_support::insert_student(ctx.state.db(), "nijat", "11S", StudentStatus::Active).await;

    let (status, body) = send(&ctx, Method::DELETE, "/api/groups/11S", Some(&teacher), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Cannot delete group with students");

    let (status, _) = send(
        &ctx,
        Method::PUT,
        "/api/groups/11S",
        Some(&teacher),
        Some(serde_json::json!({"name": "11R"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, students) = send(&ctx, Method::GET, "/api/students", Some(&teacher), None).await;
    assert_eq!(students[0]["id"], student.id.as_str());
    assert_eq!(students[0]["group"], "11R");

    let (status, _) = send(&ctx, Method::DELETE, "/api/groups/11S", Some(&teacher), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn disabled_students_cannot_log_in() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    test_support::insert_group(ctx.state.db(), "10(1,3)").await;
    test_support::insert_student(ctx.state.db(), "fuad.aliyev", "10(1,3)", StudentStatus::Disabled).await;

    let (status, body) = send(
        &ctx,
        Method::POST,
        "/api/auth/login",
        None,
        Some(serde_json::json!({
            "email": "fuad.aliyev",
            "password": test_support::TEST_STUDENT_PASSWORD
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Account is disabled");

    let (status, _) = send(
        &ctx,
        Method::POST,
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": "fuad.aliyev", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn init_data_seeds_once() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    let teacher = test_support::teacher_token(ctx.state.settings());

    let (status, body) = send(&ctx, Method::POST, "/api/init-data", Some(&teacher), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Data initialized successfully");

    let (_, body) = send(&ctx, Method::POST, "/api/init-data", Some(&teacher), None).await;
    assert_eq!(body["message"], "Data already initialized");

    let (_, groups) = send(&ctx, Method::GET, "/api/groups", Some(&teacher), None).await;
    assert_eq!(groups.as_array().map(Vec::len), Some(4));
    let (_, submissions) = send(&ctx, Method::GET, "/api/submissions/exam/exam1", Some(&teacher), None).await;
    assert_eq!(submissions[0]["score"], 10);
}
