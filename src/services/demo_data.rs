use time::macros::datetime;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{AnswerMap, Question};
use crate::db::types::{QuestionKind, StudentStatus};
use crate::repositories;
use crate::services::scoring;

struct DemoStudent {
    id: &'static str,
    name: &'static str,
    surname: &'static str,
    email: &'static str,
    password: &'static str,
    group: &'static str,
    class_name: &'static str,
    parent_contact: &'static str,
    status: StudentStatus,
}

const GROUPS: [(&str, &str); 4] = [("1", "10(1,3)"), ("2", "11S"), ("3", "9A"), ("4", "10B")];

const STUDENTS: [DemoStudent; 3] = [
    DemoStudent {
        id: "1",
        name: "Nijat",
        surname: "Qəsynli",
        email: "nijatqəsynli59",
        password: "nijat123",
        group: "10(1,3)",
        class_name: "10a",
        parent_contact: "+994501234567",
        status: StudentStatus::Active,
    },
    DemoStudent {
        id: "2",
        name: "Aynur",
        surname: "Məmmədova",
        email: "aynur.mammadova",
        password: "aynur123",
        group: "10(1,3)",
        class_name: "10a",
        parent_contact: "+994501234568",
        status: StudentStatus::Active,
    },
    DemoStudent {
        id: "3",
        name: "Fuad",
        surname: "Əliyev",
        email: "fuad.aliyev",
        password: "fuad123",
        group: "11S",
        class_name: "11a",
        parent_contact: "+994501234569",
        status: StudentStatus::Disabled,
    },
];

/// Seeds demo groups, students, exams and one submission. Does nothing and
/// returns `false` when any student already exists.
pub(crate) async fn seed_if_empty(state: &AppState) -> anyhow::Result<bool> {
    let pool = state.db();
    if repositories::students::count(pool).await? > 0 {
        return Ok(false);
    }

    let now = primitive_now_utc();

    for (id, name) in GROUPS {
        repositories::groups::create(pool, id, name, now).await?;
    }

    for student in &STUDENTS {
        repositories::students::create(
            pool,
            repositories::students::CreateStudent {
                id: student.id,
                name: student.name,
                surname: student.surname,
                email: student.email,
                hashed_password: security::hash_password(student.password)?,
                group_name: student.group,
                class_name: student.class_name,
                parent_contact: student.parent_contact,
                status: student.status,
                created_at: now,
            },
        )
        .await?;
    }

    let groups = vec!["10(1,3)".to_string()];
    let quiz = vec![Question {
        question: "x² + 5x + 6 = 0 tənliyinin köklərini tapın".to_string(),
        kind: QuestionKind::MultipleChoice,
        options: Some(
            ["x = -2, x = -3", "x = 2, x = 3", "x = -1, x = -6", "x = 1, x = 6"]
                .map(String::from)
                .to_vec(),
        ),
        correct_answer: "x = -2, x = -3".to_string(),
        image_url: None,
    }];
    let integral = vec![Question {
        question: "İnteqralı hesablayın: ∫x²dx".to_string(),
        kind: QuestionKind::FreeForm,
        options: None,
        correct_answer: "x³/3 + C".to_string(),
        image_url: None,
    }];

    repositories::exams::create(
        pool,
        "exam1",
        repositories::exams::ExamFields {
            title: "Quiz",
            description: "Bacarıqlarınızın qiymətləndirilməsi.",
            questions: &quiz,
            groups: &groups,
            start_time: datetime!(2025-09-21 23:44),
            end_time: datetime!(2025-09-22 00:44),
            points_per_question: 10,
        },
        now,
    )
    .await?;

    repositories::exams::create(
        pool,
        "exam2",
        repositories::exams::ExamFields {
            title: "3",
            description: "Bacarıqlarınızın qiymətləndirilməsi.",
            questions: &integral,
            groups: &groups,
            start_time: datetime!(2025-09-23 10:00),
            end_time: datetime!(2025-09-23 12:00),
            points_per_question: 10,
        },
        now,
    )
    .await?;

    let answers: AnswerMap = [(0, "x = -2, x = -3".to_string())].into_iter().collect();
    let score = scoring::score_answers(&quiz, &answers, 10);
    repositories::submissions::create_once(
        pool,
        repositories::submissions::CreateSubmission {
            id: "sub1",
            exam_id: "exam1",
            student_id: "1",
            answers: &answers,
            submitted_at: datetime!(2025-09-21 23:45:38),
            cheating_detected: false,
            score: score.points,
        },
    )
    .await?;

    tracing::info!(
        groups = GROUPS.len(),
        students = STUDENTS.len(),
        exams = 2,
        "Seeded demo data"
    );
    Ok(true)
}
