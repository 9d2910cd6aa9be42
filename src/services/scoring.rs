use crate::db::models::{AnswerMap, Question};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Score {
    pub(crate) correct: usize,
    pub(crate) points: i32,
}

/// Answers match when equal after trimming and lowercasing. Missing answers score zero.
pub(crate) fn answer_matches(given: &str, expected: &str) -> bool {
    normalize(given) == normalize(expected)
}

pub(crate) fn score_answers(questions: &[Question], answers: &AnswerMap, points_per_question: i32) -> Score {
    let correct = questions
        .iter()
        .enumerate()
        .filter(|(index, question)| {
            answers
                .get(index)
                .is_some_and(|given| answer_matches(given, &question.correct_answer))
        })
        .count();

    Score { correct, points: points_for(correct, points_per_question) }
}

pub(crate) fn max_score(question_count: usize, points_per_question: i32) -> i32 {
    points_for(question_count, points_per_question)
}

/// Saturates at `i32::MAX` instead of wrapping.
fn points_for(count: usize, points_per_question: i32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX).saturating_mul(points_per_question)
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}
