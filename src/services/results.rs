use std::collections::{BTreeMap, HashMap};

use crate::core::time::format_primitive;
use crate::db::models::{Exam, Student, Submission};
use crate::schemas::exam::{ExamResultsResponse, GroupResults, ResultEntry};
use crate::services::scoring;

pub(crate) const UNKNOWN_GROUP: &str = "Unknown";

/// Scores every submission against the current questions and groups them by
/// the student's group, best score first.
pub(crate) fn build_results(
    exam: &Exam,
    submissions: Vec<Submission>,
    students: &HashMap<String, Student>,
) -> ExamResultsResponse {
    let submission_count = submissions.len();
    let mut grouped: BTreeMap<String, Vec<ResultEntry>> = BTreeMap::new();

    for submission in submissions {
        let score =
            scoring::score_answers(&exam.questions.0, &submission.answers.0, exam.points_per_question);
        let student = students.get(&submission.student_id);
        let group = student
            .map(|student| student.group_name.clone())
            .unwrap_or_else(|| UNKNOWN_GROUP.to_string());
        let student_name = student.map(Student::full_name).unwrap_or_default();

        grouped.entry(group).or_default().push(ResultEntry {
            submission_id: submission.id,
            student_id: submission.student_id,
            student_name,
            score: score.points,
            correct_count: score.correct,
            cheating_detected: submission.cheating_detected,
            submitted_at: format_primitive(submission.submitted_at),
        });
    }

    let groups = grouped
        .into_iter()
        .map(|(group, mut entries)| {
            entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.student_name.cmp(&b.student_name)));
            GroupResults { group, entries }
        })
        .collect();

    ExamResultsResponse {
        exam_id: exam.id.clone(),
        title: exam.title.clone(),
        max_score: scoring::max_score(exam.questions.0.len(), exam.points_per_question),
        submission_count,
        groups,
    }
}
