pub(crate) mod exams;
pub(crate) mod groups;
pub(crate) mod health;
pub(crate) mod students;
pub(crate) mod submissions;
