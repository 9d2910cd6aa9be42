pub(crate) mod auth;
pub(crate) mod cheating_reports;
pub(crate) mod errors;
pub(crate) mod exams;
pub(crate) mod groups;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod init_data;
pub(crate) mod router;
pub(crate) mod students;
pub(crate) mod submissions;
pub(crate) mod validation;
