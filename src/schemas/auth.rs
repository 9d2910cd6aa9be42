use serde::{Deserialize, Serialize};

use crate::core::security::Role;
use crate::schemas::student::StudentResponse;

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    #[serde(alias = "email")]
    pub(crate) username: String,
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TeacherProfile {
    pub(crate) username: String,
    pub(crate) name: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum Profile {
    Teacher(TeacherProfile),
    Student(StudentResponse),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) user_type: Role,
    pub(crate) user: Profile,
}
