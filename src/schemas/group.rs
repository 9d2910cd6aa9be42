use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::Group;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct GroupPayload {
    #[validate(length(min = 1, max = 64, message = "group name must be 1-64 characters"))]
    pub(crate) name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GroupResponse {
    pub(crate) id: String,
    pub(crate) name: String,
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        Self { id: group.id, name: group.name }
    }
}
