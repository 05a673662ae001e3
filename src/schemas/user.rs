use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::User;
use crate::db::types::UserRole;

#[derive(Debug, Serialize)]
pub(crate) struct ProfileResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) role: UserRole,
    pub(crate) college_id: Option<i64>,
    pub(crate) secondary_email: Option<String>,
    pub(crate) created_at: String,
}

impl ProfileResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            college_id: user.college_id,
            secondary_email: user.secondary_email,
            created_at: format_primitive(user.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct PasswordChangeRequest {
    #[validate(length(min = 1, message = "current_password must not be empty"))]
    pub(crate) current_password: String,
    #[validate(length(min = 8, message = "new_password must be at least 8 characters"))]
    pub(crate) new_password: String,
}
