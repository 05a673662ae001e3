use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Student,
    Teacher,
    Admin,
}

impl UserRole {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "student" => Some(Self::Student),
            "teacher" => Some(Self::Teacher),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Roles a principal of this role may register.
    pub(crate) fn can_register(self, target: UserRole) -> bool {
        match self {
            Self::Admin => true,
            Self::Teacher => target == Self::Student,
            Self::Student => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "questiontype", rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum QuestionType {
    Mcq,
    TrueFalse,
    Descriptive,
}

impl QuestionType {
    pub(crate) fn is_scorable(self) -> bool {
        match self {
            Self::Mcq | Self::TrueFalse => true,
            Self::Descriptive => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "difficultylevel", rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "memberstatus", rename_all = "lowercase")]
pub(crate) enum MemberStatus {
    Active,
    Inactive,
}
