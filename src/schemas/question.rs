use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::QuestionWithOptions;
use crate::db::types::{DifficultyLevel, QuestionType};

pub(crate) const MAX_OPTIONS: usize = 5;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionCreate {
    pub(crate) question_type: QuestionType,
    #[validate(length(min = 1, message = "question_text must not be empty"))]
    pub(crate) question_text: String,
    #[serde(default = "default_difficulty")]
    pub(crate) difficulty: DifficultyLevel,
    #[serde(default)]
    #[validate(length(max = 5, message = "at most 5 options are allowed"))]
    pub(crate) options: Vec<String>,
    /// 1-based index into `options`.
    #[serde(default)]
    pub(crate) correct_option: Option<usize>,
}

impl QuestionCreate {
    /// Checks that the options fit the question type.
    pub(crate) fn check_shape(&self) -> Result<(), String> {
        let count = self.options.len();
        match self.question_type {
            QuestionType::Mcq if !(1..=MAX_OPTIONS).contains(&count) => {
                return Err(format!("MCQ questions need 1..{MAX_OPTIONS} options"));
            }
            QuestionType::TrueFalse if count != 2 => {
                return Err("TRUE_FALSE questions need exactly 2 options".to_string());
            }
            QuestionType::Descriptive if count != 0 || self.correct_option.is_some() => {
                return Err("DESCRIPTIVE questions take no options".to_string());
            }
            _ => {}
        }

        if self.options.iter().any(|option| option.trim().is_empty()) {
            return Err("options must not be empty".to_string());
        }

        match self.correct_option {
            Some(index) if index == 0 || index > count => {
                Err(format!("correct_option must be between 1 and {count}"))
            }
            _ => Ok(()),
        }
    }
}

fn default_difficulty() -> DifficultyLevel {
    DifficultyLevel::Medium
}

#[derive(Debug, Serialize)]
pub(crate) struct OptionResponse {
    pub(crate) id: i64,
    pub(crate) option_index: i32,
    pub(crate) option_text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: i64,
    pub(crate) question_type: QuestionType,
    pub(crate) question_text: String,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) correct_option_id: Option<i64>,
    pub(crate) options: Vec<OptionResponse>,
}

impl QuestionResponse {
    pub(crate) fn from_db(value: QuestionWithOptions) -> Self {
        let QuestionWithOptions { question, options } = value;
        Self {
            id: question.id,
            question_type: question.question_type,
            question_text: question.question_text,
            difficulty: question.difficulty,
            correct_option_id: question.correct_option_id,
            options: options
                .into_iter()
                .map(|option| OptionResponse {
                    id: option.id,
                    option_index: option.option_index,
                    option_text: option.option_text,
                })
                .collect(),
        }
    }
}
