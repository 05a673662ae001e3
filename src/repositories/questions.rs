use sqlx::PgPool;

use crate::db::models::{Question, QuestionOption, QuestionWithOptions};
use crate::db::types::{DifficultyLevel, QuestionType};

const COLUMNS: &str = "\
    id, question_type, question_text, difficulty, correct_option_id, created_by, created_at";
const OPTION_COLUMNS: &str = "id, question_id, option_index, option_text";

pub(crate) async fn find_with_options(
    pool: &PgPool,
    id: i64,
) -> Result<Option<QuestionWithOptions>, sqlx::Error> {
    let question =
        sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    let Some(question) = question else {
        return Ok(None);
    };

    let options = sqlx::query_as::<_, QuestionOption>(&format!(
        "SELECT {OPTION_COLUMNS} FROM question_options
         WHERE question_id = $1
         ORDER BY option_index"
    ))
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(QuestionWithOptions { question, options }))
}

pub(crate) struct CreateQuestion<'a> {
    pub question_type: QuestionType,
    pub question_text: &'a str,
    pub difficulty: DifficultyLevel,
    pub options: &'a [String],
    /// 1-based position in `options`.
    pub correct_option: Option<usize>,
    pub created_by: &'a str,
    pub created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateQuestion<'_>,
) -> Result<QuestionWithOptions, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let mut question = sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (question_type, question_text, difficulty, created_by, created_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(params.question_type)
    .bind(params.question_text)
    .bind(params.difficulty)
    .bind(params.created_by)
    .bind(params.created_at)
    .fetch_one(&mut *tx)
    .await?;

    let mut options = Vec::with_capacity(params.options.len());
    for (position, text) in params.options.iter().enumerate() {
        let option = sqlx::query_as::<_, QuestionOption>(&format!(
            "INSERT INTO question_options (question_id, option_index, option_text)
             VALUES ($1,$2,$3)
             RETURNING {OPTION_COLUMNS}",
        ))
        .bind(question.id)
        .bind(position as i32 + 1)
        .bind(text)
        .fetch_one(&mut *tx)
        .await?;
        options.push(option);
    }

    let correct_id = params
        .correct_option
        .and_then(|index| index.checked_sub(1))
        .and_then(|index| options.get(index))
        .map(|option| option.id);

    if let Some(correct_id) = correct_id {
        sqlx::query("UPDATE questions SET correct_option_id = $1 WHERE id = $2")
            .bind(correct_id)
            .bind(question.id)
            .execute(&mut *tx)
            .await?;
        question.correct_option_id = Some(correct_id);
    }

    tx.commit().await?;
    Ok(QuestionWithOptions { question, options })
}
