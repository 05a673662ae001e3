use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::core::cache::{self, Cache};
use crate::core::time::{elapsed_between, format_elapsed, primitive_now_utc};
use crate::db::models::{
    PrincipalSummary, QuestionWithOptions, Student, StudentAnswer, TestAssignment, TestResult,
};
use crate::db::{self, types::QuestionType};
use crate::repositories;

#[derive(Debug, Error)]
pub(crate) enum ScoringError {
    #[error("User not found")]
    PrincipalNotFound,
    #[error("Student not found")]
    StudentNotFound,
    #[error("Test assignment not found")]
    AssignmentNotFound,
    #[error("Result already recorded for this student and test")]
    AlreadyScored,
    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

fn storage(context: &'static str) -> impl FnOnce(sqlx::Error) -> ScoringError {
    move |source| ScoringError::Storage { context, source }
}

pub(crate) struct NewResult<'a> {
    pub(crate) test_id: i64,
    pub(crate) user_id: &'a str,
    pub(crate) tally: Tally,
    pub(crate) time_taken: &'a str,
}

/// Reads and writes everything the scoring pipeline touches.
#[async_trait]
pub(crate) trait ScoringStore: Send + Sync {
    async fn find_principal(&self, user_id: &str) -> Result<Option<PrincipalSummary>, sqlx::Error>;

    async fn find_student(&self, user_id: &str) -> Result<Option<Student>, sqlx::Error>;

    async fn result_exists(&self, test_id: i64, user_id: &str) -> Result<bool, sqlx::Error>;

    async fn list_answers(
        &self,
        test_id: i64,
        student_id: i64,
    ) -> Result<Vec<StudentAnswer>, sqlx::Error>;

    async fn find_question(
        &self,
        question_id: i64,
    ) -> Result<Option<QuestionWithOptions>, sqlx::Error>;

    async fn find_assignment(
        &self,
        test_id: i64,
        user_id: &str,
    ) -> Result<Option<TestAssignment>, sqlx::Error>;

    async fn insert_result(&self, result: NewResult<'_>) -> Result<TestResult, sqlx::Error>;
}

#[async_trait]
impl ScoringStore for PgPool {
    async fn find_principal(&self, user_id: &str) -> Result<Option<PrincipalSummary>, sqlx::Error> {
        repositories::users::find_summary(self, user_id).await
    }

    async fn find_student(&self, user_id: &str) -> Result<Option<Student>, sqlx::Error> {
        repositories::students::find_by_user_id(self, user_id).await
    }

    async fn result_exists(&self, test_id: i64, user_id: &str) -> Result<bool, sqlx::Error> {
        repositories::results::exists(self, test_id, user_id).await
    }

    async fn list_answers(
        &self,
        test_id: i64,
        student_id: i64,
    ) -> Result<Vec<StudentAnswer>, sqlx::Error> {
        repositories::answers::list_for_student_test(self, student_id, test_id).await
    }

    async fn find_question(
        &self,
        question_id: i64,
    ) -> Result<Option<QuestionWithOptions>, sqlx::Error> {
        repositories::questions::find_with_options(self, question_id).await
    }

    async fn find_assignment(
        &self,
        test_id: i64,
        user_id: &str,
    ) -> Result<Option<TestAssignment>, sqlx::Error> {
        repositories::assignments::find_for_student_test(self, user_id, test_id).await
    }

    async fn insert_result(&self, result: NewResult<'_>) -> Result<TestResult, sqlx::Error> {
        repositories::results::create(
            self,
            repositories::results::CreateResult {
                test_id: result.test_id,
                user_id: result.user_id,
                score: result.tally.score(),
                correct: result.tally.correct,
                incorrect: result.tally.incorrect,
                ignored: result.tally.ignored,
                time_taken: result.time_taken,
                created_at: primitive_now_utc(),
            },
        )
        .await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    Correct,
    Incorrect,
    Ignored,
}

/// Judges one submitted answer. `selected` is a 1-based option index; a
/// question that could not be loaded is passed as `None`.
pub(crate) fn classify(selected: &str, question: Option<&QuestionWithOptions>) -> Verdict {
    let Some(question) = question else {
        return Verdict::Ignored;
    };

    let selected = selected.trim();
    if selected.is_empty() || !question.question.question_type.is_scorable() {
        return Verdict::Ignored;
    }

    let Ok(index) = selected.parse::<usize>() else {
        return Verdict::Ignored;
    };
    let Some(option) = index.checked_sub(1).and_then(|i| question.options.get(i)) else {
        return Verdict::Ignored;
    };

    match question.question.correct_option_id {
        Some(correct) if correct == option.id => Verdict::Correct,
        _ => Verdict::Incorrect,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    pub(crate) correct: i32,
    pub(crate) incorrect: i32,
    pub(crate) ignored: i32,
}

impl Tally {
    pub(crate) fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Correct => self.correct += 1,
            Verdict::Incorrect => self.incorrect += 1,
            Verdict::Ignored => self.ignored += 1,
        }
    }

    pub(crate) fn score(&self) -> i32 {
        self.correct
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ScoreReport {
    pub(crate) result: TestResult,
    pub(crate) student_name: String,
    pub(crate) college_name: Option<String>,
    pub(crate) branch: String,
}

#[derive(Clone)]
pub(crate) struct Scorer {
    store: Arc<dyn ScoringStore>,
    cache: Arc<dyn Cache>,
}

impl Scorer {
    pub(crate) fn new(store: Arc<dyn ScoringStore>, cache: Arc<dyn Cache>) -> Self {
        Self { store, cache }
    }

    pub(crate) async fn score(&self, test_id: i64, user_id: &str) -> Result<ScoreReport, ScoringError> {
        let principal = self
            .store
            .find_principal(user_id)
            .await
            .map_err(storage("Failed to load user"))?
            .ok_or(ScoringError::PrincipalNotFound)?;
        let student = self
            .store
            .find_student(user_id)
            .await
            .map_err(storage("Failed to load student"))?
            .ok_or(ScoringError::StudentNotFound)?;

        if self
            .store
            .result_exists(test_id, user_id)
            .await
            .map_err(storage("Failed to check existing result"))?
        {
            return Err(ScoringError::AlreadyScored);
        }

        let answers = self
            .store
            .list_answers(test_id, student.id)
            .await
            .map_err(storage("Could not fetch student answers"))?;

        let mut tally = Tally::default();
        let mut seen = HashSet::with_capacity(answers.len());
        for answer in &answers {
            // Rows come back ordered by id; only the earliest answer per question counts.
            if !seen.insert(answer.question_id) {
                tracing::warn!(
                    question_id = answer.question_id,
                    answer_id = answer.id,
                    "Skipping repeated answer for an already judged question"
                );
                continue;
            }
            let question = self
                .store
                .find_question(answer.question_id)
                .await
                .map_err(storage("Failed to load question"))?;
            if question.is_none() {
                tracing::warn!(
                    question_id = answer.question_id,
                    answer_id = answer.id,
                    "Answer references a missing question; counting it as ignored"
                );
            }
            tally.record(classify(&answer.selected, question.as_ref()));
        }

        let assignment = self
            .store
            .find_assignment(test_id, user_id)
            .await
            .map_err(storage("Failed to load test assignment"))?
            .ok_or(ScoringError::AssignmentNotFound)?;
        let time_taken =
            format_elapsed(elapsed_between(assignment.start_time, primitive_now_utc()));

        let result = match self
            .store
            .insert_result(NewResult { test_id, user_id, tally, time_taken: &time_taken })
            .await
        {
            Ok(result) => result,
            Err(err) if db::is_unique_violation(&err) => return Err(ScoringError::AlreadyScored),
            Err(err) => return Err(storage("Failed to save result")(err)),
        };

        if let Err(err) = cache::invalidate_results(self.cache.as_ref(), test_id).await {
            tracing::warn!(error = %err, test_id, "Failed to invalidate cached results");
        }

        tracing::info!(
            test_id,
            user_id = %user_id,
            correct = tally.correct,
            incorrect = tally.incorrect,
            ignored = tally.ignored,
            "Result recorded"
        );

        Ok(ScoreReport {
            result,
            student_name: principal.name,
            college_name: principal.college_name,
            branch: student.branch,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::cache::{results_cache_key, results_version_key};
    use crate::db::types::UserRole;
    use crate::test_support::{self, MemoryCache, MemoryScoringStore};

    const TEST_ID: i64 = 7;
    const USER_ID: &str = "student-user";

    fn scorer(store: &Arc<MemoryScoringStore>, cache: &Arc<MemoryCache>) -> Scorer {
        Scorer::new(store.clone(), cache.clone())
    }

    fn enrolled_store() -> Arc<MemoryScoringStore> {
        let store = Arc::new(MemoryScoringStore::default());
        store.add_student(USER_ID, "Asha", Some("City College"), 11, "CSE");
        store.assign(TEST_ID, USER_ID, 65);
        store
    }

    #[test]
    fn mcq_answers_are_judged_by_option_id() {
        let question = test_support::mcq(1, 4, Some(2));

        assert_eq!(classify("2", Some(&question)), Verdict::Correct);
        assert_eq!(classify(" 3 ", Some(&question)), Verdict::Incorrect);
        assert_eq!(classify("", Some(&question)), Verdict::Ignored);
        assert_eq!(classify("   ", Some(&question)), Verdict::Ignored);
    }

    #[test]
    fn out_of_range_or_non_numeric_selections_are_ignored() {
        let question = test_support::mcq(1, 4, Some(1));

        assert_eq!(classify("7", Some(&question)), Verdict::Ignored);
        assert_eq!(classify("0", Some(&question)), Verdict::Ignored);
        assert_eq!(classify("-1", Some(&question)), Verdict::Ignored);
        assert_eq!(classify("b", Some(&question)), Verdict::Ignored);
    }

    #[test]
    fn descriptive_and_missing_questions_are_ignored() {
        let mut descriptive = test_support::mcq(1, 2, Some(1));
        descriptive.question.question_type = QuestionType::Descriptive;

        assert_eq!(classify("1", Some(&descriptive)), Verdict::Ignored);
        assert_eq!(classify("1", None), Verdict::Ignored);
    }

    #[test]
    fn scorable_question_without_correct_option_is_incorrect() {
        let question = test_support::mcq(1, 2, None);
        assert_eq!(classify("1", Some(&question)), Verdict::Incorrect);
    }

    #[tokio::test]
    async fn mixed_answers_are_tallied_and_persisted() {
        let store = enrolled_store();
        let cache = Arc::new(MemoryCache::default());
        store.add_question(test_support::mcq(1, 4, Some(2)));
        store.add_question(test_support::mcq(2, 4, Some(1)));
        store.add_question(test_support::mcq(3, 4, Some(4)));
        store.answer(TEST_ID, 11, 1, "2");
        store.answer(TEST_ID, 11, 2, "3");
        store.answer(TEST_ID, 11, 3, "");

        let report = scorer(&store, &cache).score(TEST_ID, USER_ID).await.expect("score");

        assert_eq!(report.result.correct, 1);
        assert_eq!(report.result.incorrect, 1);
        assert_eq!(report.result.ignored, 1);
        assert_eq!(report.result.score, 1);
        assert_eq!(report.student_name, "Asha");
        assert_eq!(report.college_name.as_deref(), Some("City College"));
        assert_eq!(report.branch, "CSE");
        assert!(report.result.time_taken.starts_with("1m"), "{}", report.result.time_taken);
        assert_eq!(store.results().len(), 1);
    }

    #[tokio::test]
    async fn no_answers_yields_zero_counts() {
        let store = enrolled_store();
        let cache = Arc::new(MemoryCache::default());

        let report = scorer(&store, &cache).score(TEST_ID, USER_ID).await.expect("score");

        assert_eq!(
            (report.result.correct, report.result.incorrect, report.result.ignored),
            (0, 0, 0)
        );
    }

    #[tokio::test]
    async fn answer_to_deleted_question_still_counts() {
        let store = enrolled_store();
        let cache = Arc::new(MemoryCache::default());
        store.add_question(test_support::mcq(1, 4, Some(1)));
        store.answer(TEST_ID, 11, 1, "1");
        store.answer(TEST_ID, 11, 99, "1");

        let report = scorer(&store, &cache).score(TEST_ID, USER_ID).await.expect("score");

        let counted = report.result.correct + report.result.incorrect + report.result.ignored;
        assert_eq!(counted, 2);
        assert_eq!(report.result.ignored, 1);
    }

    #[tokio::test]
    async fn second_score_for_same_pair_is_rejected() {
        let store = enrolled_store();
        let cache = Arc::new(MemoryCache::default());
        let scorer = scorer(&store, &cache);

        scorer.score(TEST_ID, USER_ID).await.expect("first");
        let err = scorer.score(TEST_ID, USER_ID).await.unwrap_err();

        assert!(matches!(err, ScoringError::AlreadyScored));
        assert_eq!(store.results().len(), 1);
    }

    #[tokio::test]
    async fn unknown_user_student_or_assignment_is_not_found() {
        let cache = Arc::new(MemoryCache::default());

        let empty = Arc::new(MemoryScoringStore::default());
        let err = scorer(&empty, &cache).score(TEST_ID, USER_ID).await.unwrap_err();
        assert!(matches!(err, ScoringError::PrincipalNotFound));

        let no_profile = Arc::new(MemoryScoringStore::default());
        no_profile.add_principal(USER_ID, "Asha", None);
        let err = scorer(&no_profile, &cache).score(TEST_ID, USER_ID).await.unwrap_err();
        assert!(matches!(err, ScoringError::StudentNotFound));

        let unassigned = Arc::new(MemoryScoringStore::default());
        unassigned.add_student(USER_ID, "Asha", None, 11, "CSE");
        let err = scorer(&unassigned, &cache).score(TEST_ID, USER_ID).await.unwrap_err();
        assert!(matches!(err, ScoringError::AssignmentNotFound));
        assert!(unassigned.results().is_empty());
    }

    #[tokio::test]
    async fn recording_a_result_drops_cached_result_pages() {
        let store = enrolled_store();
        let cache = Arc::new(MemoryCache::default());
        cache.insert(&results_cache_key(TEST_ID, 0, 1, 20), "[]");
        cache.insert(&results_cache_key(TEST_ID + 1, 0, 1, 20), "[]");

        scorer(&store, &cache).score(TEST_ID, USER_ID).await.expect("score");

        assert!(cache.value(&results_cache_key(TEST_ID, 0, 1, 20)).is_none());
        assert!(cache.value(&results_cache_key(TEST_ID + 1, 0, 1, 20)).is_some());
        assert_eq!(cache.value(&results_version_key(TEST_ID)).as_deref(), Some("1"));
        assert!(cache.value(&results_version_key(TEST_ID + 1)).is_none());
    }

    #[tokio::test]
    async fn repeated_answer_to_one_question_counts_once() {
        let store = enrolled_store();
        let cache = Arc::new(MemoryCache::default());
        store.add_question(test_support::mcq(1, 4, Some(2)));
        store.answer(TEST_ID, 11, 1, "2");
        store.answer(TEST_ID, 11, 1, "2");

        let report = scorer(&store, &cache).score(TEST_ID, USER_ID).await.expect("score");

        assert_eq!(report.result.correct, 1);
        assert_eq!(report.result.score, 1);
        let counted = report.result.correct + report.result.incorrect + report.result.ignored;
        assert_eq!(counted, 1);
    }

    #[tokio::test]
    async fn earliest_answer_wins_when_a_question_repeats() {
        let store = enrolled_store();
        let cache = Arc::new(MemoryCache::default());
        store.add_question(test_support::mcq(1, 4, Some(2)));
        store.answer(TEST_ID, 11, 1, "3");
        store.answer(TEST_ID, 11, 1, "2");

        let report = scorer(&store, &cache).score(TEST_ID, USER_ID).await.expect("score");

        assert_eq!((report.result.correct, report.result.incorrect), (0, 1));
    }

    #[tokio::test]
    async fn postgres_store_scores_once_and_joins_student_details() {
        let Some(ctx) = test_support::setup_db_context().await else {
            return;
        };
        let db = ctx.state.db();
        let college = test_support::insert_college(db, "City College", "Kerala").await;
        let teacher =
            test_support::insert_user(db, "Tara", "tara@example.com", UserRole::Teacher, None).await;
        let pupil = test_support::insert_user(
            db,
            "Asha",
            "asha@example.com",
            UserRole::Student,
            Some(college.id),
        )
        .await;
        let student = test_support::insert_student(db, &pupil, "CSE").await;
        let test = test_support::insert_test(db, &teacher, "Algebra").await;
        let first = test_support::insert_mcq(db, &teacher, 2).await;
        let second = test_support::insert_mcq(db, &teacher, 1).await;
        let now = primitive_now_utc();
        repositories::assignments::assign_to_college(db, test.id, college.id, now)
            .await
            .expect("assign");
        repositories::answers::create_many(
            db,
            &[
                repositories::answers::CreateAnswer {
                    test_id: test.id,
                    student_id: student.id,
                    question_id: first.question.id,
                    selected: "2",
                },
                repositories::answers::CreateAnswer {
                    test_id: test.id,
                    student_id: student.id,
                    question_id: second.question.id,
                    selected: "4",
                },
            ],
            primitive_now_utc(),
        )
        .await
        .expect("answers");

        let report = ctx.state.scorer().score(test.id, &pupil.id).await.expect("score");
        assert_eq!((report.result.correct, report.result.incorrect), (1, 1));

        let err = ctx.state.scorer().score(test.id, &pupil.id).await.unwrap_err();
        assert!(matches!(err, ScoringError::AlreadyScored));

        let duplicate = ScoringStore::insert_result(
            db,
            NewResult {
                test_id: test.id,
                user_id: &pupil.id,
                tally: Tally::default(),
                time_taken: "0s",
            },
        )
        .await
        .unwrap_err();
        assert!(db::is_unique_violation(&duplicate));

        let rows = repositories::results::list_enriched(db, test.id, 0, 20).await.expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].student_name, "Asha");
        assert_eq!(rows[0].college_name.as_deref(), Some("City College"));
        assert_eq!(rows[0].branch.as_deref(), Some("CSE"));
        assert_eq!(rows[0].score, 1);
    }
}
