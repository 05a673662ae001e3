use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;

use crate::repositories;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum HomeMetric {
    Users,
    Colleges,
    Teachers,
    ActiveStudents,
    Questions,
    Tests,
    Assignments,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TeacherMetric {
    TestsCreated,
    QuestionsInTests,
    StudentsAssigned,
    ResultsRecorded,
}

#[async_trait]
pub(crate) trait StatsSource: Send + Sync {
    async fn count(&self, metric: HomeMetric) -> Result<i64, sqlx::Error>;

    async fn count_for_teacher(
        &self,
        metric: TeacherMetric,
        teacher_id: &str,
    ) -> Result<i64, sqlx::Error>;
}

#[async_trait]
impl StatsSource for PgPool {
    async fn count(&self, metric: HomeMetric) -> Result<i64, sqlx::Error> {
        repositories::stats::count(self, metric).await
    }

    async fn count_for_teacher(
        &self,
        metric: TeacherMetric,
        teacher_id: &str,
    ) -> Result<i64, sqlx::Error> {
        repositories::stats::count_for_teacher(self, metric, teacher_id).await
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub(crate) struct HomeStats {
    pub(crate) total_users: i64,
    pub(crate) total_colleges: i64,
    pub(crate) active_teachers: i64,
    pub(crate) active_students: i64,
    pub(crate) total_questions: i64,
    pub(crate) total_tests: i64,
    pub(crate) total_assignments: i64,
    pub(crate) total_results: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub(crate) struct TeacherStats {
    pub(crate) tests_created: i64,
    pub(crate) questions_in_tests: i64,
    pub(crate) students_assigned: i64,
    pub(crate) results_recorded: i64,
}

/// Aggregate counts for the landing pages. All counts of a page are queried
/// concurrently and the first failure fails the whole page.
#[derive(Clone)]
pub(crate) struct Dashboard {
    source: Arc<dyn StatsSource>,
}

impl Dashboard {
    pub(crate) fn new(source: Arc<dyn StatsSource>) -> Self {
        Self { source }
    }

    pub(crate) async fn home_stats(&self) -> Result<HomeStats, sqlx::Error> {
        let source = &self.source;
        let (users, colleges, teachers, students, questions, tests, assignments, results) = tokio::try_join!(
            source.count(HomeMetric::Users),
            source.count(HomeMetric::Colleges),
            source.count(HomeMetric::Teachers),
            source.count(HomeMetric::ActiveStudents),
            source.count(HomeMetric::Questions),
            source.count(HomeMetric::Tests),
            source.count(HomeMetric::Assignments),
            source.count(HomeMetric::Results),
        )?;

        Ok(HomeStats {
            total_users: users,
            total_colleges: colleges,
            active_teachers: teachers,
            active_students: students,
            total_questions: questions,
            total_tests: tests,
            total_assignments: assignments,
            total_results: results,
        })
    }

    pub(crate) async fn teacher_stats(&self, teacher_id: &str) -> Result<TeacherStats, sqlx::Error> {
        let source = &self.source;
        let (tests, questions, students, results) = tokio::try_join!(
            source.count_for_teacher(TeacherMetric::TestsCreated, teacher_id),
            source.count_for_teacher(TeacherMetric::QuestionsInTests, teacher_id),
            source.count_for_teacher(TeacherMetric::StudentsAssigned, teacher_id),
            source.count_for_teacher(TeacherMetric::ResultsRecorded, teacher_id),
        )?;

        Ok(TeacherStats {
            tests_created: tests,
            questions_in_tests: questions,
            students_assigned: students,
            results_recorded: results,
        })
    }
}
