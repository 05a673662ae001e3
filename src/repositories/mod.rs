pub(crate) mod answers;
pub(crate) mod assignments;
pub(crate) mod colleges;
pub(crate) mod questions;
pub(crate) mod reports;
pub(crate) mod results;
pub(crate) mod stats;
pub(crate) mod students;
pub(crate) mod test_papers;
pub(crate) mod users;
