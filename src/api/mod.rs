pub(crate) mod answers;
pub(crate) mod auth;
pub(crate) mod colleges;
pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod home;
pub(crate) mod middleware;
pub(crate) mod pagination;
pub(crate) mod profile;
pub(crate) mod questions;
pub(crate) mod reports;
pub(crate) mod results;
pub(crate) mod router;
pub(crate) mod test_papers;
pub(crate) mod validation;
