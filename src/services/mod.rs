pub(crate) mod dashboard;
pub(crate) mod scoring;
pub(crate) mod sessions;
