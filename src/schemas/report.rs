use serde::Serialize;

/// Admin report envelope: who asked, and the rows.
#[derive(Debug, Serialize)]
pub(crate) struct ReportResponse<T> {
    pub(crate) requested_by: String,
    pub(crate) data: Vec<T>,
}
