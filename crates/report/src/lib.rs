//! `trimatch-report`: client-facing report rendering.
//!
//! Takes a finished reconciliation and renders it as a styled Excel
//! workbook (the full row-level report) and a one-page PDF summary.
//! Both renderers produce in-memory buffers so callers can write them
//! to a run folder or stream them over HTTP.

pub mod pdf;
pub mod xlsx;

use thiserror::Error;

pub use pdf::build_summary_pdf;
pub use xlsx::build_workbook;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("pdf error: {0}")]
    Pdf(String),
}
