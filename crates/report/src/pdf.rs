use chrono::Local;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use trimatch_engine::ReconSummary;

use crate::ReportError;

fn pdf_err<E: std::fmt::Display>(e: E) -> ReportError {
    ReportError::Pdf(e.to_string())
}

/// Renders the one-page A4 summary: title, generation timestamp and the
/// headline counts. Row-level detail lives in the workbook.
pub fn build_summary_pdf(client: &str, summary: &ReconSummary) -> Result<Vec<u8>, ReportError> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Reconciliation Report - {client}"),
        Mm(210.0),
        Mm(297.0),
        "Summary",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_err)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_err)?;
    let layer = doc.get_page(page).get_layer(layer);

    layer.use_text(
        format!("Reconciliation Report - {client}"),
        18.0,
        Mm(20.0),
        Mm(270.0),
        &bold,
    );
    layer.use_text(
        format!("Generated {}", Local::now().format("%d/%m/%Y %H:%M")),
        10.0,
        Mm(20.0),
        Mm(262.0),
        &regular,
    );

    let lines = [
        ("Total transactions", summary.total.to_string()),
        ("Matched", summary.matched.to_string()),
        ("Partially matched", summary.partially_matched.to_string()),
        ("Unmatched", summary.unmatched.to_string()),
        ("Match rate", format!("{:.2}%", summary.match_rate_pct)),
    ];
    let mut y = 245.0;
    for (name, value) in lines {
        layer.use_text(name, 12.0, Mm(20.0), Mm(y), &bold);
        layer.use_text(value, 12.0, Mm(90.0), Mm(y), &regular);
        y -= 8.0;
    }

    doc.save_to_bytes().map_err(pdf_err)
}
