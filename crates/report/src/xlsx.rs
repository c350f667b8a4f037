use chrono::Local;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet, XlsxError};
use trimatch_engine::{ReconOutput, ReconRow};

use crate::ReportError;

const MATCHED_FILL: u32 = 0xC6EFCE;
const PARTIAL_FILL: u32 = 0xFFF2CC;
const UNMATCHED_FILL: u32 = 0xF4CCCC;

const HEADERS: &[&str] = &[
    "Source",
    "Date",
    "Group Date",
    "Reference",
    "Amount",
    "Currency",
    "Status",
    "Match Type",
    "Resolution",
    "Variance",
    "Match Reason",
];

const COLUMN_WIDTHS: &[f64] = &[
    10.0, 12.0, 12.0, 24.0, 12.0, 10.0, 18.0, 26.0, 24.0, 12.0, 56.0,
];

/// Renders the full reconciliation workbook: a title block, the run
/// summary, then one coloured table per status section.
pub fn build_workbook(client: &str, output: &ReconOutput) -> Result<Vec<u8>, ReportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Reconciliation")?;

    let title = Format::new().set_bold().set_font_size(14.0);
    let label = Format::new().set_bold();
    let header = Format::new()
        .set_bold()
        .set_background_color(Color::Black)
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin);

    sheet.write_string_with_format(0, 0, format!("Reconciliation Report - {client}"), &title)?;
    sheet.write_string(
        1,
        0,
        format!("Generated {}", Local::now().format("%d/%m/%Y %H:%M")),
    )?;

    let s = &output.summary;
    let summary = [
        ("Total transactions", s.total.to_string()),
        ("Matched", s.matched.to_string()),
        ("Partially matched", s.partially_matched.to_string()),
        ("Unmatched", s.unmatched.to_string()),
        ("Match rate", format!("{:.2}%", s.match_rate_pct)),
    ];
    let mut row = 3u32;
    for (name, value) in summary {
        sheet.write_string_with_format(row, 0, name, &label)?;
        sheet.write_string(row, 1, value)?;
        row += 1;
    }
    row += 1;

    let sections: [(&str, &[ReconRow], u32); 3] = [
        ("Matched", &output.matched, MATCHED_FILL),
        ("Partially Matched", &output.partial, PARTIAL_FILL),
        ("Unmatched", &output.unmatched, UNMATCHED_FILL),
    ];
    for (name, rows, fill) in sections {
        row = write_section(sheet, row, name, rows, fill, &header)?;
        row += 1;
    }

    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_section(
    sheet: &mut Worksheet,
    start: u32,
    name: &str,
    rows: &[ReconRow],
    fill: u32,
    header: &Format,
) -> Result<u32, XlsxError> {
    let section = Format::new().set_bold().set_font_size(12.0);
    sheet.write_string_with_format(start, 0, format!("{name} ({})", rows.len()), &section)?;

    let mut row = start + 1;
    for (col, h) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(row, col as u16, *h, header)?;
    }
    row += 1;

    let body = Format::new()
        .set_background_color(Color::RGB(fill))
        .set_border(FormatBorder::Thin);
    for r in rows {
        write_row(sheet, row, r, &body)?;
        row += 1;
    }
    Ok(row)
}

fn write_row(
    sheet: &mut Worksheet,
    row: u32,
    r: &ReconRow,
    format: &Format,
) -> Result<(), XlsxError> {
    let date = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default()
    };
    let t = &r.transaction;
    let c = &r.classification;
    let cells = [
        t.source.to_string(),
        date(t.date),
        date(r.group_date),
        t.reference.clone(),
        t.amount_base.to_string(),
        t.currency.clone(),
        c.status.to_string(),
        c.match_type.map(|m| m.to_string()).unwrap_or_default(),
        c.resolution.to_string(),
        c.variance.map(|v| v.to_string()).unwrap_or_default(),
        c.reason.clone(),
    ];
    for (col, cell) in cells.into_iter().enumerate() {
        sheet.write_string_with_format(row, col as u16, cell, format)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trimatch_core::{RawRecord, ReconConfig};
    use trimatch_engine::reconcile;

    fn rec(date: &str, amount: &str, reference: &str) -> RawRecord {
        RawRecord {
            date: Some(date.to_string()),
            amount: Some(amount.to_string()),
            reference: Some(reference.to_string()),
            currency: None,
        }
    }

    fn sample_output() -> ReconOutput {
        let bank = vec![rec("05/01/2024", "100.00", "INV1001"), rec("06/01/2024", "4.99", "STRIPE FEE")];
        let ledger = vec![rec("05/01/2024", "100.00", "INV1001"), rec("07/01/2024", "50.00", "ABC")];
        let gateway = vec![rec("05/01/2024", "100.00", "INV1001"), rec("07/01/2024", "50.00", "ABC")];
        reconcile(&bank, &ledger, &gateway, &ReconConfig::default())
    }

    #[test]
    fn workbook_bytes_are_a_zip_archive() {
        let bytes = build_workbook("Acme Ltd", &sample_output()).unwrap();
        assert!(bytes.len() > 1000);
        // XLSX is a zip container.
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn empty_run_still_renders() {
        let out = ReconOutput {
            all: vec![],
            matched: vec![],
            partial: vec![],
            unmatched: vec![],
            summary: Default::default(),
        };
        let bytes = build_workbook("Acme Ltd", &out).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
