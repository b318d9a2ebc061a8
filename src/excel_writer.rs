use anyhow::Result;
use log::info;
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::Path;

use crate::models::{ScoredCandidate, SourceLoadStatus};

/// Writes the ranked candidates and the per-source load report to an Excel
/// file with one sheet each.
pub async fn write_excel_file(
    file_path: &Path,
    candidates: &[ScoredCandidate],
    statuses: &[SourceLoadStatus],
) -> Result<()> {
    info!("Initializing Excel workbook for file: {:?}", file_path);
    let mut workbook = Workbook::new();

    let candidate_sheet = workbook.add_worksheet();
    write_candidate_sheet(candidate_sheet, candidates)?;

    let status_sheet = workbook.add_worksheet();
    write_load_status_sheet(status_sheet, statuses)?;

    info!("Saving Excel workbook...");
    workbook.save(file_path)?;
    info!("Excel file saved successfully to {:?}", file_path);
    Ok(())
}

/// Helper function to write data to the "Candidates" sheet.
fn write_candidate_sheet(sheet: &mut Worksheet, data: &[ScoredCandidate]) -> Result<()> {
    sheet.set_name("Candidates")?;

    let headers = vec![
        "company_name",
        "match_score",
        "country",
        "city",
        "domain",
        "website",
        "email",
        "contact_person",
        "phone",
        "hs_code",
        "product_text",
        "industry",
        "country_targets",
        "source",
    ];

    for (col_num, header) in headers.iter().enumerate() {
        sheet.write_string(0, col_num as u16, *header)?;
    }

    for (row_num, row_data) in data.iter().enumerate() {
        let current_row = (row_num + 1) as u32; // +1 for header row
        sheet.write_string(current_row, 0, &row_data.company_name)?;
        sheet.write_number(current_row, 1, row_data.match_score as f64)?;
        sheet.write_string(current_row, 2, &row_data.country)?;
        sheet.write_string(current_row, 3, &row_data.city)?;
        sheet.write_string(current_row, 4, &row_data.domain)?;
        sheet.write_string(current_row, 5, &row_data.website)?;
        sheet.write_string(current_row, 6, &row_data.email)?;
        sheet.write_string(current_row, 7, &row_data.contact_person)?;
        sheet.write_string(current_row, 8, &row_data.phone)?;
        sheet.write_string(current_row, 9, &row_data.hs_code)?;
        sheet.write_string(current_row, 10, &row_data.product_text)?;
        sheet.write_string(current_row, 11, &row_data.industry)?;
        sheet.write_string(current_row, 12, &row_data.country_targets.join(", "))?;
        sheet.write_string(current_row, 13, &row_data.source)?;
    }
    info!("'Candidates' sheet written with {} rows.", data.len());
    Ok(())
}

/// Helper function to write the per-source diagnostics to the
/// "Load Status" sheet.
fn write_load_status_sheet(sheet: &mut Worksheet, data: &[SourceLoadStatus]) -> Result<()> {
    sheet.set_name("Load Status")?;

    let headers = vec![
        "source", "status", "rows", "cols", "encoding", "delimiter", "path", "detail",
    ];

    for (col_num, header) in headers.iter().enumerate() {
        sheet.write_string(0, col_num as u16, *header)?;
    }

    for (row_num, row_data) in data.iter().enumerate() {
        let current_row = (row_num + 1) as u32;
        sheet.write_string(current_row, 0, &row_data.source)?;
        sheet.write_string(current_row, 1, row_data.status.as_str())?;
        sheet.write_number(current_row, 2, row_data.rows as f64)?;
        sheet.write_number(current_row, 3, row_data.cols as f64)?;
        sheet.write_string(current_row, 4, &row_data.encoding)?;
        sheet.write_string(current_row, 5, &row_data.delimiter)?;
        sheet.write_string(current_row, 6, &row_data.path)?;
        sheet.write_string(current_row, 7, &row_data.detail)?;
    }
    info!("'Load Status' sheet written with {} rows.", data.len());
    Ok(())
}
