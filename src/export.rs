use std::path::Path;

use anyhow::{Context, Result, bail};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::aggregate::Aggregate;
use crate::record::{StatRecord, StatTable, Value};

/// Widest sheet the xlsx format allows.
const MAX_COLUMNS: usize = 16_384;

pub struct ExportReport {
    pub rows: usize,
    pub columns: usize,
    pub skipped_leagues: usize,
}

pub fn export_table(path: &Path, table: &StatTable, title: &str) -> Result<ExportReport> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Stats")?;
        write_header(sheet, &table.columns, false)?;
        for (idx, record) in table.records.iter().enumerate() {
            write_record(sheet, row_index(idx)?, 0, &table.columns, record)?;
        }
    }
    write_meta(&mut workbook, title)?;
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        rows: table.len(),
        columns: table.columns.len(),
        skipped_leagues: 0,
    })
}

/// Aggregate rows go to `Stats` with a leading `League` column; skipped
/// leagues are listed on their own sheet.
pub fn export_aggregate(path: &Path, aggregate: &Aggregate, title: &str) -> Result<ExportReport> {
    let table = &aggregate.table;
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Stats")?;
        write_header(sheet, &table.columns, true)?;
        for (idx, tagged) in table.records.iter().enumerate() {
            let row = row_index(idx)?;
            sheet
                .write_string(row, 0, tagged.league.name())
                .with_context(|| format!("write cell ({row},0)"))?;
            write_record(sheet, row, 1, &table.columns, &tagged.record)?;
        }
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Skipped")?;
        sheet.write_string(0, 0, "League")?;
        sheet.write_string(0, 1, "Error")?;
        for (idx, skipped) in aggregate.skipped.iter().enumerate() {
            let row = row_index(idx)?;
            sheet.write_string(row, 0, skipped.league.name())?;
            sheet.write_string(row, 1, skipped.error.to_string())?;
        }
    }
    write_meta(&mut workbook, title)?;
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        rows: table.len(),
        columns: table.columns.len() + 1,
        skipped_leagues: aggregate.skipped.len(),
    })
}

fn write_header(sheet: &mut Worksheet, columns: &[String], with_league: bool) -> Result<()> {
    let offset = u16::from(with_league);
    if with_league {
        sheet.write_string(0, 0, "League")?;
    }
    for (idx, column) in columns.iter().enumerate() {
        sheet
            .write_string(0, column_index(idx, offset)?, column)
            .with_context(|| format!("write header `{column}`"))?;
    }
    Ok(())
}

fn write_record(
    sheet: &mut Worksheet,
    row: u32,
    offset: u16,
    columns: &[String],
    record: &StatRecord,
) -> Result<()> {
    for (idx, column) in columns.iter().enumerate() {
        let col = column_index(idx, offset)?;
        let written = match record.get(column) {
            Some(Value::Number(n)) => sheet.write_number(row, col, *n),
            Some(Value::Text(s)) => sheet.write_string(row, col, s),
            None => continue,
        };
        written.with_context(|| format!("write cell ({row},{col})"))?;
    }
    Ok(())
}

/// Sheet row for the `idx`-th record, below the header row.
fn row_index(idx: usize) -> Result<u32> {
    idx.checked_add(1)
        .and_then(|row| u32::try_from(row).ok())
        .with_context(|| format!("record {idx} does not fit in a worksheet"))
}

fn column_index(idx: usize, offset: u16) -> Result<u16> {
    let col = idx
        .checked_add(usize::from(offset))
        .with_context(|| format!("column {idx} out of range"))?;
    if col >= MAX_COLUMNS {
        bail!("column {col} exceeds the xlsx limit of {MAX_COLUMNS} columns");
    }
    u16::try_from(col).with_context(|| format!("column {col} out of range"))
}

fn write_meta(workbook: &mut Workbook, title: &str) -> Result<()> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("Meta")?;
    sheet.write_string(0, 0, "Query")?;
    sheet.write_string(0, 1, title)?;
    sheet.write_string(1, 0, "Generated")?;
    sheet.write_string(1, 1, chrono::Utc::now().to_rfc3339())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_index_rejects_out_of_range_columns() {
        assert_eq!(column_index(0, 1).unwrap(), 1);
        assert_eq!(column_index(16_383, 0).unwrap(), 16_383);
        assert!(column_index(16_383, 1).is_err());
        assert!(column_index(65_535, 1).is_err());
        assert!(column_index(usize::MAX, 1).is_err());
    }

    #[test]
    fn row_index_skips_header_row() {
        assert_eq!(row_index(0).unwrap(), 1);
        assert!(row_index(u32::MAX as usize).is_err());
    }
}
