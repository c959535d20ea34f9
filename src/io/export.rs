use crate::error::Result;
use crate::models::{Cell, MatchRecord, OutputValue, OUTPUT_COLUMNS};
use bigdecimal::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde::Deserialize;
use std::io::Write;

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const XLSX_FILE_NAME: &str = "final_reconciliation.xlsx";
pub const CSV_MIME: &str = "text/csv";
pub const CSV_FILE_NAME: &str = "final_reconciliation.csv";

/// 超过 2^53 的整数写成文本, 避免 Excel 丢精度 (账号等长数字)
const MAX_EXACT_F64_INT: i64 = 1 << 53;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => XLSX_MIME,
            ExportFormat::Csv => CSV_MIME,
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => XLSX_FILE_NAME,
            ExportFormat::Csv => CSV_FILE_NAME,
        }
    }

    pub fn render(&self, rows: &[MatchRecord]) -> Result<Vec<u8>> {
        match self {
            ExportFormat::Xlsx => to_xlsx(rows),
            ExportFormat::Csv => to_csv(rows),
        }
    }
}

/// 导出对账结果为 xlsx (表头 + 每条结果一行)
pub fn to_xlsx(rows: &[MatchRecord]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Sheet1")?;

    for (col, name) in OUTPUT_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (idx, record) in rows.iter().enumerate() {
        let row = (idx + 1) as u32;
        for (col, value) in record.values().into_iter().enumerate() {
            let col = col as u16;
            match value {
                OutputValue::Text(s) => {
                    sheet.write_string(row, col, s)?;
                }
                OutputValue::Amount(amount) => match amount.to_f64() {
                    Some(v) => {
                        sheet.write_number(row, col, v)?;
                    }
                    None => {
                        sheet.write_string(row, col, amount.to_string())?;
                    }
                },
                OutputValue::Cell(cell) => write_cell(sheet, row, col, cell)?,
                OutputValue::Missing => {}
            }
        }
    }

    tracing::debug!("xlsx 导出完成, {} 行", rows.len());
    Ok(workbook.save_to_buffer()?)
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<()> {
    match cell {
        Cell::Empty => {}
        Cell::Int(n) if n.abs() < MAX_EXACT_F64_INT => {
            sheet.write_number(row, col, *n as f64)?;
        }
        Cell::Float(v) => {
            sheet.write_number(row, col, *v)?;
        }
        Cell::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        other => {
            sheet.write_string(row, col, other.to_string())?;
        }
    }
    Ok(())
}

/// CSV 导出, 列与 xlsx 相同
pub fn write_csv<W: Write>(rows: &[MatchRecord], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(OUTPUT_COLUMNS)?;
    for record in rows {
        csv_writer.write_record(record.values().iter().map(|v| v.to_string()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn to_csv(rows: &[MatchRecord]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    Ok(buf)
}
