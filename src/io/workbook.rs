use crate::error::{ReconError, Result};
use crate::models::{Cell, Table, Workbook};
use calamine::{Data, Range, Reader, Xlsx};
use std::io::Cursor;

/// 读取 xlsx 的全部工作表
pub fn read_workbook(file_name: &str, bytes: Vec<u8>) -> Result<Workbook> {
    let mut xlsx: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let names = xlsx.sheet_names();
    if names.is_empty() {
        return Err(ReconError::EmptyWorkbook(file_name.to_string()));
    }

    let mut workbook = Workbook::new();
    for name in names {
        let range = xlsx.worksheet_range(&name)?;
        let table = range_to_table(&name, &range);
        tracing::debug!(
            "读取工作表 '{}' ({}): {} 列, {} 行",
            name,
            file_name,
            table.headers.len(),
            table.len()
        );
        workbook.insert(table);
    }
    Ok(workbook)
}

/// 只取第一个工作表 (内部台账)
pub fn read_first_sheet(file_name: &str, bytes: Vec<u8>) -> Result<Table> {
    read_workbook(file_name, bytes)?
        .into_first_sheet()
        .ok_or_else(|| ReconError::EmptyWorkbook(file_name.to_string()))
}

/// 首行为表头, 其余为数据行
fn range_to_table(name: &str, range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Table::new(name, Vec::new());
    };

    let headers = header_row
        .iter()
        .enumerate()
        .map(|(idx, data)| match convert_cell(data) {
            Cell::Empty => format!("Unnamed: {}", idx),
            cell => cell.to_string(),
        })
        .collect();

    let mut table = Table::new(name, headers);
    for row in rows {
        table.push_row(row.iter().map(convert_cell).collect());
    }
    table
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(n) => Cell::Int(*n),
        Data::Float(v) => Cell::Float(*v),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Float(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Error(e.to_string()),
    }
}
