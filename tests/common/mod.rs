#![allow(dead_code)]

use rust_xlsxwriter::{ExcelDateTime, Format};
use std::sync::Arc;
use utr_recon_rust::config::ReconConfig;
use utr_recon_rust::models::{Cell, Table, Workbook};
use utr_recon_rust::{BankRegistry, ReconService};

pub const LEDGER_HEADERS: [&str; 8] = [
    "UTR_Details",
    "Date_Details",
    "collection_amount",
    "Bank _Name_Details",
    "partner_name",
    "region",
    "account_number",
    "State",
];

pub const FINO_HEADERS: [&str; 4] = ["TRANSACTION ID", "LOCAL DATE", "AMOUNT", "Bank Name"];
pub const SPICE_HEADERS: [&str; 4] = ["Spice Txn ID", "Date", "Amount", "Bank Name"];

/// (UTR, 日期, 金额, 银行)
pub type Line<'a> = (&'a str, &'a str, f64, &'a str);

pub fn service() -> ReconService {
    ReconService::new(Arc::new(BankRegistry::reference()), &ReconConfig::default())
}

pub fn ledger(lines: &[Line]) -> Table {
    let mut table = Table::new(
        "Recon",
        LEDGER_HEADERS.iter().map(|h| h.to_string()).collect(),
    );
    for (idx, (utr, date, amount, bank)) in lines.iter().enumerate() {
        table.push_row(vec![
            Cell::from(*utr),
            Cell::from(*date),
            Cell::Float(*amount),
            Cell::from(*bank),
            Cell::from(format!("Partner {}", idx)),
            Cell::from("South"),
            Cell::Int(1000 + idx as i64),
            Cell::from("Karnataka"),
        ]);
    }
    table
}

pub fn sheet(name: &str, headers: [&str; 4], lines: &[Line]) -> Table {
    let mut table = Table::new(name, headers.iter().map(|h| h.to_string()).collect());
    for (utr, date, amount, bank) in lines {
        table.push_row(vec![
            Cell::from(*utr),
            Cell::from(*date),
            Cell::Float(*amount),
            Cell::from(*bank),
        ]);
    }
    table
}

pub fn statement(sheets: Vec<Table>) -> Workbook {
    sheets.into_iter().collect()
}

/// 用 rust_xlsxwriter 生成测试用的 xlsx 文件
///
/// 形如 yyyy-mm-dd 的文本写成真正的 Excel 日期单元格.
pub fn xlsx_bytes(tables: &[Table]) -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    for table in tables {
        let ws = workbook.add_worksheet();
        ws.set_name(&table.name).unwrap();
        for (col, header) in table.headers.iter().enumerate() {
            ws.write_string(0, col as u16, header).unwrap();
        }
        for (r, row) in table.rows.iter().enumerate() {
            let r = (r + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Empty => {}
                    Cell::Text(s) if is_iso_date(s) => {
                        let dt = ExcelDateTime::parse_from_str(s).unwrap();
                        ws.write_datetime_with_format(r, col, &dt, &date_format)
                            .unwrap();
                    }
                    Cell::Text(s) => {
                        ws.write_string(r, col, s).unwrap();
                    }
                    Cell::Int(n) => {
                        ws.write_number(r, col, *n as f64).unwrap();
                    }
                    Cell::Float(v) => {
                        ws.write_number(r, col, *v).unwrap();
                    }
                    other => {
                        ws.write_string(r, col, other.to_string()).unwrap();
                    }
                }
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

fn is_iso_date(s: &str) -> bool {
    s.len() == 10
        && s.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        })
}
