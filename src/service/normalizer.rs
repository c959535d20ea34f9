use crate::error::{ReconError, Result};
use crate::models::table::{column_index, row_cell};
use crate::models::{
    CanonicalField, Cell, LedgerRow, StatementRecord, Table, LEDGER_RENAMES, PASS_THROUGH_COLUMNS,
};
use crate::service::registry::ColumnMapping;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// 输出日期格式
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// 带时间部分的 ISO 写法 (无空格分隔, 无法靠 strip_time 去掉时间)
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// 无歧义的日期写法; 纯数字的 a/b/yyyy 另行处理
const DATE_FORMATS: [&str; 11] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d/%b/%Y",
    "%d %b, %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d-%b-%y",
    "%d %b %y",
];

/// Excel 序列日期上限 (9999-12-31)
const EXCEL_SERIAL_MAX: f64 = 2_958_466.0;

/// 表头清洗: 去掉首尾空白
pub fn strip_headers(headers: &mut [String]) {
    for header in headers.iter_mut() {
        let trimmed = header.trim();
        if trimmed.len() != header.len() {
            *header = trimmed.to_string();
        }
    }
}

/// 表头重命名; 同时生效, 不会链式改名. 表中不存在的源列忽略.
///
/// 原本就叫目标列名、但不在重命名表里的列会被改名让位 (加 " (unmapped)" 后缀),
/// 否则按列名查找时会取到它而不是映射的列. 返回让位的原列名.
pub fn rename_columns<'a, I>(headers: &mut [String], renames: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let renames: HashMap<&str, &str> = renames.into_iter().collect();
    let produced: HashSet<&str> = headers
        .iter()
        .filter_map(|h| renames.get(h.as_str()).copied())
        .collect();

    let mut shadowed = Vec::new();
    for header in headers.iter_mut() {
        if let Some(target) = renames.get(header.as_str()) {
            *header = (*target).to_string();
        } else if produced.contains(header.as_str()) {
            shadowed.push(header.clone());
            *header = format!("{} (unmapped)", header);
        }
    }
    shadowed
}

/// 交易键统一为字符串, 数字键与文本键可直接比较
pub fn key_string(cell: &Cell) -> String {
    cell.to_string()
}

/// 金额解析; 文本金额允许千分位逗号, 其余无法解析的视为缺失
pub fn parse_amount(cell: &Cell) -> Option<BigDecimal> {
    match cell {
        Cell::Int(n) => Some(BigDecimal::from(*n)),
        Cell::Float(v) if v.is_finite() => BigDecimal::from_str(&v.to_string()).ok(),
        Cell::Text(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            if cleaned.is_empty() {
                None
            } else {
                BigDecimal::from_str(&cleaned).ok()
            }
        }
        _ => None,
    }
}

fn is_blank_row(row: &[Cell]) -> bool {
    row.iter().all(|c| match c {
        Cell::Empty => true,
        Cell::Text(s) => s.trim().is_empty(),
        _ => false,
    })
}

/// 表结构规范化 + 日期/金额/键的值规范化
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    /// 纯数字日期 (05/01/2024) 是否按日在前解析
    day_first: bool,
}

impl Normalizer {
    pub fn new(day_first: bool) -> Self {
        Self { day_first }
    }

    /// 解析为 dd-mm-yyyy; 无法解析返回 None, 从不报错
    pub fn parse_date(&self, cell: &Cell) -> Option<String> {
        self.parse_naive_date(cell)
            .map(|d| d.format(DATE_FORMAT).to_string())
    }

    pub fn parse_naive_date(&self, cell: &Cell) -> Option<NaiveDate> {
        match cell {
            Cell::DateTime(dt) => Some(dt.date()),
            Cell::Int(n) => excel_serial_date(*n as f64),
            Cell::Float(v) => excel_serial_date(*v),
            Cell::Text(s) => self.parse_date_text(s),
            Cell::Empty | Cell::Bool(_) | Cell::Error(_) => None,
        }
    }

    fn parse_date_text(&self, raw: &str) -> Option<NaiveDate> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.date_naive());
        }
        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
                return Some(dt.date());
            }
        }

        let date_part = strip_time(text);
        for fmt in DATE_FORMATS {
            if let Ok(d) = NaiveDate::parse_from_str(&date_part, fmt) {
                // %Y 会把两位年份读成公元 24 年, 交给后面的格式
                if d.year() >= 1900 {
                    return Some(d);
                }
            }
        }

        self.parse_numeric_date(&date_part)
    }

    /// a/b/yyyy, a-b-yyyy, a.b.yyyy, yyyymmdd
    fn parse_numeric_date(&self, text: &str) -> Option<NaiveDate> {
        if text.len() == 8 && text.bytes().all(|b| b.is_ascii_digit()) {
            let year = text[..4].parse().ok()?;
            let month = text[4..6].parse().ok()?;
            let day = text[6..].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }

        let parts: Vec<&str> = text.split(|c| matches!(c, '/' | '-' | '.')).collect();
        if parts.len() != 3
            || parts
                .iter()
                .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
        {
            return None;
        }

        let a: u32 = parts[0].parse().ok()?;
        let b: u32 = parts[1].parse().ok()?;

        if parts[0].len() == 4 {
            let c: u32 = parts[2].parse().ok()?;
            return NaiveDate::from_ymd_opt(a as i32, b, c);
        }

        let year = expand_year(parts[2])?;
        let (day_first, month_first) = (
            NaiveDate::from_ymd_opt(year, b, a),
            NaiveDate::from_ymd_opt(year, a, b),
        );
        // 首选顺序不合法时 (如月份 > 12) 换另一种顺序
        if self.day_first {
            day_first.or(month_first)
        } else {
            month_first.or(day_first)
        }
    }

    /// 内部台账: 清洗表头, 改名为规范字段, 逐行抽取
    ///
    /// UTR/Date/Amount/Bank Name 四列是必需的, 缺失说明文件不是台账, 直接报错;
    /// 透传列缺失则跳过.
    pub fn normalize_ledger(&self, mut table: Table) -> Result<Vec<LedgerRow>> {
        strip_headers(&mut table.headers);
        let shadowed = rename_columns(
            &mut table.headers,
            LEDGER_RENAMES
                .iter()
                .map(|(from, to)| (*from, to.as_str())),
        );
        if !shadowed.is_empty() {
            tracing::warn!(
                "台账 '{}' 中的列 {:?} 与规范列名冲突, 已忽略",
                table.name, shadowed
            );
        }

        let mut required = HashMap::new();
        for (raw, field) in LEDGER_RENAMES {
            let idx = table
                .column(field.as_str())
                .ok_or_else(|| ReconError::MissingColumn {
                    table: table.name.clone(),
                    column: raw.to_string(),
                })?;
            required.insert(field, idx);
        }
        let col = |field: CanonicalField| required.get(&field).copied();

        let attribute_cols: Vec<(&str, usize)> = PASS_THROUGH_COLUMNS
            .iter()
            .filter_map(|name| table.column(name).map(|idx| (*name, idx)))
            .collect();
        if attribute_cols.len() < PASS_THROUGH_COLUMNS.len() {
            tracing::debug!(
                "台账缺少 {} 个透传列, 已跳过",
                PASS_THROUGH_COLUMNS.len() - attribute_cols.len()
            );
        }

        let rows: Vec<LedgerRow> = table
            .rows
            .iter()
            .filter(|row| !is_blank_row(row))
            .map(|row| LedgerRow {
                utr: key_string(row_cell(row, col(CanonicalField::Utr))),
                date: self.parse_date(row_cell(row, col(CanonicalField::Date))),
                amount: parse_amount(row_cell(row, col(CanonicalField::Amount))),
                bank_name: row_cell(row, col(CanonicalField::BankName)).text(),
                attributes: attribute_cols
                    .iter()
                    .filter_map(|(name, idx)| {
                        let cell = row_cell(row, Some(*idx));
                        (!cell.is_empty()).then(|| (name.to_string(), cell.clone()))
                    })
                    .collect(),
            })
            .collect();

        let empty_keys = rows.iter().filter(|r| r.utr.is_empty()).count();
        if empty_keys > 0 {
            tracing::warn!("台账 '{}' 有 {} 行 UTR 为空", table.name, empty_keys);
        }

        Ok(rows)
    }

    /// 银行流水: 按登记表映射改名后抽取; 缺列按字段缺失处理, 不报错
    pub fn normalize_statement(&self, table: &Table, mapping: &ColumnMapping) -> Vec<StatementRecord> {
        let mut headers = table.headers.clone();
        strip_headers(&mut headers);
        let shadowed = rename_columns(
            &mut headers,
            mapping
                .iter()
                .map(|(from, to)| (from.as_str(), to.as_str())),
        );
        if !shadowed.is_empty() {
            tracing::warn!(
                "Sheet '{}': unmapped columns {:?} collide with canonical names and are ignored",
                table.name, shadowed
            );
        }

        let col = |field: CanonicalField| {
            let idx = column_index(&headers, field.as_str());
            if idx.is_none() {
                tracing::warn!(
                    "Sheet '{}' has no column for '{}', treating it as absent",
                    table.name, field
                );
            }
            idx
        };
        let utr_col = col(CanonicalField::Utr);
        let date_col = col(CanonicalField::Date);
        let amount_col = col(CanonicalField::Amount);
        let bank_col = col(CanonicalField::BankName);

        // 没有 UTR 列则没有任何流水能参与关联
        if utr_col.is_none() {
            return Vec::new();
        }

        table
            .rows
            .iter()
            .filter(|row| !is_blank_row(row))
            .map(|row| StatementRecord {
                utr: key_string(row_cell(row, utr_col)),
                date: self.parse_date(row_cell(row, date_col)),
                amount: parse_amount(row_cell(row, amount_col)),
                bank_name: row_cell(row, bank_col).text(),
            })
            .collect()
    }
}

/// 去掉末尾的时间部分: "05/01/2024 10:30:00 AM" -> "05/01/2024"
fn strip_time(text: &str) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let keep = tokens
        .iter()
        .rposition(|t| !(t.contains(':') || t.eq_ignore_ascii_case("am") || t.eq_ignore_ascii_case("pm")))
        .map(|i| i + 1)
        .unwrap_or(tokens.len());
    tokens[..keep].join(" ").trim_end_matches(',').to_string()
}

fn expand_year(text: &str) -> Option<i32> {
    let year: i32 = text.parse().ok()?;
    match text.len() {
        2 if year < 69 => Some(2000 + year),
        2 => Some(1900 + year),
        4 => Some(year),
        _ => None,
    }
}

fn excel_serial_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..EXCEL_SERIAL_MAX).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Table;
    use chrono::NaiveDate;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn parses_native_and_serial_dates() {
        let n = Normalizer::default();
        let dt = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(13, 45, 0)
            .unwrap();
        assert_eq!(n.parse_date(&Cell::DateTime(dt)).as_deref(), Some("05-01-2024"));
        // 45296 = 2024-01-05
        assert_eq!(n.parse_date(&Cell::Float(45296.0)).as_deref(), Some("05-01-2024"));
        assert_eq!(n.parse_date(&Cell::Int(45296)).as_deref(), Some("05-01-2024"));
    }

    #[test]
    fn parses_text_dates() {
        let n = Normalizer::default();
        for raw in [
            "2024-01-05",
            "2024-01-05 10:30:00",
            "2024-01-05T10:30:00.123",
            "2024-01-05T10:30:00+05:30",
            "2024/01/05",
            "05-Jan-2024",
            "05 Jan 2024 10:30 AM",
            "Jan 5, 2024",
            "05-Jan-24",
            "20240105",
            "01/05/2024",
            "01/05/2024 10:30:00",
        ] {
            assert_eq!(n.parse_date(&text(raw)).as_deref(), Some("05-01-2024"), "{raw}");
        }
    }

    #[test]
    fn ambiguous_numeric_dates_follow_configured_order() {
        let month_first = Normalizer::new(false);
        let day_first = Normalizer::new(true);
        assert_eq!(month_first.parse_date(&text("05-01-2024")).as_deref(), Some("01-05-2024"));
        assert_eq!(day_first.parse_date(&text("05-01-2024")).as_deref(), Some("05-01-2024"));
        // 月份越界时回退到另一种顺序
        assert_eq!(month_first.parse_date(&text("25/01/2024")).as_deref(), Some("25-01-2024"));
        assert_eq!(day_first.parse_date(&text("01/25/2024")).as_deref(), Some("25-01-2024"));
    }

    #[test]
    fn unparseable_dates_become_unknown() {
        let n = Normalizer::default();
        for cell in [
            text("not a date"),
            text(""),
            text("31/31/2024"),
            Cell::Empty,
            Cell::Bool(true),
            Cell::Float(-3.0),
            Cell::Error("#N/A".to_string()),
        ] {
            assert_eq!(n.parse_date(&cell), None, "{cell:?}");
        }
    }

    #[test]
    fn amounts_and_keys() {
        assert_eq!(parse_amount(&Cell::Int(500)), Some(BigDecimal::from(500)));
        assert_eq!(parse_amount(&Cell::Float(500.0)), Some(BigDecimal::from(500)));
        assert_eq!(
            parse_amount(&text(" 1,250.50 ")),
            Some(BigDecimal::from_str("1250.5").unwrap())
        );
        assert_eq!(parse_amount(&text("n/a")), None);
        assert_eq!(parse_amount(&Cell::Empty), None);

        assert_eq!(key_string(&Cell::Float(412345678901.0)), "412345678901");
        assert_eq!(key_string(&text("X123")), "X123");
        assert_eq!(key_string(&Cell::Empty), "");
    }

    #[test]
    fn renames_are_simultaneous() {
        let mut headers = vec![" A ".to_string(), "B".to_string()];
        strip_headers(&mut headers);
        rename_columns(&mut headers, [("A", "B"), ("B", "C"), ("Z", "Y")]);
        assert_eq!(headers, vec!["B".to_string(), "C".to_string()]);
    }

    #[test]
    fn unmapped_column_with_canonical_name_gives_way() {
        let mut headers = vec!["Date".to_string(), "LOCAL DATE".to_string(), "Amount".to_string()];
        let shadowed = rename_columns(&mut headers, [("LOCAL DATE", "Date")]);
        assert_eq!(shadowed, vec!["Date".to_string()]);
        assert_eq!(headers, vec!["Date (unmapped)", "Date", "Amount"]);
    }

    #[test]
    fn statement_uses_mapped_column_over_same_named_one() {
        let mapping = crate::service::BankRegistry::reference()
            .mapping_for("FinoBank")
            .unwrap()
            .clone();
        let mut table = Table::new(
            "FinoBank",
            vec![
                "Date".into(),
                "TRANSACTION ID".into(),
                "LOCAL DATE".into(),
                "AMOUNT".into(),
                "Bank Name".into(),
            ],
        );
        table.push_row(vec![
            text("garbage"),
            text("X123"),
            text("2024-01-05"),
            Cell::Int(500),
            text("FinoBank"),
        ]);

        let records = Normalizer::default().normalize_statement(&table, &mapping);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].utr, "X123");
        assert_eq!(records[0].date.as_deref(), Some("05-01-2024"));
        assert_eq!(records[0].amount, Some(BigDecimal::from(500)));
    }

    #[test]
    fn ledger_uses_renamed_column_over_same_named_one() {
        let mut table = Table::new(
            "recon",
            vec![
                "Amount".into(),
                "UTR_Details".into(),
                "Date_Details".into(),
                "collection_amount".into(),
                "Bank _Name_Details".into(),
            ],
        );
        table.push_row(vec![
            Cell::Int(1),
            text("U1"),
            text("2024-01-05"),
            Cell::Int(250),
            text("FinoBank"),
        ]);

        let rows = Normalizer::default().normalize_ledger(table).unwrap();
        assert_eq!(rows[0].amount, Some(BigDecimal::from(250)));
    }

    #[test]
    fn ledger_requires_core_columns() {
        let table = Table::new(
            "recon",
            vec!["UTR_Details".into(), "Date_Details".into(), "collection_amount".into()],
        );
        let err = Normalizer::default().normalize_ledger(table).unwrap_err();
        assert!(matches!(
            err,
            ReconError::MissingColumn { ref column, .. } if column == "Bank _Name_Details"
        ));
    }

    #[test]
    fn ledger_headers_are_trimmed_and_blank_rows_dropped() {
        let mut table = Table::new(
            "recon",
            vec![
                " UTR_Details".into(),
                "Date_Details ".into(),
                "collection_amount".into(),
                "Bank _Name_Details".into(),
                "region".into(),
            ],
        );
        table.push_row(vec![
            Cell::Int(9001),
            text("2024-01-05"),
            Cell::Float(100.0),
            text("FinoBank"),
            Cell::Empty,
        ]);
        table.push_row(vec![Cell::Empty, text("  "), Cell::Empty]);

        let rows = Normalizer::default().normalize_ledger(table).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].utr, "9001");
        assert_eq!(rows[0].date.as_deref(), Some("05-01-2024"));
        assert_eq!(rows[0].bank_name.as_deref(), Some("FinoBank"));
        assert!(rows[0].attributes.is_empty());
    }
}
