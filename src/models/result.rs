use super::{Cell, RunStats};
use bigdecimal::BigDecimal;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// 输出列 (固定顺序, 与参与的银行无关)
pub const OUTPUT_COLUMNS: [&str; 21] = [
    "UTR",
    "Amount",
    "Date",
    "Bank Name",
    "account_number",
    "partner_name",
    "region",
    "hub_code",
    "hub_name",
    "spoke_code",
    "spoke_name",
    "MCC Centre Id",
    "MCC Centre Name",
    "RM/SO Id",
    "RM/SO Name",
    "State",
    "date_status",
    "amount_status",
    "bank_name_status",
    "utr_status",
    "final_status",
];

/// 投影到输出的透传列
pub const PROJECTED_ATTRIBUTES: [&str; 12] = [
    "account_number",
    "partner_name",
    "region",
    "hub_code",
    "hub_name",
    "spoke_code",
    "spoke_name",
    "MCC Centre Id",
    "MCC Centre Name",
    "RM/SO Id",
    "RM/SO Name",
    "State",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Matched,
    Mismatched,
}

impl Status {
    pub fn from_bool(matched: bool) -> Self {
        if matched {
            Status::Matched
        } else {
            Status::Mismatched
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Matched => "matched",
            Status::Mismatched => "mismatched",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalStatus {
    Ok,
    NotOk,
}

impl FinalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalStatus::Ok => "Ok",
            FinalStatus::NotOk => "Not Ok",
        }
    }
}

impl fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 四个字段级状态 + 最终结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBundle {
    pub date: Status,
    pub amount: Status,
    pub bank_name: Status,
    pub utr: Status,
    pub final_status: FinalStatus,
}

impl StatusBundle {
    pub fn new(date: Status, amount: Status, bank_name: Status, utr: Status) -> Self {
        let all_matched = [date, amount, bank_name, utr]
            .iter()
            .all(|s| *s == Status::Matched);
        Self {
            date,
            amount,
            bank_name,
            utr,
            final_status: if all_matched {
                FinalStatus::Ok
            } else {
                FinalStatus::NotOk
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.final_status == FinalStatus::Ok
    }
}

/// 对账结果行: 内部记录 + (可选) 流水记录的比对结果
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub utr: String,
    pub amount: BigDecimal,
    pub date: Option<String>,
    pub bank_name: Option<String>,
    /// 与 PROJECTED_ATTRIBUTES 一一对应
    pub attributes: Vec<Cell>,
    pub statuses: StatusBundle,
}

/// 输出单元, 导出器按类型决定写法
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputValue<'a> {
    Text(&'a str),
    Amount(&'a BigDecimal),
    Cell(&'a Cell),
    Missing,
}

impl fmt::Display for OutputValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputValue::Text(s) => f.write_str(s),
            OutputValue::Amount(a) => write!(f, "{}", a),
            OutputValue::Cell(c) => write!(f, "{}", c),
            OutputValue::Missing => Ok(()),
        }
    }
}

impl MatchRecord {
    /// 按 OUTPUT_COLUMNS 顺序给出各列取值
    pub fn values(&self) -> Vec<OutputValue<'_>> {
        let mut values = Vec::with_capacity(OUTPUT_COLUMNS.len());
        values.push(OutputValue::Text(&self.utr));
        values.push(OutputValue::Amount(&self.amount));
        values.push(text_or_missing(self.date.as_deref()));
        values.push(text_or_missing(self.bank_name.as_deref()));
        values.extend(self.attributes.iter().map(|c| {
            if c.is_empty() {
                OutputValue::Missing
            } else {
                OutputValue::Cell(c)
            }
        }));
        values.push(OutputValue::Text(self.statuses.date.as_str()));
        values.push(OutputValue::Text(self.statuses.amount.as_str()));
        values.push(OutputValue::Text(self.statuses.bank_name.as_str()));
        values.push(OutputValue::Text(self.statuses.utr.as_str()));
        values.push(OutputValue::Text(self.statuses.final_status.as_str()));
        values
    }
}

fn text_or_missing(value: Option<&str>) -> OutputValue<'_> {
    value.map(OutputValue::Text).unwrap_or(OutputValue::Missing)
}

/// JSON 行按输出列名序列化
impl Serialize for MatchRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let values = self.values();
        let mut map = serializer.serialize_map(Some(values.len()))?;
        for (column, value) in OUTPUT_COLUMNS.iter().zip(values.iter()) {
            match value {
                OutputValue::Text(s) => map.serialize_entry(column, s)?,
                OutputValue::Amount(a) => map.serialize_entry(column, &a.to_string())?,
                OutputValue::Cell(c) => map.serialize_entry(column, c)?,
                OutputValue::Missing => map.serialize_entry(column, &Option::<&str>::None)?,
            }
        }
        map.end()
    }
}

/// 成功对账的报告
#[derive(Debug, Clone)]
pub struct ReconReport {
    pub rows: Vec<MatchRecord>,
    pub stats: RunStats,
}

/// 一次对账的结果: 有数据 / 无匹配数据 (区别于错误)
#[derive(Debug, Clone)]
pub enum ReconOutcome {
    Matched(ReconReport),
    NoData(RunStats),
}

impl ReconOutcome {
    pub fn stats(&self) -> &RunStats {
        match self {
            ReconOutcome::Matched(report) => &report.stats,
            ReconOutcome::NoData(stats) => stats,
        }
    }

    pub fn rows(&self) -> &[MatchRecord] {
        match self {
            ReconOutcome::Matched(report) => &report.rows,
            ReconOutcome::NoData(_) => &[],
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, ReconOutcome::NoData(_))
    }
}
