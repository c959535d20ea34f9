use super::Cell;
use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 规范字段 (内部台账与银行流水统一后的列名)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
    #[serde(rename = "UTR")]
    Utr,
    Date,
    Amount,
    #[serde(rename = "Bank Name")]
    BankName,
}

impl CanonicalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Utr => "UTR",
            CanonicalField::Date => "Date",
            CanonicalField::Amount => "Amount",
            CanonicalField::BankName => "Bank Name",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 内部台账原始列名 -> 规范字段
pub const LEDGER_RENAMES: [(&str, CanonicalField); 4] = [
    ("UTR_Details", CanonicalField::Utr),
    ("Date_Details", CanonicalField::Date),
    ("collection_amount", CanonicalField::Amount),
    ("Bank _Name_Details", CanonicalField::BankName),
];

/// 聚合时按 first-seen 透传的描述列
pub const PASS_THROUGH_COLUMNS: [&str; 50] = [
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
    "deposited_bank_account",
    "deposited_bank_branch",
    "bank_deposit_reference",
    "collected_by",
    "deposited_by",
    "account_number",
    "ClientID",
    "product_name",
    "product_code",
    "customer_name",
    "applicant_name",
    "customer id",
    "Applicant URN",
    "demand_date",
    "loan_amount",
    "schedule_demand_amount",
    "installment_number",
    "EMI Amount",
    "tenure",
    "instrument_type",
    "repayment_posted_date",
    "deposited_on_date",
    "principal_magnitude",
    "normal_interest_magnitude",
    "adjusted_security_emi",
    "fee_amount",
    "Penal_due",
    "Bounce_charges",
    "fee_waiver_amount",
    "Transaction Name",
    "status",
    "additional_interest_waiver_amount",
    "approved_by",
    "Approved Date and time",
    "stage",
    "Reject Reason",
    "Reject Remarks",
    "Rejected stage",
    "Rejected by",
];

/// 规范化后的台账行 (聚合前, 同一 UTR 可能多行)
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub utr: String,
    pub date: Option<String>,
    pub amount: Option<BigDecimal>,
    pub bank_name: Option<String>,
    /// 仅包含非空的透传列
    pub attributes: IndexMap<String, Cell>,
}

/// 聚合后的内部记录 (每个 UTR 一条)
#[derive(Debug, Clone, PartialEq)]
pub struct InternalRecord {
    pub utr: String,
    pub amount: BigDecimal,
    /// dd-mm-yyyy; None 表示日期无法解析
    pub date: Option<String>,
    pub bank_name: Option<String>,
    pub attributes: IndexMap<String, Cell>,
    /// 贡献的原始行数
    pub source_rows: usize,
}

impl InternalRecord {
    /// 可选列查找, 缺列返回 None 而不是报错
    pub fn attribute(&self, name: &str) -> Option<&Cell> {
        self.attributes.get(name)
    }
}

/// 规范化后的银行流水行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementRecord {
    pub utr: String,
    pub date: Option<String>,
    pub amount: Option<BigDecimal>,
    pub bank_name: Option<String>,
}
