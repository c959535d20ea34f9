use super::CanonicalField;
use serde::{Deserialize, Serialize};

/// 银行 -> 流水工作表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankEntry {
    pub name: String,
    pub sheet: String,
}

/// 工作表原始列 -> 规范字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnEntry {
    pub source: String,
    pub target: CanonicalField,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetEntry {
    pub sheet: String,
    pub columns: Vec<ColumnEntry>,
}

/// 银行登记表文件格式
///
/// 使用数组而非表键, 以保留银行匹配顺序以及列名的大小写和标点:
///
/// ```toml
/// [[banks]]
/// name = "FinoBank"
/// sheet = "FinoBank"
///
/// [[sheets]]
/// sheet = "FinoBank"
/// columns = [
///     { source = "TRANSACTION ID", target = "UTR" },
///     { source = "LOCAL DATE", target = "Date" },
///     { source = "AMOUNT", target = "Amount" },
///     { source = "Bank Name", target = "Bank Name" },
/// ]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryFile {
    #[serde(default)]
    pub banks: Vec<BankEntry>,
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
}
