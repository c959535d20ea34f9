use crate::error::{ReconError, Result};
use crate::models::{BankEntry, CanonicalField, ColumnEntry, RegistryFile, SheetEntry};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::Path;

/// 工作表原始列名 -> 规范字段
pub type ColumnMapping = IndexMap<String, CanonicalField>;

/// 银行登记表: 银行 -> 工作表, 工作表 -> 列映射
///
/// 纯数据查表. 任一侧缺条目都表示该银行不参与对账, 由匹配器跳过.
#[derive(Debug, Clone, Default)]
pub struct BankRegistry {
    /// 迭代顺序即匹配顺序
    banks: IndexMap<String, String>,
    sheets: HashMap<String, ColumnMapping>,
}

impl BankRegistry {
    /// 默认的六家银行配置
    pub fn reference() -> Self {
        use CanonicalField::{Amount, BankName, Date, Utr};

        let banks = [
            ("AirtelPayment", "Airtel Payments Bank"),
            ("FinoBank", "FinoBank"),
            ("SpiceMoney", "Spice Money"),
            ("FingpayAccount", "FingpayAccount"),
            ("SBIPowerJyothi", "SBI PJ -7190"),
            ("Axis Bank", "Axis Bank -4542"),
        ];
        let sheets = [
            (
                "Airtel Payments Bank",
                [("Transaction Id", Utr), ("Date and Time", Date), ("Original Input Amt", Amount), ("Bank Name", BankName)],
            ),
            (
                "FinoBank",
                [("TRANSACTION ID", Utr), ("LOCAL DATE", Date), ("AMOUNT", Amount), ("Bank Name", BankName)],
            ),
            (
                "Spice Money",
                [("Spice Txn ID", Utr), ("Date", Date), ("Amount", Amount), ("Bank Name", BankName)],
            ),
            (
                "FingpayAccount",
                [("Fingpay Transaction Id", Utr), ("Corporate", Date), ("Drop Amount", Amount), ("Bank", BankName)],
            ),
            (
                "SBI PJ -7190",
                [("Narration", Utr), ("Txn Date", Date), ("Credit", Amount), ("Bank Name", BankName)],
            ),
            (
                "Axis Bank -4542",
                [("Transaction Particulars", Utr), ("Tran Date", Date), ("Amount(INR)", Amount), ("Bank Name", BankName)],
            ),
        ];

        Self {
            banks: banks
                .iter()
                .map(|(bank, sheet)| (bank.to_string(), sheet.to_string()))
                .collect(),
            sheets: sheets
                .iter()
                .map(|(sheet, columns)| {
                    let mapping = columns
                        .iter()
                        .map(|(source, target)| (source.to_string(), *target))
                        .collect();
                    (sheet.to_string(), mapping)
                })
                .collect(),
        }
    }

    /// 从配置文件加载 (toml/json/yaml, 按扩展名识别)
    pub fn from_file(path: &Path) -> Result<Self> {
        let file: RegistryFile = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()?
            .try_deserialize()?;
        tracing::info!(
            "Loaded bank registry from {}: {} banks, {} sheets",
            path.display(),
            file.banks.len(),
            file.sheets.len()
        );
        Self::from_entries(file)
    }

    /// 校验并构建; 配置错误直接失败
    pub fn from_entries(file: RegistryFile) -> Result<Self> {
        let mut banks = IndexMap::new();
        for BankEntry { name, sheet } in file.banks {
            if banks.insert(name.clone(), sheet).is_some() {
                return Err(ReconError::Registry(format!("bank '{}' is listed twice", name)));
            }
        }

        let mut sheets = HashMap::new();
        for SheetEntry { sheet, columns } in file.sheets {
            let mapping = build_mapping(&sheet, columns)?;
            if sheets.insert(sheet.clone(), mapping).is_some() {
                return Err(ReconError::Registry(format!(
                    "sheet '{}' has two column mappings",
                    sheet
                )));
            }
        }

        for (bank, sheet) in &banks {
            if !sheets.contains_key(sheet) {
                tracing::warn!(
                    "Bank '{}' points at sheet '{}' which has no column mapping; it will be skipped",
                    bank, sheet
                );
            }
        }

        Ok(Self { banks, sheets })
    }

    /// 按登记顺序遍历 (银行, 工作表)
    pub fn banks(&self) -> impl Iterator<Item = (&str, &str)> {
        self.banks.iter().map(|(b, s)| (b.as_str(), s.as_str()))
    }

    pub fn sheet_for(&self, bank: &str) -> Option<&str> {
        self.banks.get(bank).map(String::as_str)
    }

    pub fn mapping_for(&self, sheet: &str) -> Option<&ColumnMapping> {
        self.sheets.get(sheet)
    }

    pub fn len(&self) -> usize {
        self.banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }
}

fn build_mapping(sheet: &str, columns: Vec<ColumnEntry>) -> Result<ColumnMapping> {
    let mut mapping = ColumnMapping::new();
    for ColumnEntry { source, target } in columns {
        if mapping.values().any(|t| *t == target) {
            return Err(ReconError::Registry(format!(
                "sheet '{}' maps more than one column to '{}'",
                sheet, target
            )));
        }
        if mapping.insert(source.trim().to_string(), target).is_some() {
            return Err(ReconError::Registry(format!(
                "sheet '{}' maps column '{}' twice",
                sheet, source
            )));
        }
    }
    if !mapping.values().any(|t| *t == CanonicalField::Utr) {
        return Err(ReconError::Registry(format!(
            "sheet '{}' has no column mapped to UTR",
            sheet
        )));
    }
    Ok(mapping)
}
