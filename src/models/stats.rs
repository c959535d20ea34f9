use serde::Serialize;

/// 银行被跳过的原因 (均不视为错误)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// 台账中没有该银行的记录
    NoInternalRecords,
    /// 上传的流水文件中没有对应工作表
    SheetMissing { sheet: String },
    /// 登记表中没有该工作表的列映射
    MappingMissing { sheet: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedBank {
    pub bank: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// 单个银行的匹配统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BankStats {
    pub bank: String,
    pub sheet: String,
    pub internal_records: usize,
    pub statement_rows: usize,
    pub retained_statement_rows: usize,
    pub output_rows: usize,
    pub ok_rows: usize,
    /// 流水中重复 UTR 导致的额外行数
    pub fanout_rows: usize,
}

/// 整次对账的统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub ledger_rows: usize,
    pub internal_records: usize,
    pub banks: Vec<BankStats>,
    pub skipped: Vec<SkippedBank>,
}

impl RunStats {
    pub fn total_rows(&self) -> usize {
        self.banks.iter().map(|b| b.output_rows).sum()
    }

    pub fn ok_rows(&self) -> usize {
        self.banks.iter().map(|b| b.ok_rows).sum()
    }

    pub fn fanout_rows(&self) -> usize {
        self.banks.iter().map(|b| b.fanout_rows).sum()
    }
}
