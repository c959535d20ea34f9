//! 统一错误类型. 数据质量问题不会走到这里, 只在状态列里体现.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::XlsxError),

    #[error("Excel export error: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Workbook '{0}' contains no sheets")]
    EmptyWorkbook(String),

    #[error("Sheet '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("Bank registry misconfigured: {0}")]
    Registry(String),

    #[error("Bad upload: {0}")]
    Upload(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReconError {
    /// 输入文件本身不合法 (调用方的问题)
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            ReconError::Workbook(_)
                | ReconError::EmptyWorkbook(_)
                | ReconError::MissingColumn { .. }
                | ReconError::Upload(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ReconError>;
