use crate::error::Result;
use crate::service::registry::BankRegistry;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub recon: ReconConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 上传请求体上限 (字节)
    pub max_upload_bytes: usize,
}

/// 对账参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconConfig {
    /// 银行登记表文件; 未配置时使用内置的六家银行
    pub registry_path: Option<PathBuf>,
    /// 05/01/2024 按日在前解析
    pub day_first: bool,
    /// 按银行并行匹配
    pub parallel_banks: bool,
}

const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            recon: ReconConfig::default(),
        }
    }
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            registry_path: None,
            day_first: false,
            parallel_banks: true,
        }
    }
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
                max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            },
            recon: ReconConfig {
                registry_path: std::env::var("BANK_REGISTRY_PATH").ok().map(PathBuf::from),
                day_first: env_flag("DATE_DAY_FIRST", false),
                parallel_banks: env_flag("PARALLEL_BANKS", true),
            },
        }
    }
}

impl ReconConfig {
    /// 加载银行登记表; 文件配置错误直接失败
    pub fn load_registry(&self) -> Result<BankRegistry> {
        match &self.registry_path {
            Some(path) => BankRegistry::from_file(path),
            None => Ok(BankRegistry::reference()),
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}
