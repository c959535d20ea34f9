use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;
use utr_recon_rust::{api, AppConfig, ReconService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式, RUST_LOG 控制级别
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env();
    info!("Starting server with config: {:?}", config);

    // 银行登记表配置错误直接退出
    let registry = Arc::new(config.recon.load_registry()?);
    info!("Bank registry ready: {} banks", registry.len());
    for (bank, sheet) in registry.banks() {
        info!("  {} -> '{}'", bank, sheet);
    }

    let service = Arc::new(ReconService::new(registry, &config.recon));

    let app = api::router(service, config.server.max_upload_bytes).layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/recon                     - JSON result");
    info!("  POST /api/recon/export?format=xlsx  - download (xlsx|csv)");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
