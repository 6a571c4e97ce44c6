use anyhow::Context;
use speedup_fee::config::Config;
use speedup_fee::log_info;
use speedup_fee::services::speedup::SessionExit;
use speedup_fee::startup::Application;
use speedup_fee::utils::logger::init_logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 可选
    dotenvy::dotenv().ok();

    // 初始化日志（全局只需调用一次）
    init_logger();

    log_info!("Starting speed-up session initialization...");

    // 1. 加载配置
    let config = Config::load().context("Failed to load application configuration")?;

    // 2. 构建应用实例 (Provider / 估算源 / 余额)
    let application = Application::build(config)
        .await
        .context("Application building failed (provider or balance initialization)")?;

    // 3. 运行会话直到保存或取消
    let exit = application
        .run()
        .await
        .context("Speed-up session failed during runtime")?;

    match exit {
        SessionExit::Saved(Some(fee_data)) => {
            println!("{}", serde_json::to_string_pretty(&fee_data)?);
        }
        SessionExit::Saved(None) => log_info!("会话保存时尚未得到费用结果"),
        SessionExit::Cancelled => log_info!("会话已取消"),
    }
    Ok(())
}
