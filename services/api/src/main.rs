//! nomvote-api 二进制入口：解析 CLI 后启动 HTTP 服务。

mod api;
mod app;
mod auth;
mod cli;
mod config;
mod logging;
mod state;
mod store;
mod voting;

#[tokio::main]
/// 启动 nomvote-api。
async fn main() -> anyhow::Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<String>>();
    match cli::dispatch(&args).await? {
        cli::CliDispatch::Run => {}
        cli::CliDispatch::Exit => return Ok(()),
    }

    let config = config::Config::from_env()?;
    let _log_runtime = logging::init("nomvote-api", &config.log)?;
    app::run(config).await
}
