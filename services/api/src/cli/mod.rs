//! nomvote-api CLI 分发：`run`、`migrate`、`invoke`、`doctor`、`version`。

use anyhow::{Context, anyhow};
use nomvote_protocol::Invocation;
use serde_json::json;
use tokio::io::AsyncReadExt;

use crate::{
    config::{ADDR_ENV, Config, DATABASE_URL_ENV, DEFAULT_ADDR, VK_SECRET_ENV},
    state::{AppState, Endpoint},
    store::postgres::PgStore,
};

/// CLI 分发结果。
pub(crate) enum CliDispatch {
    /// 继续进入 HTTP 服务主循环。
    Run,
    /// 命令已处理完成，主程序应退出。
    Exit,
}

/// 解析后的命令。
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run,
    Help,
    Version,
    Migrate,
    Invoke(Endpoint),
    Doctor(DoctorFormat),
}

/// `doctor` 输出格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DoctorFormat {
    Text,
    Json,
}

/// 解析并执行 CLI。
pub(crate) async fn dispatch(args: &[String]) -> anyhow::Result<CliDispatch> {
    match parse_command(args)? {
        Command::Run => Ok(CliDispatch::Run),
        Command::Help => {
            print_root_help();
            Ok(CliDispatch::Exit)
        }
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(CliDispatch::Exit)
        }
        Command::Migrate => {
            let config = Config::from_env()?;
            PgStore::connect(&config.database)?.migrate().await?;
            println!("migrations applied");
            Ok(CliDispatch::Exit)
        }
        Command::Invoke(endpoint) => {
            run_invoke(endpoint).await?;
            Ok(CliDispatch::Exit)
        }
        Command::Doctor(format) => {
            if !run_doctor(format).await {
                std::process::exit(1);
            }
            Ok(CliDispatch::Exit)
        }
    }
}

/// 解析命令行参数。
fn parse_command(args: &[String]) -> anyhow::Result<Command> {
    let Some(first) = args.first() else {
        return Ok(Command::Run);
    };
    let rest = &args[1..];

    match first.trim() {
        "" | "run" => Ok(Command::Run),
        "-h" | "--help" | "help" => Ok(Command::Help),
        "version" => Ok(Command::Version),
        "migrate" => Ok(Command::Migrate),
        "invoke" => {
            let [endpoint] = rest else {
                return Err(anyhow!("usage: nomvote-api invoke <auth|voting>"));
            };
            endpoint
                .parse::<Endpoint>()
                .map(Command::Invoke)
                .map_err(|err| anyhow!(err))
        }
        "doctor" => parse_doctor_format(rest).map(Command::Doctor),
        other => Err(anyhow!(
            "unknown command: {other}; run `nomvote-api --help` for usage"
        )),
    }
}

/// 解析 doctor 的 `--format` 参数。
fn parse_doctor_format(args: &[String]) -> anyhow::Result<DoctorFormat> {
    match args {
        [] => Ok(DoctorFormat::Text),
        [flag, value] if flag == "--format" => match value.as_str() {
            "text" => Ok(DoctorFormat::Text),
            "json" => Ok(DoctorFormat::Json),
            other => Err(anyhow!("unsupported doctor format: {other}")),
        },
        _ => Err(anyhow!("usage: nomvote-api doctor [--format text|json]")),
    }
}

/// 从 stdin 读取一个调用事件，执行对应处理器并把响应打印到 stdout。
async fn run_invoke(endpoint: Endpoint) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let mut raw = String::new();
    tokio::io::stdin()
        .read_to_string(&mut raw)
        .await
        .context("read invocation from stdin")?;
    let invocation: Invocation =
        serde_json::from_str(&raw).context("decode invocation event")?;

    let store = PgStore::connect(&config.database)?;
    let state = AppState::new(store, config.vk_secret.as_str());
    let response = state.invoke(endpoint, &invocation).await;
    println!(
        "{}",
        serde_json::to_string_pretty(&response).context("encode invocation response")?
    );
    Ok(())
}

/// 打印 doctor 信息，返回是否健康。
async fn run_doctor(format: DoctorFormat) -> bool {
    let addr = std::env::var(ADDR_ENV).unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let secret_state = env_presence(VK_SECRET_ENV);
    let database_url_state = env_presence(DATABASE_URL_ENV);

    let (config_ok, database) = match Config::from_env() {
        Ok(config) => (true, probe_database(&config).await),
        Err(err) => (false, format!("skipped ({err:#})")),
    };
    let healthy = config_ok && database == "ok";

    match format {
        DoctorFormat::Text => {
            println!("addr: {addr}");
            println!("database-url: {database_url_state}");
            println!("vk-secret: {secret_state}");
            println!("database: {database}");
        }
        DoctorFormat::Json => {
            let payload = json!({
                "addr": addr,
                "databaseUrl": database_url_state,
                "vkSecret": secret_state,
                "database": database,
                "healthy": healthy,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string())
            );
        }
    }
    healthy
}

/// 仅报告环境变量是否设置，不回显值。
fn env_presence(key: &str) -> &'static str {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => "set",
        _ => "missing",
    }
}

/// `SELECT 1` 探活。
async fn probe_database(config: &Config) -> String {
    let store = match PgStore::connect(&config.database) {
        Ok(store) => store,
        Err(err) => return format!("error: {err:#}"),
    };
    match store.ping().await {
        Ok(()) => "ok".to_string(),
        Err(err) => format!("error: {err}"),
    }
}

/// 打印 root help。
fn print_root_help() {
    println!("nomvote-api usage:");
    println!("  nomvote-api run");
    println!("  nomvote-api migrate");
    println!("  nomvote-api invoke <auth|voting>   (event JSON on stdin)");
    println!("  nomvote-api doctor [--format text|json]");
    println!("  nomvote-api version");
}

#[cfg(test)]
mod tests {
    use super::{Command, DoctorFormat, parse_command};
    use crate::state::Endpoint;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn empty_args_run_the_server() {
        assert_eq!(parse_command(&[]).expect("run"), Command::Run);
        assert_eq!(parse_command(&args(&["run"])).expect("run"), Command::Run);
    }

    #[test]
    fn invoke_requires_a_known_endpoint() {
        assert_eq!(
            parse_command(&args(&["invoke", "voting"])).expect("invoke"),
            Command::Invoke(Endpoint::Voting)
        );
        assert!(parse_command(&args(&["invoke"])).is_err());
        assert!(parse_command(&args(&["invoke", "admin"])).is_err());
        assert!(parse_command(&args(&["invoke", "auth", "extra"])).is_err());
    }

    #[test]
    fn doctor_format_parsing() {
        assert_eq!(
            parse_command(&args(&["doctor"])).expect("doctor"),
            Command::Doctor(DoctorFormat::Text)
        );
        assert_eq!(
            parse_command(&args(&["doctor", "--format", "json"])).expect("doctor"),
            Command::Doctor(DoctorFormat::Json)
        );
        assert!(parse_command(&args(&["doctor", "--format", "yaml"])).is_err());
        assert!(parse_command(&args(&["doctor", "--verbose"])).is_err());
    }

    #[test]
    fn unknown_command_is_rejected() {
        let err = parse_command(&args(&["service"])).expect_err("unknown");
        assert!(err.to_string().contains("unknown command"));
    }
}
