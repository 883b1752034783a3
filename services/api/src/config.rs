//! 配置模块职责：
//! 1. 从环境变量读取服务运行配置，并提供默认值。
//! 2. 校验必填项（数据库连接串、VK 密钥），缺失时启动失败。
//! 3. 提供日志目录与文件日志级别等环境开关的解析。

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, anyhow};

/// 默认监听地址。
pub(crate) const DEFAULT_ADDR: &str = "0.0.0.0:18080";
/// 默认连接池上限。
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
/// 默认获取连接超时（秒）。
const DEFAULT_DB_ACQUIRE_TIMEOUT_SEC: u64 = 10;
/// 默认日志根目录（相对当前工作目录）。
const DEFAULT_LOG_DIR: &str = "logs";

/// 数据库连接串环境变量。
pub(crate) const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// VK 应用密钥环境变量。
pub(crate) const VK_SECRET_ENV: &str = "VK_SECRET_KEY";
/// 监听地址环境变量。
pub(crate) const ADDR_ENV: &str = "NOMVOTE_ADDR";
const DB_MAX_CONNECTIONS_ENV: &str = "NOMVOTE_DB_MAX_CONNECTIONS";
const DB_ACQUIRE_TIMEOUT_ENV: &str = "NOMVOTE_DB_ACQUIRE_TIMEOUT_SEC";
const LOG_DIR_ENV: &str = "NOMVOTE_LOG_DIR";
/// 文件日志级别环境变量（独立于 `RUST_LOG`）。
const FILE_LOG_LEVEL_ENV: &str = "NOMVOTE_FILE_LOG_LEVEL";

/// 服务运行时配置。
#[derive(Debug, Clone)]
pub(crate) struct Config {
    /// HTTP 监听地址。
    pub(crate) addr: String,
    /// 数据库连接配置。
    pub(crate) database: DatabaseConfig,
    /// VK 签名与 token 派生共用的服务端密钥。
    pub(crate) vk_secret: String,
    /// 日志配置。
    pub(crate) log: LogConfig,
}

/// 数据库连接配置。
#[derive(Debug, Clone)]
pub(crate) struct DatabaseConfig {
    pub(crate) url: String,
    pub(crate) max_connections: u32,
    pub(crate) acquire_timeout: Duration,
}

/// 日志配置。
#[derive(Debug, Clone)]
pub(crate) struct LogConfig {
    /// 日志根目录（绝对路径）。
    pub(crate) dir: PathBuf,
    /// 文件日志级别原始值；解析失败时回退 debug。
    pub(crate) file_level: Option<String>,
}

impl Config {
    /// 从进程环境读取配置。
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意 key 查找函数读取配置，便于测试注入。
    pub(crate) fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = required(&lookup, DATABASE_URL_ENV)?;
        let vk_secret = required(&lookup, VK_SECRET_ENV)?;
        let addr = non_empty(&lookup, ADDR_ENV).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let max_connections = parse_positive(&lookup, DB_MAX_CONNECTIONS_ENV)
            .and_then(|value| u32::try_from(value).ok())
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
        let acquire_timeout = Duration::from_secs(
            parse_positive(&lookup, DB_ACQUIRE_TIMEOUT_ENV)
                .unwrap_or(DEFAULT_DB_ACQUIRE_TIMEOUT_SEC),
        );

        Ok(Self {
            addr,
            database: DatabaseConfig {
                url,
                max_connections,
                acquire_timeout,
            },
            vk_secret,
            log: LogConfig {
                dir: resolve_log_dir(non_empty(&lookup, LOG_DIR_ENV)),
                file_level: non_empty(&lookup, FILE_LOG_LEVEL_ENV),
            },
        })
    }
}

/// 读取必填项，空白视为缺失。
fn required<F>(lookup: &F, key: &str) -> anyhow::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key)
        .ok_or_else(|| anyhow!("missing required environment variable {key}"))
        .with_context(|| format!("load config: {key}"))
}

/// 读取非空值（去掉首尾空白）。
fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// 读取正整数，非法值返回 None 以回退默认值。
fn parse_positive<F>(lookup: &F, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key)
        .and_then(|raw| raw.parse::<u64>().ok())
        .filter(|value| *value > 0)
}

/// 将日志目录解析成绝对路径。
fn resolve_log_dir(raw: Option<String>) -> PathBuf {
    let path = PathBuf::from(raw.unwrap_or_else(|| DEFAULT_LOG_DIR.to_string()));
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(dir) => dir.join(path),
        Err(_) => PathBuf::from(DEFAULT_LOG_DIR),
    }
}
