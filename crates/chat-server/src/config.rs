//! Server Configuration
//!
//! 管理 Server 的配置项：HTTP 监听、模型超参数、词表来源、解码预算和日志。

use anyhow::{Context, Result};
use chat_core::model::config::{ModelConfig, MAX_LEN};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Server 配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP 服务器配置
    pub http: HttpConfig,

    /// 模型超参数
    pub model: ModelConfig,

    /// 词表来源
    pub tokenizer: TokenizerConfig,

    /// 解码配置
    pub generation: GenerationConfig,

    /// 日志配置
    pub log: LogConfig,
}

/// HTTP 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// 监听地址
    pub host: String,

    /// 监听端口
    pub port: u16,

    /// 是否启用 CORS
    pub enable_cors: bool,

    /// 单个请求的超时时间 (秒)，可以是小数
    pub request_timeout_sec: f64,
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout_sec)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            request_timeout_sec: 30.0,
        }
    }
}

/// Where the vocabulary comes from.
///
/// `vocab_path` (a JSON word -> id index) wins over `corpus_path` (one
/// sentence per line, fitted at startup). With neither set the server runs
/// on the reserved tokens alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub vocab_path: Option<PathBuf>,
    pub corpus_path: Option<PathBuf>,
}

/// 解码配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// 每个回复最多调用解码器的次数
    pub max_steps: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { max_steps: MAX_LEN }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

impl ServerConfig {
    /// 从环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            http: HttpConfig {
                host: std::env::var("HOST").unwrap_or(defaults.http.host),
                port: env_parse("PORT").unwrap_or(defaults.http.port),
                enable_cors: env_parse("ENABLE_CORS").unwrap_or(defaults.http.enable_cors),
                request_timeout_sec: env_parse("REQUEST_TIMEOUT_SEC")
                    .unwrap_or(defaults.http.request_timeout_sec),
            },
            model: ModelConfig {
                vocab_size: env_parse("VOCAB_SIZE").unwrap_or(defaults.model.vocab_size),
                max_len: env_parse("MAX_LEN").unwrap_or(defaults.model.max_len),
                seed: env_parse("MODEL_SEED").unwrap_or(defaults.model.seed),
                ..defaults.model
            },
            tokenizer: TokenizerConfig {
                vocab_path: std::env::var("VOCAB_PATH").ok().map(PathBuf::from),
                corpus_path: std::env::var("CORPUS_PATH").ok().map(PathBuf::from),
            },
            generation: GenerationConfig {
                max_steps: env_parse("MAX_STEPS").unwrap_or(defaults.generation.max_steps),
            },
            log: LogConfig {
                level: std::env::var("RUST_LOG").unwrap_or(defaults.log.level),
            },
        }
    }

    /// 从配置文件加载（YAML 或 JSON）
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        // 根据文件后缀判断格式
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&content).context("Failed to parse YAML config")
            }
            Some("json") => serde_json::from_str(&content).context("Failed to parse JSON config"),
            _ => anyhow::bail!("Unsupported config file format (use .yaml, .yml, or .json)"),
        }
    }

    /// 验证配置
    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;

        // request_timeout() relies on this: from_secs_f64 panics on values Duration cannot hold
        let timeout = Duration::try_from_secs_f64(self.http.request_timeout_sec).ok();
        if timeout.map_or(true, |t| t.is_zero()) {
            anyhow::bail!("request_timeout_sec must be a positive number of seconds");
        }

        if self.generation.max_steps == 0 {
            anyhow::bail!("max_steps must be greater than 0");
        }

        for path in [&self.tokenizer.vocab_path, &self.tokenizer.corpus_path].into_iter().flatten() {
            if !path.exists() {
                anyhow::bail!("tokenizer source not found: {}", path.display());
            }
        }

        Ok(())
    }
}
