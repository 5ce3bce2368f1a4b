//! Global State Management
//!
//! 在所有 HTTP Handler 间共享的只读状态：配置和推理引擎。

use crate::config::ServerConfig;
use crate::inference::InferenceEngine;
use anyhow::Result;
use std::sync::Arc;

/// 全局应用状态
#[derive(Clone)]
pub struct AppState {
    /// 配置
    pub config: Arc<ServerConfig>,

    /// 推理引擎 (只读，无需加锁)
    pub engine: Arc<InferenceEngine>,
}

impl AppState {
    pub fn new(config: ServerConfig, engine: InferenceEngine) -> Self {
        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
        }
    }

    /// 按配置构建引擎并创建状态
    pub fn from_config(config: ServerConfig) -> Result<Self> {
        config.validate()?;
        let engine = InferenceEngine::new(&config)?;
        Ok(Self::new(config, engine))
    }
}
