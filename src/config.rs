use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigurationError;
use crate::router::DEFAULT_THRESHOLD;
use crate::search::SearchEngine;
use crate::text_process::TextAutoProcessConfig;

/// 程序名，也是配置目录名
pub const APP_NAME: &str = "talk-to-computer";

/// 应用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub router: RouterConfig,
    /// 识别后对文本的自动处理
    #[serde(default)]
    pub text_auto_process: TextAutoProcessConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// 相似度严格大于该值才执行指令
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f32,
    /// 裸 "搜索" 使用的引擎
    #[serde(default)]
    pub default_search_engine: SearchEngine,
}

fn default_api_url() -> String {
    "https://api.siliconflow.cn/v1".to_string()
}
fn default_model() -> String {
    "BAAI/bge-large-zh-v1.5".to_string()
}
fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: String::new(),
            model: default_model(),
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_threshold(),
            default_search_engine: SearchEngine::default(),
        }
    }
}

/// 应用数据目录
pub fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// 获取配置文件路径
pub fn config_path() -> PathBuf {
    app_dir().join("config.toml")
}

/// 加载配置，文件不存在则创建默认配置
pub fn load_config() -> Result<AppConfig, ConfigurationError> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigurationError> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    } else {
        let config = AppConfig::default();
        save_config_to(&config, path)?;
        log::info!("已创建默认配置: {}", path.display());
        Ok(config)
    }
}

/// 保存配置到文件
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigurationError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}
