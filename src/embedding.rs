use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;
use crate::error::{ConfigurationError, ProviderError};

/// 文本向量化服务
///
/// 约定：非空输入返回固定维度、非空、全部为有限值的向量，并且已经归一化为单位长度，
/// 相似度直接用点积计算。空字符串由实现方拒绝。
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;
}

/// 检查向量是否可用
pub fn validate_vector(vector: &[f32]) -> Result<(), ProviderError> {
    if vector.is_empty() {
        return Err(ProviderError::EmptyVector);
    }
    if vector.iter().any(|v| !v.is_finite()) {
        return Err(ProviderError::NonFinite);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    encoding_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    data: Option<UserInfoData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserInfoData {
    total_balance: serde_json::Value,
    charge_balance: serde_json::Value,
    balance: serde_json::Value,
}

/// 账户余额
#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    /// 总余额
    pub total: String,
    /// 充值余额
    pub charge: String,
    /// 赠送余额
    pub gift: String,
}

impl std::fmt::Display for Balance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "总余额: {}, 充值余额: {}, 赠送余额: {}",
            self.total, self.charge, self.gift
        )
    }
}

fn value_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// SiliconFlow 向量化接口
pub struct SiliconFlowEmbedding {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl SiliconFlowEmbedding {
    pub fn new(config: &EmbeddingConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.trim().to_string(),
            model: config.model.clone(),
        }
    }

    /// 启动时检查 key 是否填写
    pub fn check_credentials(&self) -> Result<(), ConfigurationError> {
        if self.api_key.is_empty() {
            return Err(ConfigurationError::MissingApiKey);
        }
        Ok(())
    }

    /// 查询账户余额，也用来验证 key 是否有效
    pub async fn balance(&self) -> Result<Balance, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingApiKey);
        }
        let url = format!("{}/user/info", self.api_url);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ProviderError::Status(resp.status().as_u16()));
        }

        let body: UserInfoResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        body.data
            .map(|d| Balance {
                total: value_to_string(d.total_balance),
                charge: value_to_string(d.charge_balance),
                gift: value_to_string(d.balance),
            })
            .ok_or_else(|| ProviderError::Decode("响应中无 data 字段".to_string()))
    }
}

#[async_trait]
impl EmbeddingProvider for SiliconFlowEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        // 空字符串 siliconflow 会返回 400
        if text.is_empty() {
            return Err(ProviderError::EmptyInput);
        }
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        let url = format!("{}/embeddings", self.api_url);
        let body = EmbeddingRequest {
            model: &self.model,
            input: text,
            encoding_format: "float",
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ProviderError::Status(resp.status().as_u16()));
        }

        let body: EmbeddingResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        let vector = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ProviderError::Decode("响应中无 data 字段".to_string()))?;

        validate_vector(&vector)?;
        log::debug!("向量化完成: {text} ({} 维)", vector.len());
        Ok(vector)
    }
}
