//! 远程文档客户端

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::error::{AppError, AppResult, FetchError};

/// 远程文档获取接口
///
/// 调度器只依赖这个接口，测试中用脚本化实现替换真实 HTTP 客户端
#[async_trait]
pub trait DocumentClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// 基于 reqwest 的 HTTP 客户端
pub struct HttpDocumentClient {
    client: Client,
}

impl HttpDocumentClient {
    pub fn new(user_agent: &str, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Http(e.to_string()))?;
        Ok(Self { client })
    }
}

/// 把 HTTP 状态码归类：404/410 不重试，其余非成功状态均可重试
pub fn classify_status(status: StatusCode, url: &str) -> Option<FetchError> {
    if status.is_success() {
        None
    } else if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        Some(FetchError::NotFound(url.to_string()))
    } else {
        Some(FetchError::Transient(format!("HTTP {} ({})", status.as_u16(), url)))
    }
}

#[async_trait]
impl DocumentClient for HttpDocumentClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transient(e.to_string()))?;

        if let Some(err) = classify_status(response.status(), url) {
            return Err(err);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transient(e.to_string()))?;
        Ok(body.to_vec())
    }
}
