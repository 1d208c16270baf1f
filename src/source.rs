//! CSV取得元

use crate::error::{PharmacyError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// URLからCSVテキストを取得する
#[async_trait]
pub trait CsvSource: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// HTTP経由の取得（リトライなし）
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PharmacyError::Config(format!("HTTP 用戶端初始化失敗: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CsvSource for HttpSource {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PharmacyError::Fetch(format!("HTTP {}", status)));
        }

        Ok(response.text().await?)
    }
}
