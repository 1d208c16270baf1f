//! 写真辨識（Gemini API連携）
//!
//! 藥盒・標籤の写真と在庫の参考清單を送り、藥名を1つ推定させる。

use crate::error::{PharmacyError, Result};
use async_trait::async_trait;
use base64::Engine;
use pharmacy_lookup_common::{
    build_recognition_prompt, parse_recognition_reply, reference_names, MedicationRecord,
    Recognition,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// 送信する画像
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub mime_type: String,
    /// Base64エンコード済みデータ
    pub data: String,
}

impl ImagePayload {
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PharmacyError::FileNotFound(path.display().to_string()));
        }
        let bytes = std::fs::read(path)?;
        Ok(Self::from_bytes(&bytes, mime_type_for(path)))
    }
}

/// 拡張子からMIMEタイプを推定（不明時は image/jpeg）
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "gif" => "image/gif",
        _ => "image/jpeg",
    }
}

/// 写真辨識サービス
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, image: &ImagePayload, reference: &[&str]) -> Result<Recognition>;
}

/// 辨識して藥名を返す。失敗は「辨識なし」として扱う
pub async fn identify_or_none<R: Recognizer + ?Sized>(
    recognizer: &R,
    image: &ImagePayload,
    records: &[MedicationRecord],
) -> Option<String> {
    let reference = reference_names(records);
    match recognizer.recognize(image, &reference).await {
        Ok(recognition) => recognition.into_name(),
        Err(e) => {
            tracing::error!("AI辨識錯誤: {}", e);
            None
        }
    }
}

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// Gemini APIレスポンス
#[derive(Deserialize, Default)]
#[serde(default)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponsePart {
    text: String,
}

impl GeminiResponse {
    /// 先頭候補のテキストを連結（候補なしは空文字）
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

fn build_request(image: &ImagePayload, reference: &[&str]) -> GeminiRequest {
    GeminiRequest {
        contents: vec![Content {
            parts: vec![
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: image.mime_type.clone(),
                        data: image.data.clone(),
                    },
                },
                Part::Text {
                    text: build_recognition_prompt(reference),
                },
            ],
        }],
        generation_config: GenerationConfig { temperature: 0.1 },
    }
}

pub struct GeminiRecognizer {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiRecognizer {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PharmacyError::Config(format!("HTTP 用戶端初始化失敗: {}", e)))?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_API_BASE, self.model)
    }
}

#[async_trait]
impl Recognizer for GeminiRecognizer {
    async fn recognize(&self, image: &ImagePayload, reference: &[&str]) -> Result<Recognition> {
        let request = build_request(image, reference);
        tracing::debug!("辨識リクエスト: 参考清單{}件", reference.len());

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| PharmacyError::Recognition(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PharmacyError::Recognition(format!("API error {}: {}", status, body)));
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|e| PharmacyError::Recognition(format!("回應解析失敗: {}", e)))?;

        Ok(parse_recognition_reply(&payload.text()))
    }
}
