//! Gemini API連携

use super::{ImagePayload, Recognizer};
use crate::config::Config;
use crate::error::{VocabCropError, Result};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use vocab_crop_common::{
    parse_recognition_response, recognition_response_schema, DetectedItem, RECOGNITION_PROMPT,
};

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
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

/// Gemini APIレスポンス
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

pub struct GeminiRecognizer {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiRecognizer {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// 設定からAPIキーを解決して生成（キーがなければ `MissingApiKey`）
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.resolve_api_key().into_value()?;
        Ok(Self::new(api_key, config.model.clone(), config.api_base_url.clone()))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn call_gemini_api(&self, request: &GeminiRequest) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| VocabCropError::ApiCall(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| VocabCropError::ApiCall(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(VocabCropError::ApiCall(format!("API error {}: {}", status, body.trim())));
        }

        extract_response_text(&body)
    }
}

#[async_trait]
impl Recognizer for GeminiRecognizer {
    async fn recognize(&self, image: ImagePayload<'_>) -> Result<Vec<DetectedItem>> {
        let request = build_request(&image);

        tracing::debug!(file = image.file_name, model = %self.model, bytes = image.data.len(), "認識リクエスト送信");
        let text = self.call_gemini_api(&request).await?;

        let parsed = parse_recognition_response(&text)
            .map_err(|e| VocabCropError::ApiParse(e.to_string()))?;

        if parsed.rejected > 0 {
            tracing::warn!(file = image.file_name, rejected = parsed.rejected, "不正なカードを除外");
        }
        tracing::debug!(file = image.file_name, items = parsed.items.len(), "認識完了");

        Ok(parsed.items)
    }
}

fn build_request(image: &ImagePayload<'_>) -> GeminiRequest {
    let data = base64::engine::general_purpose::STANDARD.encode(image.data);

    GeminiRequest {
        contents: vec![Content {
            parts: vec![
                Part::Text { text: RECOGNITION_PROMPT.to_string() },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: image.mime.to_string(),
                        data,
                    },
                },
            ],
        }],
        generation_config: GenerationConfig {
            temperature: 0.1,
            response_mime_type: "application/json".to_string(),
            response_schema: recognition_response_schema(),
        },
    }
}

/// レスポンス本文から最初の候補のテキストを取り出す
fn extract_response_text(body: &str) -> Result<String> {
    let response: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| VocabCropError::ApiParse(format!("レスポンスJSONエラー: {}", e)))?;

    response
        .candidates
        .first()
        .map(|c| {
            c.content
                .parts
                .iter()
                .map(|p| p.text.as_str())
                .collect::<String>()
        })
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| VocabCropError::ApiParse("Empty response".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> ImagePayload<'static> {
        ImagePayload {
            file_name: "sheet.jpg",
            mime: "image/jpeg",
            data: &[0xFF, 0xD8, 0xFF],
        }
    }

    #[test]
    fn test_request_serialize() {
        let request = build_request(&payload());
        let json = serde_json::to_string(&request).expect("シリアライズ失敗");

        assert!(json.contains("\"contents\""));
        assert!(json.contains("\"generationConfig\""));
        assert!(json.contains("\"temperature\":0.1"));
        assert!(json.contains("\"responseMimeType\":\"application/json\""));
        assert!(json.contains("\"responseSchema\""));
        assert!(json.contains("\"inline_data\""));
        assert!(json.contains("\"mime_type\":\"image/jpeg\""));
        assert!(json.contains("\"data\":\"/9j/\""));
    }

    #[test]
    fn test_part_text_serialize() {
        let part = Part::Text { text: "Hello".to_string() };
        let json = serde_json::to_string(&part).expect("シリアライズ失敗");
        assert_eq!(json, r#"{"text":"Hello"}"#);
    }

    #[test]
    fn test_extract_response_text() {
        let body = r#"{
            "candidates": [{
                "content": {
                    "parts": [{"text": "{\"items\": [{\"word\": \"fox\", \"box_2d\": [1, 2, 3, 4]}]}"}]
                }
            }]
        }"#;
        let text = extract_response_text(body).unwrap();
        let parsed = parse_recognition_response(&text).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].word, "fox");
    }

    #[test]
    fn test_extract_response_text_joins_parts() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "{\"items\":"}, {"text": " []}"}]}}]}"#;
        assert_eq!(extract_response_text(body).unwrap(), "{\"items\": []}");
    }

    #[test]
    fn test_extract_response_text_no_candidates() {
        let result = extract_response_text(r#"{"candidates": []}"#);
        assert!(matches!(result, Err(VocabCropError::ApiParse(_))));

        let result = extract_response_text(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);
        assert!(matches!(result, Err(VocabCropError::ApiParse(_))));
    }

    #[test]
    fn test_extract_response_text_invalid_json() {
        let result = extract_response_text("<html>bad gateway</html>");
        assert!(matches!(result, Err(VocabCropError::ApiParse(_))));
    }

    #[test]
    fn test_endpoint() {
        let recognizer = GeminiRecognizer::new("key", "gemini-2.0-flash", "https://example.com/v1beta/");
        assert_eq!(
            recognizer.endpoint(),
            "https://example.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(recognizer.model(), "gemini-2.0-flash");
    }
}
