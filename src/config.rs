use crate::error::{VocabCropError, Result};
use crate::orchestrator::EmptyResultPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vocab_crop_common::HeaderLanguage;

/// APIキーを探す環境変数（優先順）
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub jpeg_quality: u8,
    pub empty_result_policy: EmptyResultPolicy,
    pub header_language: HeaderLanguage,
    /// ZIP内のサブフォルダ名（未指定ならフラット）
    pub archive_folder: Option<String>,
}

/// APIキーの取得元
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    Env(&'static str),
    ConfigFile,
}

/// APIキーの解決結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKey {
    Present { value: String, source: KeySource },
    Absent,
}

impl ApiKey {
    pub fn into_value(self) -> Result<String> {
        match self {
            ApiKey::Present { value, .. } => Ok(value),
            ApiKey::Absent => Err(VocabCropError::MissingApiKey),
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, ApiKey::Present { .. })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            api_base_url: DEFAULT_API_BASE_URL.into(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            empty_result_policy: EmptyResultPolicy::default(),
            header_language: HeaderLanguage::default(),
            archive_folder: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| VocabCropError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("vocab-crop").join("config.json"))
    }

    /// APIキーを解決（環境変数 → 設定ファイル）
    ///
    /// バッチ開始時に一度だけ呼ぶ。
    pub fn resolve_api_key(&self) -> ApiKey {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// 環境変数の参照先を差し替えて解決
    pub fn resolve_api_key_with<F>(&self, lookup: F) -> ApiKey
    where
        F: Fn(&str) -> Option<String>,
    {
        for &name in API_KEY_ENV_VARS {
            if let Some(value) = lookup(name).map(|v| v.trim().to_string()) {
                if !value.is_empty() {
                    return ApiKey::Present { value, source: KeySource::Env(name) };
                }
            }
        }

        match self.api_key.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => ApiKey::Present {
                value: value.to_string(),
                source: KeySource::ConfigFile,
            },
            _ => ApiKey::Absent,
        }
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn set_model(&mut self, model: String) -> Result<()> {
        self.model = model;
        self.save()
    }
}
