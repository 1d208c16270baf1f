use crate::error::{PharmacyError, Result};
use pharmacy_lookup_common::{Profile, DEFAULT_DISPLAY_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
    pub profile: Profile,
    /// 保存先（省略時は設定ディレクトリの store.json）
    pub store_path: Option<PathBuf>,
    pub display_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".into(),
            timeout_seconds: 30,
            profile: Profile::Western,
            store_path: None,
            display_limit: DEFAULT_DISPLAY_LIMIT,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// 読めない・壊れた設定は警告して既定値で続行する
    pub fn load_or_default() -> Self {
        match Self::config_path() {
            Ok(path) => Self::load_or_default_from(&path),
            Err(e) => {
                tracing::warn!("設定ファイルの場所を決められません、既定値で続行します: {}", e);
                Self::default()
            }
        }
    }

    pub fn load_or_default_from(config_path: &Path) -> Self {
        Self::load_from(config_path).unwrap_or_else(|e| {
            tracing::warn!(
                "設定ファイルを読めません {}、既定値で続行します: {}",
                config_path.display(),
                e
            );
            Self::default()
        })
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

    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PharmacyError::Config("找不到使用者主目錄".into()))?;
        Ok(home.join(".config").join("pharmacy-lookup"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// 保存先パス（設定 → 既定）
    pub fn resolve_store_path(&self) -> Result<PathBuf> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("store.json")),
        }
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key.clone().ok_or(PharmacyError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn set_profile(&mut self, profile: Profile) -> Result<()> {
        self.profile = profile;
        self.save()
    }
}
