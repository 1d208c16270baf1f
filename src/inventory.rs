//! 在庫ストア
//!
//! レコード一覧・取込元URL・最終同期時刻の3項目を所有し、
//! 起動時に `load`、変更時に `save` でキーバリューストアと同期する。

use crate::error::Result;
use crate::store::KeyValueStore;
use pharmacy_lookup_common::{filter_records, records_from_json, records_to_json, MedicationRecord};

pub const INVENTORY_KEY: &str = "pharmacy_inventory";
pub const SOURCE_URL_KEY: &str = "pharmacy_sheet_url";
pub const LAST_SYNCED_KEY: &str = "pharmacy_last_synced";

/// 既定の取込元（藥學部の公開スプレッドシート）
pub const DEFAULT_SOURCE_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vReUQnXNOTsBtNzEUrODdvPKKeS3XYfhdN86nICurJbG7Cst-4SGfZujbHJgs4bvLwclmHIjtTyqpTw/pub?output=csv";

#[derive(Debug, Clone)]
pub struct InventoryStore {
    records: Vec<MedicationRecord>,
    source_url: String,
    last_synced: String,
}

impl Default for InventoryStore {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            source_url: DEFAULT_SOURCE_URL.to_string(),
            last_synced: String::new(),
        }
    }
}

impl InventoryStore {
    /// ストアから読み込み
    ///
    /// 未保存のキーは既定値、壊れたレコードJSONは空一覧として扱う。
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let records = match store.get(INVENTORY_KEY) {
            Some(json) => records_from_json(&json).unwrap_or_else(|e| {
                tracing::warn!("保存済み在庫を読めません、空で開始します: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };

        let source_url = store
            .get(SOURCE_URL_KEY)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string());

        Self {
            records,
            source_url,
            last_synced: store.get(LAST_SYNCED_KEY).unwrap_or_default(),
        }
    }

    /// 3項目をストアへ保存
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        store.set(INVENTORY_KEY, records_to_json(&self.records)?)?;
        store.set(SOURCE_URL_KEY, self.source_url.clone())?;
        store.set(LAST_SYNCED_KEY, self.last_synced.clone())?;
        Ok(())
    }

    /// 一覧をまるごと置き換える
    pub fn replace(&mut self, records: Vec<MedicationRecord>, synced_at: String) {
        self.records = records;
        self.last_synced = synced_at;
    }

    pub fn set_source_url(&mut self, url: impl Into<String>) {
        self.source_url = url.into();
    }

    pub fn records(&self) -> &[MedicationRecord] {
        &self.records
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn last_synced(&self) -> &str {
        &self.last_synced
    }

    pub fn search(&self, term: &str) -> Vec<&MedicationRecord> {
        filter_records(&self.records, term)
    }

    /// 未同期（一覧が空）なら起動時に同期が必要
    pub fn needs_initial_sync(&self) -> bool {
        self.records.is_empty() || self.last_synced.is_empty()
    }
}
