//! 雲端同期
//!
//! URL正規化 → 取得 → 取込 → 置換・保存 を1単位として実行する。
//! 同じ `Syncer` での同時実行、および同じストアファイルへの同時同期は
//! `SyncInProgress` で拒否する。

use crate::error::{PharmacyError, Result};
use crate::inventory::InventoryStore;
use crate::source::CsvSource;
use crate::store::{JsonFileStore, KeyValueStore, StoreLock};
use chrono::{DateTime, Local};
use pharmacy_lookup_common::{ingest_csv, normalize_source_url, Error as IngestError, Profile};
use std::path::Path;
use tokio::sync::Mutex;

/// 同期しなかった理由（いずれも既存データは保持）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 内容行なし
    ParseEmpty,
    /// 使えるレコードなし
    ParseNoRows,
}

impl SkipReason {
    pub fn as_error(&self) -> PharmacyError {
        match self {
            SkipReason::ParseEmpty => PharmacyError::ParseEmpty,
            SkipReason::ParseNoRows => PharmacyError::ParseNoRows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Updated { count: usize, synced_at: String },
    Unchanged(SkipReason),
}

/// 同期時刻の表示形式（zh-TW, 24時間制）
pub fn format_synced_at(time: DateTime<Local>) -> String {
    time.format("%Y/%-m/%-d %H:%M:%S").to_string()
}

pub struct Syncer<S: CsvSource> {
    source: S,
    profile: Profile,
    running: Mutex<()>,
}

impl<S: CsvSource> Syncer<S> {
    pub fn new(source: S, profile: Profile) -> Self {
        Self {
            source,
            profile,
            running: Mutex::new(()),
        }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// 1回同期する
    ///
    /// 失敗時・空結果時は `inventory` とストアに一切触れない。
    pub async fn sync(
        &self,
        inventory: &mut InventoryStore,
        store: &mut dyn KeyValueStore,
    ) -> Result<SyncOutcome> {
        let _guard = self
            .running
            .try_lock()
            .map_err(|_| PharmacyError::SyncInProgress)?;

        let url = normalize_source_url(inventory.source_url())?;
        tracing::info!("同期開始: {} (profile={})", url, self.profile);

        let text = self.source.fetch_text(&url).await?;
        tracing::debug!("取得 {} bytes", text.len());

        let ingested = match ingest_csv(&text, self.profile.columns()) {
            Ok(ingested) => ingested,
            Err(IngestError::EmptyCsv) => {
                tracing::warn!("CSV に内容行がありません。既存データを保持します");
                return Ok(SyncOutcome::Unchanged(SkipReason::ParseEmpty));
            }
            Err(IngestError::NoUsableRows) => {
                tracing::warn!("使えるデータ行がありません。既存データを保持します");
                return Ok(SyncOutcome::Unchanged(SkipReason::ParseNoRows));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            "欄位: {:?} (見出し行{})",
            ingested.field_map,
            if ingested.header_detected { "あり" } else { "なし" }
        );

        let count = ingested.records.len();
        let synced_at = format_synced_at(Local::now());

        // 保存に成功してから手元の在庫へ反映する
        let mut updated = inventory.clone();
        updated.replace(ingested.records, synced_at.clone());
        updated.save(store)?;
        *inventory = updated;

        tracing::info!("同期完了: {}件 ({})", count, synced_at);
        Ok(SyncOutcome::Updated { count, synced_at })
    }

    /// ストアファイルをロックして 読み込み → 同期 → 保存 を行う
    ///
    /// `source_url` を渡すとロック下で取込元を書き換えて保存してから同期する。
    /// 他の同期がファイルを使用中なら何も読まずに `SyncInProgress`。
    /// 同期が失敗しても URL の変更は保存済みのまま残る。
    pub async fn sync_store_file(
        &self,
        path: &Path,
        source_url: Option<&str>,
    ) -> Result<(InventoryStore, SyncOutcome)> {
        let _lock = StoreLock::try_acquire(path)?;

        let mut store = JsonFileStore::load(path);
        let mut inventory = InventoryStore::load(&store);
        if let Some(url) = source_url {
            inventory.set_source_url(url);
            inventory.save(&mut store)?;
        }

        let outcome = self.sync(&mut inventory, &mut store).await?;
        Ok((inventory, outcome))
    }
}
