//! 同期テスト
//!
//! 取得元を差し替えて、置換・保持・拒否の各ポリシーを検証

use async_trait::async_trait;
use pharmacy_lookup::error::{PharmacyError, Result};
use pharmacy_lookup::inventory::{InventoryStore, INVENTORY_KEY, LAST_SYNCED_KEY};
use pharmacy_lookup::source::CsvSource;
use pharmacy_lookup::store::{JsonFileStore, KeyValueStore, MemoryStore};
use pharmacy_lookup::sync::{SkipReason, SyncOutcome, Syncer};
use pharmacy_lookup_common::{MedicationRecord, Profile};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use tokio::sync::Notify;

/// 固定テキストを返し、要求URLを記録する取得元
struct StaticSource {
    body: std::result::Result<String, String>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl StaticSource {
    fn ok(body: &str) -> Self {
        Self {
            body: Ok(body.to_string()),
            requested: Arc::default(),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            body: Err(message.to_string()),
            requested: Arc::default(),
        }
    }
}

#[async_trait]
impl CsvSource for StaticSource {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.requested.lock().unwrap().push(url.to_string());
        self.body.clone().map_err(PharmacyError::Fetch)
    }
}

/// 通知があるまで応答を保留する取得元
struct GatedSource {
    gate: Arc<Notify>,
}

#[async_trait]
impl CsvSource for GatedSource {
    async fn fetch_text(&self, _url: &str) -> Result<String> {
        self.gate.notified().await;
        Ok("儲位,中文名稱\nA101,普拿疼".to_string())
    }
}

/// 読み込みはできるが書き込みが必ず失敗するストア
struct ReadOnlyStore {
    inner: MemoryStore,
}

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&mut self, _key: &str, _value: String) -> Result<()> {
        Err(PharmacyError::Io(std::io::Error::other("disk full")))
    }
}

const SAMPLE_CSV: &str = "儲位,中文名稱\nA101,普拿疼\n,冰箱藥品";

/// 既存データ入りの在庫とストア
fn seeded() -> (InventoryStore, MemoryStore) {
    let mut store = MemoryStore::new();
    let mut inventory = InventoryStore::load(&store);
    inventory.set_source_url("https://example.com/inventory.csv");
    inventory.replace(
        vec![MedicationRecord {
            id: "med-0-1".to_string(),
            name: "舊資料".to_string(),
            location: "Z9".to_string(),
            ..Default::default()
        }],
        "2026/1/1 08:00:00".to_string(),
    );
    inventory.save(&mut store).unwrap();
    (inventory, store)
}

#[tokio::test]
async fn test_sync_replaces_records_and_persists() {
    let (mut inventory, mut store) = seeded();
    let syncer = Syncer::new(StaticSource::ok(SAMPLE_CSV), Profile::Western);

    let outcome = syncer.sync(&mut inventory, &mut store).await.unwrap();

    let SyncOutcome::Updated { count, synced_at } = outcome else {
        panic!("同期されていない: {:?}", outcome);
    };
    assert_eq!(count, 2);
    assert_eq!(inventory.last_synced(), synced_at);
    assert_eq!(inventory.records()[0].name, "普拿疼");
    assert_eq!(inventory.records()[1].name, "冰箱藥品");
    assert!(inventory.records()[1].is_refrigerated);

    let reloaded = InventoryStore::load(&store);
    assert_eq!(reloaded.records(), inventory.records());
    assert_eq!(reloaded.last_synced(), synced_at);
}

#[tokio::test]
async fn test_sync_fetches_normalized_url() {
    let mut store = MemoryStore::new();
    let mut inventory = InventoryStore::load(&store);
    inventory.set_source_url("https://docs.google.com/spreadsheets/d/abc/edit#gid=0");
    let source = StaticSource::ok(SAMPLE_CSV);
    let requested = Arc::clone(&source.requested);
    let syncer = Syncer::new(source, Profile::Western);

    syncer.sync(&mut inventory, &mut store).await.unwrap();

    assert_eq!(
        requested.lock().unwrap().as_slice(),
        ["https://docs.google.com/spreadsheets/d/abc/export?format=csv"]
    );
    // 在庫には入力されたURLがそのまま残る
    assert_eq!(
        inventory.source_url(),
        "https://docs.google.com/spreadsheets/d/abc/edit#gid=0"
    );
}

#[tokio::test]
async fn test_no_usable_rows_keeps_previous_data() {
    let (mut inventory, mut store) = seeded();
    let before_json = store.get(INVENTORY_KEY);
    let syncer = Syncer::new(StaticSource::ok("儲位,中文名稱\n,\n , "), Profile::Western);

    let outcome = syncer.sync(&mut inventory, &mut store).await.unwrap();

    assert_eq!(outcome, SyncOutcome::Unchanged(SkipReason::ParseNoRows));
    assert_eq!(inventory.records()[0].name, "舊資料");
    assert_eq!(inventory.last_synced(), "2026/1/1 08:00:00");
    assert_eq!(store.get(INVENTORY_KEY), before_json);
    assert_eq!(store.get(LAST_SYNCED_KEY).as_deref(), Some("2026/1/1 08:00:00"));
}

#[tokio::test]
async fn test_empty_body_keeps_previous_data() {
    let (mut inventory, mut store) = seeded();
    let syncer = Syncer::new(StaticSource::ok("\u{FEFF}\r\n\r\n"), Profile::Western);

    let outcome = syncer.sync(&mut inventory, &mut store).await.unwrap();

    assert_eq!(outcome, SyncOutcome::Unchanged(SkipReason::ParseEmpty));
    assert_eq!(inventory.records().len(), 1);
    assert_eq!(inventory.last_synced(), "2026/1/1 08:00:00");
}

#[tokio::test]
async fn test_fetch_error_leaves_data_untouched() {
    let (mut inventory, mut store) = seeded();
    let syncer = Syncer::new(StaticSource::failing("HTTP 500"), Profile::Western);

    let result = syncer.sync(&mut inventory, &mut store).await;

    assert!(matches!(result, Err(PharmacyError::Fetch(_))));
    assert_eq!(inventory.records()[0].name, "舊資料");
    assert_eq!(InventoryStore::load(&store).records()[0].name, "舊資料");
}

#[tokio::test]
async fn test_blank_source_url_is_config_error() {
    let mut store = MemoryStore::new();
    let mut inventory = InventoryStore::load(&store);
    inventory.set_source_url("   ");
    let syncer = Syncer::new(StaticSource::ok(SAMPLE_CSV), Profile::Western);

    let result = syncer.sync(&mut inventory, &mut store).await;

    assert!(matches!(result, Err(PharmacyError::Config(_))));
    assert!(inventory.records().is_empty());
}

#[tokio::test]
async fn test_repeated_sync_assigns_fresh_ids() {
    let (mut inventory, mut store) = seeded();
    let syncer = Syncer::new(StaticSource::ok(SAMPLE_CSV), Profile::Western);

    syncer.sync(&mut inventory, &mut store).await.unwrap();
    let first: HashSet<String> = inventory.records().iter().map(|r| r.id.clone()).collect();
    syncer.sync(&mut inventory, &mut store).await.unwrap();
    let second: HashSet<String> = inventory.records().iter().map(|r| r.id.clone()).collect();

    assert_eq!(first.len(), 2);
    assert!(first.is_disjoint(&second));
}

#[tokio::test]
async fn test_profile_changes_column_mapping() {
    let (mut inventory, mut store) = seeded();
    let csv = "藥斗,飲片,拼音\n斗3-2,黃耆,huang qi";
    let syncer = Syncer::new(StaticSource::ok(csv), Profile::Herbal);

    syncer.sync(&mut inventory, &mut store).await.unwrap();

    let record = &inventory.records()[0];
    assert_eq!(record.location, "斗3-2");
    assert_eq!(record.name, "黃耆");
    assert_eq!(record.english_name, "huang qi");
}

#[tokio::test]
async fn test_overlapping_sync_is_rejected() {
    let gate = Arc::new(Notify::new());
    let syncer = Syncer::new(
        GatedSource {
            gate: Arc::clone(&gate),
        },
        Profile::Western,
    );
    let (mut inventory_a, mut store_a) = seeded();
    let (mut inventory_b, mut store_b) = seeded();

    let first = syncer.sync(&mut inventory_a, &mut store_a);
    let second = async {
        let result = syncer.sync(&mut inventory_b, &mut store_b).await;
        gate.notify_one();
        result
    };
    let (first, second) = tokio::join!(first, second);

    assert!(matches!(first, Ok(SyncOutcome::Updated { count: 1, .. })));
    assert!(matches!(second, Err(PharmacyError::SyncInProgress)));
    assert_eq!(inventory_b.records()[0].name, "舊資料");

    // 完了後は再び同期できる
    gate.notify_one();
    let third = syncer.sync(&mut inventory_b, &mut store_b).await;
    assert!(matches!(third, Ok(SyncOutcome::Updated { count: 1, .. })));
}

#[tokio::test]
async fn test_failed_save_keeps_in_memory_inventory() {
    let (mut inventory, seeded_store) = seeded();
    let mut store = ReadOnlyStore {
        inner: seeded_store,
    };
    let syncer = Syncer::new(StaticSource::ok(SAMPLE_CSV), Profile::Western);

    let result = syncer.sync(&mut inventory, &mut store).await;

    assert!(matches!(result, Err(PharmacyError::Io(_))));
    assert_eq!(inventory.records().len(), 1);
    assert_eq!(inventory.records()[0].name, "舊資料");
    assert_eq!(inventory.last_synced(), "2026/1/1 08:00:00");
}

#[tokio::test]
async fn test_store_file_sync_persists_url_and_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    let syncer = Syncer::new(StaticSource::ok(SAMPLE_CSV), Profile::Western);

    let (inventory, outcome) = syncer
        .sync_store_file(&path, Some("https://example.com/a.csv"))
        .await
        .unwrap();

    assert!(matches!(outcome, SyncOutcome::Updated { count: 2, .. }));
    assert_eq!(inventory.source_url(), "https://example.com/a.csv");

    let reloaded = InventoryStore::load(&JsonFileStore::load(&path));
    assert_eq!(reloaded.source_url(), "https://example.com/a.csv");
    assert_eq!(reloaded.records(), inventory.records());
}

#[tokio::test]
async fn test_shared_store_file_rejects_second_sync() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    let gate = Arc::new(Notify::new());
    let syncer_a = Syncer::new(
        GatedSource {
            gate: Arc::clone(&gate),
        },
        Profile::Western,
    );
    let syncer_b = Syncer::new(StaticSource::ok("儲位,中文名稱\nB1,乙"), Profile::Western);

    let first = syncer_a.sync_store_file(&path, Some("https://example.com/a.csv"));
    let second = async {
        let result = syncer_b
            .sync_store_file(&path, Some("https://example.com/b.csv"))
            .await;
        gate.notify_one();
        result
    };
    let (first, second) = tokio::join!(first, second);

    assert!(matches!(first, Ok((_, SyncOutcome::Updated { count: 1, .. }))));
    assert!(matches!(second, Err(PharmacyError::SyncInProgress)));

    // 後発の同期は URL もレコードも書き換えていない
    let stored = InventoryStore::load(&JsonFileStore::load(&path));
    assert_eq!(stored.source_url(), "https://example.com/a.csv");
    let names: Vec<&str> = stored.records().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["普拿疼"]);

    // ロック解放後は別の Syncer でも同期できる
    let (after, _) = syncer_b.sync_store_file(&path, None).await.unwrap();
    assert_eq!(after.source_url(), "https://example.com/a.csv");
    assert_eq!(after.records()[0].name, "乙");
}
