use clap::Parser;
use pharmacy_lookup::{
    cli, config, error, inventory, logging, recognizer, render, source, store, sync,
};
use cli::{Cli, Commands};
use config::Config;
use error::{PharmacyError, Result};
use inventory::InventoryStore;
use pharmacy_lookup_common::Profile;
use recognizer::{GeminiRecognizer, ImagePayload};
use source::HttpSource;
use std::path::Path;
use std::time::Duration;
use store::{JsonFileStore, StoreLock};
use sync::{SyncOutcome, Syncer};

const EMPTY_INVENTORY_HINT: &str = "⚠ 尚無在庫資料，請先執行 `pharmacy-lookup sync`";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let mut config = Config::load_or_default();
    let profile = cli.profile.unwrap_or(config.profile);
    let store_path = match cli.store.clone() {
        Some(path) => path,
        None => config.resolve_store_path()?,
    };
    let timeout = Duration::from_secs(config.timeout_seconds);

    let kv = JsonFileStore::load(&store_path);
    let mut inventory = InventoryStore::load(&kv);

    match cli.command {
        Commands::Sync { url } => {
            let syncer = Syncer::new(HttpSource::new(timeout)?, profile);
            run_sync(&syncer, &store_path, url.as_deref()).await;
        }

        Commands::Search { term, sync, limit } => {
            // 初回（未同期・空）は自動で同期する
            if sync || inventory.needs_initial_sync() {
                let syncer = Syncer::new(HttpSource::new(timeout)?, profile);
                inventory = run_sync(&syncer, &store_path, None).await;
            }

            print_header(profile, &inventory);
            if inventory.records().is_empty() {
                println!("{}\n", EMPTY_INVENTORY_HINT);
            }
            let term = term.unwrap_or_default();
            let matches = inventory.search(&term);
            render::print_results(&matches, limit.unwrap_or(config.display_limit));
        }

        Commands::Identify { image, limit } => {
            if inventory.records().is_empty() {
                println!("{}", EMPTY_INVENTORY_HINT);
            }

            let payload = ImagePayload::from_file(&image)?;
            let recognizer =
                GeminiRecognizer::new(config.get_api_key()?, config.model.clone(), timeout)?;

            println!("📷 辨識中...");
            match recognizer::identify_or_none(&recognizer, &payload, inventory.records()).await {
                Some(name) => {
                    println!("✔ 辨識結果: {}\n", name);
                    let matches = inventory.search(&name);
                    render::print_results(&matches, limit.unwrap_or(config.display_limit));
                }
                None => println!("無法辨識藥品名稱，請改用文字搜尋"),
            }
        }

        Commands::Config { set_api_key, set_url, set_profile, show } => {
            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ 已設定 API 金鑰");
            }

            if let Some(p) = set_profile {
                config.set_profile(p)?;
                println!("✔ 已設定欄位設定檔: {}", p);
            }

            if let Some(url) = set_url {
                let _lock = StoreLock::try_acquire(&store_path)?;
                let mut kv = JsonFileStore::load(&store_path);
                inventory = InventoryStore::load(&kv);
                inventory.set_source_url(url);
                inventory.save(&mut kv)?;
                println!("✔ 已設定資料來源: {}", inventory.source_url());
            }

            if show {
                println!("設定：");
                println!("  資料來源: {}", inventory.source_url());
                println!("  欄位設定檔: {}", config.profile);
                println!("  辨識模型: {}", config.model);
                println!("  逾時: {} 秒", config.timeout_seconds);
                println!("  顯示筆數: {}", config.display_limit);
                println!("  儲存位置: {}", store_path.display());
                println!(
                    "  API 金鑰: {}",
                    if config.get_api_key().is_ok() { "已設定" } else { "未設定" }
                );
            }
        }

        Commands::Cache { clear, info } => {
            if info || !clear {
                if kv.path().exists() {
                    println!("本機資料：");
                    println!("  路徑: {}", kv.path().display());
                    println!("  藥品筆數: {}", inventory.records().len());
                    println!("  最後同步: {}", display_or_dash(inventory.last_synced()));
                    if let Ok(meta) = std::fs::metadata(kv.path()) {
                        println!("  大小: {} bytes", meta.len());
                    }
                } else {
                    println!("本機資料不存在: {}", kv.path().display());
                }
            }

            if clear {
                let cleared = StoreLock::try_acquire(&store_path)
                    .and_then(|_lock| JsonFileStore::clear(&store_path));
                match cleared {
                    Ok(true) => println!("✔ 已刪除本機資料: {}", store_path.display()),
                    Ok(false) => println!("本機資料不存在"),
                    Err(e) => println!("刪除本機資料失敗: {}", e),
                }
            }
        }
    }

    Ok(())
}

/// ストアファイルをロックして同期し、結果を表示する
///
/// 失敗しても既存データで続行できるよう、最新の在庫を返す。
async fn run_sync<S: source::CsvSource>(
    syncer: &Syncer<S>,
    store_path: &Path,
    source_url: Option<&str>,
) -> InventoryStore {
    println!("🔄 正在獲取最新儲位資料...");
    match syncer.sync_store_file(store_path, source_url).await {
        Ok((inventory, outcome)) => {
            match outcome {
                SyncOutcome::Updated { count, synced_at } => {
                    println!("✔ 同步完成: {}筆（{}）\n", count, synced_at);
                }
                SyncOutcome::Unchanged(reason) => {
                    tracing::warn!("同步略過: {}", reason.as_error());
                    println!("⚠ 來源沒有可用資料，保留現有資料\n");
                }
            }
            inventory
        }
        Err(PharmacyError::SyncInProgress) => {
            println!("⚠ {}，使用現有資料\n", PharmacyError::SyncInProgress);
            InventoryStore::load(&JsonFileStore::load(store_path))
        }
        Err(e) => {
            tracing::error!("同步失敗: {}", e);
            println!("⚠ 同步失敗，請檢查來源設定\n");
            InventoryStore::load(&JsonFileStore::load(store_path))
        }
    }
}

fn print_header(profile: Profile, inventory: &InventoryStore) {
    let title = match profile {
        Profile::Herbal => "中藥儲位快速查詢",
        Profile::Western | Profile::Refrigerated => "西藥儲位快速查詢",
    };
    println!("💊 {}", title);
    if !inventory.last_synced().is_empty() {
        println!("   同步：{}", inventory.last_synced());
    }
    println!();
}

fn display_or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}
