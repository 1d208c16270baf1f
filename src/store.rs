//! キーバリューストア
//!
//! ブラウザの localStorage に相当する、文字列キー → 文字列値の永続領域。
//! キーごとに独立して書き込み、複数キー間のトランザクションは持たない。
//! 読み込み → 同期 → 保存 の区間は `StoreLock` でプロセス間排他する。

use crate::error::{PharmacyError, Result};
use fs4::fs_std::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// 文字列キーバリューストア
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// ストアファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    /// バージョン（互換性チェック用）
    version: u32,
    entries: BTreeMap<String, String>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            version: JsonFileStore::CURRENT_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

/// JSONファイルに保存するストア
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    file: StoreFile,
}

impl JsonFileStore {
    const CURRENT_VERSION: u32 = 1;

    /// ストアファイルを読み込み
    ///
    /// ファイルがない・壊れている・バージョン不一致の場合は空で開始する。
    pub fn load(path: &Path) -> Self {
        let file = Self::read_file(path).unwrap_or_default();
        Self {
            path: path.to_path_buf(),
            file,
        }
    }

    fn read_file(path: &Path) -> Option<StoreFile> {
        if !path.exists() {
            return None;
        }

        let reader = match File::open(path) {
            Ok(f) => BufReader::new(f),
            Err(e) => {
                tracing::warn!("ストアを開けません {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_reader::<_, StoreFile>(reader) {
            Ok(file) if file.version == Self::CURRENT_VERSION => Some(file),
            Ok(file) => {
                tracing::warn!(
                    "ストアバージョン不一致 (v{} != v{})、空で開始します",
                    file.version,
                    Self::CURRENT_VERSION
                );
                None
            }
            Err(e) => {
                tracing::warn!("ストアの解析に失敗、空で開始します: {}", e);
                None
            }
        }
    }

    /// ストアファイルを保存
    ///
    /// 同じディレクトリの一時ファイルに書き切ってから置き換えるので、
    /// 途中で落ちても既存ファイルは壊れない。
    pub fn save(&self) -> Result<()> {
        let dir = parent_dir(&self.path);
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, &self.file)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// ストアファイルを削除
    ///
    /// 削除した場合は `true`、もともと存在しなければ `false`。
    pub fn clear(path: &Path) -> Result<bool> {
        if path.exists() {
            std::fs::remove_file(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 保存済みキー数
    pub fn len(&self) -> usize {
        self.file.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.entries.is_empty()
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.file.entries.get(key).cloned()
    }

    /// 書き込みのたびにファイルへ反映する
    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.file.entries.insert(key.to_string(), value);
        self.save()
    }
}

/// 空の親ディレクトリ（相対ファイル名のみ）はカレントとみなす
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// ストアファイルの排他ロック
///
/// `store.json` の隣の `store.json.lock` に排他ロックを取る。
/// 別プロセス（または同一プロセスの別ハンドル）が保持中なら
/// `SyncInProgress`。ドロップで解放される。
#[derive(Debug)]
pub struct StoreLock {
    _file: File,
    path: PathBuf,
}

impl StoreLock {
    pub fn try_acquire(store_path: &Path) -> Result<Self> {
        std::fs::create_dir_all(parent_dir(store_path))?;

        let mut name = store_path.as_os_str().to_owned();
        name.push(".lock");
        let path = PathBuf::from(name);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                tracing::debug!("ストアロック取得: {}", path.display());
                Ok(Self { _file: file, path })
            }
            Err(e) if is_contended(&e) => {
                tracing::warn!("ストアは別の同期が使用中です: {}", path.display());
                Err(PharmacyError::SyncInProgress)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// ロックファイルのパス
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn is_contended(err: &std::io::Error) -> bool {
    err.kind() == ErrorKind::WouldBlock
        || err.raw_os_error() == fs4::lock_contended_error().raw_os_error()
}

/// メモリ上のストア（テスト・組み込み用）
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}
