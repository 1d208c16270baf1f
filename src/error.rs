use thiserror::Error;

#[derive(Error, Debug)]
pub enum PharmacyError {
    #[error("設定錯誤: {0}")]
    Config(String),

    #[error("未設定 API 金鑰。請以 `pharmacy-lookup config --set-api-key YOUR_KEY` 或環境變數 GEMINI_API_KEY 設定")]
    MissingApiKey,

    #[error("找不到檔案: {0}")]
    FileNotFound(String),

    #[error("無法抓取資料: {0}")]
    Fetch(String),

    #[error("CSV 沒有任何內容")]
    ParseEmpty,

    #[error("CSV 沒有可用的資料列")]
    ParseNoRows,

    #[error("同步進行中，請稍後再試")]
    SyncInProgress,

    #[error("辨識服務錯誤: {0}")]
    Recognition(String),

    #[error("JSON 解析錯誤: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO 錯誤: {0}")]
    Io(#[from] std::io::Error),
}

impl From<pharmacy_lookup_common::Error> for PharmacyError {
    fn from(err: pharmacy_lookup_common::Error) -> Self {
        use pharmacy_lookup_common::Error as Common;
        match err {
            Common::Json(e) => PharmacyError::JsonParse(e),
            Common::Config(msg) => PharmacyError::Config(msg),
            Common::EmptyCsv => PharmacyError::ParseEmpty,
            Common::NoUsableRows => PharmacyError::ParseNoRows,
        }
    }
}

impl From<reqwest::Error> for PharmacyError {
    fn from(err: reqwest::Error) -> Self {
        PharmacyError::Fetch(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PharmacyError>;
