//! Process-wide configuration, established once at startup from the
//! environment. A missing API key is the one fatal configuration condition;
//! everything else has a workable default.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{RecommenderError, Result};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "RECOMMENDER_MODEL";
pub const DATA_ROOT_ENV: &str = "RECOMMENDER_DATA_ROOT";
pub const DATA_BUCKET_ENV: &str = "RECOMMENDER_DATA_BUCKET";
pub const OUTPUT_DIR_ENV: &str = "RECOMMENDER_OUTPUT_DIR";
pub const REQUEST_TIMEOUT_ENV: &str = "RECOMMENDER_REQUEST_TIMEOUT_SECS";
pub const KV_TABLE_ENV: &str = "RECOMMENDER_KV_TABLE";

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_DATA_BUCKET: &str = "finance-dump";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_KV_TABLE: &str = "UserRecommendations";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub api_key: String,
    pub model: String,
    /// Directory the table store resolves bucket/key pairs against.
    pub data_root: PathBuf,
    pub data_bucket: String,
    pub output_dir: PathBuf,
    pub kv_table: String,
    /// Per-call budget for each external generation request.
    pub request_timeout: Duration,
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            RecommenderError::MissingConfig(format!("{} environment variable not set", API_KEY_ENV))
        })?;
        if api_key.is_empty() {
            return Err(RecommenderError::MissingConfig(format!(
                "{} environment variable is empty",
                API_KEY_ENV
            )));
        }

        let model = std::env::var(MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let data_root = std::env::var(DATA_ROOT_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        let data_bucket =
            std::env::var(DATA_BUCKET_ENV).unwrap_or_else(|_| DEFAULT_DATA_BUCKET.to_string());
        let output_dir = std::env::var(OUTPUT_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let kv_table =
            std::env::var(KV_TABLE_ENV).unwrap_or_else(|_| DEFAULT_KV_TABLE.to_string());
        let timeout_secs = std::env::var(REQUEST_TIMEOUT_ENV)
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Ok(Self {
            api_key,
            model,
            data_root,
            data_bucket,
            output_dir,
            kv_table,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
