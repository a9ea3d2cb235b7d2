//! # Finance Recommender
//!
//! A pipeline that turns per-user transaction histories and product catalogs
//! (coupons, loans, credit cards, savings accounts) into one JSON report per
//! user: ranked product recommendations per category, a monthly spending
//! summary per month of history, dominant behavioral tags, and five
//! personalized email subject lines.
//!
//! ## Core Concepts
//!
//! - **Preprocessing**: raw feed rows are normalized (dates parsed, month
//!   buckets derived, payload fields selected); rows with unparseable dates
//!   are dropped and counted, never raised.
//! - **Advisory schemas**: every model call asks for a specific JSON shape,
//!   but the service enforces nothing. Callers decode the raw text and fall
//!   back to documented defaults on any failure — degraded mode is a normal
//!   path, not an error.
//! - **Isolated category requests**: the four recommendation categories are
//!   requested concurrently, each behind its own deadline, so one category's
//!   failure never blocks another's.
//! - **Deterministic assembly**: the final report is a pure function of its
//!   inputs; assembling twice yields byte-identical output.
//!
//! ## Example
//!
//! ```rust,ignore
//! use finance_recommender::*;
//! use std::time::Duration;
//!
//! let config = PipelineConfig::from_env()?;
//! let client = GeminiClient::new(config.api_key.clone(), config.model.clone());
//!
//! let store = LocalTableStore::new(&config.data_root);
//! let loader = DataLoader::new(&store, &config.data_bucket);
//! let catalog = loader.load_catalog()?;
//! let reports = FileReportStore::new(&config.output_dir);
//!
//! let pipeline = RecommendationPipeline::new(&client, config.request_timeout);
//! for user_id in loader.user_ids()? {
//!     let user = loader.find_user(&user_id)?;
//!     let rows = loader.load_user_transactions(&user_id);
//!     let owned = loader.load_user_cards(&user_id);
//!     let report = pipeline.run_user(&user, &rows, &catalog, &owned).await;
//!     reports.put_report(&user_id, &report)?;
//! }
//! ```

pub mod assembler;
pub mod config;
pub mod defaults;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod preprocess;
pub mod profile;
pub mod schema;
pub mod storage;

pub use assembler::{
    bare_recommendations, build_final_report, dominant_tags, resolve_recommendations,
};
pub use config::PipelineConfig;
pub use error::{RecommenderError, Result};
pub use llm::{GeminiClient, TextGenerator};
pub use pipeline::RecommendationPipeline;
pub use preprocess::*;
pub use profile::*;
pub use schema::*;
pub use storage::*;
