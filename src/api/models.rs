//! Wire types for the task backend
//!
//! Timestamps stay as the backend's ISO strings: forms send what the user
//! typed (`2025-01-01T00:00`) and tables only format them for display.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Authenticated user as returned by `GET /users/me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub is_verified: bool,
}

/// A news item (RSS entry or Telegram post) as the backend reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct News {
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub pub_date: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// News tasks
// ─────────────────────────────────────────────────────────────────────────────

/// Payload for `POST /news_task/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsTaskCreate {
    pub title: String,
    pub description: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevant_news: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_relevant_news: Option<Vec<String>>,
}

/// A news task as read back from the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsTask {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub positives: Option<Vec<News>>,
    #[serde(default)]
    pub false_positives: Option<Vec<News>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default)]
    pub rss_urls: BTreeMap<String, String>,
    #[serde(default)]
    pub tg_urls: BTreeMap<String, String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Crypto tasks
// ─────────────────────────────────────────────────────────────────────────────

/// What a crypto task measures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CryptoTaskType {
    #[default]
    Price,
    Percent,
}

impl CryptoTaskType {
    pub fn all() -> &'static [CryptoTaskType] {
        &[CryptoTaskType::Price, CryptoTaskType::Percent]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CryptoTaskType::Price => "price",
            CryptoTaskType::Percent => "percent",
        }
    }
}

/// Tickers the create form offers
pub const CRYPTO_TICKERS: &[&str] = &["BTC", "ETH", "SOL", "XRP", "DOGE", "TON"];

/// Payload for `POST /crypto_task/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoTaskCreate {
    pub title: String,
    pub description: String,
    pub end_date: String,
    pub end_point: f64,
    pub measurement_time: String,
    pub ticker: String,
    #[serde(rename = "type")]
    pub task_type: CryptoTaskType,
}

/// A crypto task as read back from the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoTask {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub end_date: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub start_point: Option<f64>,
    pub end_point: f64,
    pub measurement_time: String,
    pub ticker: String,
    #[serde(rename = "type", default)]
    pub task_type: CryptoTaskType,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Prompt configuration (`GET/PUT /prompt/`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: i64,
    pub role: String,
    pub crypto_role: String,
    pub suggest_post: String,
    #[serde(default)]
    pub post_examples: Vec<String>,
}

/// Backend API settings (`GET/PUT /settings/`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default)]
    pub deepseek: Option<String>,
    #[serde(default)]
    pub rss_urls: BTreeMap<String, String>,
    #[serde(default)]
    pub tg_urls: BTreeMap<String, String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Sources
// ─────────────────────────────────────────────────────────────────────────────

/// Which source list an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Telegram,
    Rss,
}

impl SourceType {
    pub fn label(&self) -> &'static str {
        match self {
            SourceType::Telegram => "Telegram",
            SourceType::Rss => "RSS",
        }
    }
}

/// Body of `add_source` / `remove_source`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRequest {
    pub source_url: String,
    pub source_name: String,
    pub source_type: SourceType,
    pub task_id: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// A tracked prediction-market event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub results_at: Option<String>,
    pub ends_at: String,
    #[serde(default)]
    pub rules: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub positives: Vec<serde_json::Value>,
    #[serde(default)]
    pub false_positives: Vec<serde_json::Value>,
}

/// Format a backend timestamp as a date for tables
///
/// Accepts RFC 3339 and the naive `YYYY-MM-DDTHH:MM[:SS]` forms the
/// backend emits; anything else is shown verbatim.
pub fn display_date(raw: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d").to_string();
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, fmt) {
            return dt.format("%Y-%m-%d").to_string();
        }
    }
    raw.to_string()
}
