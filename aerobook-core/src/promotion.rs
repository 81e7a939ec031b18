use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_BG_COLOR: &str = "from-blue-400 to-blue-600";

/// A promotional banner shown to customers. Has no effect on booking prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub discount: String,
    pub valid_until: DateTime<Utc>,
    pub bg_color: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Create/update payload. On update, absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub discount: Option<String>,
    pub valid_until: Option<DateTime<Utc>>,
    pub bg_color: Option<String>,
    pub is_active: Option<bool>,
}
