//! Deal scoring output types

use serde::{Deserialize, Serialize};

/// Minimum score for a `Hot` alert
pub const HOT_THRESHOLD: u8 = 85;
/// Minimum score for a `Warm` alert
pub const WARM_THRESHOLD: u8 = 70;
/// Minimum score for a `Good` alert
pub const GOOD_THRESHOLD: u8 = 55;

/// Four-tier label derived from the deal score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Hot,
    Warm,
    Good,
    Normal,
}

impl AlertLevel {
    pub fn from_score(score: u8) -> Self {
        if score >= HOT_THRESHOLD {
            AlertLevel::Hot
        } else if score >= WARM_THRESHOLD {
            AlertLevel::Warm
        } else if score >= GOOD_THRESHOLD {
            AlertLevel::Good
        } else {
            AlertLevel::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Hot => "hot",
            AlertLevel::Warm => "warm",
            AlertLevel::Good => "good",
            AlertLevel::Normal => "normal",
        }
    }
}

/// A scored event with its synthetic discount.
///
/// Recomputed on every request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: String,
    pub event_name: String,
    pub venue: String,
    pub event_date: String,
    pub original_price: u32,
    pub current_price: u32,
    pub savings: u32,
    pub savings_percentage: u32,
    /// 0..=100
    pub deal_score: u8,
    pub alert_level: AlertLevel,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_url: Option<String>,
}
