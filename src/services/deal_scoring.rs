//! Deal scoring service
//!
//! Providers expose no price history, so each listing gets a synthetic
//! "original" and "current" price drawn around its lowest listed price.
//! The score is a fixed-weight blend of the synthetic savings, the
//! absolute price, a keyword popularity bonus and a flat time factor.
//!
//! The random source is owned by the service and can be seeded, which
//! makes scoring reproducible in tests and when `RIPCITY_DEAL_SEED` is set.

use crate::providers::TicketmasterEvent;
use crate::types::{AlertLevel, Deal};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// Price assumed when the event carries no usable price range
pub const DEFAULT_MIN_PRICE: f64 = 50.0;
pub const DEFAULT_MAX_PRICE: f64 = 150.0;

/// Current price is drawn from `min * [0.7, 1.3)`
const CURRENT_PRICE_FACTOR: (f64, f64) = (0.7, 1.3);
/// Original price is drawn from `current * [1.1, 1.6)`
const ORIGINAL_PRICE_FACTOR: (f64, f64) = (1.1, 1.6);

// Score components are summed in tenths of a point so rounding is exact.
/// 0.8 points per savings percent, capped at 40
const SAVINGS_WEIGHT_TENTHS: u32 = 8;
const SAVINGS_CAP_TENTHS: u32 = 400;
/// 30 points minus 0.1 per dollar of current price, floored at 0
const PRICE_POINT_MAX_TENTHS: u32 = 300;
const TIME_FACTOR_TENTHS: u32 = 100;

/// Name keyword → popularity bonus points (first match wins)
const POPULARITY_BONUSES: &[(&str, u32)] = &[
    ("trail blazers", 20),
    ("blazers", 20),
    ("timbers", 15),
];
const DEFAULT_POPULARITY_BONUS: u32 = 10;

/// Name keyword → deal category (first match wins)
const DEAL_CATEGORIES: &[(&str, &str)] = &[
    ("trail blazers", "basketball"),
    ("blazers", "basketball"),
    ("timbers", "soccer"),
    ("winterhawks", "hockey"),
    ("concert", "music"),
    ("music", "music"),
    ("comedy", "comedy"),
    ("theater", "theater"),
    ("broadway", "theater"),
];

const DEFAULT_EVENT_DATE: &str = "2025-01-01";

/// Scores provider events into [`Deal`]s
pub struct DealScoringService {
    rng: Mutex<StdRng>,
}

impl DealScoringService {
    /// Reproducible scorer
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Scorer seeded from the OS
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Score every event, preserving input order
    pub fn score_deals(&self, events: &[TicketmasterEvent]) -> Vec<Deal> {
        events.iter().map(|e| self.score_event(e)).collect()
    }

    pub fn score_event(&self, event: &TicketmasterEvent) -> Deal {
        let (min_price, _) = price_bounds(event);
        let (current_price, original_price) = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            synthesize_prices(&mut *rng, min_price)
        };

        let savings = original_price.saturating_sub(current_price);
        let savings_percentage = if original_price == 0 {
            0
        } else {
            (savings as f64 / original_price as f64 * 100.0).round() as u32
        };

        let deal_score = compute_score(savings_percentage, current_price, &event.name);

        Deal {
            id: format!("deal_{}", event.id),
            event_name: event.name.clone(),
            venue: event
                .first_venue()
                .map(|v| v.name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "TBD".to_string()),
            event_date: event.local_date().unwrap_or(DEFAULT_EVENT_DATE).to_string(),
            original_price,
            current_price,
            savings,
            savings_percentage,
            deal_score,
            alert_level: AlertLevel::from_score(deal_score),
            category: categorize_event(&event.name).to_string(),
            image_url: event.first_image_url().map(String::from),
            ticket_url: event.url.clone(),
        }
    }
}

impl Default for DealScoringService {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// `priceRanges[0]` bounds, substituting defaults for missing or
/// non-positive values
pub fn price_bounds(event: &TicketmasterEvent) -> (f64, f64) {
    let range = event.first_price_range();
    let min = range
        .and_then(|r| r.min)
        .filter(|p| *p > 0.0)
        .unwrap_or(DEFAULT_MIN_PRICE);
    let max = range
        .and_then(|r| r.max)
        .filter(|p| *p > 0.0)
        .unwrap_or(DEFAULT_MAX_PRICE);
    (min, max)
}

/// Draw `(current, original)` prices around `min_price`
pub fn synthesize_prices<R: Rng>(rng: &mut R, min_price: f64) -> (u32, u32) {
    let current = (min_price * rng.random_range(CURRENT_PRICE_FACTOR.0..CURRENT_PRICE_FACTOR.1))
        .round()
        .max(0.0) as u32;
    let original = (current as f64
        * rng.random_range(ORIGINAL_PRICE_FACTOR.0..ORIGINAL_PRICE_FACTOR.1))
    .round() as u32;
    (current, original)
}

/// Weighted 0..=100 score
pub fn compute_score(savings_percentage: u32, current_price: u32, event_name: &str) -> u8 {
    let savings = savings_percentage
        .saturating_mul(SAVINGS_WEIGHT_TENTHS)
        .min(SAVINGS_CAP_TENTHS);
    let price = PRICE_POINT_MAX_TENTHS.saturating_sub(current_price);
    let total = savings + price + popularity_bonus(event_name) * 10 + TIME_FACTOR_TENTHS;
    // round half up, then clamp
    ((total + 5) / 10).min(100) as u8
}

/// Popularity bonus in whole points
pub fn popularity_bonus(event_name: &str) -> u32 {
    let name = event_name.to_lowercase();
    POPULARITY_BONUSES
        .iter()
        .find(|(keyword, _)| name.contains(keyword))
        .map_or(DEFAULT_POPULARITY_BONUS, |(_, bonus)| *bonus)
}

/// Coarse category from keywords in the event name
pub fn categorize_event(event_name: &str) -> &'static str {
    let name = event_name.to_lowercase();
    DEAL_CATEGORIES
        .iter()
        .find(|(keyword, _)| name.contains(keyword))
        .map_or("other", |(_, category)| *category)
}
