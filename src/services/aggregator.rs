//! Event aggregation across ticket providers
//!
//! Fans out to every selected provider at once, tolerates individual
//! failures, then deduplicates, filters, scores and sorts the merged list.

use crate::config::AppConfig;
use crate::providers::{EventProvider, ProviderRegistry, TicketmasterEvent};
use crate::services::normalizer::dedup_key;
use crate::services::DealScoringService;
use crate::types::{NormalizedEvent, Result, SearchFilters};
use futures::future::join_all;
use std::collections::HashSet;

/// Events scoring above this are "hot deals"
pub const HOT_DEAL_SCORE: u8 = 70;
pub const DEFAULT_HOT_DEALS_LIMIT: usize = 10;
pub const DEFAULT_FREE_EVENTS_LIMIT: usize = 20;

/// Aggregates provider events into one scored, sorted list
pub struct EventAggregationService {
    registry: ProviderRegistry,
    scorer: DealScoringService,
}

impl EventAggregationService {
    pub fn new(registry: ProviderRegistry, scorer: DealScoringService) -> Self {
        Self { registry, scorer }
    }

    /// Build providers and scorer from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let scorer = match config.deal_seed {
            Some(seed) => DealScoringService::seeded(seed),
            None => DealScoringService::from_entropy(),
        };
        Ok(Self::new(ProviderRegistry::from_config(config)?, scorer))
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Search every selected provider and return scored events, best first.
    ///
    /// Never fails: a provider error is logged and contributes no events.
    pub async fn search_all_events(&self, filters: &SearchFilters) -> Vec<NormalizedEvent> {
        let all_events = self.fetch_all(filters).await;

        let unique = Self::remove_duplicates(all_events);
        let filtered = Self::apply_filters(unique, filters);
        let mut scored = self.score_events(filtered);

        // Stable: ties keep provider order
        scored.sort_by(|a, b| b.deal_score.cmp(&a.deal_score));
        tracing::info!(count = scored.len(), "aggregated events");
        scored
    }

    /// Concurrent fan-out with per-provider failure isolation
    async fn fetch_all(&self, filters: &SearchFilters) -> Vec<NormalizedEvent> {
        let selected: Vec<&dyn EventProvider> = self
            .registry
            .providers()
            .iter()
            .map(|p| p.as_ref())
            .filter(|p| filters.wants_source(p.source()))
            .collect();

        let results = join_all(selected.iter().map(|p| p.fetch_events(filters))).await;

        let mut all_events = Vec::new();
        for (provider, result) in selected.iter().zip(results) {
            match result {
                Ok(events) => {
                    tracing::debug!(source = %provider.source(), count = events.len(), "provider returned events");
                    all_events.extend(events);
                }
                Err(e) => {
                    tracing::error!(source = %provider.source(), error = %e, "failed to fetch events");
                }
            }
        }
        all_events
    }

    /// Drop events whose name, date and venue match an earlier one
    pub fn remove_duplicates(events: Vec<NormalizedEvent>) -> Vec<NormalizedEvent> {
        let mut seen: HashSet<String> = HashSet::with_capacity(events.len());
        events
            .into_iter()
            .filter(|event| seen.insert(dedup_key(event)))
            .collect()
    }

    /// Keep events passing every filter
    pub fn apply_filters(events: Vec<NormalizedEvent>, filters: &SearchFilters) -> Vec<NormalizedEvent> {
        events
            .into_iter()
            .filter(|event| Self::matches_filters(event, filters))
            .collect()
    }

    pub fn matches_filters(event: &NormalizedEvent, filters: &SearchFilters) -> bool {
        if let Some(max) = filters.effective_max_price() {
            if event.max_price > max {
                return false;
            }
        }

        if let Some(min) = filters.effective_min_price() {
            if event.min_price < min {
                return false;
            }
        }

        if let Some(venue) = filters.venue.as_deref().filter(|v| !v.is_empty()) {
            if !event.venue.to_lowercase().contains(&venue.to_lowercase()) {
                return false;
            }
        }

        // Events without a parseable date (e.g. TBD) are kept
        if let (Some(range), Some(date)) = (filters.date_range, event.parsed_date()) {
            if !range.contains(date) {
                return false;
            }
        }

        if filters.include_free_events == Some(false) && event.is_free {
            return false;
        }

        true
    }

    /// Attach deal score, savings and synthetic original price
    fn score_events(&self, events: Vec<NormalizedEvent>) -> Vec<NormalizedEvent> {
        events
            .into_iter()
            .map(|mut event| {
                let deal = self
                    .scorer
                    .score_event(&TicketmasterEvent::from_normalized(&event));
                event.deal_score = Some(deal.deal_score);
                event.savings = Some(deal.savings);
                event.original_price = Some(deal.original_price);
                event
            })
            .collect()
    }

    /// Highest-scoring events above [`HOT_DEAL_SCORE`]
    pub async fn get_hot_deals(&self, limit: usize) -> Vec<NormalizedEvent> {
        self.search_all_events(&SearchFilters::default())
            .await
            .into_iter()
            .filter(|e| e.deal_score.unwrap_or(0) > HOT_DEAL_SCORE)
            .take(limit)
            .collect()
    }

    /// Free events, best score first
    pub async fn get_free_events(&self, limit: usize) -> Vec<NormalizedEvent> {
        let filters = SearchFilters {
            include_free_events: Some(true),
            ..Default::default()
        };
        self.search_all_events(&filters)
            .await
            .into_iter()
            .filter(|e| e.is_free)
            .take(limit)
            .collect()
    }

    /// Events whose name, venue or description contains `query`
    pub async fn search_by_name(&self, query: &str) -> Vec<NormalizedEvent> {
        self.search_all_events(&SearchFilters::default())
            .await
            .into_iter()
            .filter(|e| e.matches_text(query))
            .collect()
    }
}
