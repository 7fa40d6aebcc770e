//! Services for event aggregation and deal scoring

pub mod aggregator;
pub mod deal_scoring;
pub mod normalizer;

pub use aggregator::EventAggregationService;
pub use deal_scoring::DealScoringService;
pub use normalizer::{dedup_key, eventbrite_category, ticketmaster_category};
