//! Provider trait and HTTP clients for upstream ticket APIs

pub mod eventbrite;
pub mod ticketmaster;

pub use eventbrite::{
    EventbriteClient, EventbriteEvent, EventbriteResponse, EventbriteSearchParams, PriceFilter,
};
pub use ticketmaster::{
    EventSearchParams, TicketmasterClient, TicketmasterEvent, TicketmasterResponse,
    TicketmasterVenue,
};

use crate::config::AppConfig;
use crate::types::{EventSource, NormalizedEvent, Result, SearchFilters};
use async_trait::async_trait;

/// User agent sent to every provider
pub const USER_AGENT: &str = "RipCityTicketDispatch/1.0";

/// A ticket provider that can be searched and normalized
#[async_trait]
pub trait EventProvider: Send + Sync {
    /// Which provider this is
    fn source(&self) -> EventSource;

    /// Whether credentials are present; unconfigured providers yield nothing
    fn is_configured(&self) -> bool;

    /// Search the provider and map results into [`NormalizedEvent`]s
    async fn fetch_events(&self, filters: &SearchFilters) -> Result<Vec<NormalizedEvent>>;
}

/// Registry of available providers
pub struct ProviderRegistry {
    providers: Vec<Box<dyn EventProvider>>,
}

impl ProviderRegistry {
    /// Create a registry with the Ticketmaster and Eventbrite clients
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            providers: vec![
                Box::new(TicketmasterClient::new(&config.ticketmaster)?),
                Box::new(EventbriteClient::new(&config.eventbrite)?),
            ],
        })
    }

    /// Create a registry from explicit providers
    pub fn with_providers(providers: Vec<Box<dyn EventProvider>>) -> Self {
        Self { providers }
    }

    /// Get all registered providers
    pub fn providers(&self) -> &[Box<dyn EventProvider>] {
        &self.providers
    }

    /// Find a provider by source
    pub fn get(&self, source: EventSource) -> Option<&dyn EventProvider> {
        self.providers
            .iter()
            .find(|p| p.source() == source)
            .map(|p| p.as_ref())
    }
}
