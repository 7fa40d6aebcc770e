//! Ticketmaster Discovery API client

use crate::config::TicketmasterConfig;
use crate::services::normalizer::ticketmaster_category;
use crate::types::{
    CategoryFilter, DispatchError, EventSource, NormalizedEvent, Result, SearchFilters,
};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{EventProvider, USER_AGENT};

/// Timeout for event searches
const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for single-resource lookups
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_PAGE_SIZE: &str = "50";
const DEFAULT_SORT: &str = "date,asc";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TicketmasterImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TicketmasterStart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TicketmasterDates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<TicketmasterStart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TicketmasterVenue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<NamedRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<NamedRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TicketmasterVenues {
    #[serde(default)]
    pub venues: Vec<TicketmasterVenue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PriceRange {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub range_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<NamedRef>,
}

/// Raw event as returned by the Discovery API
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TicketmasterEvent {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub images: Vec<TicketmasterImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<TicketmasterDates>,
    #[serde(rename = "_embedded", default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<TicketmasterVenues>,
    #[serde(default)]
    pub price_ranges: Vec<PriceRange>,
    #[serde(default)]
    pub classifications: Vec<Classification>,
}

impl TicketmasterEvent {
    pub fn first_venue(&self) -> Option<&TicketmasterVenue> {
        self.embedded.as_ref().and_then(|e| e.venues.first())
    }

    pub fn first_price_range(&self) -> Option<&PriceRange> {
        self.price_ranges.first()
    }

    pub fn local_date(&self) -> Option<&str> {
        self.start().and_then(|s| s.local_date.as_deref())
    }

    pub fn local_time(&self) -> Option<&str> {
        self.start().and_then(|s| s.local_time.as_deref())
    }

    pub fn first_image_url(&self) -> Option<&str> {
        self.images.first().map(|i| i.url.as_str())
    }

    pub fn segment_name(&self) -> Option<&str> {
        self.classifications
            .first()
            .and_then(|c| c.segment.as_ref())
            .map(|s| s.name.as_str())
    }

    fn start(&self) -> Option<&TicketmasterStart> {
        self.dates.as_ref().and_then(|d| d.start.as_ref())
    }

    /// Wrap a normalized event back into the provider shape consumed by
    /// deal scoring.
    pub fn from_normalized(event: &NormalizedEvent) -> Self {
        Self {
            id: event.id.clone(),
            name: event.name.clone(),
            event_type: Some("event".to_string()),
            url: (!event.url.is_empty()).then(|| event.url.clone()),
            images: if event.image.is_empty() {
                Vec::new()
            } else {
                vec![TicketmasterImage {
                    url: event.image.clone(),
                    ratio: None,
                    width: Some(640),
                    height: Some(360),
                }]
            },
            dates: Some(TicketmasterDates {
                start: Some(TicketmasterStart {
                    local_date: Some(event.date.clone()),
                    local_time: Some(event.time.clone()),
                    date_time: None,
                }),
            }),
            embedded: Some(TicketmasterVenues {
                venues: vec![TicketmasterVenue {
                    id: None,
                    name: event.venue.clone(),
                    city: Some(NamedRef {
                        name: event.city.clone(),
                    }),
                    state: None,
                }],
            }),
            price_ranges: vec![PriceRange {
                range_type: Some("standard".to_string()),
                currency: Some(event.currency.clone()),
                min: Some(event.min_price),
                max: Some(event.max_price),
            }],
            classifications: vec![Classification {
                segment: Some(NamedRef {
                    name: event.category.to_string(),
                }),
            }],
        }
    }
}

/// Search response envelope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketmasterResponse {
    #[serde(rename = "_embedded", default)]
    pub embedded: Option<TicketmasterEventList>,
    #[serde(default)]
    pub page: Option<TicketmasterPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketmasterEventList {
    #[serde(default)]
    pub events: Vec<TicketmasterEvent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketmasterPage {
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub total_elements: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub number: u32,
}

#[derive(Debug, Default, Deserialize)]
struct VenueResponse {
    #[serde(rename = "_embedded", default)]
    embedded: Option<TicketmasterVenues>,
}

/// Query options for `/events.json`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSearchParams {
    pub city: Option<String>,
    pub classification_name: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub keyword: Option<String>,
    /// UTC bounds; `from_filters` pads a local date range by a day on each
    /// side and leaves exact trimming to the local date filter
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
    pub size: Option<String>,
    pub sort: Option<String>,
}

impl EventSearchParams {
    /// Translate aggregate search filters into provider query options
    pub fn from_filters(filters: &SearchFilters) -> Self {
        let classification_name = match filters.category() {
            CategoryFilter::Sports => Some("Basketball".to_string()),
            CategoryFilter::Music => Some("Music".to_string()),
            CategoryFilter::Entertainment | CategoryFilter::All => None,
        };

        Self {
            classification_name,
            min_price: filters.effective_min_price().map(|p| p.to_string()),
            max_price: filters.effective_max_price().map(|p| p.to_string()),
            start_date_time: filters.date_range.map(|r| {
                let start = r.start.pred_opt().unwrap_or(r.start);
                format!("{}T00:00:00Z", start.format("%Y-%m-%d"))
            }),
            end_date_time: filters.date_range.map(|r| {
                let end = r.end.succ_opt().unwrap_or(r.end);
                format!("{}T23:59:59Z", end.format("%Y-%m-%d"))
            }),
            ..Default::default()
        }
    }
}

/// Ticketmaster Discovery client
pub struct TicketmasterClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    city: String,
}

impl TicketmasterClient {
    pub fn new(config: &TicketmasterConfig) -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            city: config.city.clone(),
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            DispatchError::Config(
                "Ticketmaster API key is required (set TICKETMASTER_KEY)".into(),
            )
        })
    }

    /// Build the query string for an event search
    pub fn search_query(&self, api_key: &str, params: &EventSearchParams) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("apikey", api_key.to_string()),
            (
                "city",
                params.city.clone().unwrap_or_else(|| self.city.clone()),
            ),
            ("countryCode", "US".to_string()),
            (
                "size",
                params
                    .size
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PAGE_SIZE.to_string()),
            ),
            (
                "sort",
                params.sort.clone().unwrap_or_else(|| DEFAULT_SORT.to_string()),
            ),
        ];

        let optional = [
            ("classificationName", &params.classification_name),
            ("priceMin", &params.min_price),
            ("priceMax", &params.max_price),
            ("keyword", &params.keyword),
            ("startDateTime", &params.start_date_time),
            ("endDateTime", &params.end_date_time),
        ];
        for (key, value) in optional {
            if let Some(v) = value {
                query.push((key, v.clone()));
            }
        }

        query
    }

    /// Search `/events.json`
    pub async fn search_events(&self, params: &EventSearchParams) -> Result<Vec<TicketmasterEvent>> {
        let api_key = self.api_key()?;
        let url = format!("{}/events.json", self.base_url);
        tracing::debug!(%url, classification = ?params.classification_name, "fetching Ticketmaster events");

        let response = self
            .http
            .get(&url)
            .query(&self.search_query(api_key, params))
            .header(ACCEPT, "application/json")
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let body: TicketmasterResponse = response.json().await?;
        let events = body.embedded.map(|e| e.events).unwrap_or_default();
        tracing::info!(count = events.len(), "fetched events from Ticketmaster");
        Ok(events)
    }

    /// Trail Blazers home games
    pub async fn get_blazers_events(&self) -> Result<Vec<TicketmasterEvent>> {
        self.search_events(&EventSearchParams {
            classification_name: Some("Basketball".into()),
            keyword: Some("Trail Blazers".into()),
            ..Default::default()
        })
        .await
    }

    /// Everything in the configured city
    pub async fn get_portland_events(&self) -> Result<Vec<TicketmasterEvent>> {
        self.search_events(&EventSearchParams::default()).await
    }

    /// Fetch a single event; `None` when the provider reports 404
    pub async fn get_event_by_id(&self, event_id: &str) -> Result<Option<TicketmasterEvent>> {
        let api_key = self.api_key()?;
        let url = format!("{}/events/{}.json", self.base_url, event_id);

        let response = self
            .http
            .get(&url)
            .query(&[("apikey", api_key)])
            .header(ACCEPT, "application/json")
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let event = response.error_for_status()?.json().await?;
        Ok(Some(event))
    }

    /// Venues in `city`
    pub async fn get_venues(&self, city: &str) -> Result<Vec<TicketmasterVenue>> {
        let api_key = self.api_key()?;
        let url = format!("{}/venues.json", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("apikey", api_key),
                ("city", city),
                ("countryCode", "US"),
                ("size", DEFAULT_PAGE_SIZE),
            ])
            .header(ACCEPT, "application/json")
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let body: VenueResponse = response.json().await?;
        Ok(body.embedded.map(|e| e.venues).unwrap_or_default())
    }
}

/// Map a Discovery API event into the common shape
pub fn normalize_event(event: &TicketmasterEvent) -> NormalizedEvent {
    let venue = event.first_venue();
    let price = event.first_price_range();
    let min_price = price.and_then(|p| p.min).unwrap_or(0.0);

    NormalizedEvent {
        id: format!("tm_{}", event.id),
        name: event.name.clone(),
        venue: venue
            .map(|v| v.name.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Unknown Venue".to_string()),
        city: venue
            .and_then(|v| v.city.as_ref())
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "Portland".to_string()),
        date: event
            .local_date()
            .filter(|d| !d.is_empty())
            .unwrap_or("TBD")
            .to_string(),
        time: event.local_time().unwrap_or_default().to_string(),
        url: event.url.clone().unwrap_or_default(),
        image: event.first_image_url().unwrap_or_default().to_string(),
        min_price,
        max_price: price.and_then(|p| p.max).unwrap_or(0.0),
        currency: price
            .and_then(|p| p.currency.clone())
            .unwrap_or_else(|| "USD".to_string()),
        category: ticketmaster_category(event.segment_name()),
        source: EventSource::Ticketmaster,
        is_free: min_price == 0.0,
        description: None,
        deal_score: None,
        savings: None,
        original_price: None,
    }
}

#[async_trait]
impl EventProvider for TicketmasterClient {
    fn source(&self) -> EventSource {
        EventSource::Ticketmaster
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_events(&self, filters: &SearchFilters) -> Result<Vec<NormalizedEvent>> {
        if !self.is_configured() {
            tracing::warn!("Ticketmaster API key missing, skipping source");
            return Ok(Vec::new());
        }

        let events = self
            .search_events(&EventSearchParams::from_filters(filters))
            .await?;
        Ok(events.iter().map(normalize_event).collect())
    }
}
