//! Eventbrite Search API client

use crate::config::EventbriteConfig;
use crate::services::normalizer::eventbrite_category;
use crate::types::{
    CategoryFilter, DispatchError, EventSource, NormalizedEvent, Result, SearchFilters,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{EventProvider, USER_AGENT};

/// Timeout for event searches
const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for single-event lookups
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default search window
const LOOKAHEAD_DAYS: i64 = 90;

const DEFAULT_EXPAND: &str = "venue,ticket_classes,organizer";

/// Eventbrite category ids used by the search helpers
const SPORTS_CATEGORY: &str = "108";
const MUSIC_CATEGORY: &str = "103";
const ENTERTAINMENT_CATEGORY: &str = "105";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventbriteText {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventbriteDateTime {
    #[serde(default)]
    pub timezone: Option<String>,
    pub local: String,
    #[serde(default)]
    pub utc: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventbriteImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventbriteLogo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub original: Option<EventbriteImage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventbriteAddress {
    #[serde(default)]
    pub address_1: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventbriteVenue {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<EventbriteAddress>,
}

/// Money amount in minor units (cents)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventbriteCost {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub display: Option<String>,
    pub value: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TicketClass {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cost: Option<EventbriteCost>,
    #[serde(default)]
    pub quantity_sold: u32,
}

impl TicketClass {
    /// Ticket price in major units; free classes carry no cost
    pub fn price(&self) -> f64 {
        self.cost.as_ref().map_or(0.0, |c| c.value as f64 / 100.0)
    }
}

/// Raw event as returned by the Search API (only the fields we read)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventbriteEvent {
    pub id: String,
    pub name: EventbriteText,
    #[serde(default)]
    pub description: Option<EventbriteText>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub start: Option<EventbriteDateTime>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub organizer_id: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub logo: Option<EventbriteLogo>,
    #[serde(default)]
    pub venue: Option<EventbriteVenue>,
    #[serde(default)]
    pub ticket_classes: Vec<TicketClass>,
}

impl EventbriteEvent {
    /// Lowest and highest ticket price; `(0, 0)` without ticket classes
    pub fn price_bounds(&self) -> (f64, f64) {
        let prices = self.ticket_classes.iter().map(TicketClass::price);
        let min = prices.clone().reduce(f64::min).unwrap_or(0.0);
        let max = prices.reduce(f64::max).unwrap_or(0.0);
        (min, max)
    }

    /// Split `start.local` (`YYYY-MM-DDTHH:MM:SS`) into date and `HH:MM`
    pub fn local_date_time(&self) -> (String, String) {
        let Some(start) = &self.start else {
            return ("TBD".to_string(), String::new());
        };
        let mut parts = start.local.splitn(2, 'T');
        let date = parts
            .next()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or("TBD")
            .to_string();
        let time = parts
            .next()
            .map(|t| t.chars().take(5).collect::<String>())
            .unwrap_or_default();
        (date, time)
    }

    pub fn tickets_sold(&self) -> u32 {
        self.ticket_classes
            .iter()
            .fold(0u32, |sum, tc| sum.saturating_add(tc.quantity_sold))
    }
}

/// Search response envelope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventbriteResponse {
    #[serde(default)]
    pub events: Vec<EventbriteEvent>,
}

impl EventbriteResponse {
    /// Parse a raw search body
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| DispatchError::Parse(e.to_string()))
    }
}

/// `price` query value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceFilter {
    Free,
    Paid,
}

impl PriceFilter {
    fn as_str(&self) -> &'static str {
        match self {
            PriceFilter::Free => "free",
            PriceFilter::Paid => "paid",
        }
    }
}

/// Query options for `/events/search/`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventbriteSearchParams {
    pub location: Option<String>,
    pub location_within: Option<String>,
    pub categories: Option<String>,
    pub price: Option<PriceFilter>,
    pub name_filter: Option<String>,
    pub start_date_range_start: Option<String>,
    pub start_date_range_end: Option<String>,
    pub page: Option<u32>,
    pub sort_by: Option<String>,
    pub expand: Option<String>,
}

/// Eventbrite Search client
pub struct EventbriteClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    location: String,
    within: String,
}

impl EventbriteClient {
    pub fn new(config: &EventbriteConfig) -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            location: config.location.clone(),
            within: config.within.clone(),
        })
    }

    /// Build the query string for a search starting at `now`
    pub fn search_query(
        &self,
        params: &EventbriteSearchParams,
        now: DateTime<Utc>,
    ) -> Vec<(&'static str, String)> {
        let range_start = params
            .start_date_range_start
            .clone()
            .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Secs, true));
        let range_end = params.start_date_range_end.clone().unwrap_or_else(|| {
            (now + ChronoDuration::days(LOOKAHEAD_DAYS)).to_rfc3339_opts(SecondsFormat::Secs, true)
        });

        let mut query = vec![
            (
                "location.address",
                params.location.clone().unwrap_or_else(|| self.location.clone()),
            ),
            (
                "location.within",
                params
                    .location_within
                    .clone()
                    .unwrap_or_else(|| self.within.clone()),
            ),
            ("start_date.range_start", range_start),
            ("start_date.range_end", range_end),
            (
                "sort_by",
                params.sort_by.clone().unwrap_or_else(|| "date".to_string()),
            ),
            ("page", params.page.unwrap_or(1).to_string()),
            (
                "expand",
                params
                    .expand
                    .clone()
                    .unwrap_or_else(|| DEFAULT_EXPAND.to_string()),
            ),
        ];

        if let Some(categories) = &params.categories {
            query.push(("categories", categories.clone()));
        }
        if let Some(price) = params.price {
            query.push(("price", price.as_str().to_string()));
        }
        if let Some(name) = &params.name_filter {
            query.push(("q", name.clone()));
        }

        query
    }

    /// Search `/events/search/`; returns nothing when no key is configured
    pub async fn search_events(&self, params: &EventbriteSearchParams) -> Result<Vec<EventbriteEvent>> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("Eventbrite API key missing, returning no events");
            return Ok(Vec::new());
        };

        let url = format!("{}/events/search/", self.base_url);
        tracing::debug!(
            location = params.location.as_deref().unwrap_or(&self.location),
            categories = ?params.categories,
            "fetching Eventbrite events"
        );

        let response = self
            .http
            .get(&url)
            .query(&self.search_query(params, Utc::now()))
            .bearer_auth(api_key)
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let body: EventbriteResponse = response.json().await?;
        tracing::info!(count = body.events.len(), "fetched events from Eventbrite");
        Ok(body.events)
    }

    fn category_search(category: &str) -> EventbriteSearchParams {
        EventbriteSearchParams {
            categories: Some(category.to_string()),
            ..Default::default()
        }
    }

    pub async fn get_portland_sports_events(&self) -> Result<Vec<EventbriteEvent>> {
        self.search_events(&Self::category_search(SPORTS_CATEGORY))
            .await
    }

    pub async fn get_portland_music_events(&self) -> Result<Vec<EventbriteEvent>> {
        self.search_events(&Self::category_search(MUSIC_CATEGORY))
            .await
    }

    pub async fn get_portland_entertainment_events(&self) -> Result<Vec<EventbriteEvent>> {
        self.search_events(&Self::category_search(ENTERTAINMENT_CATEGORY))
            .await
    }

    pub async fn get_portland_events(&self) -> Result<Vec<EventbriteEvent>> {
        self.search_events(&EventbriteSearchParams::default()).await
    }

    pub async fn get_free_events(&self) -> Result<Vec<EventbriteEvent>> {
        self.search_events(&EventbriteSearchParams {
            price: Some(PriceFilter::Free),
            ..Default::default()
        })
        .await
    }

    /// Event details by id; failures are logged and reported as `None`
    pub async fn get_event_details(&self, event_id: &str) -> Option<EventbriteEvent> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("Eventbrite API key not available");
            return None;
        };

        match self.fetch_event(api_key, event_id).await {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::error!(event_id, error = %e, "failed to fetch Eventbrite event");
                None
            }
        }
    }

    async fn fetch_event(&self, api_key: &str, event_id: &str) -> Result<EventbriteEvent> {
        let url = format!("{}/events/{}/", self.base_url, event_id);
        let event = self
            .http
            .get(&url)
            .query(&[("expand", DEFAULT_EXPAND)])
            .bearer_auth(api_key)
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(event)
    }
}

/// Map a Search API event into the common shape
pub fn normalize_event(event: &EventbriteEvent) -> NormalizedEvent {
    let (min_price, max_price) = event.price_bounds();
    let (date, time) = event.local_date_time();
    let venue = event.venue.as_ref();

    let description = event
        .description
        .as_ref()
        .and_then(|d| d.text.clone())
        .filter(|t| !t.is_empty())
        .or_else(|| event.summary.clone())
        .unwrap_or_default();

    NormalizedEvent {
        id: format!("eb_{}", event.id),
        name: event.name.text.clone().unwrap_or_default(),
        venue: venue
            .and_then(|v| v.name.clone())
            .unwrap_or_else(|| "Online Event".to_string()),
        city: venue
            .and_then(|v| v.address.as_ref())
            .and_then(|a| a.city.clone())
            .unwrap_or_else(|| "Portland".to_string()),
        date,
        time,
        url: event.url.clone(),
        image: event
            .logo
            .as_ref()
            .and_then(|l| l.original.as_ref())
            .map(|o| o.url.clone())
            .unwrap_or_default(),
        min_price,
        max_price: if max_price == 0.0 { min_price } else { max_price },
        currency: event.currency.clone().unwrap_or_else(|| "USD".to_string()),
        category: eventbrite_category(event.category_id.as_deref()),
        source: EventSource::Eventbrite,
        is_free: event.is_free,
        description: Some(description),
        deal_score: None,
        savings: None,
        original_price: None,
    }
}

#[async_trait]
impl EventProvider for EventbriteClient {
    fn source(&self) -> EventSource {
        EventSource::Eventbrite
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_events(&self, filters: &SearchFilters) -> Result<Vec<NormalizedEvent>> {
        let events = match filters.category() {
            CategoryFilter::Sports => self.get_portland_sports_events().await?,
            CategoryFilter::Music => self.get_portland_music_events().await?,
            CategoryFilter::Entertainment => self.get_portland_entertainment_events().await?,
            CategoryFilter::All => self.get_portland_events().await?,
        };
        Ok(events.iter().map(normalize_event).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::types::EventCategory;
    use chrono::TimeZone;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FIXTURE: &str = include_str!("../../tests/fixtures/eventbrite-events.json");

    fn fixture_events() -> Vec<EventbriteEvent> {
        EventbriteResponse::parse(FIXTURE).unwrap().events
    }

    fn make_client(api_key: Option<&str>) -> EventbriteClient {
        let mut config = AppConfig::default().eventbrite;
        config.api_key = api_key.map(String::from);
        EventbriteClient::new(&config).unwrap()
    }

    // ========== Payload parsing ==========

    #[test]
    fn test_parse_search_response() {
        let events = fixture_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].ticket_classes.len(), 2);
        assert_eq!(events[0].tickets_sold(), 128);
    }

    #[test]
    fn test_parse_invalid_body() {
        let err = EventbriteResponse::parse("<html>").unwrap_err();
        assert!(matches!(err, DispatchError::Parse(_)));
    }

    #[test]
    fn test_price_bounds_convert_from_cents() {
        let events = fixture_events();
        let (min, max) = events[0].price_bounds();
        assert!((min - 45.0).abs() < f64::EPSILON);
        assert!((max - 120.0).abs() < f64::EPSILON);
        assert_eq!(events[1].price_bounds(), (0.0, 0.0));
    }

    #[test]
    fn test_local_date_time_split() {
        let events = fixture_events();
        assert_eq!(
            events[0].local_date_time(),
            ("2025-01-20".to_string(), "20:00".to_string())
        );

        let no_start = EventbriteEvent::default();
        assert_eq!(no_start.local_date_time(), ("TBD".to_string(), String::new()));
    }

    #[test]
    fn test_blank_start_local_is_tbd() {
        let blank = EventbriteEvent {
            start: Some(EventbriteDateTime::default()),
            ..Default::default()
        };
        assert_eq!(blank.local_date_time(), ("TBD".to_string(), String::new()));

        let event = normalize_event(&blank);
        assert_eq!(event.date, "TBD");
        assert!(event.parsed_date().is_none());
    }

    // ========== normalize_event ==========

    #[test]
    fn test_normalize_paid_event() {
        let event = normalize_event(&fixture_events()[0]);

        assert_eq!(event.id, "eb_801234567");
        assert_eq!(event.name, "Indie Rock Festival");
        assert_eq!(event.venue, "Crystal Ballroom");
        assert_eq!(event.city, "Portland");
        assert_eq!(event.date, "2025-01-20");
        assert_eq!(event.time, "20:00");
        assert_eq!(event.image, "https://img.evbuc.com/indie.jpg");
        assert!((event.min_price - 45.0).abs() < f64::EPSILON);
        assert!((event.max_price - 120.0).abs() < f64::EPSILON);
        assert_eq!(event.category, EventCategory::Music);
        assert_eq!(event.source, EventSource::Eventbrite);
        assert!(!event.is_free);
        assert_eq!(
            event.description.as_deref(),
            Some("Three stages of local indie bands")
        );
    }

    #[test]
    fn test_normalize_free_event_defaults() {
        let event = normalize_event(&fixture_events()[1]);

        assert_eq!(event.venue, "Online Event");
        assert_eq!(event.city, "Portland");
        assert_eq!(event.currency, "USD");
        assert_eq!(event.category, EventCategory::Sports);
        assert!(event.is_free);
        assert_eq!(event.description.as_deref(), Some("Free community 5k"));
    }

    #[test]
    fn test_max_price_falls_back_to_min() {
        let mut raw = fixture_events()[0].clone();
        raw.ticket_classes.truncate(1);
        let event = normalize_event(&raw);
        assert!((event.max_price - 45.0).abs() < f64::EPSILON);
    }

    // ========== Query building ==========

    #[test]
    fn test_search_query_defaults() {
        let client = make_client(Some("token"));
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let query = client.search_query(&EventbriteSearchParams::default(), now);

        assert_eq!(
            query,
            vec![
                ("location.address", "Portland, OR".to_string()),
                ("location.within", "25mi".to_string()),
                ("start_date.range_start", "2025-01-01T12:00:00Z".to_string()),
                ("start_date.range_end", "2025-04-01T12:00:00Z".to_string()),
                ("sort_by", "date".to_string()),
                ("page", "1".to_string()),
                ("expand", "venue,ticket_classes,organizer".to_string()),
            ]
        );
    }

    #[test]
    fn test_search_query_optional_params() {
        let client = make_client(Some("token"));
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let params = EventbriteSearchParams {
            categories: Some("108".into()),
            price: Some(PriceFilter::Free),
            name_filter: Some("run".into()),
            ..Default::default()
        };
        let query = client.search_query(&params, now);

        assert!(query.contains(&("categories", "108".to_string())));
        assert!(query.contains(&("price", "free".to_string())));
        assert!(query.contains(&("q", "run".to_string())));
    }

    // ========== HTTP requests ==========

    async fn mock_client(server: &MockServer) -> EventbriteClient {
        let mut config = AppConfig::default().eventbrite;
        config.api_key = Some("eb-token".into());
        config.base_url = server.uri();
        EventbriteClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_free_events_send_price_and_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events/search/"))
            .and(header("authorization", "Bearer eb-token"))
            .and(query_param("price", "free"))
            .and(query_param("location.address", "Portland, OR"))
            .and(query_param("location.within", "25mi"))
            .and(query_param("expand", "venue,ticket_classes,organizer"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FIXTURE))
            .expect(1)
            .mount(&server)
            .await;

        let events = mock_client(&server).await.get_free_events().await.unwrap();
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn test_category_helpers_send_category_ids() {
        let server = MockServer::start().await;
        for category in ["108", "103", "105"] {
            Mock::given(method("GET"))
                .and(path("/events/search/"))
                .and(query_param("categories", category))
                .respond_with(ResponseTemplate::new(200).set_body_string(FIXTURE))
                .expect(1)
                .mount(&server)
                .await;
        }

        let client = mock_client(&server).await;
        assert_eq!(client.get_portland_sports_events().await.unwrap().len(), 2);
        assert_eq!(client.get_portland_music_events().await.unwrap().len(), 2);
        assert_eq!(
            client.get_portland_entertainment_events().await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn test_search_server_error_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events/search/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = mock_client(&server)
            .await
            .get_portland_events()
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Http(_)));
    }

    #[tokio::test]
    async fn test_search_without_events_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events/search/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let events = mock_client(&server).await.get_portland_events().await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_event_details_found_and_failed() {
        let server = MockServer::start().await;
        let body = serde_json::to_string(&fixture_events()[0]).unwrap();
        Mock::given(method("GET"))
            .and(path("/events/ok/"))
            .and(header("authorization", "Bearer eb-token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/events/broken/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let details = client.get_event_details("ok").await.unwrap();
        assert_eq!(details.name.text.as_deref(), Some("Indie Rock Festival"));
        assert!(client.get_event_details("broken").await.is_none());
    }

    // ========== Missing key behavior ==========

    #[tokio::test]
    async fn test_search_without_key_yields_empty() {
        let client = make_client(None);
        let events = client
            .search_events(&EventbriteSearchParams::default())
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_without_key_yields_empty_for_every_category() {
        let client = make_client(None);
        for category in [
            CategoryFilter::Sports,
            CategoryFilter::Music,
            CategoryFilter::Entertainment,
            CategoryFilter::All,
        ] {
            let filters = SearchFilters {
                category: Some(category),
                ..Default::default()
            };
            assert!(client.fetch_events(&filters).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_event_details_without_key_is_none() {
        let client = make_client(None);
        assert!(client.get_event_details("123").await.is_none());
    }
}
