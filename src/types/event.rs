//! Event types shared by providers, aggregation and the CLI

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upstream ticket provider an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    Ticketmaster,
    Eventbrite,
}

impl EventSource {
    pub const ALL: [EventSource; 2] = [EventSource::Ticketmaster, EventSource::Eventbrite];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventSource::Ticketmaster => "ticketmaster",
            EventSource::Eventbrite => "eventbrite",
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ticketmaster" | "tm" => Ok(EventSource::Ticketmaster),
            "eventbrite" | "eb" => Ok(EventSource::Eventbrite),
            other => Err(format!("unknown source '{}'", other)),
        }
    }
}

/// Normalized event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Sports,
    Music,
    Entertainment,
    #[default]
    Other,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Sports => "sports",
            EventCategory::Music => "music",
            EventCategory::Entertainment => "entertainment",
            EventCategory::Other => "other",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider event mapped into the common shape.
///
/// The deal fields are empty until the aggregation stage scores the event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEvent {
    pub id: String,
    pub name: String,
    pub venue: String,
    pub city: String,
    /// Local date as `YYYY-MM-DD`, or `TBD`
    pub date: String,
    /// Local time as `HH:MM[:SS]`, empty when unknown
    pub time: String,
    pub url: String,
    pub image: String,
    pub min_price: f64,
    pub max_price: f64,
    pub currency: String,
    pub category: EventCategory,
    pub source: EventSource,
    pub is_free: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<u32>,
}

impl NormalizedEvent {
    /// Parsed event date; `None` for `TBD` or malformed dates
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// Case-insensitive substring match against name, venue and description
    pub fn matches_text(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.venue.to_lowercase().contains(&query)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&query))
    }
}

/// Category selector accepted by searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    Sports,
    Music,
    Entertainment,
    #[default]
    All,
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sports" => Ok(CategoryFilter::Sports),
            "music" => Ok(CategoryFilter::Music),
            "entertainment" => Ok(CategoryFilter::Entertainment),
            "all" => Ok(CategoryFilter::All),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

/// Inclusive date window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// User-supplied search filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(default)]
    pub category: Option<CategoryFilter>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub include_free_events: Option<bool>,
    #[serde(default)]
    pub sources: Option<Vec<EventSource>>,
}

impl SearchFilters {
    /// Whether `source` should be queried (all sources when unset)
    pub fn wants_source(&self, source: EventSource) -> bool {
        self.sources
            .as_ref()
            .map_or(true, |sources| sources.contains(&source))
    }

    pub fn category(&self) -> CategoryFilter {
        self.category.unwrap_or_default()
    }

    /// Price bound, ignoring zero and negative values
    pub fn effective_max_price(&self) -> Option<f64> {
        self.max_price.filter(|p| *p > 0.0)
    }

    /// Price bound, ignoring zero and negative values
    pub fn effective_min_price(&self) -> Option<f64> {
        self.min_price.filter(|p| *p > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event(name: &str, venue: &str, description: Option<&str>) -> NormalizedEvent {
        NormalizedEvent {
            id: "tm_1".into(),
            name: name.into(),
            venue: venue.into(),
            city: "Portland".into(),
            date: "2025-03-01".into(),
            time: "19:30:00".into(),
            url: String::new(),
            image: String::new(),
            min_price: 10.0,
            max_price: 20.0,
            currency: "USD".into(),
            category: EventCategory::Music,
            source: EventSource::Ticketmaster,
            is_free: false,
            description: description.map(String::from),
            deal_score: None,
            savings: None,
            original_price: None,
        }
    }

    #[test]
    fn test_event_serializes_camel_case_without_deal_fields() {
        let event = make_event("Show", "Roseland", None);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["minPrice"], 10.0);
        assert_eq!(json["isFree"], false);
        assert_eq!(json["source"], "ticketmaster");
        assert_eq!(json["category"], "music");
        assert!(json.get("dealScore").is_none());
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_parsed_date() {
        let mut event = make_event("Show", "Roseland", None);
        assert_eq!(
            event.parsed_date(),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        event.date = "TBD".into();
        assert!(event.parsed_date().is_none());
    }

    #[test]
    fn test_matches_text_checks_name_venue_description() {
        let event = make_event("Indie Rock Festival", "Crystal Ballroom", Some("Local bands"));
        assert!(event.matches_text("indie"));
        assert!(event.matches_text("BALLROOM"));
        assert!(event.matches_text("local band"));
        assert!(!event.matches_text("blazers"));
    }

    #[test]
    fn test_wants_source_defaults_to_all() {
        let filters = SearchFilters::default();
        assert!(filters.wants_source(EventSource::Ticketmaster));
        assert!(filters.wants_source(EventSource::Eventbrite));

        let filters = SearchFilters {
            sources: Some(vec![EventSource::Eventbrite]),
            ..Default::default()
        };
        assert!(!filters.wants_source(EventSource::Ticketmaster));
        assert!(filters.wants_source(EventSource::Eventbrite));
    }

    #[test]
    fn test_zero_price_bounds_are_ignored() {
        let filters = SearchFilters {
            max_price: Some(0.0),
            min_price: Some(25.0),
            ..Default::default()
        };
        assert_eq!(filters.effective_max_price(), None);
        assert_eq!(filters.effective_min_price(), Some(25.0));
    }

    #[test]
    fn test_parse_source_and_category() {
        assert_eq!("TM".parse::<EventSource>(), Ok(EventSource::Ticketmaster));
        assert_eq!(" eventbrite ".parse::<EventSource>(), Ok(EventSource::Eventbrite));
        assert!("stubhub".parse::<EventSource>().is_err());
        assert_eq!("Music".parse::<CategoryFilter>(), Ok(CategoryFilter::Music));
        assert!("opera".parse::<CategoryFilter>().is_err());
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        };
        assert!(range.contains(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert!(range.contains(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()));
    }
}
