//! Category inference and deduplication keys
//!
//! Maps provider-specific classifications onto [`EventCategory`] through
//! static lookup tables, so adding a provider means adding a table.

use crate::types::{EventCategory, NormalizedEvent};

/// Ticketmaster `classifications[0].segment.name` → category
pub const TICKETMASTER_SEGMENTS: &[(&str, EventCategory)] = &[
    ("Sports", EventCategory::Sports),
    ("Music", EventCategory::Music),
    ("Arts & Theatre", EventCategory::Entertainment),
];

/// Eventbrite `category_id` → category
pub const EVENTBRITE_CATEGORIES: &[(&str, EventCategory)] = &[
    ("108", EventCategory::Sports),        // Sports & Fitness
    ("103", EventCategory::Music),         // Music
    ("105", EventCategory::Entertainment), // Performing & Visual Arts
    ("110", EventCategory::Entertainment), // Travel & Outdoor
    ("104", EventCategory::Entertainment), // Film, Media & Entertainment
];

/// Look `key` up in a category table (`Other` when absent)
pub fn lookup_category(table: &[(&str, EventCategory)], key: Option<&str>) -> EventCategory {
    key.and_then(|k| table.iter().find(|(name, _)| *name == k))
        .map(|(_, category)| *category)
        .unwrap_or(EventCategory::Other)
}

pub fn ticketmaster_category(segment: Option<&str>) -> EventCategory {
    lookup_category(TICKETMASTER_SEGMENTS, segment)
}

pub fn eventbrite_category(category_id: Option<&str>) -> EventCategory {
    lookup_category(EVENTBRITE_CATEGORIES, category_id)
}

/// Composite identity used to merge the same listing across providers.
///
/// Name and venue are lowercased and trimmed; the date is taken verbatim.
pub fn dedup_key(event: &NormalizedEvent) -> String {
    format!(
        "{}_{}_{}",
        event.name.to_lowercase().trim(),
        event.date,
        event.venue.to_lowercase().trim()
    )
}
