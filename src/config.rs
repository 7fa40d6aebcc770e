//! Runtime configuration loaded from environment variables

use crate::types::{DispatchError, Result};

pub const DEFAULT_TICKETMASTER_BASE_URL: &str = "https://app.ticketmaster.com/discovery/v2";
pub const DEFAULT_EVENTBRITE_BASE_URL: &str = "https://www.eventbriteapi.com/v3";
pub const DEFAULT_CITY: &str = "Portland";
pub const DEFAULT_LOCATION: &str = "Portland, OR";
pub const DEFAULT_RADIUS: &str = "25mi";

/// Ticketmaster Discovery API settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketmasterConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub city: String,
}

/// Eventbrite Search API settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventbriteConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub location: String,
    pub within: String,
}

/// Application configuration.
///
/// | Env Var                 | Default                                     |
/// |-------------------------|---------------------------------------------|
/// | `TICKETMASTER_KEY`      | unset                                       |
/// | `TICKETMASTER_BASE_URL` | `https://app.ticketmaster.com/discovery/v2` |
/// | `EVENTBRITE_KEY`        | unset                                       |
/// | `EVENTBRITE_BASE_URL`   | `https://www.eventbriteapi.com/v3`          |
/// | `RIPCITY_CITY`          | `Portland`                                  |
/// | `RIPCITY_LOCATION`      | `Portland, OR`                              |
/// | `RIPCITY_RADIUS`        | `25mi`                                      |
/// | `RIPCITY_DEAL_SEED`     | unset (entropy)                             |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub ticketmaster: TicketmasterConfig,
    pub eventbrite: EventbriteConfig,
    /// Fixed seed for reproducible deal scoring
    pub deal_seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ticketmaster: TicketmasterConfig {
                api_key: None,
                base_url: DEFAULT_TICKETMASTER_BASE_URL.to_string(),
                city: DEFAULT_CITY.to_string(),
            },
            eventbrite: EventbriteConfig {
                api_key: None,
                base_url: DEFAULT_EVENTBRITE_BASE_URL.to_string(),
                location: DEFAULT_LOCATION.to_string(),
                within: DEFAULT_RADIUS.to_string(),
            },
            deal_seed: None,
        }
    }
}

impl AppConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup (empty values count as unset)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let deal_seed = match get("RIPCITY_DEAL_SEED") {
            Some(raw) => Some(raw.parse::<u64>().map_err(|e| {
                DispatchError::Config(format!("RIPCITY_DEAL_SEED must be a u64: {}", e))
            })?),
            None => None,
        };

        Ok(Self {
            ticketmaster: TicketmasterConfig {
                api_key: get("TICKETMASTER_KEY"),
                base_url: get("TICKETMASTER_BASE_URL")
                    .unwrap_or(defaults.ticketmaster.base_url),
                city: get("RIPCITY_CITY").unwrap_or(defaults.ticketmaster.city),
            },
            eventbrite: EventbriteConfig {
                api_key: get("EVENTBRITE_KEY"),
                base_url: get("EVENTBRITE_BASE_URL").unwrap_or(defaults.eventbrite.base_url),
                location: get("RIPCITY_LOCATION").unwrap_or(defaults.eventbrite.location),
                within: get("RIPCITY_RADIUS").unwrap_or(defaults.eventbrite.within),
            },
            deal_seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.ticketmaster.api_key.is_none());
        assert_eq!(config.eventbrite.within, "25mi");
    }

    #[test]
    fn test_reads_keys_and_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("TICKETMASTER_KEY", "tm-key"),
            ("EVENTBRITE_KEY", "eb-key"),
            ("RIPCITY_CITY", "Seattle"),
            ("RIPCITY_DEAL_SEED", "42"),
        ]))
        .unwrap();

        assert_eq!(config.ticketmaster.api_key.as_deref(), Some("tm-key"));
        assert_eq!(config.eventbrite.api_key.as_deref(), Some("eb-key"));
        assert_eq!(config.ticketmaster.city, "Seattle");
        assert_eq!(config.deal_seed, Some(42));
    }

    #[test]
    fn test_blank_key_counts_as_unset() {
        let config = AppConfig::from_lookup(lookup(&[("TICKETMASTER_KEY", "   ")])).unwrap();
        assert!(config.ticketmaster.api_key.is_none());
    }

    #[test]
    fn test_invalid_seed_is_config_error() {
        let err = AppConfig::from_lookup(lookup(&[("RIPCITY_DEAL_SEED", "abc")])).unwrap_err();
        assert!(matches!(err, DispatchError::Config(_)));
    }
}
