//! `ripcity search` arguments

use chrono::NaiveDate;
use clap::Args;

use crate::types::{CategoryFilter, DateRange, EventSource, SearchFilters};

/// Search all providers with filters
#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// sports, music, entertainment or all
    #[arg(long)]
    pub category: Option<CategoryFilter>,

    /// Drop events whose max price exceeds this
    #[arg(long)]
    pub max_price: Option<f64>,

    /// Drop events whose min price is below this
    #[arg(long)]
    pub min_price: Option<f64>,

    /// Venue name substring (case-insensitive)
    #[arg(long)]
    pub venue: Option<String>,

    /// First date to include (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", requires = "to")]
    pub from: Option<NaiveDate>,

    /// Last date to include (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", requires = "from")]
    pub to: Option<NaiveDate>,

    /// Exclude free events
    #[arg(long)]
    pub no_free: bool,

    /// Only query these providers (comma-separated: ticketmaster,eventbrite)
    #[arg(long, value_delimiter = ',')]
    pub source: Vec<EventSource>,
}

impl SearchArgs {
    pub fn to_filters(&self) -> SearchFilters {
        let date_range = match (self.from, self.to) {
            (Some(start), Some(end)) => Some(DateRange { start, end }),
            _ => None,
        };

        SearchFilters {
            category: self.category,
            max_price: self.max_price,
            min_price: self.min_price,
            venue: self.venue.clone(),
            date_range,
            include_free_events: self.no_free.then_some(false),
            sources: (!self.source.is_empty()).then(|| self.source.clone()),
        }
    }
}
