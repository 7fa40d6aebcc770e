mod output;
mod score;
mod search;

pub use output::{deals_table, events_table, to_json, venues_table};
pub use score::{score_file, ScoreArgs};
pub use search::SearchArgs;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::providers::TicketmasterClient;
use crate::services::aggregator::{DEFAULT_FREE_EVENTS_LIMIT, DEFAULT_HOT_DEALS_LIMIT};
use crate::services::EventAggregationService;
use crate::types::NormalizedEvent;

/// Portland event tickets from Ticketmaster and Eventbrite, ranked by deal score
#[derive(Parser)]
#[command(name = "ripcity")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every provider with optional filters
    Search(SearchArgs),

    /// Best deals scoring above the hot threshold
    Hot {
        #[arg(long, default_value_t = DEFAULT_HOT_DEALS_LIMIT)]
        limit: usize,
    },

    /// Free events
    Free {
        #[arg(long, default_value_t = DEFAULT_FREE_EVENTS_LIMIT)]
        limit: usize,
    },

    /// Events whose name, venue or description contains QUERY
    Find {
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Score a saved JSON array of Ticketmaster events
    Score(ScoreArgs),

    /// List Ticketmaster venues in a city
    Venues {
        /// Defaults to RIPCITY_CITY
        #[arg(long)]
        city: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = AppConfig::from_env()?;
        let json = self.json;

        match self.command {
            Commands::Search(args) => {
                let service = EventAggregationService::from_config(&config)?;
                let events = service.search_all_events(&args.to_filters()).await;
                print_events(&events, json)
            }
            Commands::Hot { limit } => {
                let service = EventAggregationService::from_config(&config)?;
                print_events(&service.get_hot_deals(limit).await, json)
            }
            Commands::Free { limit } => {
                let service = EventAggregationService::from_config(&config)?;
                print_events(&service.get_free_events(limit).await, json)
            }
            Commands::Find { query } => {
                let service = EventAggregationService::from_config(&config)?;
                print_events(&service.search_by_name(&query).await, json)
            }
            Commands::Score(args) => {
                let deals = args.deals(config.deal_seed).await?;
                if json {
                    println!("{}", to_json(&deals)?);
                } else {
                    println!("{}", deals_table(&deals));
                }
                Ok(())
            }
            Commands::Venues { city } => {
                let client = TicketmasterClient::new(&config.ticketmaster)?;
                let city = city.unwrap_or_else(|| config.ticketmaster.city.clone());
                let venues = client.get_venues(&city).await?;
                if json {
                    println!("{}", to_json(&venues)?);
                } else {
                    println!("{}", venues_table(&venues));
                }
                Ok(())
            }
        }
    }
}

fn print_events(events: &[NormalizedEvent], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", to_json(events)?);
    } else {
        println!("{}", events_table(events));
    }
    Ok(())
}
