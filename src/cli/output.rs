//! Plain-text and JSON rendering for CLI results

use serde::Serialize;

use crate::providers::TicketmasterVenue;
use crate::types::{Deal, NormalizedEvent, Result};

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn price_label(event: &NormalizedEvent) -> String {
    if event.is_free {
        "FREE".to_string()
    } else if event.max_price > event.min_price {
        format!("${:.0}-${:.0}", event.min_price, event.max_price)
    } else {
        format!("${:.0}", event.min_price)
    }
}

pub fn events_table(events: &[NormalizedEvent]) -> String {
    if events.is_empty() {
        return "No events found.".to_string();
    }

    let mut out = format!(
        "{:>5}  {:<10}  {:>11}  {:<12}  {}\n",
        "SCORE", "DATE", "PRICE", "SOURCE", "EVENT"
    );
    for event in events {
        let score = event
            .deal_score
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        out.push_str(&format!(
            "{:>5}  {:<10}  {:>11}  {:<12}  {} @ {}\n",
            score,
            event.date,
            price_label(event),
            event.source,
            event.name,
            event.venue
        ));
    }
    out.push_str(&format!("\n{} event(s)", events.len()));
    out
}

pub fn deals_table(deals: &[Deal]) -> String {
    if deals.is_empty() {
        return "No deals found.".to_string();
    }

    let mut out = format!(
        "{:>5}  {:<6}  {:>7}  {:>8}  {:>5}  {}\n",
        "SCORE", "ALERT", "NOW", "WAS", "SAVE", "EVENT"
    );
    for deal in deals {
        out.push_str(&format!(
            "{:>5}  {:<6}  {:>7}  {:>8}  {:>4}%  {} @ {} ({})\n",
            deal.deal_score,
            deal.alert_level.as_str(),
            format!("${}", deal.current_price),
            format!("${}", deal.original_price),
            deal.savings_percentage,
            deal.event_name,
            deal.venue,
            deal.event_date
        ));
    }
    out.push_str(&format!("\n{} deal(s)", deals.len()));
    out
}

pub fn venues_table(venues: &[TicketmasterVenue]) -> String {
    if venues.is_empty() {
        return "No venues found.".to_string();
    }

    venues
        .iter()
        .map(|v| {
            let city = v.city.as_ref().map(|c| c.name.as_str()).unwrap_or("");
            let state = v.state.as_ref().map(|s| s.name.as_str()).unwrap_or("");
            match (city.is_empty(), state.is_empty()) {
                (false, false) => format!("{} ({}, {})", v.name, city, state),
                (false, true) => format!("{} ({})", v.name, city),
                _ => v.name.clone(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
