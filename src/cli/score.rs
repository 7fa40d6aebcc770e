//! `ripcity score` subcommand for scoring saved Discovery API events offline

use std::path::{Path, PathBuf};

use clap::Args;

use crate::providers::TicketmasterEvent;
use crate::services::DealScoringService;
use crate::types::{Deal, Result};

/// Score a JSON array of Ticketmaster events
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Path to a JSON file holding an array of events
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Seed the price generator for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,
}

impl ScoreArgs {
    pub async fn deals(&self, default_seed: Option<u64>) -> Result<Vec<Deal>> {
        let scorer = match self.seed.or(default_seed) {
            Some(seed) => DealScoringService::seeded(seed),
            None => DealScoringService::from_entropy(),
        };
        score_file(&self.file, &scorer).await
    }
}

/// Read events from `path` and score them with `scorer`
pub async fn score_file(path: &Path, scorer: &DealScoringService) -> Result<Vec<Deal>> {
    let content = tokio::fs::read_to_string(path).await?;
    let events: Vec<TicketmasterEvent> = serde_json::from_str(&content)?;
    tracing::debug!(count = events.len(), path = %path.display(), "scoring events from file");
    Ok(scorer.score_deals(&events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DispatchError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DEALS_FIXTURE: &str = include_str!("../../tests/fixtures/deals-input.json");

    fn fixture_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_score_file_fixture() {
        let file = fixture_file(DEALS_FIXTURE);
        let deals = score_file(file.path(), &DealScoringService::seeded(1))
            .await
            .unwrap();

        assert_eq!(deals.len(), 2);
        assert_eq!(deals[0].event_name, "Trail Blazers vs Lakers");
        assert_eq!(deals[0].venue, "Moda Center");
        assert_eq!(deals[0].category, "basketball");
        assert_eq!(deals[1].event_name, "Comedy Night");
        assert_eq!(deals[1].category, "comedy");
        assert!(deals.iter().all(|d| d.deal_score <= 100));
    }

    #[tokio::test]
    async fn test_seed_gives_reproducible_output() {
        let file = fixture_file(DEALS_FIXTURE);
        let args = ScoreArgs {
            file: file.path().to_path_buf(),
            seed: Some(7),
        };

        let first = args.deals(None).await.unwrap();
        let second = args.deals(Some(99)).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let file = fixture_file("{ not json");
        let err = score_file(file.path(), &DealScoringService::seeded(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = score_file(&dir.path().join("missing.json"), &DealScoringService::seeded(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Io(_)));
    }
}
