//! Quote submission and retrieval service

use crate::models::{LatestQuote, Quote};
use crate::storage::Database;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Result of a quote submission: the stored quote plus whether the author
/// row was created by this submission.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub quote: Quote,
    pub author_created: bool,
}

pub struct QuoteService {
    db: Arc<Database>,
}

impl QuoteService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// The most recently submitted quote, joined with its author's name.
    pub async fn latest_quote(&self) -> Result<Option<LatestQuote>> {
        self.db.latest_quote().await
    }

    /// Save a quote, creating its author the first time the name is seen.
    pub async fn submit_quote(&self, author_name: &str, content: &str) -> Result<SubmitOutcome> {
        let (author, author_created) = self.db.get_or_create_author(author_name).await?;
        let quote = self.db.insert_quote(content, &author.id).await?;

        info!(
            "Saved quote {} by author {} (author_created={})",
            quote.id, author.name, author_created
        );

        Ok(SubmitOutcome {
            quote,
            author_created,
        })
    }
}
