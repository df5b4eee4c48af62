//! Domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Originator of quotes, created once per distinct name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A piece of text attributed to an author, timestamped at creation.
/// Never mutated or deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub generated_at: DateTime<Utc>,
}

/// A quote joined with the name of the author it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LatestQuote {
    pub content: String,
    pub author_name: String,
    pub generated_at: DateTime<Utc>,
}
