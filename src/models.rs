//! Core data models for the report catalog.
//!
//! These types represent the metadata declared inside a report document and
//! the derived catalog entry handed to the CLI and HTTP boundaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured metadata declared at the top of a report document.
///
/// Every field is optional: a document with no metadata declaration (or a
/// malformed one) yields the empty default, and consumers substitute display
/// fallbacks for whatever is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Vec<String>>,
}

/// A catalog entry derived from one on-disk document.
///
/// Never persisted: rebuilt from the directory listing on every query, so
/// the filesystem stays the single source of truth.
#[derive(Debug, Clone)]
pub struct Report {
    /// URL-safe identifier, the filename minus its extension.
    pub slug: String,
    /// Sanitized on-disk filename, unique within the store.
    pub filename: String,
    pub metadata: ReportMetadata,
    pub modified_at: DateTime<Utc>,
}
