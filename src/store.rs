//! The report store: a flat directory of MDX documents as the catalog.
//!
//! There is no index beside the directory itself. Every read re-enumerates
//! the store root, re-parses metadata, and rebuilds [`Report`] records, so
//! readers always observe the durable state of truth. Mutations consult the
//! [`Authorizer`] before any filesystem side effect and go through the
//! filename sanitizer, which is the sole gate against directory escape.
//!
//! Concurrency: no in-process locking. Two concurrent uploads of the same
//! sanitized name race and the last writer wins, matching plain filesystem
//! overwrite semantics; publishing is low-frequency and single-operator, so
//! no serialization is attempted. Uploads write to a temporary file and
//! rename into place, so a concurrent reader observes either the complete
//! document or none of it.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::auth::Authorizer;
use crate::metadata::extract_metadata;
use crate::models::Report;
use crate::sanitize::{
    has_report_extension, sanitize_filename, slug_for_filename, REPORT_EXTENSION,
};

/// Typed failures surfaced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] io::Error),
}

pub struct ReportStore {
    root: PathBuf,
    gate: Box<dyn Authorizer>,
}

impl ReportStore {
    pub fn new(root: impl Into<PathBuf>, gate: impl Authorizer + 'static) -> Self {
        Self {
            root: root.into(),
            gate: Box::new(gate),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Exposed for the auth-check endpoint, which reports capability status
    /// without performing a mutation.
    pub fn is_authorized(&self, token: Option<&str>) -> bool {
        self.gate.is_authorized(token)
    }

    /// Enumerates all stored reports, newest first (ties broken by filename
    /// ascending for determinism).
    ///
    /// A missing store root is an empty catalog, not an error. A root that
    /// exists but cannot be read surfaces as [`StoreError::StorageUnavailable`].
    /// Individual unreadable or malformed files are skipped with a warning;
    /// one bad document never hides the rest.
    pub fn list(&self) -> Result<Vec<Report>, StoreError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::StorageUnavailable(err)),
        };

        let mut reports = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                tracing::warn!(entry = ?entry.file_name(), "skipping non-UTF-8 filename");
                continue;
            };
            if !has_report_extension(name) {
                continue;
            }
            match self.read_report(name) {
                Ok(report) => reports.push(report),
                Err(err) => {
                    tracing::warn!(file = %name, error = %err, "skipping unreadable report");
                }
            }
        }

        reports.sort_by(|a, b| {
            b.modified_at
                .cmp(&a.modified_at)
                .then_with(|| a.filename.cmp(&b.filename))
        });

        Ok(reports)
    }

    /// Resolves a slug to its report using the same filter and derivation as
    /// [`ReportStore::list`]; there is no separate index to drift out of sync.
    pub fn get(&self, slug: &str) -> Result<Report, StoreError> {
        self.list()?
            .into_iter()
            .find(|report| report.slug == slug)
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))
    }

    /// Like [`ReportStore::get`], but also returns the raw document body for
    /// detail views.
    pub fn get_with_body(&self, slug: &str) -> Result<(Report, String), StoreError> {
        let report = self.get(slug)?;
        let body = std::fs::read_to_string(self.root.join(&report.filename)).map_err(|err| {
            // The file can vanish between the listing and this read.
            if err.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound(slug.to_string())
            } else {
                StoreError::StorageUnavailable(err)
            }
        })?;
        Ok((report, body))
    }

    /// Stores a document under the sanitized form of `original_name`,
    /// creating the store root if needed and silently overwriting an
    /// existing document of the same name. Returns the stored filename.
    ///
    /// The write goes to a temporary file in the store root and is renamed
    /// into place, so `list` never observes a partially-written document.
    pub fn create(
        &self,
        original_name: &str,
        content: &[u8],
        token: Option<&str>,
    ) -> Result<String, StoreError> {
        if !self.gate.is_authorized(token) {
            return Err(StoreError::Unauthorized);
        }
        if !has_report_extension(original_name) {
            return Err(StoreError::InvalidFormat(format!(
                "only {REPORT_EXTENSION} files are accepted"
            )));
        }

        let filename = sanitize_filename(original_name);
        std::fs::create_dir_all(&self.root).map_err(StoreError::StorageUnavailable)?;

        let mut tmp =
            tempfile::NamedTempFile::new_in(&self.root).map_err(StoreError::StorageUnavailable)?;
        tmp.write_all(content)
            .map_err(StoreError::StorageUnavailable)?;
        tmp.persist(self.root.join(&filename))
            .map_err(|err| StoreError::StorageUnavailable(err.error))?;

        tracing::info!(filename = %filename, bytes = content.len(), "stored report");
        Ok(filename)
    }

    /// Removes a stored document. The extension check keeps this from
    /// touching anything but report documents, and the name passes through
    /// the sanitizer so it cannot address files outside the store root.
    pub fn delete(&self, filename: &str, token: Option<&str>) -> Result<(), StoreError> {
        if !self.gate.is_authorized(token) {
            return Err(StoreError::Unauthorized);
        }
        if !has_report_extension(filename) {
            return Err(StoreError::InvalidFormat(format!(
                "only {REPORT_EXTENSION} files can be deleted"
            )));
        }

        let filename = sanitize_filename(filename);
        match std::fs::remove_file(self.root.join(&filename)) {
            Ok(()) => {
                tracing::info!(filename = %filename, "deleted report");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(filename))
            }
            Err(err) => Err(StoreError::StorageUnavailable(err)),
        }
    }

    fn read_report(&self, filename: &str) -> io::Result<Report> {
        let path = self.root.join(filename);
        let content = std::fs::read_to_string(&path)?;
        let modified = std::fs::metadata(&path)?.modified()?;

        Ok(Report {
            slug: slug_for_filename(filename).to_string(),
            filename: filename.to_string(),
            metadata: extract_metadata(&content),
            modified_at: DateTime::<Utc>::from(modified),
        })
    }
}
