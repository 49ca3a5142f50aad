//! CLI command implementations.
//!
//! Each function backs one `rpt` subcommand: it drives the store and prints
//! human-readable output to stdout. Errors propagate to `main`, which lets
//! anyhow render them on stderr with a non-zero exit.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::store::ReportStore;

pub fn run_init(root: &Path) -> Result<()> {
    std::fs::create_dir_all(root)
        .with_context(|| format!("Failed to create store root: {}", root.display()))?;
    println!("Store initialized at {}", root.display());
    Ok(())
}

pub fn run_list(store: &ReportStore) -> Result<()> {
    let reports = store.list()?;
    if reports.is_empty() {
        println!("No reports published yet.");
        return Ok(());
    }

    println!(
        "{:<28} {:<32} {:<20} {:<8} MODIFIED",
        "SLUG", "TITLE", "COMPANY", "TICKER"
    );
    for report in &reports {
        println!(
            "{:<28} {:<32} {:<20} {:<8} {}",
            report.slug,
            report.metadata.title.as_deref().unwrap_or(&report.filename),
            report.metadata.company.as_deref().unwrap_or("Unknown"),
            report.metadata.ticker.as_deref().unwrap_or(""),
            report.modified_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

pub fn run_get(store: &ReportStore, slug: &str) -> Result<()> {
    let (report, body) = store.get_with_body(slug)?;
    let meta = &report.metadata;

    println!("--- Report ---");
    println!("slug:     {}", report.slug);
    println!("filename: {}", report.filename);
    println!(
        "title:    {}",
        meta.title.as_deref().unwrap_or(&report.filename)
    );
    println!("company:  {}", meta.company.as_deref().unwrap_or("Unknown"));
    println!("ticker:   {}", meta.ticker.as_deref().unwrap_or(""));
    println!("period:   {}", meta.period.as_deref().unwrap_or(""));
    println!("date:     {}", meta.date.as_deref().unwrap_or(""));
    println!("icon:     {}", meta.icon.as_deref().unwrap_or("📊"));
    if let Some(ref description) = meta.description {
        println!("about:    {}", description);
    }
    if let Some(ref highlights) = meta.highlights {
        println!("highlights:");
        for highlight in highlights {
            println!("  - {}", highlight);
        }
    }
    println!(
        "modified: {}",
        report.modified_at.format("%Y-%m-%dT%H:%M:%SZ")
    );
    println!();
    println!("--- Body ---");
    println!("{}", body);

    Ok(())
}

pub fn run_publish(store: &ReportStore, path: &Path, token: &str) -> Result<()> {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        bail!("path has no usable filename: {}", path.display());
    };
    let content = std::fs::read(path)
        .with_context(|| format!("Failed to read document: {}", path.display()))?;

    let stored = store.create(name, &content, Some(token))?;
    println!("published {} as {}", path.display(), stored);
    Ok(())
}

pub fn run_delete(store: &ReportStore, filename: &str, token: &str) -> Result<()> {
    store.delete(filename, Some(token))?;
    println!("deleted {}", filename);
    Ok(())
}
