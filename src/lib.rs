//! # Report Vault
//!
//! A filesystem-backed publishing service for MDX report documents.
//!
//! Report Vault turns a flat directory of `.mdx` files into a small report
//! catalog: each document declares its metadata in a top-level
//! `export const metadata = { ... }` block, and the store derives stable
//! slugs, extracts metadata, and orders everything newest-first on every
//! read. Uploads and deletes are gated behind a shared admin token; browsing
//! is public.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌────────────────┐
//! │  CLI (rpt)  │──▶│ Report Store │──▶│  store root    │
//! └─────────────┘   │  sanitize /  │   │  (*.mdx files) │
//! ┌─────────────┐   │  extract /   │   └────────────────┘
//! │  HTTP API   │──▶│  auth gate   │
//! └─────────────┘   └──────────────┘
//! ```
//!
//! The directory listing is the only index: reports are rebuilt from the
//! filesystem on every query, so there is no cache or sidecar state to
//! drift.
//!
//! ## Quick Start
//!
//! ```bash
//! rpt init                          # create the store root
//! rpt publish ./q3-nvidia.mdx       # upload a document
//! rpt list                          # browse the catalog
//! rpt serve                         # start the HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`sanitize`] | Filename sanitization and slug derivation |
//! | [`metadata`] | Restricted metadata-literal extraction |
//! | [`store`] | The report store over the filesystem |
//! | [`auth`] | Admin authorization gate |
//! | [`server`] | Public HTTP API |
//! | [`commands`] | CLI command implementations |

pub mod auth;
pub mod commands;
pub mod config;
pub mod metadata;
pub mod models;
pub mod sanitize;
pub mod server;
pub mod store;
