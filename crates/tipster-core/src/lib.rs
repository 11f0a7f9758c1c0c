//! Core types and pure transforms for the Tipster betting-tips platform.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the domain model, the ingestion payload decoder, the market and risk
//! mapping tables, the plan assignment rules and the display mapping. Storage
//! backends implement [`store::TipStore`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod access;
pub mod display;
pub mod error;
pub mod fixture;
pub mod ingest;
pub mod market;
pub mod payload;
pub mod plan;
pub mod store;
pub mod subscription;
pub mod taxonomy;
pub mod tip;

pub use error::{Error, ErrorClass, Result, StoreError};

/// The sport every ingested league hangs off. It must be seeded before the
/// first ingestion run.
pub const BASE_SPORT: &str = "Football";
