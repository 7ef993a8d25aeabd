//! LeadCapture Pro — Lead Intake & Scoring API Library
//!
//! This library provides the core functionality of the lead-capture service:
//! normalization of heterogeneous form submissions (landing pages and the
//! Google Forms webhook bridge), capital-based scoring and categorization,
//! time-window deduplication, and persistence into Postgres.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `intake`: Pipeline orchestration (normalize, dedupe, score, persist).
//! - `models`: Core data models.
//! - `normalizer`: Field aliasing, validation gate, per-source policies.
//! - `scoring`: Capital -> score -> category mapping.
//! - `store`: Persistence boundary (`LeadStore` trait and Postgres impl).

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod intake;
pub mod models;
pub mod normalizer;
pub mod scoring;
pub mod store;
