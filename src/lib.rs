//! Chronicle backend application core.
//!
//! This crate contains the server-side functionality for the Chronicle
//! historical-timeline application: HTTP routing, JWT authentication, the
//! favorites data layer, the in-memory TTL cache shielding the database from
//! repeated reads, and the reconciliation logic that keeps the served
//! favorites view fresh without blocking callers on store latency.

pub mod auth;
pub mod cache;
pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod model;
pub mod router;
pub mod service;
pub mod startup;
