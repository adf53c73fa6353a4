//! Campusline Shared Types
//!
//! This crate contains the domain types shared across the Campusline
//! platform clients: sessions, roles, chat threads, and pagination.

pub mod types;

pub use types::*;
