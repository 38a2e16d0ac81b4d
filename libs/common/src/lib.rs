//! Common library for the Foodshare backend
//!
//! This crate provides shared infrastructure used by the Foodshare services:
//! PostgreSQL connection pooling, Redis connectivity, and database error
//! handling.

pub mod cache;
pub mod database;
pub mod error;
