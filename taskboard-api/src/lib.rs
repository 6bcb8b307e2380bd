//! # Taskboard API Server Library
//!
//! HTTP surface for the task board: configuration, error mapping, request
//! extractors, router and handlers. Business rules live in `taskboard-shared`.
//!
//! ## Modules
//!
//! - `app`: Application state, router and bearer-token middleware
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: JSON/query/path extractors with JSON error bodies
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
