//! # Helpdesk Backend
//!
//! REST backend for a support helpdesk: tickets, users and calendar events,
//! with ticket volume and resolution-time forecasts obtained from an
//! external prediction service.
//!
//! ## Architecture
//!
//! - [`api`]: Domain entities and identifiers shared by every layer
//! - [`models`]: Date ranges, count series and statistics produced by the services
//! - [`services`]: Time-series aggregation, statistics and forecast orchestration
//! - [`db`]: Repository pattern and persistence layer
//! - [`auth`]: Access tokens, password hashing and route guards
//! - [`config`]: Server configuration from the environment
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
