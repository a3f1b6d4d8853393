//! Pawhaven - backend for the pet-boarding application
//!
//! This library provides the HTTP API, document store, authentication seam,
//! and the log rotation/retention service.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod store;
