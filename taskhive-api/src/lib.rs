//! # TaskHive API Server Library
//!
//! This library provides the core functionality for the TaskHive API
//! server.
//!
//! ## Modules
//!
//! - `app`: application state and router builder
//! - `config`: configuration management
//! - `error`: error handling and HTTP response mapping
//! - `mailer`: outbound account email
//! - `realtime`: project rooms and the WebSocket endpoint
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod mailer;
pub mod realtime;
pub mod routes;
