//! Database layer for TaskHive.
//!
//! # Modules
//!
//! - `pool`: PostgreSQL connection pool management with health checks
//! - `migrations`: embedded migration runner
//!
//! Row types and their queries live in the `models` module at crate root.

pub mod migrations;
pub mod pool;
