//! Core library for a versioned workout tracker: plan versions over date
//! intervals, per-version workout structure, session recording, and the
//! read-side aggregation over what was logged.

pub mod catalog;
pub mod db;
pub mod error;
pub mod parser;
pub mod plan;
pub mod seed;
pub mod session;
pub mod stats;
pub mod validate;
pub mod versions;

pub use error::{Error, Result};
pub use sqlx::SqlitePool;
