//! Ttrack - a command-line task time tracker with per-day hour reports
//!
//! This library provides the core functionality for ttrack, including:
//! - Database operations and migrations
//! - Data models for tasks, tracking intervals, and report rows
//! - Repository layer for data access
//! - The tracking state machine (one task tracked at a time)
//! - Hours aggregation into per-day, per-task report rows
//! - CLI command parsing and execution
//! - Local/UTC clock conversions
//!
//! # Example
//!
//! ```no_run
//! use ttrack::cli::run;
//!
//! fn main() {
//!     if let Err(e) = run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod cli;
pub mod db;
pub mod error;
pub mod models;
pub mod repo;
pub mod report;
pub mod tracking;
pub mod utils;
