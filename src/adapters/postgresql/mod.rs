//! PostgreSQL database integration
//!
//! This module provides the relational gateways: publishing status rows,
//! release metadata, data sets, methodologies and subscribers.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
pub use models::{PostgreSQLMethodologyVersion, PostgreSQLReleaseVersion, PostgreSQLStatus};
