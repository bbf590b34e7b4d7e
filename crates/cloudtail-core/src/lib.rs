//! cloudtail-core — retrieval pipeline for AWS CloudWatch Logs.
//!
//! Everything is organized around one flow: resolve which streams a
//! pattern selects, fetch matching events page by page (optionally
//! polling forever), drop events the service serves twice, and render
//! aligned lines for a terminal. The [`client`] seam keeps the whole
//! pipeline testable without network access.

pub mod client;
pub mod config;
pub mod datetime;
pub mod error;
pub mod tail;

pub use config::Config;
pub use error::{CloudtailError, Result};
