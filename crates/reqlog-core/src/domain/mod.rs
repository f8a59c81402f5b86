//! Domain types
//!
//! - Log records and levels
//! - Rotation configuration

pub mod config;
mod record;

pub use config::*;
pub use record::*;
