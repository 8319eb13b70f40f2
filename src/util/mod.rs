//! Shared utilities (MySQL connection settings, logging setup).

#[cfg(feature = "cli")]
pub mod logging;
pub mod mysql;
