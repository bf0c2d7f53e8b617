pub mod api;
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod query;
pub mod view;

#[cfg(test)]
mod testing;

use std::sync::atomic::{AtomicBool, Ordering};

pub use client::Friendforce;
pub use error::{Error, Result};

/// Whether debug logging is active, shared between the logger filter and the config flag.
static DEBUG_LOGGING: AtomicBool = AtomicBool::new(false);

pub fn set_debug_logging(enabled: bool) {
    DEBUG_LOGGING.store(enabled, Ordering::Relaxed);
}

pub fn debug_logging() -> bool {
    DEBUG_LOGGING.load(Ordering::Relaxed)
}
