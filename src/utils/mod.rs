//! Shared utilities

mod browser;
mod logger;

pub use browser::BrowserOpener;
pub use logger::{init_logger, LogLevel};

#[cfg(all(test, unix))]
pub mod testing;
