//! Release radar synchronization library.
//!
//! Walks the releases of every followed Spotify artist, appends tracks that
//! were never in the target playlist, and remembers what it did (last run
//! date, previously synced track ids) in a storage folder so repeated runs
//! stay idempotent.
//!
//! # Modules
//!
//! - `api` - Loopback callback endpoint for the OAuth flow
//! - `catalog` - Remote catalog trait consumed by the engine
//! - `cli` - Command-line interface implementations
//! - `config` - Environment configuration
//! - `error` - Error taxonomy
//! - `management` - Token cache and durable sync state
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client implementation
//! - `storage` - State storage backends (Google Drive, local folder)
//! - `sync` - Fetcher, filter and run orchestration
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers

pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod storage;
pub mod sync;
pub mod types;
pub mod utils;

/// A convenient Result type alias for plumbing that may fail.
///
/// The engine itself returns the typed errors of [`error`]; this alias is
/// used by the authorization flow and CLI glue.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Fetching current playlist tracks for filtering.");
/// info!("Followed artists retrieved ({}).", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for fatal errors at the CLI layer: the process terminates with exit
/// code 1 right after printing.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for every degraded path that lets the run continue: a skipped
/// artist, a retried request, a state file that had to be saved locally.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
