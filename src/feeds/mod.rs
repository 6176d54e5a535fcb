pub mod extract;
pub mod live_casino;
pub mod retry;

use crate::models::table::RouletteTable;
use std::future::Future;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP {code}: {reason}")]
    Status { code: u16, reason: String },

    #[error("feed request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
}

/// Source of live table listings.
pub trait TableFeed: Send + Sync + 'static {
    fn fetch_tables(&self) -> impl Future<Output = Result<Vec<RouletteTable>, FeedError>> + Send;
}
