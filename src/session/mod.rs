pub mod cancel;
pub mod controller;

pub use controller::{Command, DashboardSnapshot, FeedStatus, Session, SessionHandle};

use thiserror::Error;

/// The session loop has exited and no longer accepts commands.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("session stopped")]
pub struct SessionStopped;
