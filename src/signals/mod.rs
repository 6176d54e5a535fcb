pub mod history;
pub mod stats;
pub mod trend;
