pub mod number;
pub mod stats;
pub mod strategy;
pub mod table;
