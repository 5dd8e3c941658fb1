//! Console side of the declarative engine
//!
//! The engine orchestrates:
//! 1. Refreshing - Read every tracked record, dropping vanished ones
//! 2. Planning - Compare declarations with tracked records
//! 3. Executing - Apply changes with parallelism across records

pub mod differ;
pub mod executor;

pub use executor::run;
