// Core data models for ttrack
// These structs represent the domain entities

pub mod interval;
pub mod report;
pub mod task;

pub use interval::*;
pub use report::*;
pub use task::*;
