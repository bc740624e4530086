pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod notify;
pub mod planner;
pub mod rollover;
pub mod runtime;
pub mod scheduler;
pub mod stats;
pub mod status;
pub mod storage;
