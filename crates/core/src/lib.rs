#![forbid(unsafe_code)]

pub mod model;
pub mod priority;
pub mod scheduler;
pub mod stats;
pub mod time;

pub use time::Clock;
