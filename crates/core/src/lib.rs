#![forbid(unsafe_code)]

pub mod bank;
pub mod evaluator;
pub mod model;
pub mod time;

pub use time::Clock;
