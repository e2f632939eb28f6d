pub mod config;
pub mod logging;

pub mod control;
pub mod dashboard;
pub mod parser;
pub mod progress;
pub mod retry;
pub mod runner;
pub mod scheduler;
pub mod sources;
