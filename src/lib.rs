pub mod analyzers;
pub mod collector;
pub mod fetch;
pub mod infra;
pub mod output;
pub mod parser;
pub mod plot;
pub mod report;
pub mod services;
pub mod snapshot;
