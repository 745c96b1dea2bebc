pub mod agent;
pub mod args;
pub mod cache;
pub mod decorate;
pub mod dedup;
pub mod error;
pub mod export;
pub mod flow;
pub mod link;
pub mod tracer;

#[cfg(test)]
pub mod fake;
