//! Configuration validation
//!
//! - `trait_def`: Core Validate trait definition
//! - `router_validators`: Routing, cache, logging, and deployment validators
//! - `tests`: Test suite for all validators

mod router_validators;
mod trait_def;

pub use trait_def::Validate;
