//! Common test utilities for latency-router

pub mod fixtures;

pub use fixtures::{DeploymentFactory, OutcomeFactory, TestRouter};

/// Skip test if environment variable is not set
#[macro_export]
macro_rules! skip_without_env {
    ($var:expr) => {
        if std::env::var($var).is_err() {
            eprintln!("Skipping test: {} environment variable not set", $var);
            return;
        }
    };
}
