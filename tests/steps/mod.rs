//! Step definitions for the Cucumber behaviour suites.

mod config_steps;
mod lifecycle_steps;
