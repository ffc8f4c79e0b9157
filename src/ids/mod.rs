//! Identifier generation and reconciliation.
//!
//! Every identified node of a [`crate::messages::GherkinDocument`] and every
//! [`crate::messages::Pickle`] must carry an identifier that is unique within
//! the run. [`IdGenerator`] issues identifiers; [`IdReconciler`] repairs
//! documents produced elsewhere so that they never collide with identifiers
//! issued later.

mod generator;
mod reconcile;
mod style;

pub use generator::{IdGenerator, IncrementingIdGenerator};
pub use reconcile::{DocumentReconciliation, IdMap, IdReconciler, Reconciliation};
pub use style::{IdStyle, UnknownIdStyle};
