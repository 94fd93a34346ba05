//! plugnparse-equal - Deep equality for wire values and entities.
//!
//! [`deep_equal`] compares two [`serde_json::Value`]s structurally with strict
//! type checking. [`approx_equal`] relaxes number comparison to
//! `|a - b| <= atol + rtol * |b|`, and [`entities_equal`] applies it to the
//! encodings of two entities of the same kind.

mod approx_equal;
mod deep_equal;

pub use approx_equal::{approx_equal, entities_equal, Tolerance};
pub use deep_equal::deep_equal;
