use plugnparse::{Parsable, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::deep_equal::numbers_equal;

/// Absolute and relative tolerance for number comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    pub atol: f64,
    pub rtol: f64,
}

impl Tolerance {
    /// No slack: numbers must be equal.
    pub const EXACT: Tolerance = Tolerance::new(0.0, 0.0);

    pub const fn new(atol: f64, rtol: f64) -> Self {
        Self { atol, rtol }
    }

    pub fn with_atol(mut self, atol: f64) -> Self {
        self.atol = atol;
        self
    }

    pub fn with_rtol(mut self, rtol: f64) -> Self {
        self.rtol = rtol;
        self
    }

    /// `|a - b| <= atol + rtol * |b|`. Not symmetric when `rtol > 0`.
    pub fn close(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.atol + self.rtol * b.abs()
    }
}

/// [`deep_equal`](crate::deep_equal) with numbers compared under `tolerance`.
pub fn approx_equal(a: &Value, b: &Value, tolerance: &Tolerance) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if numbers_equal(x, y) {
                return true;
            }
            match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => tolerance.close(x, y),
                _ => false,
            }
        }
        (Value::Array(arr_a), Value::Array(arr_b)) => {
            arr_a.len() == arr_b.len()
                && arr_a
                    .iter()
                    .zip(arr_b)
                    .all(|(item_a, item_b)| approx_equal(item_a, item_b, tolerance))
        }
        (Value::Object(obj_a), Value::Object(obj_b)) => {
            obj_a.len() == obj_b.len()
                && obj_a.iter().all(|(key, val_a)| {
                    obj_b
                        .get(key)
                        .is_some_and(|val_b| approx_equal(val_a, val_b, tolerance))
                })
        }
        _ => crate::deep_equal(a, b),
    }
}

/// Two entities are equal when they share a kind and their encodings are
/// approximately equal.
pub fn entities_equal(a: &dyn Parsable, b: &dyn Parsable, tolerance: &Tolerance) -> Result<bool> {
    if a.kind() != b.kind() {
        return Ok(false);
    }
    let wire_a = Value::Object(a.encode()?);
    let wire_b = Value::Object(b.encode()?);
    Ok(approx_equal(&wire_a, &wire_b, tolerance))
}
