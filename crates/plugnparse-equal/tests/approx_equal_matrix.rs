//! Tolerance-aware equality matrix over scalars, arrays and entities
//! carrying the same values.

use plugnparse::{Kind, Parsable, ParsableBase, Property, Slot, SlotMut};
use plugnparse_equal::{approx_equal, deep_equal, entities_equal, Tolerance};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
struct Holder {
    base: ParsableBase,
    value: Property<Value>,
}

impl Holder {
    fn new(value: Value) -> Self {
        let mut base = ParsableBase::new();
        base.schema_mut().plain("value");
        Self {
            base,
            value: Property::with_value("value", value),
        }
    }
}

impl Parsable for Holder {
    fn kind(&self) -> Kind {
        Kind::new("Holder", "equal-tests")
    }

    fn base(&self) -> &ParsableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ParsableBase {
        &mut self.base
    }

    fn slot(&self, name: &str) -> Option<Slot<'_>> {
        match name {
            "value" => Some(Slot::Plain(&self.value)),
            _ => self.base.slot(name),
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<SlotMut<'_>> {
        match name {
            "value" => Some(SlotMut::Plain(&mut self.value)),
            _ => self.base.slot_mut(name),
        }
    }
}

#[derive(Debug, Clone)]
struct Other {
    base: ParsableBase,
}

impl Parsable for Other {
    fn kind(&self) -> Kind {
        Kind::new("Other", "equal-tests")
    }

    fn base(&self) -> &ParsableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ParsableBase {
        &mut self.base
    }

    fn slot(&self, name: &str) -> Option<Slot<'_>> {
        self.base.slot(name)
    }

    fn slot_mut(&mut self, name: &str) -> Option<SlotMut<'_>> {
        self.base.slot_mut(name)
    }
}

fn exact() -> Tolerance {
    Tolerance::EXACT
}

fn atol(atol: f64) -> Tolerance {
    Tolerance::EXACT.with_atol(atol)
}

fn rtol(rtol: f64) -> Tolerance {
    Tolerance::EXACT.with_rtol(rtol)
}

fn cases() -> Vec<(Value, Value, Tolerance, bool)> {
    vec![
        (json!(1), json!(""), exact(), false),
        (json!(1), json!(2), exact(), false),
        (json!(1), json!(1), exact(), true),
        (json!(1), json!(3), atol(1.0), false),
        (json!(1), json!(2), atol(1.0), true),
        (json!(3), json!(1), rtol(1.0), false),
        (json!(1), json!(3), rtol(1.0), true),
        (json!(0.1), json!(0.2), exact(), false),
        (json!(0.1), json!(0.1), exact(), true),
        (json!(0.1), json!(0.3), atol(0.1), false),
        (json!(0.1), json!(0.2), atol(0.1), true),
        (json!(0.3), json!(0.1), rtol(1.0), false),
        (json!(0.1), json!(0.3), rtol(1.0), true),
        (json!([0, 1, 2]), json!([1, 2, 3]), exact(), false),
        (json!([0, 1, 2]), json!([0, 1, 2]), exact(), true),
        (json!([0, 1, 2]), json!([2, 3, 4]), atol(1.0), false),
        (json!([0, 1, 2]), json!([1, 2, 3]), atol(1.0), true),
        (json!([2, 3, 4]), json!([0, 1, 2]), rtol(1.0), false),
        (json!([0, 1, 2]), json!([2, 3, 4]), rtol(1.0), true),
        (json!(["0", "1", "2"]), json!([0, 1, 2]), exact(), false),
        (json!(["0", "1", "2"]), json!(["0", "1", "2"]), exact(), true),
        (json!(["0", null, 2]), json!(["0", "1", "2"]), exact(), false),
        (json!(["0", null, 2]), json!(["0", null, 2]), exact(), true),
        (json!([0, 1]), json!([0, 1, 2]), atol(10.0), false),
        (json!({"a": 1, "b": [1.5]}), json!({"b": [1.0], "a": 1}), atol(0.5), true),
        (json!({"a": 1}), json!({"a": 1, "b": 2}), atol(10.0), false),
    ]
}

#[test]
fn approx_equal_matrix() {
    for (a, b, tolerance, expected) in cases() {
        assert_eq!(
            approx_equal(&a, &b, &tolerance),
            expected,
            "approx_equal({a}, {b}, {tolerance:?})"
        );
    }
}

#[test]
fn entities_equal_matrix() {
    for (a, b, tolerance, expected) in cases() {
        let holder_a = Holder::new(a.clone());
        let holder_b = Holder::new(b.clone());
        assert_eq!(
            entities_equal(&holder_a, &holder_b, &tolerance).unwrap(),
            expected,
            "entities_equal({a}, {b}, {tolerance:?})"
        );
    }
}

#[test]
fn exact_tolerance_agrees_with_deep_equal() {
    for (a, b, _, _) in cases() {
        assert_eq!(approx_equal(&a, &b, &Tolerance::EXACT), deep_equal(&a, &b));
    }
}

#[test]
fn entities_of_different_kinds_are_unequal() {
    let holder = Holder::new(json!(1));
    let other = Other {
        base: ParsableBase::new(),
    };
    assert!(!entities_equal(&holder, &other, &atol(100.0)).unwrap());
}

#[test]
fn unset_attributes_compare_as_absent() {
    let mut unset = Holder::new(json!(1));
    unset.value.clear();
    let set = Holder::new(json!(1));
    assert!(!entities_equal(&unset, &set, &exact()).unwrap());
    assert!(entities_equal(&unset, &unset.clone(), &exact()).unwrap());
}
