//! The generic walk behind [`Parsable::encode`] and [`Parsable::decode`].

use serde_json::Value;

use crate::entity::Parsable;
use crate::error::{Error, Result};
use crate::property::{Slot, SlotMut};
use crate::resolver::TypeDescriptor;
use crate::variant::{Parsed, VariantParser};
use crate::wire::{describe, WireDict, WireKeys};

pub(crate) fn encode<P: Parsable + ?Sized>(entity: &P, keys: &WireKeys) -> Result<WireDict> {
    let mut wire = WireDict::new();
    for (name, category) in entity.schema().collect_categorized() {
        let slot = match entity.slot(name) {
            Some(slot) if slot.category() == category => slot,
            _ => {
                return Err(Error::undeclared_attribute(
                    entity.kind().to_string(),
                    name,
                    category.as_str(),
                ))
            }
        };
        if let Some(value) = encode_slot(&slot, keys)? {
            wire.insert(name.to_string(), value);
        }
    }
    Ok(wire)
}

fn encode_slot(slot: &Slot<'_>, keys: &WireKeys) -> Result<Option<Value>> {
    match slot {
        Slot::Plain(slot) => slot.encode_wire(),
        Slot::Enumerated(slot) => Ok(slot.encode_wire()),
        Slot::Specialized(slot) => slot.encode_special(),
        Slot::Entity(slot) => slot
            .entity()
            .map(|entity| entity.encode_tagged_with(keys).map(Value::Object))
            .transpose(),
        Slot::EntityMap(slot) => slot
            .entries()
            .map(|entries| -> Result<Value> {
                let mut map = WireDict::new();
                for (key, entity) in entries {
                    map.insert(key.to_string(), Value::Object(entity.encode_tagged_with(keys)?));
                }
                Ok(Value::Object(map))
            })
            .transpose(),
        Slot::EntityList(slot) => slot
            .items()
            .map(|items| {
                items
                    .into_iter()
                    .map(|entity| entity.encode_tagged_with(keys).map(Value::Object))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array)
            })
            .transpose(),
    }
}

/// Desired-order names first, then the rest. Keys missing from `wire` are
/// left alone; the first failing attribute aborts the walk.
pub(crate) fn decode<P: Parsable + ?Sized>(
    entity: &mut P,
    wire: &WireDict,
    only_if_missing: bool,
    parser: &VariantParser<'_>,
) -> Result<()> {
    let (ordered, unordered) = entity.split_ordered_and_unordered()?;
    for name in ordered.into_iter().chain(unordered) {
        let Some(value) = wire.get(name) else {
            continue;
        };
        if only_if_missing && entity.has(name) {
            continue;
        }
        assign(entity, name, value, parser)?;
    }
    Ok(())
}

pub(crate) fn assign<P: Parsable + ?Sized>(
    entity: &mut P,
    name: &str,
    value: &Value,
    parser: &VariantParser<'_>,
) -> Result<()> {
    let kind = entity.kind();
    let Some(category) = entity.schema().category_of(name) else {
        return Err(Error::undeclared_attribute(kind.to_string(), name, "nothing"));
    };
    let mut slot = match entity.slot_mut(name) {
        Some(slot) if slot.category() == category => slot,
        _ => {
            return Err(Error::undeclared_attribute(
                kind.to_string(),
                name,
                category.as_str(),
            ))
        }
    };
    if value.is_null() {
        slot.clear();
        return Ok(());
    }
    match slot {
        SlotMut::Plain(slot) => slot.assign_wire(value),
        SlotMut::Enumerated(slot) => slot.assign_wire(value),
        SlotMut::Specialized(slot) => slot.decode_special(value),
        SlotMut::Entity(slot) => {
            let parsed = parse_element(parser, slot.target(), name, value)?;
            slot.assign(parsed, parser)
        }
        SlotMut::EntityMap(slot) => {
            let target = slot.target();
            let entries = expect_dict(name, value, "dict of entity dicts")?
                .iter()
                .map(|(key, item)| -> Result<(String, Parsed)> {
                    Ok((key.clone(), parse_element(parser, target, name, item)?))
                })
                .collect::<Result<Vec<_>>>()?;
            slot.assign(entries, parser)
        }
        SlotMut::EntityList(slot) => {
            let Value::Array(items) = value else {
                return Err(Error::type_mismatch(name, "list of entity dicts", describe(value)));
            };
            let target = slot.target();
            let parsed = items
                .iter()
                .map(|item| parse_element(parser, target, name, item))
                .collect::<Result<Vec<_>>>()?;
            slot.assign(parsed, parser)
        }
    }
}

/// Static targets are built from the dict directly and its tags are not
/// resolved; polymorphic slots go through the tags.
fn parse_element(
    parser: &VariantParser<'_>,
    target: Option<TypeDescriptor>,
    name: &str,
    value: &Value,
) -> Result<Parsed> {
    let wire = expect_dict(name, value, "entity dict")?;
    match target {
        Some(descriptor) => parser.nested().parse_with(descriptor, wire),
        None => parser.parse_nested(wire),
    }
}

fn expect_dict<'v>(name: &str, value: &'v Value, expected: &str) -> Result<&'v WireDict> {
    value
        .as_object()
        .ok_or_else(|| Error::type_mismatch(name, expected, describe(value)))
}
