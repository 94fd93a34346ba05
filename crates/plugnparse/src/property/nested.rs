use std::fmt::Debug;

use indexmap::IndexMap;

use super::{EntityListSlot, EntityMapSlot, EntitySlot, Property};
use crate::entity::{Constructible, Parsable};
use crate::error::{Error, Result};
use crate::resolver::TypeDescriptor;
use crate::variant::{Parsed, VariantParser};
use crate::wire::WireDict;

/// Element type of the nested categories.
///
/// Every [`Constructible`] entity is `Nested` with itself as the static
/// target; `Box<dyn Parsable>` is the polymorphic element that accepts any
/// resolved kind.
pub trait Nested: Clone + Debug + 'static {
    fn entity(&self) -> &dyn Parsable;

    /// The kind nested dicts are built as, tags notwithstanding. `None`
    /// for polymorphic elements, which resolve each dict by its tags.
    fn target() -> Option<TypeDescriptor>;

    /// Narrows a resolved entity to this element type.
    fn from_entity(entity: Box<dyn Parsable>) -> Option<Self>;

    /// Builds an element from an untagged dict, when the element type has a
    /// static target to construct.
    fn from_raw(wire: &WireDict, parser: &VariantParser<'_>) -> Result<Option<Self>>;

    fn expected() -> String;
}

impl<T: Constructible> Nested for T {
    fn entity(&self) -> &dyn Parsable {
        self
    }

    fn target() -> Option<TypeDescriptor> {
        Some(TypeDescriptor::of::<T>())
    }

    fn from_entity(entity: Box<dyn Parsable>) -> Option<Self> {
        entity.downcast::<T>().map(|boxed| *boxed)
    }

    fn from_raw(wire: &WireDict, parser: &VariantParser<'_>) -> Result<Option<Self>> {
        match parser.parse_with(TypeDescriptor::of::<T>(), wire)? {
            Parsed::Entity(entity) => Ok(T::from_entity(entity)),
            Parsed::Raw(_) => Ok(None),
        }
    }

    fn expected() -> String {
        T::KIND.to_string()
    }
}

impl Nested for Box<dyn Parsable> {
    fn entity(&self) -> &dyn Parsable {
        self.as_ref()
    }

    fn target() -> Option<TypeDescriptor> {
        None
    }

    fn from_entity(entity: Box<dyn Parsable>) -> Option<Self> {
        Some(entity)
    }

    fn from_raw(_wire: &WireDict, _parser: &VariantParser<'_>) -> Result<Option<Self>> {
        Ok(None)
    }

    fn expected() -> String {
        "tagged entity".to_string()
    }
}

/// Typed instances pass through, raw dicts are constructed as the static
/// target, anything else is a mismatch.
fn coerce<E: Nested>(attribute: &str, parsed: Parsed, parser: &VariantParser<'_>) -> Result<E> {
    match parsed {
        Parsed::Entity(entity) => {
            let found = entity.kind().to_string();
            E::from_entity(entity).ok_or_else(|| Error::type_mismatch(attribute, E::expected(), found))
        }
        Parsed::Raw(wire) => E::from_raw(&wire, parser)?
            .ok_or_else(|| Error::type_mismatch(attribute, E::expected(), "untyped dict")),
    }
}

impl<E: Nested> EntitySlot for Property<E> {
    fn entity(&self) -> Option<&dyn Parsable> {
        self.value().map(Nested::entity)
    }

    fn target(&self) -> Option<TypeDescriptor> {
        E::target()
    }

    fn assign(&mut self, parsed: Parsed, parser: &VariantParser<'_>) -> Result<()> {
        let value = coerce::<E>(self.name(), parsed, parser)?;
        self.set(value);
        Ok(())
    }
}

impl<E: Nested> EntityMapSlot for Property<IndexMap<String, E>> {
    fn entries(&self) -> Option<Vec<(&str, &dyn Parsable)>> {
        self.value().map(|map| {
            map.iter()
                .map(|(key, value)| (key.as_str(), value.entity()))
                .collect()
        })
    }

    fn target(&self) -> Option<TypeDescriptor> {
        E::target()
    }

    fn assign(&mut self, entries: Vec<(String, Parsed)>, parser: &VariantParser<'_>) -> Result<()> {
        let mut map = IndexMap::with_capacity(entries.len());
        for (key, parsed) in entries {
            let value = coerce::<E>(self.name(), parsed, parser)?;
            map.insert(key, value);
        }
        self.set(map);
        Ok(())
    }
}

impl<E: Nested> EntityListSlot for Property<Vec<E>> {
    fn items(&self) -> Option<Vec<&dyn Parsable>> {
        self.value()
            .map(|items| items.iter().map(Nested::entity).collect())
    }

    fn target(&self) -> Option<TypeDescriptor> {
        E::target()
    }

    fn assign(&mut self, items: Vec<Parsed>, parser: &VariantParser<'_>) -> Result<()> {
        let values = items
            .into_iter()
            .map(|parsed| coerce::<E>(self.name(), parsed, parser))
            .collect::<Result<Vec<_>>>()?;
        self.set(values);
        Ok(())
    }
}
