//! Presence-tracked attribute accessors.
//!
//! Every attribute of an entity is a [`Property`]: an optional value plus the
//! attribute name. The category traits in this module ([`PlainSlot`],
//! [`EnumSlot`], [`EntitySlot`], [`EntityMapSlot`], [`EntityListSlot`],
//! [`SpecializedSlot`]) let the codec reach an attribute by name without
//! knowing its Rust type. Assignment from wire values is the only type gate:
//! `null` clears, anything of the wrong shape is a `TypeMismatch`.

mod enumerated;
mod nested;
mod specialized;

pub use enumerated::{enum_parse, enum_parse_list, WireEnum};
pub use nested::Nested;
pub use specialized::{Codec, SpecializedProperty};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::entity::Parsable;
use crate::error::{Error, Result};
use crate::resolver::TypeDescriptor;
use crate::schema::Category;
use crate::variant::{Parsed, VariantParser};
use crate::wire::describe;

#[derive(Debug, Clone, PartialEq)]
pub struct Property<T> {
    name: &'static str,
    value: Option<T>,
}

impl<T> Property<T> {
    pub const fn new(name: &'static str) -> Self {
        Self { name, value: None }
    }

    pub fn with_value(name: &'static str, value: T) -> Self {
        Self {
            name,
            value: Some(value),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// The value, or `NotSet` when absent.
    pub fn get(&self) -> Result<&T> {
        self.value.as_ref().ok_or_else(|| Error::not_set(self.name))
    }

    pub fn get_mut(&mut self) -> Result<&mut T> {
        let name = self.name;
        self.value.as_mut().ok_or_else(|| Error::not_set(name))
    }

    /// Assigns a value; `None` resets the attribute to unset.
    pub fn set(&mut self, value: impl Into<Option<T>>) {
        self.value = value.into();
    }

    pub fn clear(&mut self) {
        self.value = None;
    }

    pub fn take(&mut self) -> Option<T> {
        self.value.take()
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }
}

impl<T: Clone> Property<T> {
    pub fn cloned(&self) -> Result<T> {
        self.get().cloned()
    }
}

/// Name and presence, shared by every slot.
pub trait Presence {
    fn name(&self) -> &'static str;
    fn is_set(&self) -> bool;
    fn clear(&mut self);
}

impl<T> Presence for Property<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_set(&self) -> bool {
        self.value.is_some()
    }

    fn clear(&mut self) {
        self.value = None;
    }
}

pub trait PlainSlot: Presence {
    fn encode_wire(&self) -> Result<Option<Value>>;
    fn assign_wire(&mut self, value: &Value) -> Result<()>;
}

impl<T> PlainSlot for Property<T>
where
    T: Serialize + DeserializeOwned,
{
    fn encode_wire(&self) -> Result<Option<Value>> {
        self.value
            .as_ref()
            .map(|value| {
                serde_json::to_value(value).map_err(|err| {
                    Error::type_mismatch(self.name, "serializable value", err.to_string())
                })
            })
            .transpose()
    }

    fn assign_wire(&mut self, value: &Value) -> Result<()> {
        if value.is_null() {
            self.clear();
            return Ok(());
        }
        let typed = serde_json::from_value::<T>(value.clone()).map_err(|_| {
            Error::type_mismatch(self.name, std::any::type_name::<T>(), describe(value))
        })?;
        self.value = Some(typed);
        Ok(())
    }
}

pub trait EnumSlot: Presence {
    fn encode_wire(&self) -> Option<Value>;
    fn assign_wire(&mut self, value: &Value) -> Result<()>;
}

pub trait EntitySlot: Presence {
    fn entity(&self) -> Option<&dyn Parsable>;
    /// The kind every value is built as, for slots with a static target.
    fn target(&self) -> Option<TypeDescriptor>;
    fn assign(&mut self, parsed: Parsed, parser: &VariantParser<'_>) -> Result<()>;
}

pub trait EntityMapSlot: Presence {
    fn entries(&self) -> Option<Vec<(&str, &dyn Parsable)>>;
    fn target(&self) -> Option<TypeDescriptor>;
    fn assign(&mut self, entries: Vec<(String, Parsed)>, parser: &VariantParser<'_>) -> Result<()>;
}

pub trait EntityListSlot: Presence {
    fn items(&self) -> Option<Vec<&dyn Parsable>>;
    fn target(&self) -> Option<TypeDescriptor>;
    fn assign(&mut self, items: Vec<Parsed>, parser: &VariantParser<'_>) -> Result<()>;
}

pub trait SpecializedSlot: Presence {
    fn encode_special(&self) -> Result<Option<Value>>;
    fn decode_special(&mut self, value: &Value) -> Result<()>;
}

/// Read access to one attribute, tagged with its category.
pub enum Slot<'a> {
    Plain(&'a dyn PlainSlot),
    Enumerated(&'a dyn EnumSlot),
    Entity(&'a dyn EntitySlot),
    Specialized(&'a dyn SpecializedSlot),
    EntityMap(&'a dyn EntityMapSlot),
    EntityList(&'a dyn EntityListSlot),
}

impl Slot<'_> {
    pub fn category(&self) -> Category {
        match self {
            Slot::Plain(_) => Category::Plain,
            Slot::Enumerated(_) => Category::Enumerated,
            Slot::Entity(_) => Category::Entity,
            Slot::Specialized(_) => Category::Specialized,
            Slot::EntityMap(_) => Category::EntityMap,
            Slot::EntityList(_) => Category::EntityList,
        }
    }

    pub fn is_set(&self) -> bool {
        match self {
            Slot::Plain(slot) => slot.is_set(),
            Slot::Enumerated(slot) => slot.is_set(),
            Slot::Entity(slot) => slot.is_set(),
            Slot::Specialized(slot) => slot.is_set(),
            Slot::EntityMap(slot) => slot.is_set(),
            Slot::EntityList(slot) => slot.is_set(),
        }
    }
}

/// Write access to one attribute, tagged with its category.
pub enum SlotMut<'a> {
    Plain(&'a mut dyn PlainSlot),
    Enumerated(&'a mut dyn EnumSlot),
    Entity(&'a mut dyn EntitySlot),
    Specialized(&'a mut dyn SpecializedSlot),
    EntityMap(&'a mut dyn EntityMapSlot),
    EntityList(&'a mut dyn EntityListSlot),
}

impl SlotMut<'_> {
    pub fn category(&self) -> Category {
        match self {
            SlotMut::Plain(_) => Category::Plain,
            SlotMut::Enumerated(_) => Category::Enumerated,
            SlotMut::Entity(_) => Category::Entity,
            SlotMut::Specialized(_) => Category::Specialized,
            SlotMut::EntityMap(_) => Category::EntityMap,
            SlotMut::EntityList(_) => Category::EntityList,
        }
    }

    pub fn clear(&mut self) {
        match self {
            SlotMut::Plain(slot) => slot.clear(),
            SlotMut::Enumerated(slot) => slot.clear(),
            SlotMut::Entity(slot) => slot.clear(),
            SlotMut::Specialized(slot) => slot.clear(),
            SlotMut::EntityMap(slot) => slot.clear(),
            SlotMut::EntityList(slot) => slot.clear(),
        }
    }
}
