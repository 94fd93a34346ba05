//! The serializable entity contract.
//!
//! An entity owns a [`ParsableBase`] (its [`AttributeSchema`] plus the
//! `version` attribute every entity carries) and exposes each declared
//! attribute as a [`Slot`]. Everything else (encode, decode, merge, dynamic
//! assignment) is provided on top of those two hooks.
//!
//! Derived entities embed the entity they extend, append their own names to
//! the schema in their constructor and forward unknown slot names to the
//! embedded value.

use std::any::Any;
use std::fmt;

use serde_json::Value;

use crate::codec;
use crate::error::Result;
use crate::property::{Property, Slot, SlotMut};
use crate::resolver::TypeResolver;
use crate::schema::AttributeSchema;
use crate::variant::VariantParser;
use crate::wire::{WireDict, WireKeys};

/// The `(name, namespace)` pair written to the tag keys of a nested value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Kind {
    pub name: &'static str,
    pub namespace: &'static str,
}

impl Kind {
    pub const fn new(name: &'static str, namespace: &'static str) -> Self {
        Self { name, namespace }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.namespace, self.name)
    }
}

/// Root of every composition chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsableBase {
    schema: AttributeSchema,
    pub version: Property<String>,
}

impl Default for ParsableBase {
    fn default() -> Self {
        Self::new()
    }
}

impl ParsableBase {
    pub const VERSION: &'static str = "version";

    pub fn new() -> Self {
        let mut schema = AttributeSchema::new();
        schema.plain(Self::VERSION);
        Self {
            schema,
            version: Property::new(Self::VERSION),
        }
    }

    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    pub fn schema_mut(&mut self) -> &mut AttributeSchema {
        &mut self.schema
    }

    pub fn slot(&self, name: &str) -> Option<Slot<'_>> {
        match name {
            Self::VERSION => Some(Slot::Plain(&self.version)),
            _ => None,
        }
    }

    pub fn slot_mut(&mut self, name: &str) -> Option<SlotMut<'_>> {
        match name {
            Self::VERSION => Some(SlotMut::Plain(&mut self.version)),
            _ => None,
        }
    }
}

/// Object plumbing for `dyn Parsable`, implemented for every cloneable entity.
pub trait EntityObject: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn clone_entity(&self) -> Box<dyn Parsable>;
}

impl<T: Parsable + Clone> EntityObject for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn clone_entity(&self) -> Box<dyn Parsable> {
        Box::new(self.clone())
    }
}

pub trait Parsable: EntityObject + fmt::Debug {
    fn kind(&self) -> Kind;

    fn base(&self) -> &ParsableBase;

    fn base_mut(&mut self) -> &mut ParsableBase;

    /// Read access to the attribute `name`, `None` when not declared.
    fn slot(&self, name: &str) -> Option<Slot<'_>>;

    fn slot_mut(&mut self, name: &str) -> Option<SlotMut<'_>>;

    fn schema(&self) -> &AttributeSchema {
        self.base().schema()
    }

    /// Encodes every present attribute. Nested values carry their tags; the
    /// entity itself does not (see [`Parsable::encode_tagged`]).
    fn encode(&self) -> Result<WireDict> {
        self.encode_with(&WireKeys::default())
    }

    fn encode_with(&self, keys: &WireKeys) -> Result<WireDict> {
        codec::encode(self, keys)
    }

    fn encode_tagged(&self) -> Result<WireDict> {
        self.encode_tagged_with(&WireKeys::default())
    }

    fn encode_tagged_with(&self, keys: &WireKeys) -> Result<WireDict> {
        let mut wire = self.encode_with(keys)?;
        keys.tag(&mut wire, self.kind());
        Ok(wire)
    }

    /// Applies `wire` through the process-wide resolver.
    fn decode(&mut self, wire: &WireDict, only_if_missing: bool) -> Result<()> {
        let resolver = TypeResolver::global();
        let parser = VariantParser::new(&resolver);
        self.decode_with(wire, only_if_missing, &parser)
    }

    fn decode_with(
        &mut self,
        wire: &WireDict,
        only_if_missing: bool,
        parser: &VariantParser<'_>,
    ) -> Result<()> {
        codec::decode(self, wire, only_if_missing, parser)
    }

    /// Fills the attributes still unset on `self` from `other`.
    fn merge(&mut self, other: &dyn Parsable) -> Result<()> {
        let wire = other.encode()?;
        self.decode(&wire, true)
    }

    fn has(&self, name: &str) -> bool {
        self.slot(name).is_some_and(|slot| slot.is_set())
    }

    /// Assigns one attribute from a wire value, with the same coercion as
    /// [`Parsable::decode`].
    fn set_attribute(&mut self, name: &str, value: &Value) -> Result<()> {
        let resolver = TypeResolver::global();
        let parser = VariantParser::new(&resolver);
        codec::assign(self, name, value, &parser)
    }

    fn collect_all_attributes(&self) -> Vec<&'static str> {
        self.schema().collect_all_attributes()
    }

    fn split_ordered_and_unordered(&self) -> Result<(Vec<&'static str>, Vec<&'static str>)> {
        self.schema().split_ordered_and_unordered()
    }
}

/// A concrete entity the resolver can build from a wire dict.
pub trait Constructible: Parsable + Clone {
    const KIND: Kind;

    /// Keys that must be present to construct an instance. Derived entities
    /// repeat the parameters of the entity they extend.
    fn required_parameters() -> Vec<&'static str> {
        Vec::new()
    }

    fn construct(args: &WireDict) -> Result<Self>;
}

impl dyn Parsable {
    pub fn is<T: Parsable>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Parsable>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Parsable>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    pub fn downcast<T: Parsable>(self: Box<Self>) -> Option<Box<T>> {
        self.into_any().downcast::<T>().ok()
    }
}

impl Clone for Box<dyn Parsable> {
    fn clone(&self) -> Self {
        (**self).clone_entity()
    }
}

/// Same kind and equal encodings.
impl PartialEq for dyn Parsable {
    fn eq(&self, other: &Self) -> bool {
        if self.kind() != other.kind() {
            return false;
        }
        match (self.encode(), other.encode()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}
