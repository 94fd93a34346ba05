//! plugnparse - schema-less entity (de)serialization with polymorphic type
//! resolution.
//!
//! Entities declare, per attribute, one of six encoding categories in an
//! [`AttributeSchema`]; the codec walks those declarations to turn an entity
//! into a wire dict (`serde_json::Map`) and back. Nested values carry
//! `parsable_type` / `parsable_module` tags, which the [`TypeResolver`] maps
//! back to constructible types. [`PluginRegistry`] builds implementations of a
//! capability trait from a declared kind name.
//!
//! ```
//! use plugnparse::{
//!     Constructible, Kind, Parsable, ParsableBase, Property, Result, Slot,
//!     SlotMut, WireDict,
//! };
//!
//! #[derive(Debug, Clone)]
//! struct Point {
//!     base: ParsableBase,
//!     x: Property<i64>,
//! }
//!
//! impl Parsable for Point {
//!     fn kind(&self) -> Kind {
//!         Self::KIND
//!     }
//!     fn base(&self) -> &ParsableBase {
//!         &self.base
//!     }
//!     fn base_mut(&mut self) -> &mut ParsableBase {
//!         &mut self.base
//!     }
//!     fn slot(&self, name: &str) -> Option<Slot<'_>> {
//!         match name {
//!             "x" => Some(Slot::Plain(&self.x)),
//!             _ => self.base.slot(name),
//!         }
//!     }
//!     fn slot_mut(&mut self, name: &str) -> Option<SlotMut<'_>> {
//!         match name {
//!             "x" => Some(SlotMut::Plain(&mut self.x)),
//!             _ => self.base.slot_mut(name),
//!         }
//!     }
//! }
//!
//! impl Constructible for Point {
//!     const KIND: Kind = Kind::new("Point", "doc");
//!     fn construct(_args: &WireDict) -> Result<Self> {
//!         let mut base = ParsableBase::new();
//!         base.schema_mut().plain("x");
//!         Ok(Self { base, x: Property::new("x") })
//!     }
//! }
//!
//! let mut point = Point::construct(&WireDict::new()).unwrap();
//! point.x.set(3);
//! let wire = point.encode().unwrap();
//! assert_eq!(wire["x"], 3);
//! ```

mod codec;
pub mod entity;
pub mod error;
pub mod plugin;
pub mod property;
pub mod resolver;
pub mod schema;
pub mod variant;
pub mod wire;

pub use entity::{Constructible, EntityObject, Kind, Parsable, ParsableBase};
pub use error::{Error, ErrorKind, Result};
pub use plugin::{
    Capability, GenericParameters, Parameters, PluginDescriptor, PluginParameters,
    PluginRegistry, PluginType, PropertyNames,
};
pub use property::{
    enum_parse, enum_parse_list, Codec, EntityListSlot, EntityMapSlot, EntitySlot, EnumSlot,
    Nested, PlainSlot, Presence, Property, Slot, SlotMut, SpecializedProperty, SpecializedSlot,
    WireEnum,
};
pub use resolver::{
    Facet, InventoryLoader, Namespace, NamespaceLoader, Registration, Symbol, TypeDescriptor,
    TypeResolver,
};
pub use schema::{split_ordered_and_unordered, AttributeSchema, Category};
pub use variant::{Parsed, VariantParser};
pub use wire::{
    describe, required_arg, ParseOptions, Tags, WireDict, WireKeys, GENERIC_PARSABLE_MODULE,
    GENERIC_PARSABLE_TYPE,
};

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}

/// Makes entity types resolvable by their [`Kind`].
#[macro_export]
macro_rules! register_entity {
    ($($ty:ty),+ $(,)?) => {
        $(
            $crate::__private::inventory::submit! {
                $crate::Registration::entity::<$ty>()
            }
        )+
    };
}

/// Registers plugin implementations of a capability.
///
/// ```ignore
/// register_plugin!(dyn Strategy => FastStrategy, SlowStrategy);
/// ```
#[macro_export]
macro_rules! register_plugin {
    ($cap:ty => $($ty:ty),+ $(,)?) => {
        $(
            $crate::__private::inventory::submit! {
                $crate::Registration::plugin::<$cap, $ty>()
            }
        )+
    };
}

/// Registers plugin implementations that are also entities, so they can be
/// parsed by name and resolved from tagged dicts.
#[macro_export]
macro_rules! register_parsable_plugin {
    ($cap:ty => $($ty:ty),+ $(,)?) => {
        $(
            $crate::__private::inventory::submit! {
                $crate::Registration::parsable_plugin::<$cap, $ty>()
            }
            $crate::__private::inventory::submit! {
                $crate::Registration::entity::<$ty>()
            }
        )+
    };
}
