//! Capability plugins: build a concrete implementation of a trait from a
//! declared kind name.
//!
//! A capability is a trait object type (`dyn Strategy`) implementing
//! [`Capability`]. Implementations implement [`PluginType`] for it and are
//! registered with [`register_plugin!`](crate::register_plugin) or
//! [`PluginRegistry::register`].

mod registry;

pub use registry::PluginRegistry;

use serde_json::Value;

use crate::entity::{Constructible, Kind, Parsable, ParsableBase};
use crate::error::{Error, Result};
use crate::property::{Property, Slot, SlotMut};
use crate::variant::VariantParser;
use crate::wire::{describe, WireDict, GENERIC_PARSABLE_MODULE, GENERIC_PARSABLE_TYPE};

/// Where a parameters object stores the plugin kind and namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyNames {
    pub plugin: Option<&'static str>,
    pub module: Option<&'static str>,
}

impl PropertyNames {
    pub const GENERIC: PropertyNames =
        PropertyNames::new(GENERIC_PARSABLE_TYPE, Some(GENERIC_PARSABLE_MODULE));

    pub const fn new(plugin: &'static str, module: Option<&'static str>) -> Self {
        Self {
            plugin: Some(plugin),
            module,
        }
    }
}

/// Implemented for the trait object of a plugin capability.
pub trait Capability: 'static {
    const NAME: &'static str;

    /// Property names read by `*_from_parameters` when defaults are off.
    fn property_names() -> PropertyNames {
        PropertyNames::default()
    }
}

/// A parameters type that names the properties holding the plugin kind.
pub trait PluginParameters {
    const PLUGIN_PROPERTY: &'static str;
    const MODULE_PROPERTY: Option<&'static str> = None;

    fn property_names() -> PropertyNames {
        PropertyNames::new(Self::PLUGIN_PROPERTY, Self::MODULE_PROPERTY)
    }
}

pub trait PluginType<B: ?Sized + 'static>: Sized + 'static {
    const KIND: Kind;

    fn construct(args: &WireDict) -> Result<Self>;

    fn upcast(self: Box<Self>) -> Box<B>;
}

/// Entry points for building one plugin kind as a `Box<B>`.
pub struct PluginDescriptor<B: ?Sized + 'static> {
    pub kind: Kind,
    construct: fn(&WireDict) -> Result<Box<B>>,
    parse: Option<fn(&WireDict, &WireDict, &VariantParser<'_>) -> Result<Box<B>>>,
}

impl<B: ?Sized + 'static> Clone for PluginDescriptor<B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: ?Sized + 'static> Copy for PluginDescriptor<B> {}

impl<B: ?Sized + 'static> std::fmt::Debug for PluginDescriptor<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("kind", &self.kind)
            .field("supports_decode", &self.supports_decode())
            .finish()
    }
}

impl<B: ?Sized + 'static> PluginDescriptor<B> {
    pub fn of<T: PluginType<B>>() -> Self {
        Self {
            kind: T::KIND,
            construct: construct_plugin::<B, T>,
            parse: None,
        }
    }

    /// A descriptor whose instances can also be completed from a values dict.
    pub fn parsable<T: PluginType<B> + Constructible>() -> Self {
        Self {
            kind: <T as PluginType<B>>::KIND,
            construct: construct_plugin::<B, T>,
            parse: Some(parse_plugin::<B, T>),
        }
    }

    pub fn supports_decode(&self) -> bool {
        self.parse.is_some()
    }

    pub fn construct(&self, args: &WireDict) -> Result<Box<B>> {
        (self.construct)(args)
    }

    /// Constructs from `args`, then decodes `values` into the instance.
    pub fn parse(
        &self,
        args: &WireDict,
        values: &WireDict,
        parser: &VariantParser<'_>,
    ) -> Result<Box<B>> {
        match self.parse {
            Some(parse) => parse(args, values, parser),
            None => Err(Error::construction(
                self.kind.to_string(),
                "the plugin type does not support decode",
            )),
        }
    }
}

fn construct_plugin<B: ?Sized + 'static, T: PluginType<B>>(args: &WireDict) -> Result<Box<B>> {
    let instance = <T as PluginType<B>>::construct(args)?;
    Ok(T::upcast(Box::new(instance)))
}

fn parse_plugin<B, T>(args: &WireDict, values: &WireDict, parser: &VariantParser<'_>) -> Result<Box<B>>
where
    B: ?Sized + 'static,
    T: PluginType<B> + Constructible,
{
    let mut instance = <T as PluginType<B>>::construct(args)?;
    parser.decode(&mut instance, values, false)?;
    Ok(T::upcast(Box::new(instance)))
}

/// The source of a plugin's `(kind, namespace)` pair.
#[derive(Debug, Clone, Copy)]
pub enum Parameters<'a> {
    Dict(&'a WireDict),
    Entity(&'a dyn Parsable),
}

impl<'a> Parameters<'a> {
    pub fn dict(dict: &'a WireDict) -> Self {
        Parameters::Dict(dict)
    }

    pub fn entity(entity: &'a dyn Parsable) -> Self {
        Parameters::Entity(entity)
    }

    /// Reads the string stored under `key`. Missing, unset and non-string
    /// properties are errors.
    fn read(&self, capability: &str, key: &str) -> Result<String> {
        let value = match self {
            Parameters::Dict(dict) => dict.get(key).cloned().ok_or_else(|| {
                Error::plugin_property(
                    capability,
                    format!("`{key}` is missing from the parameters dict"),
                )
            })?,
            Parameters::Entity(entity) => {
                let kind = entity.kind();
                let slot = entity.slot(key).ok_or_else(|| {
                    Error::plugin_property(capability, format!("`{kind}` has no `{key}` property"))
                })?;
                if !slot.is_set() {
                    return Err(Error::plugin_property(
                        capability,
                        format!("`{key}` has not been assigned on `{kind}`"),
                    ));
                }
                let encoded = match slot {
                    Slot::Plain(slot) => slot.encode_wire()?,
                    Slot::Enumerated(slot) => slot.encode_wire(),
                    other => {
                        return Err(Error::plugin_property(
                            capability,
                            format!("`{key}` is a {} property", other.category()),
                        ))
                    }
                };
                encoded.unwrap_or(Value::Null)
            }
        };
        match value {
            Value::String(name) => Ok(name),
            other => Err(Error::plugin_property(
                capability,
                format!("`{key}` holds {} instead of a name", describe(&other)),
            )),
        }
    }

    /// Extracts `(kind, namespace)` using `names`. The namespace is only read
    /// when `names` declares a module property.
    pub fn extract(
        &self,
        capability: &str,
        names: PropertyNames,
    ) -> Result<(String, Option<String>)> {
        let Some(plugin_key) = names.plugin else {
            return Err(Error::plugin_property(
                capability,
                "no plugin property name is declared",
            ));
        };
        let name = self.read(capability, plugin_key)?;
        let namespace = names
            .module
            .map(|key| self.read(capability, key))
            .transpose()?;
        Ok((name, namespace))
    }
}

impl<'a> From<&'a WireDict> for Parameters<'a> {
    fn from(dict: &'a WireDict) -> Self {
        Parameters::Dict(dict)
    }
}

/// Parameters entity exposing the two generic tag keys as plain attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericParameters {
    base: ParsableBase,
    pub parsable_type: Property<String>,
    pub parsable_module: Property<String>,
}

impl Default for GenericParameters {
    fn default() -> Self {
        Self::new()
    }
}

impl GenericParameters {
    pub fn new() -> Self {
        let mut base = ParsableBase::new();
        base.schema_mut()
            .plain(GENERIC_PARSABLE_TYPE)
            .plain(GENERIC_PARSABLE_MODULE);
        Self {
            base,
            parsable_type: Property::new(GENERIC_PARSABLE_TYPE),
            parsable_module: Property::new(GENERIC_PARSABLE_MODULE),
        }
    }

    /// Parameters naming `kind`.
    pub fn naming(kind: Kind) -> Self {
        let mut parameters = Self::new();
        parameters.parsable_type.set(kind.name.to_string());
        parameters.parsable_module.set(kind.namespace.to_string());
        parameters
    }
}

impl Parsable for GenericParameters {
    fn kind(&self) -> Kind {
        Self::KIND
    }

    fn base(&self) -> &ParsableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ParsableBase {
        &mut self.base
    }

    fn slot(&self, name: &str) -> Option<Slot<'_>> {
        match name {
            GENERIC_PARSABLE_TYPE => Some(Slot::Plain(&self.parsable_type)),
            GENERIC_PARSABLE_MODULE => Some(Slot::Plain(&self.parsable_module)),
            _ => self.base.slot(name),
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<SlotMut<'_>> {
        match name {
            GENERIC_PARSABLE_TYPE => Some(SlotMut::Plain(&mut self.parsable_type)),
            GENERIC_PARSABLE_MODULE => Some(SlotMut::Plain(&mut self.parsable_module)),
            _ => self.base.slot_mut(name),
        }
    }
}

impl Constructible for GenericParameters {
    const KIND: Kind = Kind::new("GenericParameters", "plugnparse");

    fn construct(_args: &WireDict) -> Result<Self> {
        Ok(Self::new())
    }
}

impl PluginParameters for GenericParameters {
    const PLUGIN_PROPERTY: &'static str = GENERIC_PARSABLE_TYPE;
    const MODULE_PROPERTY: Option<&'static str> = Some(GENERIC_PARSABLE_MODULE);
}

crate::register_entity!(GenericParameters);
