use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::{Facet, Registration, TypeDescriptor};
use crate::error::{Error, Result};

/// A plugin facet of a symbol: the type-erased descriptor of one capability.
#[derive(Clone)]
pub struct PluginSymbol {
    pub capability: TypeId,
    pub capability_name: &'static str,
    pub descriptor: Arc<dyn Any + Send + Sync>,
}

impl fmt::Debug for PluginSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginSymbol")
            .field("capability", &self.capability_name)
            .finish_non_exhaustive()
    }
}

/// Everything a namespace knows under one name.
#[derive(Debug, Clone)]
pub struct Symbol {
    name: String,
    namespace: String,
    entity: Option<TypeDescriptor>,
    plugins: Vec<PluginSymbol>,
}

impl Symbol {
    fn new(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            entity: None,
            plugins: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn entity(&self) -> Option<TypeDescriptor> {
        self.entity
    }

    pub fn plugin(&self, capability: TypeId) -> Option<&PluginSymbol> {
        self.plugins
            .iter()
            .find(|plugin| plugin.capability == capability)
    }

    pub fn plugins(&self) -> &[PluginSymbol] {
        &self.plugins
    }

    /// The first entity facet wins, and so does the first plugin facet of
    /// each capability.
    fn absorb(&mut self, facet: Facet) {
        match facet {
            Facet::Entity(descriptor) => {
                if self.entity.is_none() {
                    self.entity = Some(descriptor);
                }
            }
            Facet::Plugin(plugin) => {
                if self.plugin(plugin.capability).is_none() {
                    self.plugins.push(plugin);
                }
            }
        }
    }
}

/// The symbols of one namespace.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    name: String,
    symbols: IndexMap<String, Symbol>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbols: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn insert(&mut self, registration: &Registration) {
        let namespace = self.name.clone();
        self.symbols
            .entry(registration.name.to_string())
            .or_insert_with(|| Symbol::new(registration.name, &namespace))
            .absorb(registration.facet());
    }

    pub fn with(mut self, registration: Registration) -> Self {
        self.insert(&registration);
        self
    }

    pub fn lookup(&self, name: &str) -> Result<&Symbol> {
        self.symbols.get(name).ok_or_else(|| {
            Error::resolution(name, Some(&self.name), "no such symbol in the namespace")
        })
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Produces the symbols of a namespace on demand.
pub trait NamespaceLoader: Send + Sync {
    fn load(&self, namespace: &str) -> Result<Namespace>;
}

/// Loads namespaces from the registrations submitted at compile time through
/// [`register_entity!`](crate::register_entity) and friends.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryLoader;

impl NamespaceLoader for InventoryLoader {
    fn load(&self, namespace: &str) -> Result<Namespace> {
        let mut loaded = Namespace::new(namespace);
        for registration in inventory::iter::<Registration> {
            if registration.namespace == namespace {
                loaded.insert(registration);
            }
        }
        if loaded.is_empty() {
            return Err(Error::resolution(
                namespace,
                None,
                "no registrations were submitted for this namespace",
            ));
        }
        Ok(loaded)
    }
}
