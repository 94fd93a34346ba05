//! Name → type resolution.
//!
//! Types become resolvable by submitting a [`Registration`], either at
//! compile time through [`register_entity!`](crate::register_entity) /
//! [`register_plugin!`](crate::register_plugin) or at runtime through
//! [`TypeResolver::register`]. A [`NamespaceLoader`] turns a namespace name
//! into the [`Namespace`] of symbols it defines; loaded namespaces are cached
//! for the life of the resolver and only ever grow.

mod namespace;

pub use namespace::{InventoryLoader, Namespace, NamespaceLoader, PluginSymbol, Symbol};

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use crate::entity::{Constructible, Kind, Parsable};
use crate::error::{Error, Result};
use crate::plugin::{Capability, PluginDescriptor, PluginType};
use crate::wire::{ParseOptions, Tags, WireDict};

/// How to build one entity kind.
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    pub kind: Kind,
    pub required: fn() -> Vec<&'static str>,
    pub construct: fn(&WireDict) -> Result<Box<dyn Parsable>>,
}

impl TypeDescriptor {
    pub fn of<T: Constructible>() -> Self {
        Self {
            kind: T::KIND,
            required: T::required_parameters,
            construct: construct_boxed::<T>,
        }
    }

    /// Required construction keys, deduplicated in declaration order.
    pub fn required_parameters(&self) -> Vec<&'static str> {
        let mut required: Vec<&'static str> = Vec::new();
        for name in (self.required)() {
            if !required.contains(&name) {
                required.push(name);
            }
        }
        required
    }

    pub fn construct(&self, args: &WireDict) -> Result<Box<dyn Parsable>> {
        (self.construct)(args)
    }
}

fn construct_boxed<T: Constructible>(args: &WireDict) -> Result<Box<dyn Parsable>> {
    Ok(Box::new(T::construct(args)?))
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// One facet a registration contributes to its symbol.
#[derive(Debug, Clone)]
pub enum Facet {
    Entity(TypeDescriptor),
    Plugin(PluginSymbol),
}

/// A `(name, namespace)` pair and the facet registered under it.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    pub name: &'static str,
    pub namespace: &'static str,
    facet: fn() -> Facet,
}

impl Registration {
    pub const fn entity<T: Constructible>() -> Self {
        Self {
            name: T::KIND.name,
            namespace: T::KIND.namespace,
            facet: entity_facet::<T>,
        }
    }

    pub const fn plugin<B, T>() -> Self
    where
        B: Capability + ?Sized,
        T: PluginType<B>,
    {
        Self {
            name: T::KIND.name,
            namespace: T::KIND.namespace,
            facet: plugin_facet::<B, T>,
        }
    }

    /// A plugin facet that can also decode values into the built instance.
    pub const fn parsable_plugin<B, T>() -> Self
    where
        B: Capability + ?Sized,
        T: PluginType<B> + Constructible,
    {
        Self {
            name: <T as PluginType<B>>::KIND.name,
            namespace: <T as PluginType<B>>::KIND.namespace,
            facet: parsable_plugin_facet::<B, T>,
        }
    }

    pub fn facet(&self) -> Facet {
        (self.facet)()
    }

    fn key(&self) -> (&'static str, &'static str, Option<TypeId>) {
        let capability = match self.facet() {
            Facet::Entity(_) => None,
            Facet::Plugin(plugin) => Some(plugin.capability),
        };
        (self.name, self.namespace, capability)
    }

    fn plugin_for(&self, capability: TypeId) -> Option<PluginSymbol> {
        match self.facet() {
            Facet::Plugin(plugin) if plugin.capability == capability => Some(plugin),
            _ => None,
        }
    }
}

fn entity_facet<T: Constructible>() -> Facet {
    Facet::Entity(TypeDescriptor::of::<T>())
}

fn plugin_facet<B: Capability + ?Sized, T: PluginType<B>>() -> Facet {
    Facet::Plugin(PluginSymbol {
        capability: TypeId::of::<B>(),
        capability_name: B::NAME,
        descriptor: Arc::new(PluginDescriptor::<B>::of::<T>()),
    })
}

fn parsable_plugin_facet<B, T>() -> Facet
where
    B: Capability + ?Sized,
    T: PluginType<B> + Constructible,
{
    Facet::Plugin(PluginSymbol {
        capability: TypeId::of::<B>(),
        capability_name: B::NAME,
        descriptor: Arc::new(PluginDescriptor::<B>::parsable::<T>()),
    })
}

inventory::collect!(Registration);

#[derive(Default)]
struct ResolverState {
    registered: Vec<Registration>,
    loaded: HashMap<String, Arc<Namespace>>,
}

pub struct TypeResolver {
    loader: Box<dyn NamespaceLoader>,
    state: RwLock<ResolverState>,
}

impl Default for TypeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("TypeResolver")
            .field("registered", &state.registered.len())
            .field("loaded", &state.loaded.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TypeResolver {
    /// A resolver backed by the compile-time registration table.
    pub fn new() -> Self {
        Self::with_loader(InventoryLoader)
    }

    pub fn with_loader(loader: impl NamespaceLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            state: RwLock::new(ResolverState::default()),
        }
    }

    /// The process-wide resolver used by [`Parsable::decode`].
    pub fn global() -> Arc<TypeResolver> {
        static GLOBAL: OnceLock<Arc<TypeResolver>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(TypeResolver::new()))
            .clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, ResolverState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ResolverState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a registration at runtime. Returns `false` when the same facet
    /// was already registered under the same name and namespace.
    pub fn register(&self, registration: Registration) -> bool {
        let key = registration.key();
        let mut state = self.write();
        if state.registered.iter().any(|known| known.key() == key) {
            return false;
        }
        state.registered.push(registration);
        if let Some(namespace) = state.loaded.get_mut(registration.namespace) {
            Arc::make_mut(namespace).insert(&registration);
        }
        tracing::debug!(
            name = registration.name,
            namespace = registration.namespace,
            "registered type"
        );
        true
    }

    /// Loads `namespace` once and caches it. Runtime registrations for the
    /// namespace are merged into whatever the loader produced.
    pub fn load(&self, namespace: &str) -> Result<Arc<Namespace>> {
        if let Some(loaded) = self.read().loaded.get(namespace) {
            return Ok(Arc::clone(loaded));
        }

        let outcome = self.loader.load(namespace);
        let mut state = self.write();
        if let Some(loaded) = state.loaded.get(namespace) {
            return Ok(Arc::clone(loaded));
        }
        let runtime: Vec<Registration> = state
            .registered
            .iter()
            .filter(|registration| registration.namespace == namespace)
            .copied()
            .collect();
        let mut loaded = match outcome {
            Ok(loaded) => loaded,
            Err(err) if !runtime.is_empty() => {
                tracing::debug!(namespace, %err, "loader failed, using runtime registrations");
                Namespace::new(namespace)
            }
            Err(err) => return Err(err),
        };
        for registration in &runtime {
            loaded.insert(registration);
        }
        let loaded = Arc::new(loaded);
        state
            .loaded
            .insert(namespace.to_string(), Arc::clone(&loaded));
        tracing::debug!(namespace, symbols = loaded.len(), "loaded namespace");
        Ok(loaded)
    }

    pub fn is_loaded(&self, namespace: &str) -> bool {
        self.read().loaded.contains_key(namespace)
    }

    /// Resolves `name` to an entity descriptor.
    ///
    /// The namespace is `namespace` if given, else the namespace tag of
    /// `hint`. Without either the outcome is `Ok(None)`, or an error when
    /// `options.strict` is set. Once a namespace is known every failure is
    /// an error.
    pub fn resolve(
        &self,
        name: &str,
        namespace: Option<&str>,
        hint: Option<&WireDict>,
        options: &ParseOptions,
    ) -> Result<Option<TypeDescriptor>> {
        let namespace = namespace.map(str::to_owned).or_else(|| {
            hint.and_then(|hint| hint.get(&options.keys.namespace))
                .and_then(Value::as_str)
                .map(str::to_owned)
        });
        let Some(namespace) = namespace else {
            if options.strict {
                return Err(Error::resolution(
                    name,
                    None,
                    "no namespace was given and none could be read from the hint",
                ));
            }
            tracing::warn!(name, "unresolved: no namespace available");
            return Ok(None);
        };

        let loaded = self
            .load(&namespace)
            .map_err(|err| Error::resolution(name, Some(&namespace), err.to_string()))?;
        let symbol = loaded.lookup(name)?;
        match symbol.entity() {
            Some(descriptor) => Ok(Some(descriptor)),
            None => Err(Error::resolution(
                name,
                Some(&namespace),
                "the symbol is not a constructible entity",
            )),
        }
    }

    /// Resolves the kind tagged on `wire`.
    pub fn resolve_wire(
        &self,
        wire: &WireDict,
        options: &ParseOptions,
    ) -> Result<Option<TypeDescriptor>> {
        let tags = Tags::extract(wire, options)?;
        let Some(kind) = tags.kind else {
            tracing::warn!(key = %options.keys.kind, "unresolved: wire dict carries no kind");
            return Ok(None);
        };
        self.resolve(&kind, tags.namespace.as_deref(), Some(wire), options)
    }

    /// Every currently visible plugin of `capability`: compile-time
    /// registrations, runtime registrations, then loaded namespaces.
    pub fn plugin_symbols(&self, capability: TypeId) -> Vec<(String, PluginSymbol)> {
        let mut found: Vec<(String, PluginSymbol)> = inventory::iter::<Registration>
            .into_iter()
            .filter_map(|registration| {
                registration
                    .plugin_for(capability)
                    .map(|plugin| (registration.name.to_string(), plugin))
            })
            .collect();
        let state = self.read();
        for registration in &state.registered {
            if let Some(plugin) = registration.plugin_for(capability) {
                found.push((registration.name.to_string(), plugin));
            }
        }
        for namespace in state.loaded.values() {
            for symbol in namespace.symbols() {
                if let Some(plugin) = symbol.plugin(capability) {
                    found.push((symbol.name().to_string(), plugin.clone()));
                }
            }
        }
        found
    }
}
