use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use serde_json::Value;

use super::{Capability, Parameters, PluginDescriptor, PluginType, PropertyNames};
use crate::entity::Constructible;
use crate::error::{Error, Result};
use crate::resolver::{PluginSymbol, Registration, TypeResolver};
use crate::variant::VariantParser;
use crate::wire::{ParseOptions, WireDict, WireKeys};

type Cache<B> = Option<IndexMap<String, PluginDescriptor<B>>>;

/// Name → plugin lookup for one capability.
///
/// The cache starts absent, is created on the first lookup and only ever
/// grows: every miss re-enumerates the visible plugins of the capability and
/// merges them in, keeping entries that are already cached.
pub struct PluginRegistry<B: Capability + ?Sized> {
    resolver: Arc<TypeResolver>,
    cache: Arc<RwLock<Cache<B>>>,
    keys: WireKeys,
}

impl<B: Capability + ?Sized> Clone for PluginRegistry<B> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            cache: Arc::clone(&self.cache),
            keys: self.keys.clone(),
        }
    }
}

impl<B: Capability + ?Sized> fmt::Debug for PluginRegistry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("capability", &B::NAME)
            .field("names", &self.names())
            .finish()
    }
}

impl<B: Capability + ?Sized> PluginRegistry<B> {
    pub fn new(resolver: Arc<TypeResolver>) -> Self {
        Self {
            resolver,
            cache: Arc::new(RwLock::new(None)),
            keys: WireKeys::default(),
        }
    }

    /// Tag keys for reading namespace hints and for parsing. The cache stays
    /// shared with the registry this was built from.
    pub fn with_keys(mut self, keys: WireKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn keys(&self) -> &WireKeys {
        &self.keys
    }

    /// The process-wide registry of `B`, backed by [`TypeResolver::global`].
    pub fn global() -> Self {
        static REGISTRIES: OnceLock<Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>> =
            OnceLock::new();
        let mut registries = REGISTRIES
            .get_or_init(Default::default)
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let entry = registries
            .entry(TypeId::of::<B>())
            .or_insert_with(|| Box::new(Self::new(TypeResolver::global())));
        match (**entry).downcast_ref::<Self>() {
            Some(registry) => registry.clone(),
            None => Self::new(TypeResolver::global()),
        }
    }

    pub fn resolver(&self) -> &Arc<TypeResolver> {
        &self.resolver
    }

    fn read(&self) -> RwLockReadGuard<'_, Cache<B>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Cache<B>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn has_registry(&self) -> bool {
        self.read().is_some()
    }

    pub fn has_registered(&self, name: &str) -> bool {
        self.read()
            .as_ref()
            .is_some_and(|cache| cache.contains_key(name))
    }

    pub fn names(&self) -> Vec<String> {
        self.read()
            .as_ref()
            .map(|cache| cache.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Registers `T` with the resolver and the cache.
    pub fn register<T: PluginType<B>>(&self) -> bool {
        self.resolver.register(Registration::plugin::<B, T>());
        self.merge([(T::KIND.name.to_string(), PluginDescriptor::of::<T>())]) > 0
    }

    /// Like [`PluginRegistry::register`], for plugin types that are also
    /// entities and can therefore be parsed.
    pub fn register_parsable<T: PluginType<B> + Constructible>(&self) -> bool {
        let kind = <T as PluginType<B>>::KIND;
        self.resolver.register(Registration::entity::<T>());
        self.resolver
            .register(Registration::parsable_plugin::<B, T>());
        self.merge([(kind.name.to_string(), PluginDescriptor::parsable::<T>())]) > 0
    }

    fn cached(&self, name: &str) -> Option<PluginDescriptor<B>> {
        self.read()
            .as_ref()
            .and_then(|cache| cache.get(name).copied())
    }

    /// Adds entries under names not cached yet. Returns how many were added.
    fn merge(&self, entries: impl IntoIterator<Item = (String, PluginDescriptor<B>)>) -> usize {
        let mut cache = self.write();
        let cache = cache.get_or_insert_with(IndexMap::new);
        let mut added = 0;
        for (name, descriptor) in entries {
            if !cache.contains_key(&name) {
                cache.insert(name, descriptor);
                added += 1;
            }
        }
        if added > 0 {
            tracing::debug!(capability = B::NAME, added, "merged plugins");
        }
        added
    }

    fn merge_visible(&self) {
        let visible: Vec<(String, PluginDescriptor<B>)> = self
            .resolver
            .plugin_symbols(TypeId::of::<B>())
            .into_iter()
            .filter_map(|(name, symbol)| downcast::<B>(&symbol).map(|descriptor| (name, descriptor)))
            .collect();
        self.merge(visible);
    }

    /// Cache, then every visible plugin of `B`, then the namespace given or
    /// read from `hint` under the registry's namespace key.
    pub fn get(
        &self,
        name: &str,
        namespace: Option<&str>,
        hint: Option<&WireDict>,
    ) -> Result<Option<PluginDescriptor<B>>> {
        if let Some(found) = self.cached(name) {
            return Ok(Some(found));
        }
        self.merge_visible();
        if let Some(found) = self.cached(name) {
            return Ok(Some(found));
        }

        let namespace = namespace.map(str::to_owned).or_else(|| {
            hint.and_then(|hint| hint.get(&self.keys.namespace))
                .and_then(Value::as_str)
                .map(str::to_owned)
        });
        let Some(namespace) = namespace else {
            return Ok(None);
        };
        let loaded = self
            .resolver
            .load(&namespace)
            .map_err(|err| Error::resolution(name, Some(&namespace), err.to_string()))?;
        let symbol = loaded.lookup(name)?;
        let descriptor = symbol
            .plugin(TypeId::of::<B>())
            .and_then(downcast::<B>)
            .ok_or_else(|| {
                Error::resolution(
                    name,
                    Some(&namespace),
                    format!("the symbol is not a {} plugin", B::NAME),
                )
            })?;
        self.merge_visible();
        self.merge([(name.to_string(), descriptor)]);
        Ok(Some(descriptor))
    }

    /// [`PluginRegistry::get`], with "not found" as an error.
    pub fn lookup(
        &self,
        name: &str,
        namespace: Option<&str>,
        hint: Option<&WireDict>,
    ) -> Result<PluginDescriptor<B>> {
        self.get(name, namespace, hint)?.ok_or_else(|| {
            Error::resolution(
                name,
                namespace,
                format!("no {} plugin is registered under this name", B::NAME),
            )
        })
    }

    pub fn construct(&self, name: &str, args: &WireDict, namespace: Option<&str>) -> Result<Box<B>> {
        self.lookup(name, namespace, Some(args))?.construct(args)
    }

    /// Constructs from `args`, then decodes `values` into the instance.
    pub fn parse(
        &self,
        name: &str,
        args: &WireDict,
        values: &WireDict,
        namespace: Option<&str>,
    ) -> Result<Box<B>> {
        let descriptor = self.lookup(name, namespace, Some(values))?;
        let parser = VariantParser::new(&self.resolver)
            .with_options(ParseOptions::new().with_keys(self.keys.clone()));
        descriptor.parse(args, values, &parser)
    }

    /// The `(kind, namespace)` pair named by `parameters`: the generic keys
    /// with `use_default`, the capability's property names otherwise.
    pub fn extract_names(
        parameters: Parameters<'_>,
        use_default: bool,
    ) -> Result<(String, Option<String>)> {
        let names = if use_default {
            PropertyNames::GENERIC
        } else {
            B::property_names()
        };
        parameters.extract(B::NAME, names)
    }

    pub fn construct_from_parameters(
        &self,
        parameters: Parameters<'_>,
        args: &WireDict,
        use_default: bool,
    ) -> Result<Box<B>> {
        let (name, namespace) = Self::extract_names(parameters, use_default)?;
        self.construct(&name, args, namespace.as_deref())
    }

    pub fn parse_from_parameters(
        &self,
        parameters: Parameters<'_>,
        args: &WireDict,
        values: &WireDict,
        use_default: bool,
    ) -> Result<Box<B>> {
        let (name, namespace) = Self::extract_names(parameters, use_default)?;
        self.parse(&name, args, values, namespace.as_deref())
    }
}

fn downcast<B: Capability + ?Sized>(symbol: &PluginSymbol) -> Option<PluginDescriptor<B>> {
    symbol
        .descriptor
        .downcast_ref::<PluginDescriptor<B>>()
        .copied()
}
