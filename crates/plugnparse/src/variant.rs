//! Turning tagged wire dicts into entities.
//!
//! [`VariantParser::parse`] resolves the kind tagged on a dict, constructs it
//! from its required parameters and decodes the rest of the dict into it. Out
//! of strict mode any failure hands the original dict back as
//! [`Parsed::Raw`], so callers can try several strategies in turn.

use crate::codec;
use crate::entity::Parsable;
use crate::error::{Error, Result};
use crate::resolver::{TypeDescriptor, TypeResolver};
use crate::wire::{ParseOptions, Tags, WireDict};

/// Outcome of a parse attempt.
#[derive(Debug, Clone)]
pub enum Parsed {
    Entity(Box<dyn Parsable>),
    /// The input, unchanged, when it could not be parsed.
    Raw(WireDict),
}

impl Parsed {
    pub fn is_entity(&self) -> bool {
        matches!(self, Parsed::Entity(_))
    }

    pub fn entity(&self) -> Option<&dyn Parsable> {
        match self {
            Parsed::Entity(entity) => Some(entity.as_ref()),
            Parsed::Raw(_) => None,
        }
    }

    pub fn into_entity(self) -> Option<Box<dyn Parsable>> {
        match self {
            Parsed::Entity(entity) => Some(entity),
            Parsed::Raw(_) => None,
        }
    }

    pub fn raw(&self) -> Option<&WireDict> {
        match self {
            Parsed::Raw(wire) => Some(wire),
            Parsed::Entity(_) => None,
        }
    }

    /// The parsed entity as a `T`, if that is what was built.
    pub fn downcast<T: Parsable>(self) -> Option<T> {
        self.into_entity()?.downcast::<T>().map(|boxed| *boxed)
    }
}

#[derive(Debug, Clone)]
pub struct VariantParser<'r> {
    resolver: &'r TypeResolver,
    options: ParseOptions,
}

impl<'r> VariantParser<'r> {
    pub fn new(resolver: &'r TypeResolver) -> Self {
        Self {
            resolver,
            options: ParseOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn resolver(&self) -> &'r TypeResolver {
        self.resolver
    }

    /// The parser nested values are handled with.
    pub fn nested(&self) -> VariantParser<'r> {
        Self {
            resolver: self.resolver,
            options: self.options.nested(),
        }
    }

    pub fn parse(&self, wire: &WireDict) -> Result<Parsed> {
        let outcome = match self.resolver.resolve_wire(wire, &self.options) {
            Ok(Some(descriptor)) => self.build(descriptor, wire),
            Ok(None) => {
                tracing::warn!("wire dict names no resolvable kind, keeping it unparsed");
                return Ok(Parsed::Raw(wire.clone()));
            }
            Err(err) => Err(err),
        };
        self.settle(outcome, wire)
    }

    /// Parses `wire` as the kind described by `descriptor`, ignoring its tags.
    pub fn parse_with(&self, descriptor: TypeDescriptor, wire: &WireDict) -> Result<Parsed> {
        let outcome = self.build(descriptor, wire);
        self.settle(outcome, wire)
    }

    /// Tagged dicts are parsed with the nested options; untagged ones are
    /// returned raw for the receiving slot to construct.
    pub fn parse_nested(&self, wire: &WireDict) -> Result<Parsed> {
        let nested = self.nested();
        if Tags::is_tagged(wire, &nested.options.keys) {
            nested.parse(wire)
        } else {
            Ok(Parsed::Raw(wire.clone()))
        }
    }

    pub fn decode(&self, entity: &mut dyn Parsable, wire: &WireDict, only_if_missing: bool) -> Result<()> {
        codec::decode(entity, wire, only_if_missing, self)
    }

    fn settle(&self, outcome: Result<Box<dyn Parsable>>, wire: &WireDict) -> Result<Parsed> {
        match outcome {
            Ok(entity) => Ok(Parsed::Entity(entity)),
            Err(err) if !self.options.strict => {
                tracing::warn!(%err, "keeping wire dict unparsed");
                Ok(Parsed::Raw(wire.clone()))
            }
            Err(err) => Err(err),
        }
    }

    /// Constructs from exactly the required keys, then decodes the others.
    fn build(&self, descriptor: TypeDescriptor, wire: &WireDict) -> Result<Box<dyn Parsable>> {
        let required = descriptor.required_parameters();
        let missing: Vec<String> = required
            .iter()
            .filter(|key| !wire.contains_key(**key))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::missing_arguments(
                descriptor.kind.to_string(),
                missing,
                wire.keys().cloned().collect(),
            ));
        }

        let mut args = WireDict::new();
        let mut rest = WireDict::new();
        for (key, value) in wire {
            if required.contains(&key.as_str()) {
                args.insert(key.clone(), value.clone());
            } else {
                rest.insert(key.clone(), value.clone());
            }
        }

        let mut entity = descriptor.construct(&args)?;
        self.decode(entity.as_mut(), &rest, false)?;
        tracing::debug!(kind = %descriptor.kind, "parsed entity");
        Ok(entity)
    }
}
