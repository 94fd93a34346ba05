use std::fmt;
use std::ops::{Deref, DerefMut};

use serde_json::Value;

use super::{Property, SpecializedSlot};
use crate::error::Result;

/// A custom encode/decode pair for one attribute.
pub struct Codec<T> {
    pub encode: fn(&T) -> Result<Value>,
    pub decode: fn(&Value) -> Result<T>,
}

impl<T> Codec<T> {
    pub const fn new(encode: fn(&T) -> Result<Value>, decode: fn(&Value) -> Result<T>) -> Self {
        Self { encode, decode }
    }
}

impl<T> Clone for Codec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Codec<T> {}

impl<T> fmt::Debug for Codec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec").finish_non_exhaustive()
    }
}

/// A [`Property`] whose wire shape is owned by a [`Codec`].
///
/// Dereferences to the inner property for `get`/`set`/`is_set`.
pub struct SpecializedProperty<T> {
    inner: Property<T>,
    codec: Codec<T>,
}

impl<T> SpecializedProperty<T> {
    pub const fn new(name: &'static str, codec: Codec<T>) -> Self {
        Self {
            inner: Property::new(name),
            codec,
        }
    }

    pub fn codec(&self) -> Codec<T> {
        self.codec
    }
}

impl<T> Deref for SpecializedProperty<T> {
    type Target = Property<T>;

    fn deref(&self) -> &Property<T> {
        &self.inner
    }
}

impl<T> DerefMut for SpecializedProperty<T> {
    fn deref_mut(&mut self) -> &mut Property<T> {
        &mut self.inner
    }
}

impl<T: Clone> Clone for SpecializedProperty<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            codec: self.codec,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SpecializedProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecializedProperty")
            .field("name", &self.inner.name())
            .field("value", &self.inner.value())
            .finish()
    }
}

impl<T: PartialEq> PartialEq for SpecializedProperty<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> super::Presence for SpecializedProperty<T> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn is_set(&self) -> bool {
        self.inner.is_set()
    }

    fn clear(&mut self) {
        self.inner.clear();
    }
}

impl<T> SpecializedSlot for SpecializedProperty<T> {
    fn encode_special(&self) -> Result<Option<Value>> {
        self.inner.value().map(self.codec.encode).transpose()
    }

    fn decode_special(&mut self, value: &Value) -> Result<()> {
        if value.is_null() {
            self.inner.clear();
            return Ok(());
        }
        let decoded = (self.codec.decode)(value)?;
        self.inner.set(decoded);
        Ok(())
    }
}
