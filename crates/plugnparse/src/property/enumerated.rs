use std::fmt::Debug;

use serde_json::Value;

use super::{EnumSlot, Property};
use crate::error::{Error, Result};
use crate::wire::describe;

/// A finite symbolic set with canonical names and integer ordinals.
///
/// Usually declared through [`wire_enum!`](crate::wire_enum).
pub trait WireEnum: Copy + Eq + Debug + 'static {
    const TYPE_NAME: &'static str;

    fn variants() -> &'static [Self];

    /// Canonical name written to the wire.
    fn name(&self) -> &'static str;

    fn ordinal(&self) -> i64;

    fn from_name(name: &str) -> Option<Self> {
        Self::variants()
            .iter()
            .copied()
            .find(|variant| variant.name() == name)
    }

    fn from_ordinal(ordinal: i64) -> Option<Self> {
        Self::variants()
            .iter()
            .copied()
            .find(|variant| variant.ordinal() == ordinal)
    }
}

/// Declares a fieldless enum together with its [`WireEnum`] impl.
///
/// ```
/// plugnparse::wire_enum! {
///     pub enum Color {
///         Red = 1,
///         Green = 2,
///     }
/// }
///
/// use plugnparse::WireEnum;
/// assert_eq!(Color::from_name("Green"), Some(Color::Green));
/// assert_eq!(Color::Red.ordinal(), 1);
/// ```
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $ordinal:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant = $ordinal),+
        }

        impl $crate::WireEnum for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn variants() -> &'static [Self] {
                &[$($name::$variant),+]
            }

            fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }

            fn ordinal(&self) -> i64 {
                *self as i64
            }
        }
    };
}

/// Coerces a wire value into `E`: names and ordinals are accepted, `null`
/// means unset.
pub fn enum_parse<E: WireEnum>(value: &Value) -> Result<Option<E>> {
    match value {
        Value::Null => Ok(None),
        Value::String(name) => E::from_name(name).map(Some).ok_or_else(|| {
            Error::type_mismatch(E::TYPE_NAME, "variant name", format!("`{name}`"))
        }),
        Value::Number(number) => number
            .as_i64()
            .and_then(E::from_ordinal)
            .map(Some)
            .ok_or_else(|| Error::type_mismatch(E::TYPE_NAME, "variant ordinal", number.to_string())),
        other => Err(Error::type_mismatch(
            E::TYPE_NAME,
            "variant name or ordinal",
            describe(other),
        )),
    }
}

/// [`enum_parse`] over an array. Elements may not be `null`.
pub fn enum_parse_list<E: WireEnum>(value: &Value) -> Result<Option<Vec<E>>> {
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                enum_parse::<E>(item)?.ok_or_else(|| {
                    Error::type_mismatch(E::TYPE_NAME, "variant name or ordinal", "null")
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Some),
        other => Err(Error::type_mismatch(E::TYPE_NAME, "array", describe(other))),
    }
}

impl<E: WireEnum> EnumSlot for Property<E> {
    fn encode_wire(&self) -> Option<Value> {
        self.value().map(|variant| Value::from(variant.name()))
    }

    fn assign_wire(&mut self, value: &Value) -> Result<()> {
        let parsed = enum_parse::<E>(value).map_err(|err| match err {
            Error::TypeMismatch {
                expected, found, ..
            } => Error::TypeMismatch {
                attribute: self.name().to_string(),
                expected,
                found,
            },
            other => other,
        })?;
        self.set(parsed);
        Ok(())
    }
}
