//! Error taxonomy shared by every fallible operation in the crate.
//!
//! Every error is built through one of the constructors below, which all
//! funnel through [`Error::raise`] so diagnostics have a single shape in the
//! log stream.

use std::fmt;

use thiserror::Error;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An attribute was read while absent.
    NotSet,
    /// A setter received a value of the wrong shape.
    TypeMismatch,
    /// A name/namespace pair could not be turned into a type.
    Resolution,
    /// Required arguments were missing, or the constructor itself failed.
    Construction,
    /// The declarations of an entity or capability are inconsistent.
    Configuration,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotSet => "not_set",
            ErrorKind::TypeMismatch => "type_mismatch",
            ErrorKind::Resolution => "resolution",
            ErrorKind::Construction => "construction",
            ErrorKind::Configuration => "configuration",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("attribute `{attribute}` has not been set")]
    NotSet { attribute: String },

    #[error("invalid input type for `{attribute}`: expected {expected}, found {found}")]
    TypeMismatch {
        attribute: String,
        expected: String,
        found: String,
    },

    #[error("unable to resolve `{name}`{}: {reason}", in_namespace(.namespace))]
    Resolution {
        name: String,
        namespace: Option<String>,
        reason: String,
    },

    #[error("the required arguments {missing:?} of `{type_name}` are not included in the provided arguments {provided:?}")]
    MissingArguments {
        type_name: String,
        missing: Vec<String>,
        provided: Vec<String>,
    },

    #[error("unable to construct `{type_name}`: {reason}")]
    Construction { type_name: String, reason: String },

    #[error("desired parse order references attributes {unknown:?} that are not declared")]
    Ordering { unknown: Vec<String> },

    #[error("`{type_name}` declares `{attribute}` as {category} but exposes no matching accessor")]
    UndeclaredAttribute {
        type_name: String,
        attribute: String,
        category: String,
    },

    #[error("unable to extract plugin property for `{capability}`: {reason}")]
    PluginProperty { capability: String, reason: String },
}

fn in_namespace(namespace: &Option<String>) -> String {
    match namespace {
        Some(namespace) => format!(" in namespace `{namespace}`"),
        None => String::new(),
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotSet { .. } => ErrorKind::NotSet,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::Resolution { .. } => ErrorKind::Resolution,
            Error::MissingArguments { .. } | Error::Construction { .. } => {
                ErrorKind::Construction
            }
            Error::Ordering { .. }
            | Error::UndeclaredAttribute { .. }
            | Error::PluginProperty { .. } => ErrorKind::Configuration,
        }
    }

    /// Records the error and hands it back for propagation.
    pub fn raise(self) -> Self {
        tracing::error!(kind = %self.kind(), "{self}");
        self
    }

    pub fn not_set(attribute: impl Into<String>) -> Self {
        Error::NotSet {
            attribute: attribute.into(),
        }
        .raise()
    }

    pub fn type_mismatch(
        attribute: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Error::TypeMismatch {
            attribute: attribute.into(),
            expected: expected.into(),
            found: found.into(),
        }
        .raise()
    }

    pub fn resolution(
        name: impl Into<String>,
        namespace: Option<&str>,
        reason: impl Into<String>,
    ) -> Self {
        Error::Resolution {
            name: name.into(),
            namespace: namespace.map(str::to_owned),
            reason: reason.into(),
        }
        .raise()
    }

    pub fn missing_arguments(
        type_name: impl Into<String>,
        missing: Vec<String>,
        provided: Vec<String>,
    ) -> Self {
        Error::MissingArguments {
            type_name: type_name.into(),
            missing,
            provided,
        }
        .raise()
    }

    pub fn construction(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Construction {
            type_name: type_name.into(),
            reason: reason.into(),
        }
        .raise()
    }

    pub fn ordering(unknown: Vec<String>) -> Self {
        Error::Ordering { unknown }.raise()
    }

    pub fn undeclared_attribute(
        type_name: impl Into<String>,
        attribute: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Error::UndeclaredAttribute {
            type_name: type_name.into(),
            attribute: attribute.into(),
            category: category.into(),
        }
        .raise()
    }

    pub fn plugin_property(capability: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::PluginProperty {
            capability: capability.into(),
            reason: reason.into(),
        }
        .raise()
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
