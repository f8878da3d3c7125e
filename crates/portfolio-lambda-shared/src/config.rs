//! Environment configuration helpers.
//!
//! Lambda configuration is read once at cold start. Handlers build their
//! configuration from an [`EnvLookup`], which wraps either the process
//! environment or a caller-supplied function so tests never have to mutate
//! global environment state.
//!
//! # Example
//!
//! ```
//! use portfolio_lambda_shared::EnvLookup;
//!
//! let env = EnvLookup::from_pairs([("SMTP_HOST", "smtp.example.com")]);
//! assert_eq!(env.required("SMTP_HOST").unwrap(), "smtp.example.com");
//! assert_eq!(env.parse_or("SMTP_PORT", 587u16).unwrap(), 587);
//! ```

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

/// Error raised while resolving configuration at startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required environment variable {name}")]
    Missing { name: String },

    /// A variable is set but its value could not be used.
    #[error("invalid value for environment variable {name}: {reason}")]
    Invalid { name: String, reason: String },
}

impl ConfigError {
    /// Construct an [`ConfigError::Invalid`] for `name`.
    pub fn invalid(name: impl Into<String>, reason: impl Display) -> Self {
        Self::Invalid {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

type LookupFn<'a> = Box<dyn Fn(&str) -> Option<String> + Send + Sync + 'a>;

/// Source of configuration values keyed by environment variable name.
pub struct EnvLookup<'a> {
    lookup: LookupFn<'a>,
}

impl<'a> EnvLookup<'a> {
    /// Read from the process environment.
    pub fn process() -> Self {
        Self::from_fn(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup function.
    pub fn from_fn(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'a) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Read from a fixed set of key/value pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let values: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_fn(move |key| values.get(key).cloned())
    }

    /// Value of `name`, treating empty strings as unset.
    pub fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    /// Value of `name`, or [`ConfigError::Missing`].
    pub fn required(&self, name: &str) -> Result<String, ConfigError> {
        self.optional(name).ok_or_else(|| ConfigError::Missing {
            name: name.to_string(),
        })
    }

    /// Parse `name` into `T`, falling back to `default` when unset.
    pub fn parse_or<T>(&self, name: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.optional(name) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(name, format!("'{}': {}", raw, e))),
            None => Ok(default),
        }
    }
}

impl std::fmt::Debug for EnvLookup<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvLookup").finish_non_exhaustive()
    }
}
