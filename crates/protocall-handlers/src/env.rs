//! `env:` protocol - environment variable lookup
//!
//! The input names a variable. An optional suffix converts the value:
//!
//! - `NAME|d` - leading integer, `null` when there is none
//! - `NAME|b` - `false` for unset, `""`, `"false"` and `"0"`, otherwise `true`
//! - `NAME|!b` - the negation of `|b`
//!
//! Without a suffix an unset variable resolves to `null`.

use std::collections::HashMap;

use protocall_core::{Handler, Value};

use crate::error::Error;

/// Where variables are read from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EnvSource {
    /// The process environment at lookup time
    #[default]
    Process,
    /// A fixed set of variables
    Fixed(HashMap<String, String>),
}

impl EnvSource {
    pub fn get(&self, name: &str) -> Option<String> {
        match self {
            Self::Process => std::env::var(name).ok(),
            Self::Fixed(vars) => vars.get(name).cloned(),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSource
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Fixed(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Filter {
    Integer,
    Truthy,
    Falsy,
}

impl Filter {
    const ALL: [(&'static str, Filter); 3] = [
        ("|d", Filter::Integer),
        ("|b", Filter::Truthy),
        ("|!b", Filter::Falsy),
    ];

    /// Split a trailing filter off `input`.
    ///
    /// A suffix only counts when its first occurrence is at the very end.
    fn split(input: &str) -> (&str, Option<Filter>) {
        Self::ALL
            .into_iter()
            .find_map(|(suffix, filter)| {
                let at = input.find(suffix)?;
                (at + suffix.len() == input.len()).then(|| (&input[..at], Some(filter)))
            })
            .unwrap_or((input, None))
    }

    fn apply(self, value: Option<&str>) -> Value {
        match self {
            Self::Integer => value.and_then(parse_leading_int).unwrap_or(Value::Null),
            Self::Truthy => Value::Bool(is_truthy(value)),
            Self::Falsy => Value::Bool(!is_truthy(value)),
        }
    }
}

fn is_truthy(value: Option<&str>) -> bool {
    !matches!(value, None | Some("" | "false" | "0"))
}

/// Parse an optionally signed run of digits at the start of `value`.
///
/// Integers outside the `i64` range become the nearest float.
fn parse_leading_int(value: &str) -> Option<Value> {
    let trimmed = value.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['-', '+']));
    let digits = trimmed[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len() - sign_len);
    if digits == 0 {
        return None;
    }
    let literal = &trimmed[..sign_len + digits];
    match literal.parse::<i64>() {
        Ok(n) => Some(Value::from(n)),
        Err(_) => literal.parse::<f64>().ok().map(Value::from),
    }
}

/// Resolves environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvHandler {
    source: EnvSource,
}

impl EnvHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(source: EnvSource) -> Self {
        Self { source }
    }

    pub fn lookup(&self, input: &str) -> Value {
        let (name, filter) = Filter::split(input);
        let value = self.source.get(name);
        match filter {
            Some(filter) => filter.apply(value.as_deref()),
            None => value.map_or(Value::Null, Value::String),
        }
    }

    pub fn into_handler(self) -> Handler {
        Handler::transform(move |input: Value| {
            let input = input.as_str().ok_or(Error::expected_string("env"))?;
            Ok(self.lookup(input))
        })
    }
}
