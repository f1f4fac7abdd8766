//! Environment variable resolution for configuration values.
//!
//! Credentials should not live in configuration files. Any value wrapped in
//! [`LiteralOrEnv`] may instead name an environment variable:
//!
//! ```json
//! {
//!   "accessKey": "$EVM_PAY_ACCESS_KEY",
//!   "secretKey": "${EVM_PAY_SECRET_KEY}",
//!   "rpc": "https://bsc-mainnet.token.im"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::str::FromStr;

/// A value that is either written literally or read from `$VAR` / `${VAR}`
/// while deserializing. Derefs to the inner value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct LiteralOrEnv<T>(T);

impl<T> LiteralOrEnv<T> {
    pub fn from_literal(value: T) -> Self {
        Self(value)
    }

    pub fn inner(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Returns the variable name if `s` is `$VAR` or `${VAR}`.
fn env_var_name(s: &str) -> Option<&str> {
    if let Some(braced) = s.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
        return (!braced.is_empty()).then_some(braced);
    }
    let bare = s.strip_prefix('$')?;
    let valid = !bare.is_empty() && bare.chars().all(|c| c.is_alphanumeric() || c == '_');
    valid.then_some(bare)
}

impl<T> Deref for LiteralOrEnv<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LiteralOrEnvError {
    #[error("${var} is referenced but not set")]
    MissingVar { var: String },
    #[error("Cannot parse {raw:?}: {reason}")]
    Parse { raw: String, reason: String },
}

/// Substitutes `$VAR` / `${VAR}` from the environment, then parses the result.
pub fn resolve<T>(raw: String) -> Result<T, LiteralOrEnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = match env_var_name(&raw) {
        Some(var) => std::env::var(var).map_err(|_| LiteralOrEnvError::MissingVar {
            var: var.to_string(),
        })?,
        None => raw,
    };
    raw.parse().map_err(|e: T::Err| LiteralOrEnvError::Parse {
        reason: e.to_string(),
        raw,
    })
}

impl<'de, T> Deserialize<'de> for LiteralOrEnv<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        resolve(raw).map(LiteralOrEnv).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_name() {
        assert_eq!(env_var_name("$ACCESS_KEY"), Some("ACCESS_KEY"));
        assert_eq!(env_var_name("${ACCESS_KEY}"), Some("ACCESS_KEY"));
        assert_eq!(env_var_name("${}"), None);
        assert_eq!(env_var_name("$"), None);
        assert_eq!(env_var_name("$not-a-var"), None);
        assert_eq!(env_var_name("plain"), None);
    }

    #[test]
    fn test_literal() {
        let value: LiteralOrEnv<String> = serde_json::from_str("\"ak_live_1\"").unwrap();
        assert_eq!(value.as_str(), "ak_live_1");
    }

    #[test]
    fn test_from_env() {
        // PATH is set in every test environment.
        let expected = std::env::var("PATH").unwrap();
        let value: LiteralOrEnv<String> = serde_json::from_str("\"${PATH}\"").unwrap();
        assert_eq!(value.into_inner(), expected);
    }

    #[test]
    fn test_missing_env() {
        let result: Result<LiteralOrEnv<String>, _> =
            serde_json::from_str("\"$EVM_PAY_SURELY_UNSET_VARIABLE\"");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("EVM_PAY_SURELY_UNSET_VARIABLE"), "{err}");
    }
}
