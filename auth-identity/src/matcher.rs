// Credential matching strategies
use crate::error::{IdentityError, Result};
use anyhow::anyhow;
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use database_layer::CredentialTreatment;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// `(stored, supplied) -> matches?`. An `Err` marks the attempt uncategorized.
pub type CallbackFn = dyn Fn(&Value, &str) -> anyhow::Result<bool> + Send + Sync;

/// A comparison predicate applied in process to each candidate row
#[derive(Clone)]
pub struct CredentialCallback {
    name: String,
    check: Arc<CallbackFn>,
}

impl CredentialCallback {
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value, &str) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// The stored value must be a string equal to the supplied credential
    pub fn strict() -> Self {
        Self::new("strict", |stored, supplied| {
            Ok(matches!(stored, Value::String(s) if s == supplied))
        })
    }

    /// The stored value is an Argon2 PHC string
    pub fn argon2() -> Self {
        Self::new("argon2", |stored, supplied| {
            let hash = stored_str(stored)?;
            let parsed =
                PasswordHash::new(hash).map_err(|e| anyhow!("malformed argon2 hash: {e}"))?;
            match Argon2::default().verify_password(supplied.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(anyhow!("argon2 verification failed: {e}")),
            }
        })
    }

    /// The stored value is a bcrypt hash
    pub fn bcrypt() -> Self {
        Self::new("bcrypt", |stored, supplied| {
            Ok(bcrypt::verify(supplied, stored_str(stored)?)?)
        })
    }

    /// Resolve a callback by configuration name
    pub fn named(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "strict" => Ok(Self::strict()),
            "argon2" => Ok(Self::argon2()),
            "bcrypt" => Ok(Self::bcrypt()),
            _ => Err(IdentityError::InvalidCallback(name.to_string())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the predicate. A panic inside it is reported as an `Err`.
    pub fn check(&self, stored: &Value, supplied: &str) -> anyhow::Result<bool> {
        panic::catch_unwind(AssertUnwindSafe(|| (self.check)(stored, supplied))).unwrap_or_else(
            |payload| {
                Err(anyhow!(
                    "credential callback '{}' panicked: {}",
                    self.name,
                    panic_message(payload.as_ref())
                ))
            },
        )
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

fn stored_str(stored: &Value) -> anyhow::Result<&str> {
    stored
        .as_str()
        .ok_or_else(|| anyhow!("stored credential is not a string"))
}

impl Default for CredentialCallback {
    fn default() -> Self {
        Self::strict()
    }
}

impl fmt::Debug for CredentialCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialCallback")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// How a candidate row's stored credential is compared with the supplied one
#[derive(Debug, Clone)]
pub enum CredentialMatcher {
    /// Compare in process with a predicate
    Callback(CredentialCallback),
    /// Let the database evaluate a treatment expression and return a flag per row
    Treatment(CredentialTreatment),
}

impl Default for CredentialMatcher {
    fn default() -> Self {
        Self::Callback(CredentialCallback::default())
    }
}
