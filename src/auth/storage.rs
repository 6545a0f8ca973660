//! Principal storage behind providers
//!
//! A provider binds one or more guards to a `PrincipalStorage`. Concrete
//! backends (SQL, Redis, directory services) live outside this crate; the
//! in-memory implementation here backs development and tests.

use crate::domain::{NewPrincipal, Principal};
use crate::error::{AppError, Result};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

/// Storage accessor for the user-like entity behind a provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PrincipalStorage: Send + Sync {
    async fn create(&self, input: NewPrincipal) -> Result<Principal>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Principal>>;
}

/// Hash a plaintext password into an argon2 PHC string
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored PHC string.
///
/// Comparison runs through argon2's verifier, which is constant-time over the
/// hash output. An unparseable stored hash verifies as false.
pub fn verify_password(hash: &str, plain: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// In-memory principal storage
pub struct MemoryPrincipalStorage {
    records: RwLock<HashMap<i64, Principal>>,
    next_id: AtomicI64,
}

impl MemoryPrincipalStorage {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryPrincipalStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrincipalStorage for MemoryPrincipalStorage {
    async fn create(&self, input: NewPrincipal) -> Result<Principal> {
        let mut records = self.records.write().await;
        if records
            .values()
            .any(|p| p.username == input.username)
        {
            return Err(AppError::Storage(format!(
                "username `{}` already exists",
                input.username
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let principal = Principal {
            id,
            username: input.username,
            password_hash: input.password_hash,
            attributes: input.attributes,
        };
        records.insert(id, principal.clone());
        Ok(principal)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>> {
        let records = self.records.read().await;
        Ok(records.values().find(|p| p.username == username).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Principal>> {
        let records = self.records.read().await;
        Ok(records.get(&id).cloned())
    }
}
