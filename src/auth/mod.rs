//! Guard-based authentication
//!
//! This module owns the authentication core:
//! - `AuthSlot`: the per-guard state machine persisted in the session
//! - `GuardRegistry`: the validated guard/provider table built at boot
//! - `PrincipalStorage`: the trait boundary to credential storage
//! - `Auth` / `GuardAuth`: the facade handlers call

pub mod facade;
pub mod registry;
pub mod slot;
pub mod storage;

pub use facade::{Auth, GuardAuth, ProviderSet};
pub use registry::{Guard, GuardRegistry};
pub use slot::AuthSlot;
pub use storage::{hash_password, verify_password, MemoryPrincipalStorage, PrincipalStorage};
