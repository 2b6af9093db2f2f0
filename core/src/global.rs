//! Process-wide default client.
//!
//! # Design
//! Applications should build a `Client` at startup and hand out `&Client`
//! or `Arc<Client>`. The default accessors exist for code that cannot be
//! threaded through a composition root.
//!
//! `ClientSlot` makes exactly one construction attempt over its lifetime.
//! A `Once` guards the construction and an `RwLock` guards the stored
//! outcome: once a client exists, readers only take the shared lock; the
//! exclusive lock is taken a single time, inside the `Once`. A failed
//! attempt is remembered and never retried. A builder that panics counts
//! as a failed attempt: the panic is caught inside the `Once`, so it is
//! never poisoned.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once, PoisonError, RwLock};

use crate::client::Client;
use crate::config::Tier;
use crate::error::{Error, Result};

/// One-time cell holding a shared `Client`.
pub struct ClientSlot {
    init: Once,
    client: RwLock<Option<Arc<Client>>>,
}

impl ClientSlot {
    pub const fn new() -> Self {
        Self {
            init: Once::new(),
            client: RwLock::new(None),
        }
    }

    /// Returns the stored client, running `build` if no attempt has been
    /// made yet. Concurrent first callers wait for the single attempt and
    /// all observe its outcome. If `build` panics the attempt is recorded
    /// as failed and `None` is returned, now and on every later call.
    pub fn get_or_init_with(&self, build: impl FnOnce() -> Result<Client>) -> Option<Arc<Client>> {
        if let Some(client) = self.get() {
            return Some(client);
        }
        self.init.call_once(|| {
            let built = match panic::catch_unwind(AssertUnwindSafe(build)) {
                Ok(outcome) => outcome.ok().map(Arc::new),
                Err(_) => {
                    tracing::error!("client construction panicked");
                    None
                }
            };
            *self.client.write().unwrap_or_else(PoisonError::into_inner) = built;
        });
        self.get()
    }

    /// Returns the stored client without attempting construction.
    pub fn get(&self) -> Option<Arc<Client>> {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the single construction attempt has already run.
    pub fn is_initialized(&self) -> bool {
        self.init.is_completed()
    }
}

impl Default for ClientSlot {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT: ClientSlot = ClientSlot::new();

/// Returns the process-wide default client, building an Anonymous-tier
/// client from the environment on first use. `None` means the single
/// construction attempt failed; the failure was logged at that time.
pub fn default_client() -> Option<Arc<Client>> {
    DEFAULT.get_or_init_with(|| Client::from_env(Tier::Anonymous))
}

/// Builds the process-wide default client with `tier` if it does not
/// exist yet. An existing default is returned unchanged whatever `tier`
/// is passed.
pub fn init_default(tier: Tier) -> Result<Arc<Client>> {
    DEFAULT
        .get_or_init_with(|| Client::from_env(tier))
        .ok_or(Error::DefaultUnavailable)
}
