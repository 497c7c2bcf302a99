//! Shared application state.

use std::fmt;
use std::sync::Arc;

use keyhaven_core::breach::BreachClient;
use keyhaven_core::crypto::StaticKeyProvider;
use keyhaven_core::session::SessionSigner;
use keyhaven_storage::VaultStore;

/// Shared state threaded through all routes via `State<Arc<AppState>>`.
pub struct AppState {
    /// Credential record storage.
    pub store: Arc<dyn VaultStore>,
    /// Provider of the encryption key for sealing vault entries.
    pub keys: StaticKeyProvider,
    /// Session token issuer and verifier.
    pub signer: SessionSigner,
    /// Client for the breach range API.
    pub breach: BreachClient,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
