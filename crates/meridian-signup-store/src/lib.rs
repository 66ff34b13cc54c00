// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use std::error::Error;

pub use ephemeral::{InMemSessionStore, InMemSessionStoreError};
pub use keys::{
    derive_key_password, generate_address_key, rewrap_address_key, KeyError, KeyPassword, KeySalt,
};
pub use recovery::{RecoveryError, RecoveryPhrase};
pub use session::{PersistedSession, SessionStore};

mod ephemeral;
mod keys;
mod recovery;
mod session;

// Helper functions for error wrapping

#[derive(Debug, thiserror::Error)]
pub enum SignupStoreError {
    #[error("failed to store session")]
    FailedToStoreSession {
        source: Box<dyn Error + Send + Sync + 'static>,
    },

    #[error("failed to load session")]
    FailedToLoadSession {
        source: Box<dyn Error + Send + Sync + 'static>,
    },

    #[error("failed to remove session")]
    FailedToRemoveSession {
        source: Box<dyn Error + Send + Sync + 'static>,
    },
}

pub async fn store_session<S>(
    store: &S,
    session: &PersistedSession,
) -> Result<(), SignupStoreError>
where
    S: SessionStore,
{
    store
        .store_session(session)
        .await
        .map_err(|err| SignupStoreError::FailedToStoreSession {
            source: Box::new(err),
        })
}

pub async fn load_session<S>(store: &S) -> Result<PersistedSession, SignupStoreError>
where
    S: SessionStore,
{
    store
        .load_session()
        .await
        .map_err(|err| SignupStoreError::FailedToLoadSession {
            source: Box::new(err),
        })
}

pub async fn remove_session<S>(store: &S) -> Result<(), SignupStoreError>
where
    S: SessionStore,
{
    store
        .remove_session()
        .await
        .map_err(|err| SignupStoreError::FailedToRemoveSession {
            source: Box::new(err),
        })
}
