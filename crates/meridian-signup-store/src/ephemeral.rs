// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use tokio::sync::Mutex;

use crate::session::{PersistedSession, SessionStore};

/// Session store that never touches disk. Used by tests and by clients that
/// opt out of persistence.
#[derive(Default)]
pub struct InMemSessionStore {
    session: Mutex<Option<PersistedSession>>,
}

#[derive(Debug, thiserror::Error)]
pub enum InMemSessionStoreError {
    #[error("no session stored")]
    NoSessionStored,
}

impl SessionStore for InMemSessionStore {
    type StorageError = InMemSessionStoreError;

    async fn store_session(
        &self,
        session: &PersistedSession,
    ) -> Result<(), InMemSessionStoreError> {
        self.session.lock().await.replace(session.clone());
        Ok(())
    }

    async fn load_session(&self) -> Result<PersistedSession, InMemSessionStoreError> {
        self.session
            .lock()
            .await
            .clone()
            .ok_or(InMemSessionStoreError::NoSessionStored)
    }

    async fn remove_session(&self) -> Result<(), InMemSessionStoreError> {
        self.session.lock().await.take();
        Ok(())
    }
}
