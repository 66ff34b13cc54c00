// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use std::error::Error;

use serde::{Deserialize, Serialize};

use crate::keys::KeyPassword;

/// The session material persisted once signup reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub uid: String,
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub key_password: Option<KeyPassword>,
    pub persistent: bool,
    pub trusted: bool,
}

pub trait SessionStore {
    type StorageError: Error + Send + Sync + 'static;

    #[allow(async_fn_in_trait)]
    async fn store_session(&self, session: &PersistedSession) -> Result<(), Self::StorageError>;

    #[allow(async_fn_in_trait)]
    async fn load_session(&self) -> Result<PersistedSession, Self::StorageError>;

    #[allow(async_fn_in_trait)]
    async fn remove_session(&self) -> Result<(), Self::StorageError>;
}
