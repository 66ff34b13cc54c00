// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use meridian_signup_api_client::{
    request::{KeyUpdate, UpdateKeysRequest},
    SignupApi,
};
use meridian_signup_store::{
    derive_key_password, generate_address_key, rewrap_address_key, KeySalt, PersistedSession,
    SessionStore,
};

use crate::{
    cache::SignupCache, error::Error, handlers::HandlerOutcome, steps::Step,
};

/// Re-keys the account under a new password chosen after setup.
///
/// Unlock, key upload, and session persistence run strictly in order; the
/// unlock token is single-use and the persisted session must match whatever
/// key material the server ends up holding.
pub async fn handle_set_password<A, S>(
    cache: &SignupCache,
    api: &A,
    store: &S,
    new_password: String,
) -> Result<HandlerOutcome, Error>
where
    A: SignupApi,
    S: SessionStore,
{
    let state = cache.signup()?;
    let setup = state.setup_data.as_ref().ok_or(Error::MissingSetupData)?;

    let addresses = api.get_addresses().await.map_err(Error::Api)?;
    let salt = KeySalt::generate();
    let new_key_password = derive_key_password(&new_password, &salt);

    let mut keys = Vec::new();
    for address in &addresses {
        for key in &address.keys {
            let private_key = match &setup.key_password {
                Some(old) => rewrap_address_key(&key.private_key, old, &new_key_password)?,
                None => generate_address_key(&new_key_password),
            };
            keys.push(KeyUpdate {
                id: key.id.clone(),
                private_key,
            });
        }
    }

    let unlock = api.unlock_password_change().await.map_err(Error::Api)?;
    api.update_private_keys(UpdateKeysRequest {
        key_salt: salt.encoded(),
        keys,
        unlock_token: unlock.unlock_token,
    })
    .await
    .map_err(Error::Api)?;

    let session = PersistedSession {
        uid: setup.auth.uid.clone(),
        user_id: setup.auth.user_id.clone(),
        access_token: setup.auth.access_token.clone(),
        refresh_token: setup.auth.refresh_token.clone(),
        key_password: Some(new_key_password.clone()),
        persistent: cache.persistent,
        trusted: cache.trusted,
    };
    meridian_signup_store::store_session(store, &session).await?;

    let user = api.get_user().await.map_err(Error::Api)?;
    let next = cache.with_signup(|state| {
        if let Some(setup) = &mut state.setup_data {
            setup.key_password = Some(new_key_password);
            setup.user = user;
        }
    });
    Ok(HandlerOutcome::advance(next, Step::Congratulations))
}
