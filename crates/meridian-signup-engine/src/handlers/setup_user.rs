// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use meridian_signup_api_client::{
    request::{RegisterMnemonicRequest, SetupKeysRequest},
    response::User,
    types::SignupType,
    SignupApi,
};
use meridian_signup_store::{
    derive_key_password, generate_address_key, KeyPassword, KeySalt, PersistedSession,
    RecoveryPhrase, SessionStore,
};

use crate::{
    best_effort::BestEffort,
    cache::{ClientType, SetupData, SignupCache},
    error::Error,
    handlers::{subscription::handle_subscribe_user, HandlerOutcome},
    steps::Step,
    telemetry::TelemetryEvent,
};

/// Finishes provisioning the freshly created user: session, subscription,
/// address keys, locale, persistence, and the best-effort recovery phrase.
///
/// Runs at the automatic setting-up step.
pub async fn handle_setup_user<A, S>(
    cache: &SignupCache,
    api: &A,
    store: &S,
) -> Result<HandlerOutcome, Error>
where
    A: SignupApi,
    S: SessionStore,
{
    let state = cache.signup()?;
    let account = &state.account_data;
    let login = match account.signup_type {
        SignupType::Email => account.email.as_deref().unwrap_or(&account.username),
        SignupType::Username | SignupType::Vpn => account.username.as_str(),
    };
    let auth = api
        .authenticate(login, &account.password)
        .await
        .map_err(Error::Api)?;

    // The subscription must be in place before any key material lands on the
    // account; keys on an unentitled user leave it locked.
    let subscription_event = handle_subscribe_user(
        api,
        &state.subscription_data,
        state.referral_data.as_ref(),
        cache.product_param.as_deref(),
    )
    .await?;

    let ((user, key_password), _) = tokio::try_join!(
        setup_address_keys(api, &account.password),
        push_locale(api, &cache.locale),
    )?;

    let session = PersistedSession {
        uid: auth.uid.clone(),
        user_id: auth.user_id.clone(),
        access_token: auth.access_token.clone(),
        refresh_token: auth.refresh_token.clone(),
        key_password: key_password.clone(),
        persistent: cache.persistent,
        trusted: cache.trusted,
    };
    meridian_signup_store::store_session(store, &session).await?;

    let mnemonic = BestEffort::from_result(register_recovery_phrase(api).await);

    let mut events = Vec::new();
    if let Some(event) = subscription_event {
        events.push(event);
    }

    let next = cache.with_signup(|state| {
        state.setup_data = Some(SetupData {
            auth,
            user,
            key_password,
            mnemonic,
        });
    });

    // Headless clients have no post-setup screens; the flow ends here.
    if cache.client_type == ClientType::Vpn {
        events.push(TelemetryEvent::SignupCompleted {
            client_type: cache.client_type,
        });
        let session = next.session()?;
        return Ok(HandlerOutcome::Done {
            session: Box::new(session),
            events,
        });
    }
    Ok(HandlerOutcome::advance_with(
        next,
        Step::Congratulations,
        events,
    ))
}

/// Generates and uploads key material for every address the account got at
/// creation, then re-reads the user. Accounts without addresses get no key
/// password.
async fn setup_address_keys<A: SignupApi>(
    api: &A,
    password: &str,
) -> Result<(User, Option<KeyPassword>), Error> {
    let addresses = api.get_addresses().await.map_err(Error::Api)?;
    if addresses.is_empty() {
        let user = api.get_user().await.map_err(Error::Api)?;
        return Ok((user, None));
    }

    let salt = KeySalt::generate();
    let key_password = derive_key_password(password, &salt);
    for address in &addresses {
        let private_key = generate_address_key(&key_password);
        api.setup_address_keys(SetupKeysRequest {
            address_id: address.id.clone(),
            private_key,
            key_salt: salt.encoded(),
        })
        .await
        .map_err(Error::Api)?;
    }
    let user = api.get_user().await.map_err(Error::Api)?;
    Ok((user, Some(key_password)))
}

async fn push_locale<A: SignupApi>(api: &A, locale: &str) -> Result<(), Error> {
    api.update_locale(locale).await.map_err(Error::Api)
}

async fn register_recovery_phrase<A: SignupApi>(api: &A) -> Result<RecoveryPhrase, Error> {
    let phrase = RecoveryPhrase::generate().map_err(Error::internal)?;
    let salt = KeySalt::generate();
    api.register_mnemonic(RegisterMnemonicRequest {
        phrase_hash: phrase.salted_hash(&salt),
        salt: salt.encoded(),
    })
    .await
    .map_err(Error::Api)?;
    api.reactivate_mnemonic().await.map_err(Error::Api)?;
    Ok(phrase)
}
