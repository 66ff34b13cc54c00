// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use meridian_signup_api_client::{codes, types::SignupType, SignupApi};

use crate::{
    cache::SignupCache, error::Error, handlers::HandlerOutcome, steps::Step,
};

/// Sets the account display name chosen on the congratulations screen.
pub async fn handle_display_name<A: SignupApi>(
    cache: &SignupCache,
    api: &A,
    name: String,
) -> Result<HandlerOutcome, Error> {
    let state = cache.signup()?;
    state.setup_data.as_ref().ok_or(Error::MissingSetupData)?;

    api.set_display_name(&name).await.map_err(Error::Api)?;
    let user = api.get_user().await.map_err(Error::Api)?;

    let to = match state.account_data.signup_type {
        SignupType::Email => Step::SaveRecovery,
        SignupType::Username | SignupType::Vpn => {
            if state.ignore_explore {
                Step::SaveRecovery
            } else {
                Step::Explore
            }
        }
    };
    let next = cache.with_signup(|state| {
        if let Some(setup) = &mut state.setup_data {
            setup.user = user;
        }
    });
    Ok(HandlerOutcome::advance(next, to))
}

/// Records the recovery contacts the user offered on the save-recovery
/// screen. Both updates run concurrently.
pub async fn handle_save_recovery<A: SignupApi>(
    cache: &SignupCache,
    api: &A,
    phone: Option<String>,
    email: Option<String>,
) -> Result<HandlerOutcome, Error> {
    let state = cache.signup()?;
    let signup_type = state.account_data.signup_type;

    let phone_update = async {
        if let Some(phone) = &phone {
            api.update_recovery_phone(phone).await.map_err(Error::Api)?;
        }
        Ok::<(), Error>(())
    };
    let email_update = async {
        if let Some(email) = &email {
            if let Err(err) = api.update_recovery_email(email).await {
                // Email accounts often re-enter their own address here; the
                // server rejects it but nothing was lost.
                if signup_type == SignupType::Email && err.is_code(codes::EMAIL_UPDATE_SELF) {
                    tracing::warn!("Recovery email matches the account address, ignoring");
                } else {
                    return Err(Error::Api(err));
                }
            }
        }
        Ok::<(), Error>(())
    };
    tokio::try_join!(phone_update, email_update)?;

    Ok(HandlerOutcome::advance(cache.clone(), Step::Explore))
}
