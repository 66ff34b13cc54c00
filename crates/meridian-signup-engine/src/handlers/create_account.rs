// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use meridian_signup_api_client::{
    codes,
    types::SignupType,
    SignupApi,
};

use crate::{
    cache::{SignupCache, SignupState, VerificationTrigger},
    error::Error,
    handlers::{verification, HandlerOutcome},
    steps::Step,
};

/// Validates the submitted account form against the gateway and routes to
/// the next step.
///
/// Availability rejections are benign: the user picks another name and the
/// flow stays where it is. A verification demand suspends the checks into
/// the verification step instead.
pub async fn handle_create_account<A: SignupApi>(
    cache: &SignupCache,
    api: &A,
) -> Result<HandlerOutcome, Error> {
    let state = cache.signup()?;
    let account = &state.account_data;

    match account.signup_type {
        SignupType::Username | SignupType::Vpn => {
            if let Err(err) = api.check_username_available(&account.username).await {
                if err.is_code(codes::HUMAN_VERIFICATION_REQUIRED) {
                    return verification::enter(cache, VerificationTrigger::ExternalCheck, err);
                }
                return Err(Error::UsernameAvailability(err));
            }
            // An external notification address is checked too, with any
            // already-solved proof attached.
            if let Some(email) = &account.email {
                let proof = state.human_verification_result.as_ref();
                if let Err(err) = api.check_email_available(email, proof).await {
                    if err.is_code(codes::HUMAN_VERIFICATION_REQUIRED) {
                        return verification::enter(
                            cache,
                            VerificationTrigger::ExternalCheck,
                            err,
                        );
                    }
                    return Err(Error::EmailAvailability(err));
                }
            }
        }
        SignupType::Email => {
            let email = account.email.as_deref().unwrap_or(&account.username);
            let proof = state.human_verification_result.as_ref();
            if let Err(err) = api.check_email_available(email, proof).await {
                if err.is_code(codes::HUMAN_VERIFICATION_REQUIRED) {
                    return verification::enter(cache, VerificationTrigger::ExternalCheck, err);
                }
                return Err(Error::EmailAvailability(err));
            }
        }
    }

    Ok(HandlerOutcome::advance(
        cache.clone(),
        route_after_account(state),
    ))
}

fn route_after_account(state: &SignupState) -> Step {
    if state.referral_data.is_some() {
        Step::TrialPlan
    } else if state.subscription_data.amount_due() > 0 {
        Step::Payment
    } else if state.show_upsell {
        Step::Upsell
    } else {
        Step::CreatingAccount
    }
}
