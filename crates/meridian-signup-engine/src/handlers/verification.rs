// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

//! Human-verification sub-flow. A verification-required error suspends the
//! step that hit it; a submitted proof re-runs that step from the top with
//! the proof attached.

use meridian_signup_api_client::{
    types::{HumanVerificationResult, VerificationTokenType},
    ApiError, SignupApi,
};

use crate::{
    cache::{PendingVerification, SignupCache, VerificationTrigger},
    error::Error,
    handlers::{
        create_account::handle_create_account,
        create_user::{handle_create_user, CreateUserMode},
        HandlerOutcome,
    },
    steps::Step,
};

/// Turns a verification-required error into the verification step.
///
/// An error that demands verification but carries no usable challenge token
/// cannot be solved, so it is re-raised as fatal.
pub(crate) fn enter(
    cache: &SignupCache,
    trigger: VerificationTrigger,
    err: ApiError,
) -> Result<HandlerOutcome, Error> {
    let Some(challenge) = err.human_verification_challenge() else {
        return Err(Error::Api(err));
    };
    tracing::info!("Human verification requested during {}", trigger);
    let next = cache.with_signup(|state| {
        state.human_verification_result = None;
        state.human_verification_data = Some(PendingVerification { challenge, trigger });
    });
    Ok(HandlerOutcome::advance(next, Step::HumanVerification))
}

/// Accepts a solved challenge and resumes the suspended step.
pub async fn handle_human_verification<A: SignupApi>(
    cache: &SignupCache,
    api: &A,
    token: String,
    token_type: VerificationTokenType,
    mode: CreateUserMode,
) -> Result<HandlerOutcome, Error> {
    let state = cache.signup()?;
    let pending = state
        .human_verification_data
        .clone()
        .ok_or(Error::NoPendingVerification)?;

    let solved = cache.with_signup(|state| {
        state.human_verification_result = Some(HumanVerificationResult { token, token_type });
        state.human_verification_data = None;
    });

    match pending.trigger {
        VerificationTrigger::ExternalCheck => handle_create_account(&solved, api).await,
        VerificationTrigger::UserCreation => handle_create_user(&solved, api, mode).await,
    }
}
