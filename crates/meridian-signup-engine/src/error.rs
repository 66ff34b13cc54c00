// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use meridian_signup_api_client::ApiError;
use meridian_signup_store::SignupStoreError;

use crate::steps::Step;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The chosen username is taken or otherwise rejected. Tagged distinctly
    /// so the UI can re-prompt without alarming messaging.
    #[error("username is not available")]
    UsernameAvailability(#[source] ApiError),

    #[error("email is not available")]
    EmailAvailability(#[source] ApiError),

    #[error(transparent)]
    Api(ApiError),

    #[error(transparent)]
    SessionStore(#[from] SignupStoreError),

    #[error("key material error")]
    Keys(#[from] meridian_signup_store::KeyError),

    #[error("account setup finished without session material")]
    MissingSetupData,

    #[error("no human verification request is pending")]
    NoPendingVerification,

    #[error("signup flow was aborted")]
    FlowAborted,

    #[error("cache is in the {0} lifecycle but a signup lifecycle is required")]
    WrongLifecycle(&'static str),

    #[error("event {event} is not valid in step {step}")]
    UnexpectedEvent { step: Step, event: &'static str },

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn internal(msg: impl ToString) -> Self {
        Error::Internal(msg.to_string())
    }

    /// Benign errors are expected outcomes the UI recovers from in place; the
    /// orchestrator does not reset the flow for them. An out-of-order event
    /// counts too: a stale screen must not wipe a healthy flow.
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            Error::UsernameAvailability(_)
                | Error::EmailAvailability(_)
                | Error::UnexpectedEvent { .. }
        )
    }
}
