// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use meridian_signup_api_client::{
    codes,
    request::CreateUserRequest,
    types::{AccountData, HumanVerificationResult, SignupType, VerificationTokenType},
    SignupApi,
};

use crate::{
    cache::{SignupCache, SignupState, VerificationTrigger},
    error::Error,
    handlers::{verification, HandlerOutcome},
    steps::Step,
    telemetry::TelemetryEvent,
};

/// How email signups prove themselves at user creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateUserMode {
    #[default]
    Standard,
    /// Present the collected payment token as the verification channel.
    PaymentTokenVerification,
}

/// The verification channel selected for a creation attempt. The invite
/// channel is the only one that gets a retry without itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Proof,
    Invite,
    Payment,
    None,
}

/// Creates the account user. Runs at the automatic account-creation step.
///
/// A rejected invite token is dropped and creation retried exactly once
/// without it; any further rejection propagates.
pub async fn handle_create_user<A: SignupApi>(
    cache: &SignupCache,
    api: &A,
    mode: CreateUserMode,
) -> Result<HandlerOutcome, Error> {
    let mut cache = cache.clone();
    let mut retries_left: u32 = 1;
    loop {
        let state = cache.signup()?;
        let signup_type = state.account_data.signup_type;
        let (channel, proof) = select_channel(state, mode);
        let request = build_request(&state.account_data);

        match api.create_user(request, proof).await {
            Ok(user) => {
                tracing::info!("Created account user {}", user.id);
                let next = cache.with_signup(|state| {
                    state.human_verification_data = None;
                });
                return Ok(HandlerOutcome::advance_with(
                    next,
                    Step::SettingUp,
                    vec![TelemetryEvent::UserCreated { signup_type }],
                ));
            }
            Err(err)
                if err.is_code(codes::CREATE_USER_TOKEN_INVALID)
                    && channel == Channel::Invite
                    && retries_left > 0 =>
            {
                tracing::warn!("Invite token rejected, retrying user creation without it");
                retries_left -= 1;
                cache = cache.with_signup(|state| {
                    state.invite_data = None;
                });
            }
            Err(err) if err.is_code(codes::HUMAN_VERIFICATION_REQUIRED) => {
                return verification::enter(&cache, VerificationTrigger::UserCreation, err);
            }
            Err(err) => return Err(Error::Api(err)),
        }
    }
}

fn select_channel(
    state: &SignupState,
    mode: CreateUserMode,
) -> (Channel, Option<HumanVerificationResult>) {
    match state.account_data.signup_type {
        SignupType::Username | SignupType::Vpn => {
            if let Some(proof) = &state.human_verification_result {
                (Channel::Proof, Some(proof.clone()))
            } else if let Some(invite) = &state.invite_data {
                (
                    Channel::Invite,
                    Some(HumanVerificationResult {
                        token: format!("{}:{}", invite.selector, invite.token),
                        token_type: VerificationTokenType::Invite,
                    }),
                )
            } else {
                (Channel::None, None)
            }
        }
        SignupType::Email => {
            if mode == CreateUserMode::PaymentTokenVerification {
                if let Some(payment) = &state.subscription_data.payment {
                    return (
                        Channel::Payment,
                        Some(HumanVerificationResult {
                            token: payment.token.clone(),
                            token_type: VerificationTokenType::Payment,
                        }),
                    );
                }
            }
            if let Some(proof) = &state.human_verification_result {
                (Channel::Proof, Some(proof.clone()))
            } else {
                (Channel::None, None)
            }
        }
    }
}

fn build_request(account: &AccountData) -> CreateUserRequest {
    let username = match account.signup_type {
        SignupType::Username | SignupType::Vpn => Some(account.username.clone()),
        SignupType::Email => None,
    };
    CreateUserRequest {
        username,
        email: account.email.clone(),
        password: account.password.clone(),
        payload: account.client_payload.clone(),
    }
}

#[cfg(test)]
mod tests {
    use meridian_signup_api_client::types::{InviteData, PaymentDescriptor, PaymentType};

    use super::*;
    use crate::testutil::{email_cache, hv_details, username_cache, Call, MockApi};

    fn invited_cache() -> SignupCache {
        username_cache().with_signup(|state| {
            state.invite_data = Some(InviteData {
                selector: "sel-1".to_string(),
                token: "tok-1".to_string(),
            });
        })
    }

    #[tokio::test]
    async fn plain_signup_advances_to_setup() {
        let api = MockApi::new();
        let cache = username_cache();
        let before = cache.clone();

        let outcome = handle_create_user(&cache, &api, CreateUserMode::Standard)
            .await
            .unwrap();

        assert_eq!(outcome.to(), Step::SettingUp);
        assert_eq!(cache, before);
        assert_eq!(api.calls(), vec![Call::CreateUser { channel: None }]);
    }

    #[tokio::test]
    async fn rejected_invite_is_retried_exactly_once_without_it() {
        let api = MockApi::new();
        api.create_user
            .fail_once(codes::CREATE_USER_TOKEN_INVALID, None);
        let cache = invited_cache();

        let outcome = handle_create_user(&cache, &api, CreateUserMode::Standard)
            .await
            .unwrap();

        assert_eq!(outcome.to(), Step::SettingUp);
        assert_eq!(
            api.calls(),
            vec![
                Call::CreateUser {
                    channel: Some(VerificationTokenType::Invite)
                },
                Call::CreateUser { channel: None },
            ]
        );
        // The dropped invite stays dropped in the resulting lineage.
        assert!(outcome
            .cache()
            .unwrap()
            .signup()
            .unwrap()
            .invite_data
            .is_none());
    }

    #[tokio::test]
    async fn second_token_rejection_propagates() {
        let api = MockApi::new();
        api.create_user
            .fail_always(codes::CREATE_USER_TOKEN_INVALID, None);
        let cache = invited_cache();

        let err = handle_create_user(&cache, &api, CreateUserMode::Standard)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Api(inner) if inner.is_code(codes::CREATE_USER_TOKEN_INVALID)));
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn verification_demand_suspends_with_user_creation_trigger() {
        let api = MockApi::new();
        api.create_user.fail_once(
            codes::HUMAN_VERIFICATION_REQUIRED,
            Some(hv_details("hv-create")),
        );
        let cache = username_cache();

        let outcome = handle_create_user(&cache, &api, CreateUserMode::Standard)
            .await
            .unwrap();

        assert_eq!(outcome.to(), Step::HumanVerification);
        let state = outcome.cache().unwrap().signup().unwrap();
        assert_eq!(
            state.human_verification_data.as_ref().unwrap().trigger,
            VerificationTrigger::UserCreation
        );
    }

    #[tokio::test]
    async fn email_signup_can_verify_with_its_payment_token() {
        let api = MockApi::new();
        let cache = email_cache().with_signup(|state| {
            state.subscription_data.payment = Some(PaymentDescriptor {
                token: "pay-1".to_string(),
                payment_type: PaymentType::Card,
            });
        });

        handle_create_user(&cache, &api, CreateUserMode::PaymentTokenVerification)
            .await
            .unwrap();

        assert_eq!(
            api.calls(),
            vec![Call::CreateUser {
                channel: Some(VerificationTokenType::Payment)
            }]
        );
    }
}
