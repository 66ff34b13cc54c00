// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use meridian_signup_api_client::{
    response::{AuthResponse, HumanVerificationChallenge, User},
    types::{
        AccountData, HumanVerificationResult, InviteData, ReferralData, SubscriptionData,
    },
};
use meridian_signup_store::KeyPassword;
use serde::Serialize;

use crate::{best_effort::BestEffort, error::Error};

use meridian_signup_store::RecoveryPhrase;

/// The state record threaded through every signup transition.
///
/// Handlers never mutate a cache in place: each transition derives a new cache
/// from the previous one, leaving the input intact for safe retry and replay.
#[derive(Debug, Clone, PartialEq)]
pub struct SignupCache {
    pub variant: CacheVariant,

    // How the eventual session is persisted.
    pub persistent: bool,
    pub trusted: bool,

    // Environment tags passed through unchanged.
    pub product_param: Option<String>,
    pub client_type: ClientType,
    pub kt_activation: KtActivation,
    pub locale: String,
}

/// The two cache lifecycles. Signup handlers only operate on the signup
/// lifecycle and reject the other one up front.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheVariant {
    Signup(SignupState),
    ExistingUser(ExistingUserState),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignupState {
    pub account_data: AccountData,
    pub subscription_data: SubscriptionData,
    pub invite_data: Option<InviteData>,
    pub referral_data: Option<ReferralData>,

    /// Supplied verification proof. Mutually exclusive with
    /// `human_verification_data`.
    pub human_verification_result: Option<HumanVerificationResult>,
    /// Pending verification request waiting for the user to solve it.
    pub human_verification_data: Option<PendingVerification>,

    /// Present only once account creation succeeded. Never cleared within a
    /// cache lineage afterwards.
    pub setup_data: Option<SetupData>,

    pub show_upsell: bool,
    pub ignore_explore: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExistingUserState {
    pub user: User,
    pub subscription_data: SubscriptionData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum VerificationTrigger {
    UserCreation,
    ExternalCheck,
}

/// A verification request extracted from a server challenge, tagged with the
/// step that asked for it so control can return there afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingVerification {
    pub challenge: HumanVerificationChallenge,
    pub trigger: VerificationTrigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum ClientType {
    Web,
    Desktop,
    Vpn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum KtActivation {
    Disabled,
    Enabled,
}

/// Session and key material accumulated by the setup step.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupData {
    pub auth: AuthResponse,
    pub user: User,
    pub key_password: Option<KeyPassword>,
    pub mnemonic: BestEffort<RecoveryPhrase>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum SignupFlow {
    Signup,
    ExistingUser,
}

/// The terminal output handed to the session-persistence collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct SignupSession {
    pub auth: AuthResponse,
    pub user: User,
    pub key_password: Option<KeyPassword>,
    pub persistent: bool,
    pub trusted: bool,
    pub flow: SignupFlow,
    pub app_intent: Option<String>,
}

impl SignupCache {
    pub fn new_signup(account_data: AccountData, subscription_data: SubscriptionData) -> Self {
        SignupCache {
            variant: CacheVariant::Signup(SignupState {
                account_data,
                subscription_data,
                invite_data: None,
                referral_data: None,
                human_verification_result: None,
                human_verification_data: None,
                setup_data: None,
                show_upsell: false,
                ignore_explore: false,
            }),
            persistent: true,
            trusted: false,
            product_param: None,
            client_type: ClientType::Web,
            kt_activation: KtActivation::Disabled,
            locale: "en_US".to_string(),
        }
    }

    pub fn new_existing_user(user: User, subscription_data: SubscriptionData) -> Self {
        SignupCache {
            variant: CacheVariant::ExistingUser(ExistingUserState {
                user,
                subscription_data,
            }),
            persistent: true,
            trusted: false,
            product_param: None,
            client_type: ClientType::Web,
            kt_activation: KtActivation::Disabled,
            locale: "en_US".to_string(),
        }
    }

    pub fn signup(&self) -> Result<&SignupState, Error> {
        match &self.variant {
            CacheVariant::Signup(state) => Ok(state),
            CacheVariant::ExistingUser(_) => Err(Error::WrongLifecycle("existing-user")),
        }
    }

    /// Derives a new cache with the signup state updated. Callers verify the
    /// lifecycle via [`signup`](Self::signup) before using this.
    pub fn with_signup<F>(&self, mutate: F) -> SignupCache
    where
        F: FnOnce(&mut SignupState),
    {
        let mut next = self.clone();
        if let CacheVariant::Signup(state) = &mut next.variant {
            mutate(state);
        }
        next
    }

    pub fn flow(&self) -> SignupFlow {
        match &self.variant {
            CacheVariant::Signup(_) => SignupFlow::Signup,
            CacheVariant::ExistingUser(_) => SignupFlow::ExistingUser,
        }
    }

    /// Cache to restart from after an error reset. Form data survives so the
    /// user does not retype everything, but a supplied verification token is
    /// never carried into the next attempt.
    pub fn reset_for_retry(&self) -> SignupCache {
        let mut next = self.clone();
        if let CacheVariant::Signup(state) = &mut next.variant {
            state.human_verification_result = None;
            state.human_verification_data = None;
        }
        next
    }

    /// Builds the terminal session output from the accumulated setup data.
    pub fn session(&self) -> Result<SignupSession, Error> {
        let state = self.signup()?;
        let setup = state.setup_data.as_ref().ok_or(Error::MissingSetupData)?;
        Ok(SignupSession {
            auth: setup.auth.clone(),
            user: setup.user.clone(),
            key_password: setup.key_password.clone(),
            persistent: self.persistent,
            trusted: self.trusted,
            flow: self.flow(),
            app_intent: self.product_param.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use meridian_signup_api_client::types::{Currency, VerificationTokenType};

    use super::*;
    use crate::testutil::username_account;

    fn cache() -> SignupCache {
        SignupCache::new_signup(
            username_account(),
            meridian_signup_api_client::types::SubscriptionData::free(Currency::Eur),
        )
    }

    #[test]
    fn transitions_derive_a_new_cache_and_leave_the_input_intact() {
        let original = cache();
        let snapshot = original.clone();

        let next = original.with_signup(|state| {
            state.show_upsell = true;
        });

        assert_eq!(original, snapshot);
        assert_ne!(next, original);
        assert!(next.signup().unwrap().show_upsell);
    }

    #[test]
    fn reset_keeps_form_data_but_drops_the_verification_proof() {
        let filled = cache().with_signup(|state| {
            state.human_verification_result = Some(HumanVerificationResult {
                token: "proof".to_string(),
                token_type: VerificationTokenType::Captcha,
            });
        });

        let reset = filled.reset_for_retry();
        let state = reset.signup().unwrap();
        assert_eq!(state.account_data.username, "alice");
        assert!(state.human_verification_result.is_none());
        assert!(state.human_verification_data.is_none());
    }

    #[test]
    fn session_requires_completed_setup() {
        assert!(matches!(cache().session(), Err(Error::MissingSetupData)));
    }

    #[test]
    fn existing_user_lifecycle_is_rejected_by_signup_accessors() {
        let user = User {
            id: "user-1".to_string(),
            name: None,
            email: None,
            display_name: None,
            locale: None,
        };
        let existing = SignupCache::new_existing_user(
            user,
            meridian_signup_api_client::types::SubscriptionData::free(Currency::Eur),
        );
        assert!(matches!(existing.signup(), Err(Error::WrongLifecycle(_))));
        assert_eq!(existing.flow(), SignupFlow::ExistingUser);
    }
}
