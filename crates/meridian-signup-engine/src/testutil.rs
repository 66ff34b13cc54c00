// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

//! Scriptable gateway double shared by the handler and orchestrator tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use meridian_signup_api_client::{
    request::{
        CheckSubscriptionRequest, CreateSubscriptionRequest, CreateUserRequest,
        RegisterMnemonicRequest, SetupKeysRequest, UpdateKeysRequest,
    },
    response::{Address, AddressKey, AuthResponse, SubscriptionCheck, UnlockResponse, User},
    types::{
        AccountData, Currency, Cycle, HumanVerificationResult, SignupType, SubscriptionData,
        VerificationTokenType,
    },
    ApiError, SignupApi,
};

use crate::cache::SignupCache;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    CheckUsername(String),
    CheckEmail { email: String, proof: bool },
    CreateUser { channel: Option<VerificationTokenType> },
    CheckSubscription,
    CreateSubscription { amount: i64, codes: Vec<String> },
    Authenticate(String),
    GetUser,
    GetAddresses,
    SetupAddressKeys { address_id: String },
    UpdateLocale(String),
    UnlockPasswordChange,
    UpdatePrivateKeys,
    SetDisplayName(String),
    UpdateRecoveryPhone(String),
    UpdateRecoveryEmail(String),
    RegisterMnemonic,
    ReactivateMnemonic,
}

/// Per-endpoint failure script. Queued failures fire once each in order,
/// then the endpoint succeeds unless an `always` failure is armed.
#[derive(Default)]
pub(crate) struct FailurePlan {
    queue: Mutex<VecDeque<(u32, Option<serde_json::Value>)>>,
    always: Mutex<Option<(u32, Option<serde_json::Value>)>>,
}

impl FailurePlan {
    pub(crate) fn fail_once(&self, code: u32, details: Option<serde_json::Value>) {
        self.queue.lock().unwrap().push_back((code, details));
    }

    pub(crate) fn fail_always(&self, code: u32, details: Option<serde_json::Value>) {
        *self.always.lock().unwrap() = Some((code, details));
    }

    fn next(&self, endpoint: &str) -> Result<(), ApiError> {
        let scripted = self
            .queue
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.always.lock().unwrap().clone());
        match scripted {
            Some((code, details)) => {
                let mut err = ApiError::endpoint(endpoint, code, "scripted failure");
                if let Some(details) = details {
                    err = err.with_details(details);
                }
                Err(err)
            }
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub(crate) struct MockApi {
    pub(crate) log: Mutex<Vec<Call>>,
    pub(crate) username_check: FailurePlan,
    pub(crate) email_check: FailurePlan,
    pub(crate) create_user: FailurePlan,
    pub(crate) create_subscription: FailurePlan,
    pub(crate) unlock: FailurePlan,
    pub(crate) update_keys: FailurePlan,
    pub(crate) recovery_phone: FailurePlan,
    pub(crate) recovery_email: FailurePlan,
    pub(crate) register_mnemonic: FailurePlan,
    pub(crate) check_result: Mutex<Option<SubscriptionCheck>>,
    pub(crate) addresses: Mutex<Vec<Address>>,
}

impl MockApi {
    pub(crate) fn new() -> Self {
        MockApi::default()
    }

    pub(crate) fn with_address(self) -> Self {
        *self.addresses.lock().unwrap() = vec![Address {
            id: "addr-1".to_string(),
            email: "alice@example.com".to_string(),
            keys: Vec::new(),
        }];
        self
    }

    pub(crate) fn with_keyed_address(self, private_key: &str) -> Self {
        *self.addresses.lock().unwrap() = vec![Address {
            id: "addr-1".to_string(),
            email: "alice@example.com".to_string(),
            keys: vec![AddressKey {
                id: "key-1".to_string(),
                private_key: private_key.to_string(),
            }],
        }];
        self
    }

    pub(crate) fn with_check_amount(self, amount_due: i64) -> Self {
        *self.check_result.lock().unwrap() = Some(SubscriptionCheck {
            amount_due,
            coupon: None,
            currency: Currency::Eur,
            cycle: Cycle::Yearly,
            period_end: None,
        });
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.log.lock().unwrap().push(call);
    }

    fn default_user(&self) -> User {
        User {
            id: "user-1".to_string(),
            name: Some("alice".to_string()),
            email: Some("alice@example.com".to_string()),
            display_name: None,
            locale: Some("en_US".to_string()),
        }
    }
}

impl SignupApi for MockApi {
    async fn check_username_available(&self, username: &str) -> Result<(), ApiError> {
        self.record(Call::CheckUsername(username.to_string()));
        self.username_check.next("users/available")
    }

    async fn check_email_available(
        &self,
        email: &str,
        proof: Option<&HumanVerificationResult>,
    ) -> Result<(), ApiError> {
        self.record(Call::CheckEmail {
            email: email.to_string(),
            proof: proof.is_some(),
        });
        self.email_check.next("users/available")
    }

    async fn create_user(
        &self,
        _request: CreateUserRequest,
        verification: Option<HumanVerificationResult>,
    ) -> Result<User, ApiError> {
        self.record(Call::CreateUser {
            channel: verification.map(|v| v.token_type),
        });
        self.create_user.next("users")?;
        Ok(self.default_user())
    }

    async fn check_subscription(
        &self,
        request: CheckSubscriptionRequest,
    ) -> Result<SubscriptionCheck, ApiError> {
        self.record(Call::CheckSubscription);
        Ok(self
            .check_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(SubscriptionCheck {
                amount_due: 0,
                coupon: request.codes.first().cloned(),
                currency: request.currency,
                cycle: request.cycle,
                period_end: None,
            }))
    }

    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<(), ApiError> {
        self.record(Call::CreateSubscription {
            amount: request.amount,
            codes: request.codes,
        });
        self.create_subscription.next("subscriptions")
    }

    async fn authenticate(
        &self,
        username: &str,
        _password: &str,
    ) -> Result<AuthResponse, ApiError> {
        self.record(Call::Authenticate(username.to_string()));
        Ok(AuthResponse {
            uid: "uid-1".to_string(),
            user_id: "user-1".to_string(),
            access_token: "access-1".to_string(),
            refresh_token: "refresh-1".to_string(),
            scope: Some("full".to_string()),
        })
    }

    async fn get_user(&self) -> Result<User, ApiError> {
        self.record(Call::GetUser);
        Ok(self.default_user())
    }

    async fn get_addresses(&self) -> Result<Vec<Address>, ApiError> {
        self.record(Call::GetAddresses);
        Ok(self.addresses.lock().unwrap().clone())
    }

    async fn setup_address_keys(&self, request: SetupKeysRequest) -> Result<(), ApiError> {
        self.record(Call::SetupAddressKeys {
            address_id: request.address_id,
        });
        Ok(())
    }

    async fn update_locale(&self, locale: &str) -> Result<(), ApiError> {
        self.record(Call::UpdateLocale(locale.to_string()));
        Ok(())
    }

    async fn unlock_password_change(&self) -> Result<UnlockResponse, ApiError> {
        self.record(Call::UnlockPasswordChange);
        self.unlock.next("users/unlock")?;
        Ok(UnlockResponse {
            unlock_token: "unlock-1".to_string(),
        })
    }

    async fn update_private_keys(&self, _request: UpdateKeysRequest) -> Result<(), ApiError> {
        self.record(Call::UpdatePrivateKeys);
        self.update_keys.next("settings/keys")
    }

    async fn set_display_name(&self, name: &str) -> Result<(), ApiError> {
        self.record(Call::SetDisplayName(name.to_string()));
        Ok(())
    }

    async fn update_recovery_phone(&self, phone: &str) -> Result<(), ApiError> {
        self.record(Call::UpdateRecoveryPhone(phone.to_string()));
        self.recovery_phone.next("settings/phone")
    }

    async fn update_recovery_email(&self, email: &str) -> Result<(), ApiError> {
        self.record(Call::UpdateRecoveryEmail(email.to_string()));
        self.recovery_email.next("settings/email")
    }

    async fn register_mnemonic(&self, _request: RegisterMnemonicRequest) -> Result<(), ApiError> {
        self.record(Call::RegisterMnemonic);
        self.register_mnemonic.next("settings/mnemonic")
    }

    async fn reactivate_mnemonic(&self) -> Result<(), ApiError> {
        self.record(Call::ReactivateMnemonic);
        Ok(())
    }
}

pub(crate) fn hv_details(token: &str) -> serde_json::Value {
    serde_json::json!({
        "humanVerificationToken": token,
        "humanVerificationMethods": ["captcha", "email"],
    })
}

pub(crate) fn plan_selection(plan: &str, quantity: u64) -> SubscriptionData {
    let mut selection = SubscriptionData::free(Currency::Eur);
    selection.cycle = Cycle::Yearly;
    selection.plan_ids.insert(plan.to_string(), quantity);
    selection
}

pub(crate) fn username_account() -> AccountData {
    AccountData {
        username: "alice".to_string(),
        email: None,
        password: "hunter2".to_string(),
        signup_type: SignupType::Username,
        client_payload: None,
    }
}

pub(crate) fn email_account() -> AccountData {
    AccountData {
        username: "alice".to_string(),
        email: Some("alice@example.com".to_string()),
        password: "hunter2".to_string(),
        signup_type: SignupType::Email,
        client_payload: None,
    }
}

pub(crate) fn username_cache() -> SignupCache {
    SignupCache::new_signup(username_account(), SubscriptionData::free(Currency::Eur))
}

pub(crate) fn email_cache() -> SignupCache {
    SignupCache::new_signup(email_account(), SubscriptionData::free(Currency::Eur))
}
