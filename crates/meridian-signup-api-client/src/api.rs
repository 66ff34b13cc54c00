// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use crate::{
    error::ApiError,
    request::{
        CheckSubscriptionRequest, CreateSubscriptionRequest, CreateUserRequest,
        RegisterMnemonicRequest, SetupKeysRequest, UpdateKeysRequest,
    },
    response::{Address, AuthResponse, SubscriptionCheck, UnlockResponse, User},
    types::HumanVerificationResult,
};

/// The remote operation gateway the signup engine drives.
///
/// Every method maps to one remote call. Failures surface as [`ApiError`],
/// whose numeric code and details payload carry the engine's decision points
/// (verification challenges, token rejections, benign recovery-email
/// failures).
pub trait SignupApi {
    #[allow(async_fn_in_trait)]
    async fn check_username_available(&self, username: &str) -> Result<(), ApiError>;

    #[allow(async_fn_in_trait)]
    async fn check_email_available(
        &self,
        email: &str,
        proof: Option<&HumanVerificationResult>,
    ) -> Result<(), ApiError>;

    #[allow(async_fn_in_trait)]
    async fn create_user(
        &self,
        request: CreateUserRequest,
        verification: Option<HumanVerificationResult>,
    ) -> Result<User, ApiError>;

    #[allow(async_fn_in_trait)]
    async fn check_subscription(
        &self,
        request: CheckSubscriptionRequest,
    ) -> Result<SubscriptionCheck, ApiError>;

    #[allow(async_fn_in_trait)]
    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<(), ApiError>;

    #[allow(async_fn_in_trait)]
    async fn authenticate(&self, username: &str, password: &str)
        -> Result<AuthResponse, ApiError>;

    #[allow(async_fn_in_trait)]
    async fn get_user(&self) -> Result<User, ApiError>;

    #[allow(async_fn_in_trait)]
    async fn get_addresses(&self) -> Result<Vec<Address>, ApiError>;

    #[allow(async_fn_in_trait)]
    async fn setup_address_keys(&self, request: SetupKeysRequest) -> Result<(), ApiError>;

    #[allow(async_fn_in_trait)]
    async fn update_locale(&self, locale: &str) -> Result<(), ApiError>;

    #[allow(async_fn_in_trait)]
    async fn unlock_password_change(&self) -> Result<UnlockResponse, ApiError>;

    #[allow(async_fn_in_trait)]
    async fn update_private_keys(&self, request: UpdateKeysRequest) -> Result<(), ApiError>;

    #[allow(async_fn_in_trait)]
    async fn set_display_name(&self, name: &str) -> Result<(), ApiError>;

    #[allow(async_fn_in_trait)]
    async fn update_recovery_phone(&self, phone: &str) -> Result<(), ApiError>;

    #[allow(async_fn_in_trait)]
    async fn update_recovery_email(&self, email: &str) -> Result<(), ApiError>;

    #[allow(async_fn_in_trait)]
    async fn register_mnemonic(&self, request: RegisterMnemonicRequest) -> Result<(), ApiError>;

    #[allow(async_fn_in_trait)]
    async fn reactivate_mnemonic(&self) -> Result<(), ApiError>;
}
