// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use std::{sync::Arc, time::Duration};

use reqwest::Method;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use url::Url;

use crate::{
    api::SignupApi,
    error::ApiError,
    request::{
        CheckSubscriptionRequest, CreateSubscriptionRequest, CreateUserRequest,
        RegisterMnemonicRequest, SetupKeysRequest, UpdateKeysRequest,
    },
    response::{
        Address, AddressesResponse, ApiErrorBody, AuthResponse, SubscriptionCheck, UnlockResponse,
        User, UserResponse,
    },
    routes,
    types::HumanVerificationResult,
};

const SESSION_UID_HEADER: &str = "x-session-uid";
const HV_TOKEN_HEADER: &str = "x-hv-token";
const HV_TOKEN_TYPE_HEADER: &str = "x-hv-token-type";

const CALL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
struct SessionTokens {
    uid: String,
    access_token: String,
}

/// Reqwest-backed implementation of [`SignupApi`].
///
/// The client carries the session tokens produced by `authenticate` and
/// attaches them to all subsequent authenticated calls.
#[derive(Clone)]
pub struct SignupApiClient {
    inner: reqwest::Client,
    base_url: Url,
    auth: Arc<RwLock<Option<SessionTokens>>>,
}

impl SignupApiClient {
    pub fn new(base_url: Url) -> Result<Self, ApiError> {
        let inner = reqwest::Client::builder()
            .timeout(CALL_TIMEOUT)
            .build()
            .map_err(ApiError::Setup)?;
        tracing::debug!("Using signup api url: {}", base_url);
        Ok(SignupApiClient {
            inner,
            base_url,
            auth: Default::default(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn send<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<&B>,
        verification: Option<&HumanVerificationResult>,
        authenticated: bool,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: serde::Serialize,
    {
        let endpoint = segments.join("/");
        let url = self
            .base_url
            .join(&endpoint)
            .map_err(ApiError::InvalidUrl)?;

        let mut request = self.inner.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if authenticated {
            let auth = self.auth.read().await;
            let Some(tokens) = auth.as_ref() else {
                return Err(ApiError::NotAuthenticated { endpoint });
            };
            request = request
                .header(SESSION_UID_HEADER, &tokens.uid)
                .bearer_auth(&tokens.access_token);
        }
        if let Some(proof) = verification {
            request = request
                .header(HV_TOKEN_HEADER, &proof.token)
                .header(HV_TOKEN_TYPE_HEADER, proof.token_type.to_string());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!("Calling {}", endpoint);
        let response = request.send().await.map_err(|source| ApiError::Network {
            endpoint: endpoint.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return match response.json::<ApiErrorBody>().await {
                Ok(error_body) => Err(ApiError::Endpoint {
                    endpoint,
                    code: error_body.code,
                    message: error_body.error,
                    status: Some(status.as_u16()),
                    details: error_body.details,
                }),
                Err(source) => Err(ApiError::Decode { endpoint, source }),
            };
        }

        response
            .json::<T>()
            .await
            .map_err(|source| ApiError::Decode { endpoint, source })
    }

    async fn send_no_content<B>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
        authenticated: bool,
    ) -> Result<(), ApiError>
    where
        B: serde::Serialize,
    {
        // Endpoints without a payload still answer with a status body.
        let _: ApiOkBody = self
            .send(method, segments, &[], body, None, authenticated)
            .await?;
        Ok(())
    }
}

#[derive(serde::Deserialize)]
struct ApiOkBody {
    #[serde(default)]
    #[allow(dead_code)]
    code: u32,
}

impl SignupApi for SignupApiClient {
    async fn check_username_available(&self, username: &str) -> Result<(), ApiError> {
        let _: ApiOkBody = self
            .send(
                Method::GET,
                &[routes::CORE, routes::V1, routes::USERS, routes::AVAILABLE],
                &[("name", username)],
                None::<&()>,
                None,
                false,
            )
            .await?;
        Ok(())
    }

    async fn check_email_available(
        &self,
        email: &str,
        proof: Option<&HumanVerificationResult>,
    ) -> Result<(), ApiError> {
        let _: ApiOkBody = self
            .send(
                Method::GET,
                &[routes::CORE, routes::V1, routes::USERS, routes::AVAILABLE],
                &[("email", email)],
                None::<&()>,
                proof,
                false,
            )
            .await?;
        Ok(())
    }

    async fn create_user(
        &self,
        request: CreateUserRequest,
        verification: Option<HumanVerificationResult>,
    ) -> Result<User, ApiError> {
        let response: UserResponse = self
            .send(
                Method::POST,
                &[routes::CORE, routes::V1, routes::USERS],
                &[],
                Some(&request),
                verification.as_ref(),
                false,
            )
            .await?;
        Ok(response.user)
    }

    async fn check_subscription(
        &self,
        request: CheckSubscriptionRequest,
    ) -> Result<SubscriptionCheck, ApiError> {
        self.send(
            Method::POST,
            &[
                routes::CORE,
                routes::V1,
                routes::SUBSCRIPTIONS,
                routes::CHECK,
            ],
            &[],
            Some(&request),
            None,
            false,
        )
        .await
    }

    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<(), ApiError> {
        self.send_no_content(
            Method::POST,
            &[routes::CORE, routes::V1, routes::SUBSCRIPTIONS],
            Some(&request),
            true,
        )
        .await
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        // The credential proof exchange happens inside the gateway boundary;
        // only the resulting session tokens are carried forward.
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });
        let response: AuthResponse = self
            .send(
                Method::POST,
                &[routes::CORE, routes::V1, routes::AUTH],
                &[],
                Some(&body),
                None,
                false,
            )
            .await?;
        self.auth.write().await.replace(SessionTokens {
            uid: response.uid.clone(),
            access_token: response.access_token.clone(),
        });
        Ok(response)
    }

    async fn get_user(&self) -> Result<User, ApiError> {
        let response: UserResponse = self
            .send(
                Method::GET,
                &[routes::CORE, routes::V1, routes::USERS],
                &[],
                None::<&()>,
                None,
                true,
            )
            .await?;
        Ok(response.user)
    }

    async fn get_addresses(&self) -> Result<Vec<Address>, ApiError> {
        let response: AddressesResponse = self
            .send(
                Method::GET,
                &[routes::CORE, routes::V1, routes::ADDRESSES],
                &[],
                None::<&()>,
                None,
                true,
            )
            .await?;
        Ok(response.addresses)
    }

    async fn setup_address_keys(&self, request: SetupKeysRequest) -> Result<(), ApiError> {
        self.send_no_content(
            Method::POST,
            &[routes::CORE, routes::V1, routes::KEYS, routes::SETUP],
            Some(&request),
            true,
        )
        .await
    }

    async fn update_locale(&self, locale: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({ "locale": locale });
        self.send_no_content(
            Method::PUT,
            &[routes::CORE, routes::V1, routes::SETTINGS, routes::LOCALE],
            Some(&body),
            true,
        )
        .await
    }

    async fn unlock_password_change(&self) -> Result<UnlockResponse, ApiError> {
        self.send(
            Method::POST,
            &[routes::CORE, routes::V1, routes::KEYS, routes::UNLOCK],
            &[],
            None::<&()>,
            None,
            true,
        )
        .await
    }

    async fn update_private_keys(&self, request: UpdateKeysRequest) -> Result<(), ApiError> {
        self.send_no_content(
            Method::PUT,
            &[routes::CORE, routes::V1, routes::KEYS],
            Some(&request),
            true,
        )
        .await
    }

    async fn set_display_name(&self, name: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({ "displayName": name });
        self.send_no_content(
            Method::PUT,
            &[
                routes::CORE,
                routes::V1,
                routes::SETTINGS,
                routes::DISPLAY_NAME,
            ],
            Some(&body),
            true,
        )
        .await
    }

    async fn update_recovery_phone(&self, phone: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({ "phone": phone });
        self.send_no_content(
            Method::PUT,
            &[routes::CORE, routes::V1, routes::SETTINGS, routes::PHONE],
            Some(&body),
            true,
        )
        .await
    }

    async fn update_recovery_email(&self, email: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({ "email": email });
        self.send_no_content(
            Method::PUT,
            &[routes::CORE, routes::V1, routes::SETTINGS, routes::EMAIL],
            Some(&body),
            true,
        )
        .await
    }

    async fn register_mnemonic(&self, request: RegisterMnemonicRequest) -> Result<(), ApiError> {
        self.send_no_content(
            Method::POST,
            &[routes::CORE, routes::V1, routes::SETTINGS, routes::MNEMONIC],
            Some(&request),
            true,
        )
        .await
    }

    async fn reactivate_mnemonic(&self) -> Result<(), ApiError> {
        self.send_no_content(
            Method::POST,
            &[
                routes::CORE,
                routes::V1,
                routes::SETTINGS,
                routes::MNEMONIC,
                routes::REACTIVATE,
            ],
            None::<&()>,
            true,
        )
        .await
    }
}
