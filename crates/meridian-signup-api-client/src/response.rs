// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

use crate::types::{Currency, Cycle};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub uid: String,
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub scope: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressKey {
    pub id: String,
    pub private_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub keys: Vec<AddressKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressesResponse {
    pub addresses: Vec<Address>,
}

/// Result of pricing the current plan selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCheck {
    pub amount_due: i64,
    pub coupon: Option<String>,
    pub currency: Currency,
    pub cycle: Cycle,
    #[serde(default, with = "time::serde::timestamp::option")]
    pub period_end: Option<time::OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockResponse {
    pub unlock_token: String,
}

/// Error body returned by the signup API on failed requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub code: u32,
    pub error: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// Challenge metadata carried in the details of a
/// [`codes::HUMAN_VERIFICATION_REQUIRED`](crate::codes::HUMAN_VERIFICATION_REQUIRED)
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanVerificationChallenge {
    #[serde(rename = "humanVerificationToken")]
    pub token: String,
    #[serde(rename = "humanVerificationMethods", default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl HumanVerificationChallenge {
    /// Parses the challenge out of an error details payload. Returns `None`
    /// when the payload is absent, malformed, or lacks the challenge token.
    pub fn from_details(details: Option<&serde_json::Value>) -> Option<Self> {
        let challenge: HumanVerificationChallenge =
            serde_json::from_value(details?.clone()).ok()?;
        if challenge.token.is_empty() {
            return None;
        }
        Some(challenge)
    }
}
