// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::response::SubscriptionCheck;

/// How the account identifies itself at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SignupType {
    Username,
    Email,
    Vpn,
}

/// Validated account form data handed to the engine by the UI collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountData {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    pub signup_type: SignupType,
    pub client_payload: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Currency {
    Eur,
    Usd,
    Chf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Cycle {
    Monthly,
    Yearly,
    TwoYears,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentType {
    Card,
    Paypal,
    Prepaid,
}

/// Opaque payment instrument collected by the payment step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDescriptor {
    pub token: String,
    pub payment_type: PaymentType,
}

/// Selected plans plus everything needed to price and charge them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionData {
    /// Plan code to quantity. Empty means free tier.
    pub plan_ids: BTreeMap<String, u64>,
    pub currency: Currency,
    pub cycle: Cycle,
    pub coupon: Option<String>,
    /// Latest price check. Must be recomputed before any charging call.
    pub check_result: Option<SubscriptionCheck>,
    pub payment: Option<PaymentDescriptor>,
}

impl SubscriptionData {
    pub fn free(currency: Currency) -> Self {
        SubscriptionData {
            plan_ids: BTreeMap::new(),
            currency,
            cycle: Cycle::Monthly,
            coupon: None,
            check_result: None,
            payment: None,
        }
    }

    pub fn amount_due(&self) -> i64 {
        self.check_result
            .as_ref()
            .map(|check| check.amount_due)
            .unwrap_or(0)
    }
}

/// Invitation provenance, usable as an alternate verification channel during
/// user creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteData {
    pub selector: String,
    pub token: String,
}

/// Referral provenance. A present referral zeroes the subscribe charge and its
/// code replaces any user-entered coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralData {
    pub code: String,
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VerificationTokenType {
    Captcha,
    Email,
    Sms,
    Invite,
    Payment,
}

/// Proof that a human-verification challenge has been solved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanVerificationResult {
    pub token: String,
    pub token_type: VerificationTokenType,
}
