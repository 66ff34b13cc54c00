// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use meridian_signup_api_client::types::{
    AccountData, PaymentDescriptor, SubscriptionData, VerificationTokenType,
};
use serde::Serialize;

/// Screen-level workflow step. The orchestrator dispatches on this with an
/// exhaustive match so a new step cannot silently fall through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum Step {
    Account,
    TrialPlan,
    Upsell,
    Payment,
    CreatingAccount,
    SettingUp,
    HumanVerification,
    Congratulations,
    SetPassword,
    SaveRecovery,
    Explore,
    Done,
}

/// External events handed to the orchestrator by the UI collaborator.
#[derive(Debug, Clone)]
pub enum SignupEvent {
    SubmitAccount(AccountData),
    SelectPlan(SubscriptionData),
    DeclinePlan,
    SubmitPayment(PaymentDescriptor),
    SubmitVerification {
        token: String,
        token_type: VerificationTokenType,
    },
    SubmitDisplayName(String),
    RequestPasswordChange,
    SubmitNewPassword(String),
    SubmitRecovery {
        phone: Option<String>,
        email: Option<String>,
    },
    Complete,
    Abort,
}

impl SignupEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SignupEvent::SubmitAccount(_) => "submit-account",
            SignupEvent::SelectPlan(_) => "select-plan",
            SignupEvent::DeclinePlan => "decline-plan",
            SignupEvent::SubmitPayment(_) => "submit-payment",
            SignupEvent::SubmitVerification { .. } => "submit-verification",
            SignupEvent::SubmitDisplayName(_) => "submit-display-name",
            SignupEvent::RequestPasswordChange => "request-password-change",
            SignupEvent::SubmitNewPassword(_) => "submit-new-password",
            SignupEvent::SubmitRecovery { .. } => "submit-recovery",
            SignupEvent::Complete => "complete",
            SignupEvent::Abort => "abort",
        }
    }
}
