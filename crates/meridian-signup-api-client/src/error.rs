// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use crate::{codes, response::HumanVerificationChallenge};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{endpoint} failed with code {code}: {message}")]
    Endpoint {
        endpoint: String,
        code: u32,
        message: String,
        status: Option<u16>,
        details: Option<serde_json::Value>,
    },

    #[error("failed to reach {endpoint}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode response from {endpoint}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to set up signup api client")]
    Setup(#[source] reqwest::Error),

    #[error("invalid signup api url")]
    InvalidUrl(#[source] url::ParseError),

    #[error("{endpoint} requires an authenticated session")]
    NotAuthenticated { endpoint: String },
}

impl ApiError {
    /// Convenience constructor used by tests and gateway doubles.
    pub fn endpoint(endpoint: impl Into<String>, code: u32, message: impl Into<String>) -> Self {
        ApiError::Endpoint {
            endpoint: endpoint.into(),
            code,
            message: message.into(),
            status: None,
            details: None,
        }
    }

    pub fn with_details(mut self, new_details: serde_json::Value) -> Self {
        if let ApiError::Endpoint { details, .. } = &mut self {
            *details = Some(new_details);
        }
        self
    }

    pub fn code(&self) -> Option<u32> {
        match self {
            ApiError::Endpoint { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_code(&self, expected: u32) -> bool {
        self.code() == Some(expected)
    }

    pub fn details(&self) -> Option<&serde_json::Value> {
        match self {
            ApiError::Endpoint { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// The human-verification challenge carried by this error, if it is a
    /// verification-required error whose details hold a usable token.
    pub fn human_verification_challenge(&self) -> Option<HumanVerificationChallenge> {
        if !self.is_code(codes::HUMAN_VERIFICATION_REQUIRED) {
            return None;
        }
        HumanVerificationChallenge::from_details(self.details())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_extraction_requires_matching_code() {
        let details = serde_json::json!({
            "humanVerificationToken": "abc",
            "humanVerificationMethods": ["captcha"],
        });

        let err = ApiError::endpoint("users", codes::HUMAN_VERIFICATION_REQUIRED, "verify")
            .with_details(details.clone());
        assert!(err.human_verification_challenge().is_some());

        let err = ApiError::endpoint("users", codes::NOT_AVAILABLE, "taken").with_details(details);
        assert!(err.human_verification_challenge().is_none());
    }

    #[test]
    fn challenge_extraction_requires_token() {
        let err = ApiError::endpoint("users", codes::HUMAN_VERIFICATION_REQUIRED, "verify");
        assert!(err.human_verification_challenge().is_none());
    }
}
