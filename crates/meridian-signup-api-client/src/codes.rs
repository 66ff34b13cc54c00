// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

//! Numeric API error codes the signup engine branches on.

/// The server requires a human-verification challenge to be solved before the
/// request can be retried. The error details carry the challenge.
pub const HUMAN_VERIFICATION_REQUIRED: u32 = 9001;

/// Username or email is taken or otherwise not available.
pub const NOT_AVAILABLE: u32 = 2500;

/// The verification token passed to user creation was rejected.
pub const CREATE_USER_TOKEN_INVALID: u32 = 12087;

/// Recovery email update rejected because it matches the account's own
/// address.
pub const EMAIL_UPDATE_SELF: u32 = 12221;
