// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

pub(crate) const CORE: &str = "core";
pub(crate) const V1: &str = "v1";
pub(crate) const USERS: &str = "users";
pub(crate) const AVAILABLE: &str = "available";
pub(crate) const AUTH: &str = "auth";
pub(crate) const ADDRESSES: &str = "addresses";
pub(crate) const KEYS: &str = "keys";
pub(crate) const SETUP: &str = "setup";
pub(crate) const SUBSCRIPTIONS: &str = "subscriptions";
pub(crate) const CHECK: &str = "check";
pub(crate) const SETTINGS: &str = "settings";
pub(crate) const PHONE: &str = "phone";
pub(crate) const EMAIL: &str = "email";
pub(crate) const LOCALE: &str = "locale";
pub(crate) const DISPLAY_NAME: &str = "display-name";
pub(crate) const UNLOCK: &str = "unlock";
pub(crate) const MNEMONIC: &str = "mnemonic";
pub(crate) const REACTIVATE: &str = "reactivate";
