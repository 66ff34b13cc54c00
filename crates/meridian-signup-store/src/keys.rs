// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use std::fmt;

use base64::Engine as _;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

const SALT_LEN: usize = 16;
const STRETCH_ROUNDS: u32 = 10_000;
const LOCK_TAG_LEN: usize = 8;

const KEY_ARMOR_HEADER: &str = "-----BEGIN MERIDIAN KEY-----";
const KEY_ARMOR_FOOTER: &str = "-----END MERIDIAN KEY-----";

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("malformed armored key material")]
    MalformedKey,

    #[error("key password does not unlock the key material")]
    WrongKeyPassword,
}

#[derive(Clone, PartialEq, Eq)]
pub struct KeySalt([u8; SALT_LEN]);

impl KeySalt {
    pub fn generate() -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        KeySalt(salt)
    }

    pub fn encoded(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.0)
    }
}

impl fmt::Debug for KeySalt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeySalt({})", self.encoded())
    }
}

/// The password-derived secret that unlocks the account's key material.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct KeyPassword(String);

impl KeyPassword {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for KeyPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPassword(..)")
    }
}

/// Derives the key password from the login password and a fresh salt.
///
/// Stand-in stretch for the real KDF, which lives behind the excluded crypto
/// boundary. Deterministic for a given (password, salt) pair.
pub fn derive_key_password(password: &str, salt: &KeySalt) -> KeyPassword {
    let mut digest = Sha256::new()
        .chain_update(salt.0)
        .chain_update(password.as_bytes())
        .finalize();
    for _ in 1..STRETCH_ROUNDS {
        digest = Sha256::new().chain_update(digest).finalize();
    }
    KeyPassword(base64::engine::general_purpose::STANDARD_NO_PAD.encode(digest))
}

/// Generates fresh armored key material locked to the given key password.
pub fn generate_address_key(key_password: &KeyPassword) -> String {
    let mut secret = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut secret);
    let wrapped = wrap(&secret, key_password);
    secret.zeroize();
    wrapped
}

/// Re-locks existing armored key material under a new key password.
///
/// The old key password must actually unlock the material: its lock tag is
/// verified before re-wrapping, so a stale or mistyped password cannot
/// silently produce keys nobody can open.
pub fn rewrap_address_key(
    armored: &str,
    old: &KeyPassword,
    new: &KeyPassword,
) -> Result<String, KeyError> {
    let inner = armored
        .strip_prefix(KEY_ARMOR_HEADER)
        .and_then(|rest| rest.strip_suffix(KEY_ARMOR_FOOTER))
        .map(str::trim)
        .ok_or(KeyError::MalformedKey)?;
    let mut body = base64::engine::general_purpose::STANDARD
        .decode(inner)
        .map_err(|_| KeyError::MalformedKey)?;
    if body.len() <= LOCK_TAG_LEN {
        return Err(KeyError::MalformedKey);
    }
    let (secret, tag) = body.split_at(body.len() - LOCK_TAG_LEN);
    if tag != lock_tag(secret, old) {
        return Err(KeyError::WrongKeyPassword);
    }
    let rewrapped = wrap(secret, new);
    body.zeroize();
    Ok(rewrapped)
}

fn wrap(secret: &[u8], key_password: &KeyPassword) -> String {
    let mut body = secret.to_vec();
    body.extend_from_slice(&lock_tag(secret, key_password));
    let armored = format!(
        "{}\n{}\n{}",
        KEY_ARMOR_HEADER,
        base64::engine::general_purpose::STANDARD.encode(&body),
        KEY_ARMOR_FOOTER
    );
    body.zeroize();
    armored
}

/// Binds the blob to the key password without exposing either.
fn lock_tag(secret: &[u8], key_password: &KeyPassword) -> [u8; LOCK_TAG_LEN] {
    let digest = Sha256::new()
        .chain_update(key_password.as_str().as_bytes())
        .chain_update(secret)
        .finalize();
    let mut tag = [0u8; LOCK_TAG_LEN];
    tag.copy_from_slice(&digest[..LOCK_TAG_LEN]);
    tag
}
