// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use std::fmt;

use base64::Engine as _;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::keys::KeySalt;

const WORD_COUNT: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error("failed to generate recovery phrase")]
    Generate(#[source] bip39::Error),
}

/// The recovery-phrase artifact optionally produced at the end of signup.
/// Deliberately not serializable; the phrase is shown once and never stored.
#[derive(Clone, PartialEq, Zeroize, ZeroizeOnDrop)]
pub struct RecoveryPhrase {
    mnemonic: bip39::Mnemonic,
}

impl RecoveryPhrase {
    pub fn generate() -> Result<Self, RecoveryError> {
        bip39::Mnemonic::generate_in(bip39::Language::English, WORD_COUNT)
            .map(|mnemonic| RecoveryPhrase { mnemonic })
            .map_err(RecoveryError::Generate)
    }

    pub fn phrase(&self) -> String {
        self.mnemonic.to_string()
    }

    pub fn word_count(&self) -> usize {
        self.mnemonic.word_count()
    }

    /// Salted digest sent to the server at registration. The phrase itself
    /// never leaves the client.
    pub fn salted_hash(&self, salt: &KeySalt) -> String {
        let digest = Sha256::new()
            .chain_update(salt.encoded().as_bytes())
            .chain_update(self.phrase().as_bytes())
            .finalize();
        base64::engine::general_purpose::STANDARD_NO_PAD.encode(digest)
    }
}

impl fmt::Debug for RecoveryPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecoveryPhrase(..)")
    }
}
