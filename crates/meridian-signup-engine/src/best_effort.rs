// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use std::fmt;

/// Outcome of a side computation that is allowed to fail without failing the
/// surrounding step. The error channel is deliberately discarded after
/// logging; callers only observe whether the artifact was produced.
#[derive(Debug, Clone, PartialEq)]
pub enum BestEffort<T> {
    Produced(T),
    Skipped,
}

impl<T> BestEffort<T> {
    pub fn from_result<E: fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => BestEffort::Produced(value),
            Err(err) => {
                tracing::warn!("Skipping best-effort side result: {}", err);
                BestEffort::Skipped
            }
        }
    }

    pub fn produced(&self) -> Option<&T> {
        match self {
            BestEffort::Produced(value) => Some(value),
            BestEffort::Skipped => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, BestEffort::Skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produced_exposes_the_value() {
        let result: Result<u32, String> = Ok(7);
        let best_effort = BestEffort::from_result(result);
        assert_eq!(best_effort.produced(), Some(&7));
        assert!(!best_effort.is_skipped());
    }

    #[test]
    fn errors_collapse_to_skipped() {
        let result: Result<u32, String> = Err("remote call failed".to_string());
        let best_effort = BestEffort::from_result(result);
        assert!(best_effort.is_skipped());
        assert_eq!(best_effort.produced(), None);
    }
}
