// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

//! Client-driven account signup orchestration.
//!
//! The engine owns the state machine that takes a user from the account form
//! to a created, subscribed, key-provisioned account with a persisted
//! session. Remote calls go through the [`SignupApi`] gateway trait and
//! session persistence through the [`SessionStore`] trait, so hosts plug in
//! their own transport and storage.
//!
//! [`SignupApi`]: meridian_signup_api_client::SignupApi
//! [`SessionStore`]: meridian_signup_store::SessionStore

pub mod cache;
pub mod error;
pub mod handlers;
pub mod orchestrator;
pub mod steps;
pub mod telemetry;

mod best_effort;

pub use best_effort::BestEffort;
pub use cache::{SignupCache, SignupSession};
pub use error::Error;
pub use handlers::{CreateUserMode, HandlerOutcome, Transition};
pub use orchestrator::Orchestrator;
pub use steps::{SignupEvent, Step};
pub use telemetry::TelemetryEvent;

#[cfg(test)]
pub(crate) mod testutil;
