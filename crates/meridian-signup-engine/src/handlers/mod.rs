// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use crate::{cache::SignupCache, cache::SignupSession, steps::Step, telemetry::TelemetryEvent};

pub(crate) mod create_account;
pub(crate) mod create_user;
pub(crate) mod post_setup;
pub(crate) mod set_password;
pub(crate) mod setup_user;
pub(crate) mod subscription;
pub(crate) mod verification;

pub use create_account::handle_create_account;
pub use create_user::{handle_create_user, CreateUserMode};
pub use post_setup::{handle_display_name, handle_save_recovery};
pub use set_password::handle_set_password;
pub use setup_user::handle_setup_user;
pub use subscription::{handle_payment, handle_select_plan, handle_subscribe_user};
pub use verification::handle_human_verification;

/// A non-terminal handler result: the next cache lineage plus the step to
/// show, with any telemetry the handler selected along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub cache: SignupCache,
    pub to: Step,
    pub events: Vec<TelemetryEvent>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutcome {
    Continue(Transition),
    Done {
        session: Box<SignupSession>,
        events: Vec<TelemetryEvent>,
    },
}

impl HandlerOutcome {
    pub(crate) fn advance(cache: SignupCache, to: Step) -> Self {
        HandlerOutcome::Continue(Transition {
            cache,
            to,
            events: Vec::new(),
        })
    }

    pub(crate) fn advance_with(cache: SignupCache, to: Step, events: Vec<TelemetryEvent>) -> Self {
        HandlerOutcome::Continue(Transition { cache, to, events })
    }

    /// The step this outcome transitions to. Test convenience.
    pub fn to(&self) -> Step {
        match self {
            HandlerOutcome::Continue(transition) => transition.to,
            HandlerOutcome::Done { .. } => Step::Done,
        }
    }

    pub fn cache(&self) -> Option<&SignupCache> {
        match self {
            HandlerOutcome::Continue(transition) => Some(&transition.cache),
            HandlerOutcome::Done { .. } => None,
        }
    }
}
