// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use meridian_signup_api_client::types::{Cycle, PaymentType, SignupType};

use crate::{cache::ClientType, steps::Step};

/// Events the engine selects for the telemetry collaborator. The engine only
/// chooses the event and its dimensions; transport is someone else's job.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    StepChanged {
        from: Step,
        to: Step,
    },
    UserCreated {
        signup_type: SignupType,
    },
    SubscriptionCreated {
        plans: String,
        cycle: Cycle,
        payment_type: Option<PaymentType>,
    },
    SignupCompleted {
        client_type: ClientType,
    },
    FlowReset {
        from: Step,
    },
}

impl TelemetryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TelemetryEvent::StepChanged { .. } => "signup.step_changed",
            TelemetryEvent::UserCreated { .. } => "signup.user_created",
            TelemetryEvent::SubscriptionCreated { .. } => "signup.subscription_created",
            TelemetryEvent::SignupCompleted { .. } => "signup.completed",
            TelemetryEvent::FlowReset { .. } => "signup.flow_reset",
        }
    }

    pub fn dimensions(&self) -> Vec<(&'static str, String)> {
        match self {
            TelemetryEvent::StepChanged { from, to } => {
                vec![("from", from.to_string()), ("to", to.to_string())]
            }
            TelemetryEvent::UserCreated { signup_type } => {
                vec![("signup_type", signup_type.to_string())]
            }
            TelemetryEvent::SubscriptionCreated {
                plans,
                cycle,
                payment_type,
            } => {
                let mut dimensions = vec![
                    ("plans", plans.clone()),
                    ("cycle", cycle.to_string()),
                ];
                if let Some(payment_type) = payment_type {
                    dimensions.push(("payment_type", payment_type.to_string()));
                }
                dimensions
            }
            TelemetryEvent::SignupCompleted { client_type } => {
                vec![("client_type", client_type.to_string())]
            }
            TelemetryEvent::FlowReset { from } => vec![("from", from.to_string())],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_dimensions_include_payment_type_when_present() {
        let event = TelemetryEvent::SubscriptionCreated {
            plans: "mail2022".to_string(),
            cycle: Cycle::Yearly,
            payment_type: Some(PaymentType::Card),
        };
        let dimensions = event.dimensions();
        assert!(dimensions.contains(&("plans", "mail2022".to_string())));
        assert!(dimensions.contains(&("payment_type", "card".to_string())));
        assert_eq!(event.name(), "signup.subscription_created");
    }
}
