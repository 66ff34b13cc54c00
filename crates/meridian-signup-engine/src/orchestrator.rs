// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

//! The event loop that drives a signup from the account form to a persisted
//! session.
//!
//! The orchestrator owns the current cache lineage and step. External
//! collaborators feed it [`SignupEvent`]s; between events it drives the
//! automatic steps itself until the flow settles on a screen again.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use meridian_signup_api_client::SignupApi;
use meridian_signup_store::SessionStore;

use crate::{
    cache::{SignupCache, SignupSession},
    error::Error,
    handlers::{self, CreateUserMode, HandlerOutcome, Transition},
    steps::{SignupEvent, Step},
    telemetry::TelemetryEvent,
};

pub struct Orchestrator<A, S> {
    api: A,
    store: S,
    cache: SignupCache,
    step: Step,
    /// Bumped on every reset. An in-flight handler whose generation no
    /// longer matches must not have its outcome applied.
    generation: u64,
    flow_token: CancellationToken,
    create_user_mode: CreateUserMode,
    telemetry_tx: Option<mpsc::UnboundedSender<TelemetryEvent>>,
    session: Option<SignupSession>,
    run_id: Uuid,
}

impl<A, S> Orchestrator<A, S>
where
    A: SignupApi,
    S: SessionStore,
{
    pub fn new(api: A, store: S, cache: SignupCache) -> Self {
        Orchestrator {
            api,
            store,
            cache,
            step: Step::Account,
            generation: 0,
            flow_token: CancellationToken::new(),
            create_user_mode: CreateUserMode::default(),
            telemetry_tx: None,
            session: None,
            run_id: Uuid::new_v4(),
        }
    }

    pub fn with_telemetry(mut self, tx: mpsc::UnboundedSender<TelemetryEvent>) -> Self {
        self.telemetry_tx = Some(tx);
        self
    }

    pub fn with_create_user_mode(mut self, mode: CreateUserMode) -> Self {
        self.create_user_mode = mode;
        self
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn cache(&self) -> &SignupCache {
        &self.cache
    }

    /// Token that aborts the flow from another task. Cancelling it makes the
    /// event in flight fail with [`Error::FlowAborted`].
    pub fn abort_handle(&self) -> CancellationToken {
        self.flow_token.clone()
    }

    /// The finished session, once the flow reached [`Step::Done`].
    pub fn take_session(&mut self) -> Option<SignupSession> {
        self.session.take()
    }

    /// Handles one external event and drives any automatic steps it leads
    /// to. Returns the step the flow settled on.
    ///
    /// A benign error leaves the flow where it is so the user can correct
    /// the input; any other error resets it back to the account form.
    pub async fn submit(&mut self, event: SignupEvent) -> Result<Step, Error> {
        if matches!(event, SignupEvent::Abort) {
            self.reset_flow();
            return Ok(self.step);
        }

        let generation = self.generation;
        tracing::debug!(
            run_id = %self.run_id,
            step = %self.step,
            event = event.name(),
            "Handling signup event",
        );
        match self.run_event(event).await {
            Ok(step) => Ok(step),
            Err(err) if err.is_benign() => {
                tracing::debug!("Recoverable signup error: {}", err);
                Err(err)
            }
            Err(err) => {
                if self.generation == generation {
                    tracing::warn!("Signup step failed, resetting the flow: {}", err);
                    self.reset_flow();
                }
                Err(err)
            }
        }
    }

    async fn run_event(&mut self, event: SignupEvent) -> Result<Step, Error> {
        let token = self.flow_token.clone();
        let generation = self.generation;

        let outcome = tokio::select! {
            _ = token.cancelled() => return Err(Error::FlowAborted),
            outcome = self.dispatch(event) => outcome?,
        };
        if self.generation != generation {
            return Err(Error::FlowAborted);
        }
        self.apply(outcome);

        // Automatic steps run to quiescence without further external events.
        loop {
            if token.is_cancelled() || self.generation != generation {
                return Err(Error::FlowAborted);
            }
            let outcome = match self.step {
                Step::CreatingAccount => {
                    tokio::select! {
                        _ = token.cancelled() => return Err(Error::FlowAborted),
                        outcome = handlers::handle_create_user(
                            &self.cache,
                            &self.api,
                            self.create_user_mode,
                        ) => outcome?,
                    }
                }
                Step::SettingUp => {
                    tokio::select! {
                        _ = token.cancelled() => return Err(Error::FlowAborted),
                        outcome = handlers::handle_setup_user(
                            &self.cache,
                            &self.api,
                            &self.store,
                        ) => outcome?,
                    }
                }
                _ => break,
            };
            self.apply(outcome);
        }
        Ok(self.step)
    }

    async fn dispatch(&self, event: SignupEvent) -> Result<HandlerOutcome, Error> {
        match self.step {
            Step::Account => match event {
                SignupEvent::SubmitAccount(account) => {
                    let cache = self.cache.with_signup(|state| state.account_data = account);
                    handlers::handle_create_account(&cache, &self.api).await
                }
                SignupEvent::SelectPlan(selection) => {
                    handlers::handle_select_plan(&self.cache, &self.api, selection).await
                }
                event => self.unexpected(event),
            },
            Step::TrialPlan | Step::Upsell => match event {
                SignupEvent::SelectPlan(selection) => {
                    handlers::handle_select_plan(&self.cache, &self.api, selection).await
                }
                SignupEvent::DeclinePlan => Ok(HandlerOutcome::advance(
                    self.cache.clone(),
                    Step::CreatingAccount,
                )),
                event => self.unexpected(event),
            },
            Step::Payment => match event {
                SignupEvent::SubmitPayment(payment) => {
                    handlers::handle_payment(&self.cache, &self.api, payment).await
                }
                event => self.unexpected(event),
            },
            Step::HumanVerification => match event {
                SignupEvent::SubmitVerification { token, token_type } => {
                    handlers::handle_human_verification(
                        &self.cache,
                        &self.api,
                        token,
                        token_type,
                        self.create_user_mode,
                    )
                    .await
                }
                event => self.unexpected(event),
            },
            Step::CreatingAccount | Step::SettingUp => self.unexpected(event),
            Step::Congratulations => match event {
                SignupEvent::SubmitDisplayName(name) => {
                    handlers::handle_display_name(&self.cache, &self.api, name).await
                }
                SignupEvent::RequestPasswordChange => Ok(HandlerOutcome::advance(
                    self.cache.clone(),
                    Step::SetPassword,
                )),
                SignupEvent::Complete => self.finish(),
                event => self.unexpected(event),
            },
            Step::SetPassword => match event {
                SignupEvent::SubmitNewPassword(password) => {
                    handlers::handle_set_password(&self.cache, &self.api, &self.store, password)
                        .await
                }
                event => self.unexpected(event),
            },
            Step::SaveRecovery => match event {
                SignupEvent::SubmitRecovery { phone, email } => {
                    handlers::handle_save_recovery(&self.cache, &self.api, phone, email).await
                }
                SignupEvent::Complete => self.finish(),
                event => self.unexpected(event),
            },
            Step::Explore => match event {
                SignupEvent::Complete => self.finish(),
                event => self.unexpected(event),
            },
            Step::Done => self.unexpected(event),
        }
    }

    fn unexpected(&self, event: SignupEvent) -> Result<HandlerOutcome, Error> {
        Err(Error::UnexpectedEvent {
            step: self.step,
            event: event.name(),
        })
    }

    fn finish(&self) -> Result<HandlerOutcome, Error> {
        let session = self.cache.session()?;
        Ok(HandlerOutcome::Done {
            session: Box::new(session),
            events: vec![TelemetryEvent::SignupCompleted {
                client_type: self.cache.client_type,
            }],
        })
    }

    fn apply(&mut self, outcome: HandlerOutcome) {
        match outcome {
            HandlerOutcome::Continue(Transition { cache, to, events }) => {
                for event in events {
                    self.emit(event);
                }
                if to != self.step {
                    self.emit(TelemetryEvent::StepChanged {
                        from: self.step,
                        to,
                    });
                }
                self.cache = cache;
                self.step = to;
            }
            HandlerOutcome::Done { session, events } => {
                for event in events {
                    self.emit(event);
                }
                if self.step != Step::Done {
                    self.emit(TelemetryEvent::StepChanged {
                        from: self.step,
                        to: Step::Done,
                    });
                }
                self.session = Some(*session);
                self.step = Step::Done;
            }
        }
    }

    fn reset_flow(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.flow_token.cancel();
        self.flow_token = CancellationToken::new();
        self.emit(TelemetryEvent::FlowReset { from: self.step });
        tracing::info!(
            run_id = %self.run_id,
            "Resetting signup flow from {}",
            self.step,
        );
        self.cache = self.cache.reset_for_retry();
        self.step = Step::Account;
        self.session = None;
    }

    fn emit(&self, event: TelemetryEvent) {
        if let Some(tx) = &self.telemetry_tx {
            // Telemetry must never stall the flow; a closed channel is fine.
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use meridian_signup_api_client::{
        codes,
        response::SubscriptionCheck,
        types::{Currency, Cycle, PaymentDescriptor, PaymentType, VerificationTokenType},
    };
    use meridian_signup_store::InMemSessionStore;

    use super::*;
    use crate::testutil::{
        hv_details, plan_selection, username_account, username_cache, Call, MockApi,
    };

    fn orchestrator(api: MockApi) -> Orchestrator<MockApi, InMemSessionStore> {
        Orchestrator::new(api, InMemSessionStore::default(), username_cache())
    }

    #[tokio::test]
    async fn free_signup_runs_through_to_congratulations_and_done() {
        let mut orchestrator = orchestrator(MockApi::new().with_address());

        let step = orchestrator
            .submit(SignupEvent::SubmitAccount(username_account()))
            .await
            .unwrap();
        assert_eq!(step, Step::Congratulations);

        let step = orchestrator.submit(SignupEvent::Complete).await.unwrap();
        assert_eq!(step, Step::Done);
        let session = orchestrator.take_session().unwrap();
        assert_eq!(session.auth.uid, "uid-1");
        assert!(session.key_password.is_some());
    }

    #[tokio::test]
    async fn paid_signup_collects_payment_and_subscribes_before_key_setup() {
        let api = MockApi::new().with_address().with_check_amount(4788);
        let mut orchestrator = orchestrator(api);

        let step = orchestrator
            .submit(SignupEvent::SelectPlan(plan_selection("mail2022", 1)))
            .await
            .unwrap();
        assert_eq!(step, Step::Payment);

        let step = orchestrator
            .submit(SignupEvent::SubmitPayment(PaymentDescriptor {
                token: "pay-1".to_string(),
                payment_type: PaymentType::Card,
            }))
            .await
            .unwrap();
        assert_eq!(step, Step::Congratulations);

        let calls = orchestrator.api.calls();
        let subscribe = calls
            .iter()
            .position(|c| matches!(c, Call::CreateSubscription { amount: 4788, .. }))
            .unwrap();
        let keys = calls
            .iter()
            .position(|c| matches!(c, Call::SetupAddressKeys { .. }))
            .unwrap();
        assert!(subscribe < keys);
    }

    #[tokio::test]
    async fn verification_demand_pauses_the_flow_and_resumes_after_the_proof() {
        let api = MockApi::new().with_address();
        api.create_user.fail_once(
            codes::HUMAN_VERIFICATION_REQUIRED,
            Some(hv_details("hv-1")),
        );
        let mut orchestrator = orchestrator(api);

        let step = orchestrator
            .submit(SignupEvent::SubmitAccount(username_account()))
            .await
            .unwrap();
        assert_eq!(step, Step::HumanVerification);

        let step = orchestrator
            .submit(SignupEvent::SubmitVerification {
                token: "solved".to_string(),
                token_type: VerificationTokenType::Captcha,
            })
            .await
            .unwrap();
        assert_eq!(step, Step::Congratulations);

        let creations: Vec<_> = orchestrator
            .api
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::CreateUser { .. }))
            .collect();
        assert_eq!(
            creations,
            vec![
                Call::CreateUser { channel: None },
                Call::CreateUser {
                    channel: Some(VerificationTokenType::Captcha)
                },
            ]
        );
    }

    #[tokio::test]
    async fn benign_availability_error_does_not_reset_the_flow() {
        let api = MockApi::new();
        api.username_check.fail_always(codes::NOT_AVAILABLE, None);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut orchestrator = orchestrator(api).with_telemetry(tx);

        let err = orchestrator
            .submit(SignupEvent::SubmitAccount(username_account()))
            .await
            .unwrap_err();
        assert!(err.is_benign());
        assert_eq!(orchestrator.step(), Step::Account);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn fatal_error_resets_to_the_account_form_but_keeps_the_form_data() {
        let api = MockApi::new().with_address();
        api.create_subscription.fail_always(22000, None);
        let mut orchestrator = Orchestrator::new(
            api,
            InMemSessionStore::default(),
            username_cache().with_signup(|state| {
                state.subscription_data = {
                    let mut selection = plan_selection("mail2022", 1);
                    selection.check_result = Some(SubscriptionCheck {
                        amount_due: 0,
                        coupon: None,
                        currency: Currency::Eur,
                        cycle: Cycle::Yearly,
                        period_end: None,
                    });
                    selection
                };
            }),
        );

        let err = orchestrator
            .submit(SignupEvent::SubmitAccount(username_account()))
            .await
            .unwrap_err();
        assert!(!err.is_benign());
        assert_eq!(orchestrator.step(), Step::Account);
        let state = orchestrator.cache().signup().unwrap();
        assert_eq!(state.account_data.username, "alice");
        assert!(state.human_verification_result.is_none());
    }

    #[tokio::test]
    async fn abort_event_resets_the_flow() {
        let mut orchestrator = orchestrator(MockApi::new());
        let step = orchestrator.submit(SignupEvent::Abort).await.unwrap();
        assert_eq!(step, Step::Account);
    }

    #[tokio::test]
    async fn cancelled_abort_handle_fails_the_next_event_then_heals() {
        let api = MockApi::new().with_address();
        let mut orchestrator = orchestrator(api);

        orchestrator.abort_handle().cancel();
        let err = orchestrator
            .submit(SignupEvent::SubmitAccount(username_account()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::FlowAborted));

        // The failure reset the flow with a fresh token.
        let step = orchestrator
            .submit(SignupEvent::SubmitAccount(username_account()))
            .await
            .unwrap();
        assert_eq!(step, Step::Congratulations);
    }

    #[tokio::test]
    async fn events_are_rejected_in_steps_that_do_not_expect_them() {
        let mut orchestrator = orchestrator(MockApi::new());
        let err = orchestrator.submit(SignupEvent::Complete).await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedEvent { .. }));
        assert_eq!(orchestrator.step(), Step::Account);
    }

    #[tokio::test]
    async fn telemetry_reports_the_journey() {
        let api = MockApi::new().with_address();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut orchestrator = orchestrator(api).with_telemetry(tx);

        orchestrator
            .submit(SignupEvent::SubmitAccount(username_account()))
            .await
            .unwrap();
        orchestrator.submit(SignupEvent::Complete).await.unwrap();

        let mut names = Vec::new();
        while let Ok(event) = rx.try_recv() {
            names.push(event.name());
        }
        assert!(names.contains(&"signup.user_created"));
        assert!(names.contains(&"signup.step_changed"));
        assert!(names.contains(&"signup.completed"));
    }
}
