// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

use meridian_signup_api_client::{
    request::{CheckSubscriptionRequest, CreateSubscriptionRequest},
    response::SubscriptionCheck,
    types::{PaymentDescriptor, ReferralData, SubscriptionData},
    SignupApi,
};

use crate::{
    cache::SignupCache, error::Error, handlers::HandlerOutcome, steps::Step,
    telemetry::TelemetryEvent,
};

/// Records a plan selection, priced fresh against the gateway.
pub async fn handle_select_plan<A: SignupApi>(
    cache: &SignupCache,
    api: &A,
    selection: SubscriptionData,
) -> Result<HandlerOutcome, Error> {
    let state = cache.signup()?;
    let check = price_selection(api, &selection, state.referral_data.as_ref()).await?;
    let has_plans = !selection.plan_ids.is_empty();
    let amount_due = check.as_ref().map(|check| check.amount_due).unwrap_or(0);

    let next = cache.with_signup(|state| {
        state.subscription_data = SubscriptionData {
            check_result: check,
            ..selection
        };
    });
    let to = if has_plans && amount_due > 0 {
        Step::Payment
    } else {
        Step::CreatingAccount
    };
    Ok(HandlerOutcome::advance(next, to))
}

/// Attaches the collected payment instrument, re-pricing first so the charge
/// amount can never come from a stale check.
pub async fn handle_payment<A: SignupApi>(
    cache: &SignupCache,
    api: &A,
    payment: PaymentDescriptor,
) -> Result<HandlerOutcome, Error> {
    let state = cache.signup()?;
    let check = price_selection(api, &state.subscription_data, state.referral_data.as_ref())
        .await?;
    let next = cache.with_signup(|state| {
        state.subscription_data.check_result = check;
        state.subscription_data.payment = Some(payment);
    });
    Ok(HandlerOutcome::advance(next, Step::CreatingAccount))
}

/// Purchases the selected subscription for the freshly created user.
///
/// An empty selection means the free tier and makes no remote call at all.
/// A referral zeroes the charge and substitutes its code for any coupon.
pub async fn handle_subscribe_user<A: SignupApi>(
    api: &A,
    subscription: &SubscriptionData,
    referral: Option<&ReferralData>,
    product_param: Option<&str>,
) -> Result<Option<TelemetryEvent>, Error> {
    if subscription.plan_ids.is_empty() {
        tracing::debug!("No plans selected, skipping subscription purchase");
        return Ok(None);
    }

    let amount = if referral.is_some() {
        0
    } else {
        subscription.amount_due()
    };
    let request = CreateSubscriptionRequest {
        plan_ids: subscription.plan_ids.clone(),
        currency: subscription.currency,
        cycle: subscription.cycle,
        amount,
        codes: coupon_codes(subscription, referral),
        payment_token: subscription.payment.as_ref().map(|p| p.token.clone()),
        external: product_param.map(str::to_string),
    };
    api.create_subscription(request).await.map_err(Error::Api)?;

    Ok(Some(TelemetryEvent::SubscriptionCreated {
        plans: subscription
            .plan_ids
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join("+"),
        cycle: subscription.cycle,
        payment_type: subscription.payment.as_ref().map(|p| p.payment_type),
    }))
}

async fn price_selection<A: SignupApi>(
    api: &A,
    selection: &SubscriptionData,
    referral: Option<&ReferralData>,
) -> Result<Option<SubscriptionCheck>, Error> {
    if selection.plan_ids.is_empty() {
        return Ok(None);
    }
    let request = CheckSubscriptionRequest {
        plan_ids: selection.plan_ids.clone(),
        currency: selection.currency,
        cycle: selection.cycle,
        codes: coupon_codes(selection, referral),
    };
    api.check_subscription(request).await.map_err(Error::Api).map(Some)
}

fn coupon_codes(subscription: &SubscriptionData, referral: Option<&ReferralData>) -> Vec<String> {
    if let Some(referral) = referral {
        return vec![referral.code.clone()];
    }
    subscription.coupon.iter().cloned().collect()
}
