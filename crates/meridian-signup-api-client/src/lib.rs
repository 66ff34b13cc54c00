// Copyright 2025 - Meridian Privacy <contact@meridianprivacy.net>
// SPDX-License-Identifier: GPL-3.0-only

// Typed client for the Meridian signup API. The signup engine only depends on
// the `SignupApi` trait and the structured `ApiError`; the reqwest-backed
// `SignupApiClient` is the production implementation.

pub mod codes;
pub mod request;
pub mod response;
pub mod types;

mod api;
mod client;
mod error;
mod routes;

pub use api::SignupApi;
pub use client::SignupApiClient;
pub use error::ApiError;

pub type Result<T> = std::result::Result<T, ApiError>;
