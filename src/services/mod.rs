// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - the auth and data facades plus their adapters.

pub mod auth;
pub mod data;
pub mod firebase_auth;

pub use auth::{AuthHandle, AuthService, IdentityProvider};
pub use data::DataService;
pub use firebase_auth::FirebaseAuthClient;
