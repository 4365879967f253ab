// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Taskmanager-Sync: cloud persistence layer for a task-manager front-end
//!
//! This crate wires a task-manager UI to Firebase: federated or
//! email/password sign-in through an auth facade, and per-user document
//! persistence (todos, calendar events, time blocks, pomodoro timer state)
//! through a data facade over Firestore, including a one-time migration from
//! local-only storage and client-side backup export.

pub mod config;
pub mod db;
pub mod error;
pub mod local;
pub mod models;
pub mod notify;
pub mod services;

pub use error::{AppError, AuthErrorCode, Result};
