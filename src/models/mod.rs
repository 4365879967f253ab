// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod document;
pub mod identity;

pub use document::{TimeBlocksData, UserDocument};
pub use identity::Identity;
