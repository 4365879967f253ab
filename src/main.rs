// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Taskmanager-Sync maintenance tool
//!
//! Signs in with email/password and runs the headless flows: one-time
//! migration of a local-storage export into the cloud document, and backup
//! export of the full document.

use std::path::Path;
use std::sync::Arc;
use taskmanager_sync::{
    config::Config,
    db::FirestoreStore,
    local::JsonFileCache,
    notify::LogNotifier,
    services::{AuthService, DataService, FirebaseAuthClient},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(project = %config.gcp_project_id, "Starting Taskmanager-Sync");

    let store = FirestoreStore::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    let provider = Arc::new(FirebaseAuthClient::new(&config.firebase_api_key)?);
    let notifier = Arc::new(LogNotifier);

    let auth = AuthService::new(provider, notifier.clone(), config.adapter_wait);
    auth.initialize().await?;

    let email = std::env::var("SYNC_EMAIL").expect("SYNC_EMAIL not set");
    let password = std::env::var("SYNC_PASSWORD").expect("SYNC_PASSWORD not set");
    let identity = auth.sign_in_with_password(&email, &password).await?;
    tracing::info!(user_id = %identity.id, "Signed in");

    let data = DataService::new(auth.handle(), Arc::new(store), notifier);

    if let Some(export_path) = &config.local_export_path {
        let cache = JsonFileCache::open(Path::new(export_path))?;
        let migrated = data.migrate_local_data(&cache).await?;
        tracing::info!(migrated, path = %export_path, "Migration finished");
    }

    if let Some(backup_dir) = &config.backup_dir {
        let created = data.create_backup(Path::new(backup_dir)).await?;
        tracing::info!(created, dir = %backup_dir, "Backup finished");
    }

    auth.sign_out().await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("taskmanager_sync=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
