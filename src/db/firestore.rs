// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore-backed document store.
//!
//! One document per user in the `users` collection. Merge-writes use a
//! field mask so sibling fields are never disturbed; real-time changes are
//! forwarded through a listener task into a [`DocumentWatch`] channel.

use crate::db::{collections, DocumentStore, DocumentWatch};
use crate::error::{AppError, Result};
use crate::models::UserDocument;
use firestore::{FirestoreListenEvent, FirestoreListenerTarget, FirestoreMemListenStateStorage};
use tokio::sync::{mpsc, oneshot};

const WATCH_TARGET_ID: u32 = 17;

/// Firestore document store client.
#[derive(Clone)]
pub struct FirestoreStore {
    client: firestore::FirestoreDb,
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Persistence(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Persistence(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }
}

impl DocumentStore for FirestoreStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserDocument>> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))
    }

    async fn merge(&self, user_id: &str, patch: &UserDocument) -> Result<()> {
        let _: UserDocument = self
            .client
            .fluent()
            .update()
            .fields(patch.set_fields())
            .in_col(collections::USERS)
            .document_id(user_id)
            .object(patch)
            .execute()
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;
        Ok(())
    }

    async fn replace(&self, user_id: &str, doc: &UserDocument) -> Result<()> {
        let _: UserDocument = self
            .client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(user_id)
            .object(doc)
            .execute()
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;
        Ok(())
    }

    async fn watch(&self, user_id: &str) -> Result<DocumentWatch> {
        let (tx, rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let client = self.client.clone();
        let user_id = user_id.to_string();

        let task = tokio::spawn(async move {
            if let Err(e) = run_listener(client, &user_id, tx, stop_rx).await {
                tracing::error!(user_id = %user_id, error = %e, "Document listener failed");
            }
        });

        Ok(DocumentWatch::with_task(rx, stop_tx, task))
    }
}

/// Run a document listener until the stop signal arrives.
async fn run_listener(
    client: firestore::FirestoreDb,
    user_id: &str,
    tx: mpsc::UnboundedSender<UserDocument>,
    stop_rx: oneshot::Receiver<()>,
) -> std::result::Result<(), firestore::errors::FirestoreError> {
    let mut listener = client
        .create_listener(FirestoreMemListenStateStorage::new())
        .await?;

    client
        .fluent()
        .select()
        .by_id_in(collections::USERS)
        .batch_listen([user_id.to_string()])
        .add_target(FirestoreListenerTarget::new(WATCH_TARGET_ID), &mut listener)?;

    listener
        .start(move |event| {
            let tx = tx.clone();
            async move {
                if let FirestoreListenEvent::DocumentChange(ref doc_change) = event {
                    if let Some(doc) = &doc_change.document {
                        match firestore::FirestoreDb::deserialize_doc_to::<UserDocument>(doc) {
                            Ok(parsed) => {
                                // Receiver gone means the watch handle was dropped.
                                let _ = tx.send(parsed);
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Skipping undecodable document change");
                            }
                        }
                    }
                }
                Ok(())
            }
        })
        .await?;

    let _ = stop_rx.await;
    listener.shutdown().await?;
    Ok(())
}
