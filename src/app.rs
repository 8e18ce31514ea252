use axum::extract::{FromRequestParts, State};
use error_stack::{Result, ResultExt};
use std::fmt::Debug;
use std::ops::Deref;
use std::sync::Arc;
use thiserror::Error;

use crate::config;
use crate::documents::{BucketClient, DocumentStore};
use crate::payments::{PaymentGateway, StripeGateway};
use crate::store::{PgStore, Store};

/// Shared process-wide context passed into every handler.
///
/// Constructed once at startup and never mutated afterwards; cloning
/// is cheap since every collaborator sits behind an [`Arc`].
#[derive(Clone, FromRequestParts)]
#[from_request(via(State))]
#[must_use]
pub struct App(Arc<AppInner>);

pub struct AppInner {
    pub config: Arc<config::Server>,
    pub store: Arc<dyn Store>,
    pub payments: Arc<dyn PaymentGateway>,
    pub documents: Arc<dyn DocumentStore>,
}

#[derive(Debug, Error)]
#[error("Failed to initialize App struct")]
pub struct AppError;

impl App {
    pub fn new(config: config::Server) -> Result<Self, AppError> {
        let store = PgStore::connect(&config.db).change_context(AppError)?;
        let payments = StripeGateway::new(&config.payment).change_context(AppError)?;
        let documents = BucketClient::new(&config.storage).change_context(AppError)?;

        Ok(Self::with_parts(
            config,
            Arc::new(store),
            Arc::new(payments),
            Arc::new(documents),
        ))
    }

    /// Assembles an [`App`] from already-constructed collaborators.
    pub fn with_parts(
        config: config::Server,
        store: Arc<dyn Store>,
        payments: Arc<dyn PaymentGateway>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self(Arc::new(AppInner {
            config: Arc::new(config),
            store,
            payments,
            documents,
        }))
    }
}

impl Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Deref for App {
    type Target = AppInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
