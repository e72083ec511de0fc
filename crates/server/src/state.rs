use crate::payments::PaymentGateway;
use database::storage::FileStore;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared handles for every request
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub files: FileStore,
    pub payments: Arc<dyn PaymentGateway>,
    /// Base for the checkout return URLs
    pub public_base_url: String,
}
