use std::sync::Arc;

use quotedesk_core::config::TelegramConfig;
use quotedesk_db::repositories::{
    ApprovalRepository, CustomerRepository, PinRepository, ProductRepository, QuoteRepository,
    SqlApprovalRepository, SqlCustomerRepository, SqlPinRepository, SqlProductRepository,
    SqlQuoteRepository,
};
use quotedesk_db::DbPool;
use quotedesk_telegram::{BotApiNotifier, Notifier};

/// Shared handler state. Repositories and the notifier sit behind trait
/// objects so tests can swap in in-memory doubles.
#[derive(Clone)]
pub struct ApiState {
    pub customers: Arc<dyn CustomerRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub pins: Arc<dyn PinRepository>,
    pub quotes: Arc<dyn QuoteRepository>,
    pub approvals: Arc<dyn ApprovalRepository>,
    pub notifier: Arc<dyn Notifier>,
    /// Public origin for approval deep links; falls back to the request
    /// origin when absent.
    pub base_url: Option<String>,
}

impl ApiState {
    pub fn from_pool(pool: DbPool, telegram: &TelegramConfig, base_url: Option<String>) -> Self {
        Self {
            customers: Arc::new(SqlCustomerRepository::new(pool.clone())),
            products: Arc::new(SqlProductRepository::new(pool.clone())),
            pins: Arc::new(SqlPinRepository::new(pool.clone())),
            quotes: Arc::new(SqlQuoteRepository::new(pool.clone())),
            approvals: Arc::new(SqlApprovalRepository::new(pool)),
            notifier: Arc::new(BotApiNotifier::new(telegram)),
            base_url,
        }
    }
}
