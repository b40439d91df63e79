use async_trait::async_trait;
use thiserror::Error;

use quotedesk_core::domain::approval::{ApprovalId, ApprovalRequest};
use quotedesk_core::domain::customer::{Customer, CustomerId};
use quotedesk_core::domain::pin::{PinId, PinProfile};
use quotedesk_core::domain::product::{Product, ProductId};
use quotedesk_core::domain::quote::{Quote, QuoteId};

pub mod approval;
pub mod customer;
pub mod memory;
pub mod pin;
pub mod product;
pub mod quote;

pub use approval::SqlApprovalRepository;
pub use customer::SqlCustomerRepository;
pub use memory::{
    InMemoryApprovalRepository, InMemoryCustomerRepository, InMemoryPinRepository,
    InMemoryProductRepository, InMemoryQuoteRepository,
};
pub use pin::SqlPinRepository;
pub use product::SqlProductRepository;
pub use quote::SqlQuoteRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Customer>, RepositoryError>;
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError>;
    async fn insert(&self, customer: Customer) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn insert(&self, product: Product) -> Result<(), RepositoryError>;
    /// Returns the stored row after the update, or `None` when the id is
    /// unknown.
    async fn update(&self, product: Product) -> Result<Option<Product>, RepositoryError>;
    async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait PinRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<PinProfile>, RepositoryError>;
    async fn find_by_id(&self, id: &PinId) -> Result<Option<PinProfile>, RepositoryError>;
    async fn find_by_pin(&self, pin: &str) -> Result<Option<PinProfile>, RepositoryError>;
    /// Duplicate check used by registration and by updates (which must
    /// ignore the row being edited).
    async fn pin_taken(&self, pin: &str, excluding: Option<&PinId>)
        -> Result<bool, RepositoryError>;
    async fn insert(&self, profile: PinProfile) -> Result<(), RepositoryError>;
    async fn update(&self, profile: PinProfile) -> Result<Option<PinProfile>, RepositoryError>;
    async fn delete(&self, id: &PinId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<Quote>, RepositoryError>;
    async fn insert(&self, quote: Quote) -> Result<(), RepositoryError>;
    async fn list_recent(&self, limit: u32) -> Result<Vec<Quote>, RepositoryError>;
}

#[async_trait]
pub trait ApprovalRepository: Send + Sync {
    /// Latest attempt for one quote, by requested_at descending.
    async fn latest_for_quote(
        &self,
        quote_id: &QuoteId,
    ) -> Result<Option<ApprovalRequest>, RepositoryError>;
    /// Latest attempt per quote for a batch of ids; quotes with no
    /// attempts are simply absent from the result.
    async fn latest_for_quotes(
        &self,
        quote_ids: &[QuoteId],
    ) -> Result<Vec<ApprovalRequest>, RepositoryError>;
    /// Insert-or-update by id. Used both to open a pending attempt and to
    /// record the approve transition on an existing row.
    async fn save(&self, approval: ApprovalRequest) -> Result<(), RepositoryError>;
    /// Best-effort attachment of notification correlation ids.
    async fn set_telegram_refs(
        &self,
        id: &ApprovalId,
        chat_id: Option<i64>,
        message_id: Option<i64>,
    ) -> Result<(), RepositoryError>;
    /// Compensating rollback for a pending row whose notification never
    /// went out.
    async fn delete(&self, id: &ApprovalId) -> Result<(), RepositoryError>;
}
