//! In-memory repositories backing handler and workflow tests.

use tokio::sync::RwLock;

use quotedesk_core::domain::approval::{ApprovalId, ApprovalRequest};
use quotedesk_core::domain::customer::{Customer, CustomerId};
use quotedesk_core::domain::pin::{PinId, PinProfile};
use quotedesk_core::domain::product::{Product, ProductId};
use quotedesk_core::domain::quote::{Quote, QuoteId};

use super::{
    ApprovalRepository, CustomerRepository, PinRepository, ProductRepository, QuoteRepository,
    RepositoryError,
};

#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: RwLock<Vec<Customer>>,
}

#[async_trait::async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        let mut customers = self.customers.read().await.clone();
        customers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(customers)
    }

    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let customers = self.customers.read().await;
        Ok(customers.iter().find(|c| &c.id == id).cloned())
    }

    async fn insert(&self, customer: Customer) -> Result<(), RepositoryError> {
        self.customers.write().await.push(customer);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let mut products = self.products.read().await.clone();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| &p.id == id).cloned())
    }

    async fn insert(&self, product: Product) -> Result<(), RepositoryError> {
        self.products.write().await.push(product);
        Ok(())
    }

    async fn update(&self, product: Product) -> Result<Option<Product>, RepositoryError> {
        let mut products = self.products.write().await;
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => {
                let created_at = existing.created_at;
                *existing = Product { created_at, ..product };
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| &p.id != id);
        Ok(products.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryPinRepository {
    profiles: RwLock<Vec<PinProfile>>,
}

#[async_trait::async_trait]
impl PinRepository for InMemoryPinRepository {
    async fn list(&self) -> Result<Vec<PinProfile>, RepositoryError> {
        let mut profiles = self.profiles.read().await.clone();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }

    async fn find_by_id(&self, id: &PinId) -> Result<Option<PinProfile>, RepositoryError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.iter().find(|p| &p.id == id).cloned())
    }

    async fn find_by_pin(&self, pin: &str) -> Result<Option<PinProfile>, RepositoryError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.iter().find(|p| p.pin == pin).cloned())
    }

    async fn pin_taken(
        &self,
        pin: &str,
        excluding: Option<&PinId>,
    ) -> Result<bool, RepositoryError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.iter().any(|p| p.pin == pin && Some(&p.id) != excluding))
    }

    async fn insert(&self, profile: PinProfile) -> Result<(), RepositoryError> {
        self.profiles.write().await.push(profile);
        Ok(())
    }

    async fn update(&self, profile: PinProfile) -> Result<Option<PinProfile>, RepositoryError> {
        let mut profiles = self.profiles.write().await;
        match profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => {
                let created_at = existing.created_at;
                *existing = PinProfile { created_at, ..profile };
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &PinId) -> Result<bool, RepositoryError> {
        let mut profiles = self.profiles.write().await;
        let before = profiles.len();
        profiles.retain(|p| &p.id != id);
        Ok(profiles.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryQuoteRepository {
    quotes: RwLock<Vec<Quote>>,
}

#[async_trait::async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<Quote>, RepositoryError> {
        let quotes = self.quotes.read().await;
        Ok(quotes.iter().find(|q| &q.id == id).cloned())
    }

    async fn insert(&self, quote: Quote) -> Result<(), RepositoryError> {
        self.quotes.write().await.push(quote);
        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Quote>, RepositoryError> {
        let mut quotes = self.quotes.read().await.clone();
        quotes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        quotes.truncate(limit as usize);
        Ok(quotes)
    }
}

#[derive(Default)]
pub struct InMemoryApprovalRepository {
    approvals: RwLock<Vec<ApprovalRequest>>,
}

impl InMemoryApprovalRepository {
    /// Row count for a single quote; used by tests asserting that the
    /// cooldown suppressed (or the rollback removed) an insert.
    pub async fn count_for_quote(&self, quote_id: &QuoteId) -> usize {
        self.approvals.read().await.iter().filter(|a| &a.quote_id == quote_id).count()
    }
}

#[async_trait::async_trait]
impl ApprovalRepository for InMemoryApprovalRepository {
    async fn latest_for_quote(
        &self,
        quote_id: &QuoteId,
    ) -> Result<Option<ApprovalRequest>, RepositoryError> {
        let approvals = self.approvals.read().await;
        Ok(approvals
            .iter()
            .filter(|a| &a.quote_id == quote_id)
            .max_by_key(|a| a.requested_at)
            .cloned())
    }

    async fn latest_for_quotes(
        &self,
        quote_ids: &[QuoteId],
    ) -> Result<Vec<ApprovalRequest>, RepositoryError> {
        let mut latest = Vec::new();
        for quote_id in quote_ids {
            if let Some(approval) = self.latest_for_quote(quote_id).await? {
                latest.push(approval);
            }
        }
        Ok(latest)
    }

    async fn save(&self, approval: ApprovalRequest) -> Result<(), RepositoryError> {
        let mut approvals = self.approvals.write().await;
        match approvals.iter_mut().find(|a| a.id == approval.id) {
            Some(existing) => *existing = approval,
            None => approvals.push(approval),
        }
        Ok(())
    }

    async fn set_telegram_refs(
        &self,
        id: &ApprovalId,
        chat_id: Option<i64>,
        message_id: Option<i64>,
    ) -> Result<(), RepositoryError> {
        let mut approvals = self.approvals.write().await;
        if let Some(approval) = approvals.iter_mut().find(|a| &a.id == id) {
            if chat_id.is_some() {
                approval.telegram_chat_id = chat_id;
            }
            if message_id.is_some() {
                approval.telegram_message_id = message_id;
            }
        }
        Ok(())
    }

    async fn delete(&self, id: &ApprovalId) -> Result<(), RepositoryError> {
        self.approvals.write().await.retain(|a| &a.id != id);
        Ok(())
    }
}
