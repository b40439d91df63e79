//! Deterministic demo fixtures for local development and smoke checks.
//!
//! Seeding is idempotent: rows are keyed by fixed ids and skipped when
//! they already exist, so `quotedesk seed` can run against a live file
//! database without duplicating data.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use quotedesk_core::domain::customer::{Customer, CustomerId};
use quotedesk_core::domain::pin::{PinId, PinProfile, Role};
use quotedesk_core::domain::product::{Product, ProductId};
use quotedesk_core::domain::quote::{Quote, QuoteId, QuoteItem};
use quotedesk_core::pricing;

use crate::repositories::{
    CustomerRepository, PinRepository, ProductRepository, QuoteRepository, RepositoryError,
    SqlCustomerRepository, SqlPinRepository, SqlProductRepository, SqlQuoteRepository,
};
use crate::DbPool;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub pins: u32,
    pub customers: u32,
    pub products: u32,
    pub quotes: u32,
    pub skipped: u32,
}

pub async fn seed_demo_data(pool: &DbPool) -> Result<SeedReport, RepositoryError> {
    let mut report = SeedReport::default();

    seed_pins(pool, &mut report).await?;
    seed_customers(pool, &mut report).await?;
    seed_products(pool, &mut report).await?;
    seed_quote(pool, &mut report).await?;

    Ok(report)
}

async fn seed_pins(pool: &DbPool, report: &mut SeedReport) -> Result<(), RepositoryError> {
    let repo = SqlPinRepository::new(pool.clone());
    let profiles = [
        ("seed-pin-master", "000000", "Master", "Admin", Role::Admin),
        ("seed-pin-sales", "734592", "Somsri", "Wong", Role::User),
    ];

    for (id, pin, first, last, role) in profiles {
        if repo.find_by_pin(pin).await?.is_some() {
            report.skipped += 1;
            continue;
        }
        repo.insert(PinProfile {
            id: PinId(id.to_string()),
            pin: pin.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            role,
            signature_image: None,
            created_at: Utc::now(),
        })
        .await?;
        report.pins += 1;
    }

    Ok(())
}

async fn seed_customers(pool: &DbPool, report: &mut SeedReport) -> Result<(), RepositoryError> {
    let repo = SqlCustomerRepository::new(pool.clone());
    let customers = [
        ("seed-cust-riverside", "Riverside Hotel Co., Ltd.", "0105543102214"),
        ("seed-cust-lotus", "Lotus Warehouse Ltd.", ""),
    ];

    for (id, company, tax_id) in customers {
        if repo.find_by_id(&CustomerId(id.to_string())).await?.is_some() {
            report.skipped += 1;
            continue;
        }
        repo.insert(Customer {
            id: CustomerId(id.to_string()),
            company_name: company.to_string(),
            tax_id: tax_id.to_string(),
            contact_name: "Khun Ploy".to_string(),
            contact_phone: "0812345678".to_string(),
            address: "88/12 Rama IX Rd, Bangkok".to_string(),
            approx_purchase_date: "Q3/2026".to_string(),
            created_at: Utc::now(),
        })
        .await?;
        report.customers += 1;
    }

    Ok(())
}

async fn seed_products(pool: &DbPool, report: &mut SeedReport) -> Result<(), RepositoryError> {
    let repo = SqlProductRepository::new(pool.clone());
    let products = [
        ("seed-prod-dome", "Dome camera 4MP", "CAM-D400", 2200, 2400, 2650),
        ("seed-prod-nvr", "NVR 16ch", "NVR-16P", 8900, 9500, 10500),
        ("seed-prod-labour", "Install labour (per day)", "SVC-INST", 3000, 3000, 3500),
    ];

    for (id, name, sku, dealer, project, user) in products {
        if repo.find_by_id(&ProductId(id.to_string())).await?.is_some() {
            report.skipped += 1;
            continue;
        }
        repo.insert(Product {
            id: ProductId(id.to_string()),
            name: name.to_string(),
            sku: sku.to_string(),
            unit: "unit".to_string(),
            dealer_price: Decimal::from(dealer),
            project_price: Decimal::from(project),
            user_price: Decimal::from(user),
            description: String::new(),
            created_at: Utc::now(),
        })
        .await?;
        report.products += 1;
    }

    Ok(())
}

async fn seed_quote(pool: &DbPool, report: &mut SeedReport) -> Result<(), RepositoryError> {
    let repo = SqlQuoteRepository::new(pool.clone());
    let quote_id = QuoteId("seed-quote-0001".to_string());

    if repo.find_by_id(&quote_id).await?.is_some() {
        report.skipped += 1;
        return Ok(());
    }

    let items = vec![
        QuoteItem {
            description: "Dome camera 4MP".to_string(),
            qty: Decimal::from(4),
            price: Decimal::from(2650),
        },
        QuoteItem {
            description: "NVR 16ch".to_string(),
            qty: Decimal::from(1),
            price: Decimal::from(10500),
        },
        QuoteItem {
            description: "Install labour (per day)".to_string(),
            qty: Decimal::from(2),
            price: Decimal::from(3500),
        },
    ];
    let totals = pricing::compute_totals(&items, Decimal::from(1000));

    repo.insert(Quote {
        id: quote_id,
        customer_id: Some(CustomerId("seed-cust-riverside".to_string())),
        company_name: "Riverside Hotel Co., Ltd.".to_string(),
        system_name: "CCTV renovation phase 1".to_string(),
        items,
        total: totals.total,
        note: Some("Installation within 30 days of PO".to_string()),
        created_at: Utc::now(),
    })
    .await?;
    report.quotes += 1;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use quotedesk_core::domain::quote::QuoteId;

    use super::seed_demo_data;
    use crate::repositories::{QuoteRepository, SqlQuoteRepository};
    use crate::{connect_with_settings, migrations};

    #[tokio::test]
    async fn seeding_twice_only_inserts_once() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let first = seed_demo_data(&pool).await.expect("first seed");
        assert_eq!(first.pins, 2);
        assert_eq!(first.customers, 2);
        assert_eq!(first.products, 3);
        assert_eq!(first.quotes, 1);
        assert_eq!(first.skipped, 0);

        let second = seed_demo_data(&pool).await.expect("second seed");
        assert_eq!(second.pins + second.customers + second.products + second.quotes, 0);
        assert_eq!(second.skipped, 8);
    }

    #[tokio::test]
    async fn seeded_quote_total_reflects_the_discount() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        seed_demo_data(&pool).await.expect("seed");

        let repo = SqlQuoteRepository::new(pool);
        let quote = repo
            .find_by_id(&QuoteId("seed-quote-0001".to_string()))
            .await
            .expect("query")
            .expect("seeded quote exists");

        // 4x2650 + 10500 + 2x3500 = 28100, minus the 1000 seed discount.
        assert_eq!(quote.total, Decimal::from(27100));
    }
}
