//! Seed the catalog with sample data.
//!
//! Exercises the repositories end to end: category ancestry, product
//! creation, user registration (password hashing), an order with an
//! allocated order number, and a verified review.

use rust_decimal::Decimal;

use orchard_catalog::db::{
    CategoryRepository, OrderRepository, ProductRepository, ReviewRepository, UserRepository,
};
use orchard_catalog::models::{
    CustomerInfo, NewCategory, NewOrder, NewProduct, NewReview, NewUser, OrderItem, OrderPricing,
    PaymentInfo, PostalAddress, ShippingInfo, UserProfile,
};
use orchard_catalog::{CatalogConfig, db};
use orchard_core::{CurrencyCode, Email, ListPrice, PaymentMethod, PaymentStatus};

/// Seed sample data through the repositories.
///
/// # Errors
///
/// Returns an error if configuration is missing, the database is
/// unreachable, or any insert fails (including conflicts from re-running
/// the seed against a populated database).
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = CatalogConfig::from_env()?;
    let pool = db::create_pool(&config.database_url, config.max_connections).await?;

    let categories = CategoryRepository::new(&pool);
    let products = ProductRepository::new(&pool);
    let users = UserRepository::new(&pool);
    let orders = OrderRepository::new(&pool);
    let reviews = ReviewRepository::new(&pool);

    // Category tree: Garden -> Garden Tools
    let garden = categories.create(&NewCategory::new("Garden")).await?;
    let tools = categories
        .create(&NewCategory::new("Garden Tools").under(garden.id))
        .await?;
    tracing::info!(parent = %garden.id, child = %tools.id, "seeded categories");

    // A product in both categories
    let mut trowel = NewProduct::new(
        "TRL-001",
        "Hand Trowel",
        ListPrice::on_sale(Decimal::from(12), Decimal::from(9), CurrencyCode::USD),
    );
    trowel.short_description = Some("Forged steel hand trowel".to_owned());
    trowel.category_ids = vec![garden.id, tools.id];
    trowel.inventory.stock_quantity = 120;
    trowel.tags = vec!["garden".to_owned(), "tools".to_owned()];
    let trowel = products.create(&trowel).await?;
    tracing::info!(product = %trowel.id, sku = %trowel.sku, "seeded product");

    // A customer
    let customer = users
        .create(&NewUser::new(
            Email::parse("ada@example.com")?,
            "analytical-engine",
            UserProfile {
                first_name: "Ada".to_owned(),
                last_name: "Lovelace".to_owned(),
                phone_number: None,
                date_of_birth: None,
            },
        ))
        .await?;
    tracing::info!(user = %customer.id, "seeded user");

    // An order for the product
    let address = PostalAddress {
        street: "1 Orchard Way".to_owned(),
        city: "Portland".to_owned(),
        state: "OR".to_owned(),
        zip_code: "97201".to_owned(),
        country: "US".to_owned(),
    };
    let order = orders
        .create(&NewOrder {
            user_id: customer.id,
            customer: CustomerInfo {
                email: customer.email.clone(),
                first_name: customer.profile.first_name.clone(),
                last_name: customer.profile.last_name.clone(),
                phone_number: None,
            },
            items: vec![OrderItem {
                product_id: trowel.id,
                variant_id: None,
                sku: trowel.sku.clone(),
                name: trowel.name.clone(),
                quantity: 2,
                price_at_purchase: Decimal::from(9),
                discount: Decimal::ZERO,
                total: Decimal::from(18),
            }],
            pricing: OrderPricing {
                subtotal: Decimal::from(18),
                tax: Decimal::from(2),
                shipping: Decimal::from(5),
                discount: Decimal::ZERO,
                total: Decimal::from(25),
                currency: CurrencyCode::USD,
            },
            shipping_address: address.clone(),
            billing_address: address,
            payment: PaymentInfo {
                method: PaymentMethod::CreditCard,
                transaction_id: None,
                status: PaymentStatus::Pending,
                paid_at: None,
            },
            shipping: ShippingInfo::default(),
            notes: None,
        })
        .await?;
    users.add_order_to_history(customer.id, order.id).await?;
    tracing::info!(order = %order.order_number, "seeded order");

    // A purchase-linked (verified) review
    let mut review = NewReview::new(
        trowel.id,
        customer.id,
        5,
        "Sturdy handle, cuts cleanly through compacted soil.",
    );
    review.order_id = Some(order.id);
    let review = reviews.create(&review).await?;
    tracing::info!(review = %review.id, verified = review.verified, "seeded review");

    tracing::info!("Seed complete");
    Ok(())
}
