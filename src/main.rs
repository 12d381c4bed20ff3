//! Qahwa storefront demo walkthrough.
//!
//! Opens (or creates) a file-backed store, seeds the catalog, registers a
//! visitor, and runs a checkout twice: once paying through Syriatel Cash and
//! once fully covered by the `d.bader` coupon.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qahwa_storefront::{
    CartStore, CheckoutSession, Credentials, DemoIdentityProvider, IdentityError, JsonFileStore,
    NewUser, OrderLog, PaymentMethod, ProductCatalog, StorageProvider, WishlistStore,
};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir = std::env::var("QAHWA_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir().join("qahwa-storefront"));
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;
    let store_path = data_dir.join("store.json");
    let provider: Arc<dyn StorageProvider> = Arc::new(JsonFileStore::open(&store_path)?);
    tracing::info!(path = %store_path.display(), "store opened");

    let catalog = ProductCatalog::new(provider.clone());
    let cart_store = CartStore::new(provider.clone());
    let order_log = OrderLog::new(provider.clone());
    let wishlist = WishlistStore::new(provider.clone());
    let identity = DemoIdentityProvider::new(provider.clone());

    // Sign in, or register on first run.
    let credentials = Credentials {
        email: "demo@qahwa.shop".into(),
        password: "demo".into(),
        admin: false,
    };
    let user = match identity.login(credentials.clone()) {
        Ok(user) => user,
        Err(IdentityError::UnknownEmail) => identity.register(NewUser {
            name: Some("زائر تجريبي".into()),
            email: credentials.email,
            password: credentials.password,
            admin: false,
        })?,
        Err(err) => return Err(err.into()),
    };
    tracing::info!(name = %user.name, "welcome");

    let products = catalog.list()?;
    println!("المنتجات ({}):", products.len());
    for product in &products {
        println!("  [{}] {} — {}", product.id, product.name, product.price);
    }

    wishlist.toggle(products[0].id)?;

    // First order: two bags of beans, half-off coupon, Syriatel Cash.
    cart_store.add_product(&products[0])?;
    cart_store.add_product(&products[0])?;
    cart_store.add_product(&products[1])?;

    let mut session = CheckoutSession::new();
    session.apply_coupon("d.fadi");
    let cart = cart_store.load()?;
    let quote = session.quote(&cart);
    println!(
        "\nالمجموع الفرعي: {} | الخصم: {} | المجموع الكلي: {}",
        quote.subtotal, quote.discount, quote.total
    );

    session.payment_mut().select_method(PaymentMethod::SyriatelCash);
    session.payment_mut().set_syriatel_phone("0991234567");
    let order = session.confirm(&cart_store, &order_log)?;
    println!("طلب {} — {}", order.id(), order.status().label_ar());

    // Second order: fully covered by d.bader, confirmable with no payment.
    cart_store.add_product(&products[2])?;
    session.apply_coupon("d.bader");
    let order = session.confirm(&cart_store, &order_log)?;
    println!("طلب {} — {}", order.id(), order.status().label_ar());

    println!("\nسجل الطلبات (الأحدث أولاً):");
    for order in order_log.list()? {
        println!(
            "  {} | {} | {}",
            order.id(),
            order.total(),
            order.status().label_ar()
        );
    }

    Ok(())
}
