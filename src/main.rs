//! Demo run: signs up and logs in a customer, registers a product, then walks one order
//! through placement, amendment and cancellation while logging stock levels.

use shop_orders::auth::StaticTokenVerifier;
use shop_orders::config::ShopConfig;
use shop_orders::lifecycle::{setup_tracing, ShopSystem};
use shop_orders::model::{CustomerCreate, OrderId, ProductCreate};
use shop_orders::workflow::{OrderRequest, ShopError};
use std::sync::Arc;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => ShopConfig::load(&path).await.map_err(|e| e.to_string())?,
        None => ShopConfig::default(),
    };

    let system = ShopSystem::new(config, Arc::new(StaticTokenVerifier::new()));

    system
        .accounts
        .signup(CustomerCreate {
            login_id: "alice".to_string(),
            email: "alice@example.com".to_string(),
            credential_digest: "sha256:demo".to_string(),
            user_name: "Alice".to_string(),
            phone_number: "010-0000-0000".to_string(),
        })
        .await
        .map_err(|e| e.to_string())?;
    let login = system
        .accounts
        .login("alice", "sha256:demo")
        .await
        .map_err(|e| e.to_string())?;
    let token = login.token.as_str();

    let product_id = system
        .catalog
        .register(ProductCreate {
            name: "Desk Lamp".to_string(),
            description: "LED desk lamp".to_string(),
            category: "home".to_string(),
            price: 100,
            stock: 10,
            shipping: "standard".to_string(),
        })
        .await
        .map_err(|e| e.to_string())?;

    let span = tracing::info_span!("order_processing");
    let outcome = async {
        let placed = system
            .workflow
            .create_order(OrderRequest::new(product_id.0, 3), token)
            .await?;
        let stock = system.products.check_stock(product_id).await?;
        info!(order = %placed.order_number, total = placed.total_price, stock, "Order placed");

        let id = OrderId(placed.id);
        let amended = system.workflow.update_order(id, 5, token).await?;
        let stock = system.products.check_stock(product_id).await?;
        info!(quantity = amended.quantity, stock, "Order amended");

        let cancelled = system.workflow.cancel_order(id).await?;
        let stock = system.products.check_stock(product_id).await?;
        info!(status = %cancelled.status, stock, "Order cancelled");
        Ok::<_, ShopError>(())
    }
    .instrument(span)
    .await;

    if let Err(e) = outcome {
        error!(code = e.code(), error = %e, "Demo failed");
    }

    system.shutdown().await?;
    info!("Demo completed");
    Ok(())
}
