use crate::auth::{TokenIssuer, TokenVerifier};
use crate::cache::{CacheStore, MemoryCache, OrderCache};
use crate::cart::CartService;
use crate::catalog::Catalog;
use crate::clients::{CustomerClient, OrderClient, ProductClient};
use crate::config::ShopConfig;
use crate::workflow::{CustomerService, OrderWorkflow};
use crate::{customer_actor, order_actor, product_actor};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// The running shop: three actors plus the services built over their clients, and a
/// background task that purges expired cache entries.
///
/// Must be created inside a Tokio runtime. Call [`shutdown`](Self::shutdown) to stop
/// the actors; clones of the clients or services that are still held elsewhere keep
/// their actor alive until they are dropped too.
pub struct ShopSystem {
    pub products: ProductClient,
    pub orders: OrderClient,
    pub customers: CustomerClient,
    pub workflow: OrderWorkflow,
    pub accounts: CustomerService,
    pub cart: CartService,
    pub catalog: Catalog,
    pub store: Arc<dyn CacheStore>,
    handles: Vec<JoinHandle<()>>,
    sweeper: JoinHandle<()>,
}

/// Calls [`CacheStore::purge_expired`] every `period` until aborted.
fn spawn_sweeper(store: Arc<dyn CacheStore>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = tokio::time::interval(period);
        ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticks.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(dropped) => debug!(dropped, "Purged expired cache entries"),
                Err(e) => warn!(error = %e, "Cache sweep failed"),
            }
        }
    })
}

impl ShopSystem {
    /// Starts the shop over a fresh [`MemoryCache`]. `tokens` both checks tokens for
    /// the order workflow and issues them at login.
    pub fn new<A>(config: ShopConfig, tokens: Arc<A>) -> Self
    where
        A: TokenVerifier + TokenIssuer + 'static,
    {
        Self::with_cache(config, tokens, Arc::new(MemoryCache::new()))
    }

    /// Starts the shop over the given key-value store.
    pub fn with_cache<A>(config: ShopConfig, tokens: Arc<A>, store: Arc<dyn CacheStore>) -> Self
    where
        A: TokenVerifier + TokenIssuer + 'static,
    {
        let (product_actor, products) = product_actor::new(config.actor_buffer);
        let (order_actor, orders) = order_actor::new(config.actor_buffer);
        let (customer_actor, customers) = customer_actor::new(config.actor_buffer);

        let handles = vec![
            tokio::spawn(product_actor.run(())),
            tokio::spawn(order_actor.run(())),
            tokio::spawn(customer_actor.run(())),
        ];

        let workflow = OrderWorkflow::new(
            products.clone(),
            orders.clone(),
            customers.clone(),
            tokens.clone(),
            OrderCache::new(store.clone(), config.order_cache_ttl()),
        );
        let accounts = CustomerService::new(customers.clone(), tokens, config.token_ttl());
        let cart = CartService::new(
            store.clone(),
            products.clone(),
            customers.clone(),
            config.cart_ttl(),
        );
        let catalog = Catalog::new(products.clone(), store.clone());
        let sweeper = spawn_sweeper(store.clone(), config.cache_sweep_interval());

        info!(
            buffer = config.actor_buffer,
            sweep_secs = config.cache_sweep_secs,
            "Shop system started"
        );
        Self {
            products,
            orders,
            customers,
            workflow,
            accounts,
            cart,
            catalog,
            store,
            handles,
            sweeper,
        }
    }

    /// Drops every client held by the system and waits for the actors to exit.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down shop system");
        let ShopSystem {
            products,
            orders,
            customers,
            workflow,
            accounts,
            cart,
            catalog,
            store,
            handles,
            sweeper,
        } = self;
        sweeper.abort();
        // The sweeper holds a store handle; wait until it is gone.
        let _ = sweeper.await;
        drop((workflow, accounts, cart, catalog));
        drop((products, orders, customers));
        drop(store);

        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Actor task failed");
                return Err(format!("Actor task failed: {e:?}"));
            }
        }
        info!("Shop system stopped");
        Ok(())
    }
}
