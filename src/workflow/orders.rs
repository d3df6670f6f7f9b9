//! # Order Workflow
//!
//! The only place where orders are created or mutated. Each operation touches the
//! product actor (stock), the order actor and the customer registry, and runs under one
//! [`UnitOfWork`] so a failure halfway through undoes the writes already made. The
//! order cache is written after commit and never fails an operation.

use super::error::ShopError;
use super::unit_of_work::{Compensation, UnitOfWork};
use crate::auth::TokenVerifier;
use crate::cache::OrderCache;
use crate::clients::{CustomerClient, OrderClient, ProductClient};
use crate::framework::{ActorClient, Predicate};
use crate::model::{
    Order, OrderCreate, OrderId, OrderSnapshot, OrderStatus, OrderView, ProductId, ShippingInfo,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// One line of an order placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub product_id: u32,
    pub quantity: u32,
    #[serde(default)]
    pub shipping: Option<ShippingInfo>,
}

impl OrderRequest {
    pub fn new(product_id: u32, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            shipping: None,
        }
    }

    fn validate(&self) -> Result<(), ShopError> {
        if self.product_id == 0 {
            return Err(ShopError::BadRequest("product id must be positive".into()));
        }
        if self.quantity == 0 {
            return Err(ShopError::BadRequest("quantity must be positive".into()));
        }
        Ok(())
    }
}

/// Filter for [`OrderWorkflow::get_orders_with_conditions`].
///
/// The date range applies only when both ends are given, and covers whole days.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderConditions {
    pub login_id: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<OrderStatus>,
}

impl OrderConditions {
    pub fn for_customer(login_id: impl Into<String>) -> Self {
        Self {
            login_id: login_id.into(),
            ..Default::default()
        }
    }

    fn into_predicate(self) -> Result<Predicate<Order>, ShopError> {
        if self.login_id.trim().is_empty() {
            return Err(ShopError::BadRequest("login id is required".into()));
        }
        let range = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start > end => {
                return Err(ShopError::BadRequest(format!(
                    "start date {start} is after end date {end}"
                )))
            }
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        };
        let OrderConditions {
            login_id, status, ..
        } = self;
        Ok(Predicate::new(move |order: &Order| {
            if order.login_id != login_id {
                return false;
            }
            if let Some((start, end)) = range {
                let day = order.ordered_at.date_naive();
                if day < start || day > end {
                    return false;
                }
            }
            status.map_or(true, |s| order.status == s)
        }))
    }
}

/// Orchestrates order placement, amendment, cancellation and reads.
#[derive(Clone)]
pub struct OrderWorkflow {
    products: ProductClient,
    orders: OrderClient,
    customers: CustomerClient,
    tokens: Arc<dyn TokenVerifier>,
    cache: OrderCache,
}

async fn settle<T>(uow: UnitOfWork<'_>, result: Result<T, ShopError>) -> Result<T, ShopError> {
    match result {
        Ok(value) => {
            uow.commit();
            Ok(value)
        }
        Err(e) => {
            info!(code = e.code(), error = %e, "Operation failed");
            uow.rollback().await;
            Err(e)
        }
    }
}

impl OrderWorkflow {
    pub fn new(
        products: ProductClient,
        orders: OrderClient,
        customers: CustomerClient,
        tokens: Arc<dyn TokenVerifier>,
        cache: OrderCache,
    ) -> Self {
        Self {
            products,
            orders,
            customers,
            tokens,
            cache,
        }
    }

    fn authenticate(&self, token: &str) -> Result<String, ShopError> {
        if !self.tokens.validate(token) {
            info!("Rejected token");
            return Err(ShopError::UnsupportedToken);
        }
        self.tokens.login_id(token).ok_or(ShopError::UnsupportedToken)
    }

    /// Places one order: takes stock, then records the order for the token's customer.
    #[instrument(skip(self, token), fields(product_id = request.product_id, quantity = request.quantity))]
    pub async fn create_order(
        &self,
        request: OrderRequest,
        token: &str,
    ) -> Result<OrderView, ShopError> {
        let login_id = self.authenticate(token)?;
        request.validate()?;

        let mut uow = UnitOfWork::begin("create_order", &self.products, &self.orders);
        let result = self.place(&mut uow, &request, &login_id).await;
        let order = settle(uow, result).await?;

        let view = OrderView::from(&order);
        self.cache.put(&view).await;
        info!(order_id = %order.id, total = order.total_price, "Order placed");
        Ok(view)
    }

    /// Places several orders as one unit: the first failure undoes every earlier line.
    #[instrument(skip(self, requests, token), fields(lines = requests.len()))]
    pub async fn create_orders(
        &self,
        requests: Vec<OrderRequest>,
        token: &str,
    ) -> Result<Vec<OrderView>, ShopError> {
        let login_id = self.authenticate(token)?;
        if requests.is_empty() {
            return Err(ShopError::BadRequest("no order lines".into()));
        }

        let mut uow = UnitOfWork::begin("create_orders", &self.products, &self.orders);
        let mut placed = Vec::with_capacity(requests.len());
        let mut result = Ok(());
        for request in &requests {
            let line = match request.validate() {
                Ok(()) => self.place(&mut uow, request, &login_id).await,
                Err(e) => Err(e),
            };
            match line {
                Ok(order) => placed.push(order),
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        settle(uow, result).await?;

        let mut views = Vec::with_capacity(placed.len());
        for order in &placed {
            let view = OrderView::from(order);
            self.cache.put(&view).await;
            views.push(view);
        }
        info!(count = views.len(), "Orders placed");
        Ok(views)
    }

    async fn place(
        &self,
        uow: &mut UnitOfWork<'_>,
        request: &OrderRequest,
        login_id: &str,
    ) -> Result<Order, ShopError> {
        let product = self.products.load(ProductId(request.product_id)).await?;
        if product.stock < request.quantity {
            return Err(ShopError::InsufficientStock {
                requested: request.quantity,
                available: product.stock,
            });
        }

        // The actor re-checks stock: a concurrent order may have won the race since the load.
        self.products
            .decrease_stock(product.id, request.quantity)
            .await?;
        uow.record(Compensation::RestoreStock {
            product_id: product.id,
            quantity: request.quantity,
        });

        let customer = self.customers.find_active(login_id).await?;

        let order_id = self
            .orders
            .create_order(OrderCreate {
                customer_id: customer.id,
                login_id: customer.login_id,
                product_id: product.id,
                quantity: request.quantity,
                unit_price: product.price,
                shipping: request.shipping.clone(),
            })
            .await?;
        uow.record(Compensation::DiscardOrder { order_id });

        Ok(self.orders.load(order_id).await?)
    }

    /// Changes the quantity of a pending order and moves the difference in stock.
    /// Ordering more takes the stock before touching the order; ordering less amends
    /// the order first and then gives the stock back. The amendment only applies if the
    /// order still holds the quantity read at the start.
    #[instrument(skip(self, token))]
    pub async fn update_order(
        &self,
        order_id: OrderId,
        quantity: u32,
        token: &str,
    ) -> Result<OrderView, ShopError> {
        let login_id = self.authenticate(token)?;
        if quantity == 0 {
            return Err(ShopError::BadRequest("quantity must be positive".into()));
        }
        let order = self.orders.load(order_id).await?;
        let product = self.products.load(order.product_id).await?;
        self.customers.find_active(&login_id).await?;

        let mut uow = UnitOfWork::begin("update_order", &self.products, &self.orders);
        let result = self.amend(&mut uow, &order, product.id, quantity).await;
        let order = settle(uow, result).await?;

        let view = OrderView::from(&order);
        self.cache.put(&view).await;
        Ok(view)
    }

    async fn amend(
        &self,
        uow: &mut UnitOfWork<'_>,
        current: &Order,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Order, ShopError> {
        let order_id = current.id;
        let held = current.quantity;
        match quantity.cmp(&held) {
            Ordering::Greater => {
                let extra = quantity - held;
                self.products.decrease_stock(product_id, extra).await?;
                uow.record(Compensation::RestoreStock {
                    product_id,
                    quantity: extra,
                });
                let (_, order) = self.orders.amend_quantity(order_id, held, quantity).await?;
                Ok(order)
            }
            Ordering::Less => {
                let (_, order) = self.orders.amend_quantity(order_id, held, quantity).await?;
                uow.record(Compensation::RevertOrder {
                    order_id,
                    expected: order.snapshot(),
                    snapshot: current.snapshot(),
                });
                self.products
                    .increase_stock(product_id, held - quantity)
                    .await?;
                Ok(order)
            }
            // Still checks the status and the held quantity.
            Ordering::Equal => {
                let (_, order) = self.orders.amend_quantity(order_id, held, quantity).await?;
                Ok(order)
            }
        }
    }

    /// Cancels an order and returns its stock. Cancelling a cancelled order changes nothing.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<OrderView, ShopError> {
        let order = self.orders.load(order_id).await?;
        let product = self.products.load(order.product_id).await?;

        let mut uow = UnitOfWork::begin("cancel_order", &self.products, &self.orders);
        let result = self.cancel(&mut uow, order_id, product.id).await;
        let order = settle(uow, result).await?;

        self.cache.evict(order_id).await;
        Ok(OrderView::from(&order))
    }

    async fn cancel(
        &self,
        uow: &mut UnitOfWork<'_>,
        order_id: OrderId,
        product_id: ProductId,
    ) -> Result<Order, ShopError> {
        let cancellation = self.orders.cancel(order_id).await?;
        let order = cancellation.order;
        if !cancellation.changed {
            info!(%order_id, "Order already cancelled");
            return Ok(order);
        }
        uow.record(Compensation::RevertOrder {
            order_id,
            expected: order.snapshot(),
            snapshot: OrderSnapshot {
                quantity: order.quantity,
                total_price: order.total_price,
                status: cancellation.previous_status,
            },
        });

        self.products
            .increase_stock(product_id, order.quantity)
            .await?;
        info!(%order_id, restored = order.quantity, "Order cancelled");
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn ship_order(&self, order_id: OrderId) -> Result<OrderView, ShopError> {
        let order = self.orders.ship(order_id).await?;
        let view = OrderView::from(&order);
        self.cache.put(&view).await;
        Ok(view)
    }

    #[instrument(skip(self))]
    pub async fn complete_order(&self, order_id: OrderId) -> Result<OrderView, ShopError> {
        let order = self.orders.complete(order_id).await?;
        let view = OrderView::from(&order);
        self.cache.put(&view).await;
        Ok(view)
    }

    /// Replaces the delivery details of a pending order.
    #[instrument(skip(self, shipping, token))]
    pub async fn update_shipping(
        &self,
        order_id: OrderId,
        shipping: ShippingInfo,
        token: &str,
    ) -> Result<OrderView, ShopError> {
        let login_id = self.authenticate(token)?;
        self.customers.find_active(&login_id).await?;
        let order = self.orders.update_shipping(order_id, shipping).await?;
        let view = OrderView::from(&order);
        self.cache.put(&view).await;
        Ok(view)
    }

    /// Cache-aside read of one order.
    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<OrderView, ShopError> {
        if let Some(view) = self.cache.get(order_id).await {
            return Ok(view);
        }
        let order = self.orders.load(order_id).await?;
        let view = OrderView::from(&order);
        self.cache.put(&view).await;
        Ok(view)
    }

    #[instrument(skip(self))]
    pub async fn get_orders(&self) -> Result<Vec<OrderView>, ShopError> {
        let orders = self.orders.find(Predicate::all()).await?;
        if orders.is_empty() {
            return Err(ShopError::NotFound("orders".into()));
        }
        Ok(orders.iter().map(OrderView::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_orders_with_conditions(
        &self,
        conditions: OrderConditions,
    ) -> Result<Vec<OrderView>, ShopError> {
        let login_id = conditions.login_id.clone();
        let orders = self.orders.find(conditions.into_predicate()?).await?;
        if orders.is_empty() {
            warn!(%login_id, "No orders match");
            return Err(ShopError::NotFound(format!("orders of {login_id}")));
        }
        Ok(orders.iter().map(OrderView::from).collect())
    }
}
