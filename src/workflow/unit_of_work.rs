//! Explicit transaction scope over the product and order actors.
//!
//! The actors have no shared transaction, so a multi-step operation records an undo
//! step ([`Compensation`]) after each write that succeeded. `commit` forgets them;
//! `rollback` replays them newest first.

use crate::clients::{OrderClient, ProductClient};
use crate::framework::ActorClient;
use crate::model::{OrderId, OrderSnapshot, ProductId};
use tracing::{debug, error, info, warn};

/// An undo step for one write that already happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    /// Undo a stock decrease.
    RestoreStock {
        product_id: ProductId,
        quantity: u32,
    },
    /// Undo an order creation.
    DiscardOrder { order_id: OrderId },
    /// Undo an amendment or status change. Skipped if the order is no longer at
    /// `expected`, i.e. someone else changed it after this write.
    RevertOrder {
        order_id: OrderId,
        expected: OrderSnapshot,
        snapshot: OrderSnapshot,
    },
}

/// A unit of work for one public operation.
///
/// Must end in [`commit`](Self::commit) or [`rollback`](Self::rollback); dropping it with
/// recorded compensations logs an error, since the writes can no longer be undone.
pub struct UnitOfWork<'a> {
    label: &'static str,
    products: &'a ProductClient,
    orders: &'a OrderClient,
    compensations: Vec<Compensation>,
}

impl<'a> UnitOfWork<'a> {
    pub fn begin(label: &'static str, products: &'a ProductClient, orders: &'a OrderClient) -> Self {
        debug!(label, "Unit of work started");
        Self {
            label,
            products,
            orders,
            compensations: Vec::new(),
        }
    }

    pub fn record(&mut self, compensation: Compensation) {
        debug!(label = self.label, ?compensation, "Recorded");
        self.compensations.push(compensation);
    }

    pub fn pending(&self) -> &[Compensation] {
        &self.compensations
    }

    pub fn commit(mut self) {
        debug!(label = self.label, writes = self.compensations.len(), "Committed");
        self.compensations.clear();
    }

    /// Applies every recorded compensation in reverse order.
    ///
    /// A compensation that fails is logged and skipped; the rest still run.
    pub async fn rollback(mut self) {
        let steps = std::mem::take(&mut self.compensations);
        warn!(label = self.label, steps = steps.len(), "Rolling back");
        for step in steps.into_iter().rev() {
            if let Err(msg) = self.apply(&step).await {
                error!(label = self.label, ?step, error = %msg, "Compensation failed");
            }
        }
        info!(label = self.label, "Rolled back");
    }

    async fn apply(&self, step: &Compensation) -> Result<(), String> {
        match step {
            Compensation::RestoreStock {
                product_id,
                quantity,
            } => self
                .products
                .increase_stock(*product_id, *quantity)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string()),
            Compensation::DiscardOrder { order_id } => {
                self.orders.delete(*order_id).await.map_err(|e| e.to_string())
            }
            Compensation::RevertOrder {
                order_id,
                expected,
                snapshot,
            } => self
                .orders
                .restore(*order_id, *expected, *snapshot)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string()),
        }
    }
}

impl Drop for UnitOfWork<'_> {
    fn drop(&mut self) {
        if !self.compensations.is_empty() {
            error!(
                label = self.label,
                pending = ?self.compensations,
                "Unit of work dropped without commit or rollback"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CustomerId, OrderCreate, OrderStatus, ProductCreate};
    use crate::{order_actor, product_actor};

    fn spawn() -> (ProductClient, OrderClient) {
        let (p_actor, products) = product_actor::new(8);
        let (o_actor, orders) = order_actor::new(8);
        tokio::spawn(p_actor.run(()));
        tokio::spawn(o_actor.run(()));
        (products, orders)
    }

    async fn widget(products: &ProductClient, stock: u32) -> ProductId {
        products
            .create_product(ProductCreate {
                name: "Widget".into(),
                description: String::new(),
                category: "tools".into(),
                price: 100,
                stock,
                shipping: String::new(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_rollback_replays_in_reverse() {
        let (products, orders) = spawn();
        let product_id = widget(&products, 10).await;

        let mut uow = UnitOfWork::begin("test", &products, &orders);
        products.decrease_stock(product_id, 4).await.unwrap();
        uow.record(Compensation::RestoreStock {
            product_id,
            quantity: 4,
        });
        let order_id = orders
            .create_order(OrderCreate {
                customer_id: CustomerId(1),
                login_id: "alice".into(),
                product_id,
                quantity: 4,
                unit_price: 100,
                shipping: None,
            })
            .await
            .unwrap();
        uow.record(Compensation::DiscardOrder { order_id });
        assert_eq!(uow.pending().len(), 2);

        uow.rollback().await;

        assert_eq!(products.check_stock(product_id).await.unwrap(), 10);
        assert!(orders.get(order_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revert_order_restores_snapshot() {
        let (products, orders) = spawn();
        let product_id = widget(&products, 10).await;
        let order_id = orders
            .create_order(OrderCreate {
                customer_id: CustomerId(1),
                login_id: "alice".into(),
                product_id,
                quantity: 2,
                unit_price: 100,
                shipping: None,
            })
            .await
            .unwrap();
        let before = orders.load(order_id).await.unwrap().snapshot();

        let mut uow = UnitOfWork::begin("test", &products, &orders);
        let cancelled = orders.cancel(order_id).await.unwrap().order;
        uow.record(Compensation::RevertOrder {
            order_id,
            expected: cancelled.snapshot(),
            snapshot: before,
        });
        uow.rollback().await;

        let order = orders.load(order_id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.quantity, 2);
    }

    #[tokio::test]
    async fn test_failed_compensation_does_not_stop_the_rest() {
        let (products, orders) = spawn();
        let product_id = widget(&products, 5).await;

        let mut uow = UnitOfWork::begin("test", &products, &orders);
        uow.record(Compensation::RestoreStock {
            product_id,
            quantity: 1,
        });
        uow.record(Compensation::DiscardOrder {
            order_id: OrderId(404),
        });
        uow.rollback().await;

        assert_eq!(products.check_stock(product_id).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_commit_forgets_compensations() {
        let (products, orders) = spawn();
        let product_id = widget(&products, 5).await;

        let mut uow = UnitOfWork::begin("test", &products, &orders);
        products.decrease_stock(product_id, 1).await.unwrap();
        uow.record(Compensation::RestoreStock {
            product_id,
            quantity: 1,
        });
        uow.commit();

        assert_eq!(products.check_stock(product_id).await.unwrap(), 4);
    }
}
