//! [`ActorEntity`] implementation for [`Product`].

use super::actions::{ProductAction, ProductActionResult};
use super::error::ProductError;
use crate::framework::ActorEntity;
use crate::model::{Product, ProductCreate, ProductId, ProductUpdate};
use async_trait::async_trait;

fn require_text(field: &str, value: &str) -> Result<(), ProductError> {
    if value.trim().is_empty() {
        return Err(ProductError::InvalidProduct(format!("{field} must not be blank")));
    }
    Ok(())
}

fn require_price(price: u64) -> Result<(), ProductError> {
    if price == 0 {
        return Err(ProductError::InvalidProduct("price must be positive".into()));
    }
    Ok(())
}

#[async_trait]
impl ActorEntity for Product {
    type Id = ProductId;
    type Create = ProductCreate;
    type Update = ProductUpdate;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Context = ();
    type Error = ProductError;

    fn from_create_params(id: ProductId, params: ProductCreate) -> Result<Self, ProductError> {
        require_text("name", &params.name)?;
        require_price(params.price)?;
        Ok(Self {
            id,
            name: params.name,
            description: params.description,
            category: params.category,
            price: params.price,
            stock: params.stock,
            shipping: params.shipping,
        })
    }

    async fn on_update(&mut self, update: ProductUpdate, _ctx: &()) -> Result<(), ProductError> {
        if let Some(name) = update.name {
            require_text("name", &name)?;
            self.name = name;
        }
        if let Some(price) = update.price {
            require_price(price)?;
            self.price = price;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: ProductAction,
        _ctx: &(),
    ) -> Result<ProductActionResult, ProductError> {
        match action {
            ProductAction::CheckStock => Ok(ProductActionResult::CheckStock(self.stock)),
            ProductAction::DecreaseStock(amount) => self
                .decrease_stock(amount)
                .map(ProductActionResult::DecreaseStock)
                .map_err(ProductError::from),
            ProductAction::IncreaseStock(amount) => self
                .increase_stock(amount)
                .map(ProductActionResult::IncreaseStock)
                .map_err(ProductError::from),
        }
    }
}
