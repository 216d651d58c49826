use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sf_core::domain::entities::Product;
use validator::{Validate, ValidationError};

fn non_negative_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        return Err(ValidationError::new("negative_price"));
    }
    Ok(())
}

/// Body of product create and update
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(max = 500))]
    pub description: Option<String>,

    #[validate(custom(function = "non_negative_price"))]
    pub price: Decimal,

    #[validate(length(min = 1, max = 50))]
    pub sku: Option<String>,

    pub category_id: i64,

    #[validate(range(min = 0))]
    #[serde(default)]
    pub stock_quantity: i32,
}

impl ProductRequest {
    pub fn into_product(self) -> Product {
        let mut product = Product::new(self.name, self.price, self.category_id)
            .with_stock(self.stock_quantity);
        product.description = self.description;
        product.sku = self.sku;
        product
    }

    /// Overwrites the editable fields of `product`
    pub fn apply_to(self, product: &mut Product) {
        let replacement = Product::new(self.name, self.price, self.category_id);
        product.name = replacement.name;
        product.price = replacement.price;
        product.category_id = replacement.category_id;
        product.description = self.description;
        product.sku = self.sku;
        product.stock_quantity = self.stock_quantity;
        product.touch();
    }
}
