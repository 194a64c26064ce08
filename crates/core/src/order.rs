//! Text of the chat message a shopper sends to place an order.

use crate::types::{Color, Product, SizeName};

/// Order message for `product` with the shopper's optional choices.
///
/// ```
/// use esther_core::order::order_message;
/// # use esther_core::{CategoryId, Gender, Price, Product, ProductId};
/// # let product = Product {
/// #     id: ProductId::new("p1"), name: "Blusa".into(), price: "45.9".parse().unwrap(),
/// #     description: String::new(), image_urls: vec![], category_id: CategoryId::new("c"),
/// #     gender: Gender::Women, colors: vec![], sizes: vec![], created_at: None, updated_at: None,
/// # };
/// assert_eq!(
///     order_message(&product, None, None),
///     "Hola! Quisiera realizar un pedido de Blusa con un precio de 45.90 Bs. Gracias!"
/// );
/// ```
#[must_use]
pub fn order_message(product: &Product, color: Option<&Color>, size: Option<SizeName>) -> String {
    let mut message = format!(
        "Hola! Quisiera realizar un pedido de {} con un precio de {} Bs.",
        product.name,
        product.price.display()
    );
    if let Some(color) = color {
        message.push_str(&format!(" Color: {}.", color.name));
    }
    if let Some(size) = size {
        message.push_str(&format!(" Talla: {size}."));
    }
    message.push_str(" Gracias!");
    message
}
