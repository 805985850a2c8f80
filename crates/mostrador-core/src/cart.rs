//! # Cart
//!
//! The lines being rung up in the current checkout.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add_product(p, 2) ──► line exists? ──yes──► quantity += 2             │
//! │                              │                                          │
//! │                              no ──► push CartLine (price frozen)        │
//! │                                                                         │
//! │  update_quantity(id, 0) ──► remove_line(id)                            │
//! │                                                                         │
//! │  subtotal = Σ unit_price × quantity   (order independent)              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::validation::{validate_price_cents, validate_quantity};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// A line in the cart.
///
/// Product details are copied when the line is added, so the cart keeps
/// showing the price the cashier quoted even if the catalog changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    /// SKU at time of adding (frozen)
    pub sku: String,
    /// Product name at time of adding (frozen)
    pub name: String,
    /// Price in cents at time of adding (frozen)
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl CartLine {
    pub fn new(
        product_id: impl Into<String>,
        sku: impl Into<String>,
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> Self {
        CartLine {
            product_id: product_id.into(),
            sku: sku.into(),
            name: name.into(),
            unit_price_cents: unit_price.cents(),
            quantity,
        }
    }

    /// Creates a line from a catalog product, freezing its current price.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine::new(
            product.id.clone(),
            product.sku.clone(),
            product.name.clone(),
            product.price(),
            quantity,
        )
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// unit price × quantity.
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding same product increases quantity)
/// - Quantity is always in `1..=MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_ITEMS` lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds a catalog product, or increases the quantity if already present.
    pub fn add_product(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        self.add_line(CartLine::from_product(product, quantity))
    }

    /// Adds a line, merging with an existing line for the same product.
    ///
    /// When merging, the price already in the cart wins.
    pub fn add_line(&mut self, line: CartLine) -> CoreResult<()> {
        validate_quantity(line.quantity)?;
        validate_price_cents(line.unit_price_cents)?;

        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == line.product_id)
        {
            let new_qty = existing.quantity + line.quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            existing.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.lines.push(line);
        Ok(())
    }

    /// Sets the quantity of a line. Quantity 0 removes it.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_line(product_id);
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }
        validate_quantity(quantity)?;

        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::NotInCart(product_id.to_string())),
        }
    }

    pub fn remove_line(&mut self, product_id: &str) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);

        if self.lines.len() == initial_len {
            Err(CoreError::NotInCart(product_id.to_string()))
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ line subtotals.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::MAX_PRICE_CENTS;

    fn line(id: &str, price_cents: i64, qty: i64) -> CartLine {
        CartLine::new(
            id,
            format!("SKU-{}", id),
            format!("Product {}", id),
            Money::from_cents(price_cents),
            qty,
        )
    }

    #[test]
    fn test_cart_add_line() {
        let mut cart = Cart::new();
        cart.add_line(line("1", 999, 2)).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.subtotal().cents(), 1998);
    }

    #[test]
    fn test_cart_add_same_product_increases_quantity() {
        let mut cart = Cart::new();
        cart.add_line(line("1", 999, 2)).unwrap();
        cart.add_line(line("1", 1500, 3)).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 5);
        // First quoted price is kept
        assert_eq!(cart.subtotal().cents(), 999 * 5);
    }

    #[test]
    fn test_subtotal_independent_of_line_order() {
        let mut forward = Cart::new();
        let mut backward = Cart::new();
        let lines = [line("a", 1250, 3), line("b", 99, 7), line("c", 40_000, 1)];

        for l in lines.iter() {
            forward.add_line(l.clone()).unwrap();
        }
        for l in lines.iter().rev() {
            backward.add_line(l.clone()).unwrap();
        }

        let expected: i64 = lines.iter().map(|l| l.unit_price_cents * l.quantity).sum();
        assert_eq!(forward.subtotal().cents(), expected);
        assert_eq!(backward.subtotal(), forward.subtotal());
    }

    #[test]
    fn test_quantity_limits() {
        let mut cart = Cart::new();
        assert!(cart.add_line(line("1", 100, 0)).is_err());
        cart.add_line(line("1", 100, 998)).unwrap();
        assert!(matches!(
            cart.add_line(line("1", 100, 2)),
            Err(CoreError::QuantityTooLarge { requested: 1000, .. })
        ));
        assert_eq!(cart.total_quantity(), 998);
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = Cart::new();
        cart.add_line(line("1", 100, 2)).unwrap();
        cart.update_quantity("1", 5).unwrap();
        assert_eq!(cart.total_quantity(), 5);

        cart.update_quantity("1", 0).unwrap();
        assert!(cart.is_empty());
        assert_eq!(
            cart.update_quantity("1", 3),
            Err(CoreError::NotInCart("1".to_string()))
        );
    }

    #[test]
    fn test_cart_too_large() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add_line(line(&i.to_string(), 100, 1)).unwrap();
        }
        assert_eq!(
            cart.add_line(line("extra", 100, 1)),
            Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS
            })
        );
    }

    #[test]
    fn test_price_above_ceiling_rejected() {
        let mut cart = Cart::new();
        let err = cart.add_line(line("1", i64::MAX / 2, 3)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
        assert!(cart.is_empty());
        assert!(cart.subtotal().is_zero());
    }

    #[test]
    fn test_full_cart_at_price_ceiling_fits() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add_line(line(&i.to_string(), MAX_PRICE_CENTS, MAX_ITEM_QUANTITY))
                .unwrap();
        }

        let expected = MAX_PRICE_CENTS as i128 * MAX_ITEM_QUANTITY as i128 * MAX_CART_ITEMS as i128;
        assert_eq!(cart.subtotal().cents() as i128, expected);
    }

    #[test]
    fn test_empty_cart_subtotal_is_zero() {
        let cart = Cart::new();
        assert!(cart.subtotal().is_zero());
    }
}
