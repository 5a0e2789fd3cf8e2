//! Shopping cart lines and totals.

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, CartItemId, GameTag, Price};

/// Largest quantity a single cart line may hold.
pub const MAX_QUANTITY: u32 = 99;

/// One account in a user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartItemId,
    pub account_id: AccountId,
    pub title: String,
    pub game: GameTag,
    pub image_url: Option<String>,
    pub unit_price: Price,
    /// Always at least 1.
    pub quantity: u32,
}

impl CartLine {
    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price * self.quantity
    }
}

/// A user's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Wrap loaded lines.
    #[must_use]
    pub const fn new(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of items, counting quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of every line total.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Order summary shown at checkout.
    #[must_use]
    pub fn summary(&self) -> CheckoutSummary {
        let subtotal = self.total();
        CheckoutSummary {
            subtotal,
            tax: Price::ZERO,
            total: subtotal,
        }
    }
}

/// Totals shown on the checkout page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSummary {
    pub subtotal: Price,
    /// Digital goods carry no tax.
    pub tax: Price,
    pub total: Price,
}

/// What to do with a cart line after a quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityUpdate {
    /// Store the new quantity.
    Set(u32),
    /// Drop the line.
    Remove,
}

impl QuantityUpdate {
    /// Resolve a requested quantity.
    ///
    /// Zero or less removes the line; anything above [`MAX_QUANTITY`] is
    /// clamped.
    #[must_use]
    pub fn from_requested(requested: i64) -> Self {
        if requested <= 0 {
            return Self::Remove;
        }
        let clamped = u32::try_from(requested).map_or(MAX_QUANTITY, |q| q.min(MAX_QUANTITY));
        Self::Set(clamped)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(price: &str, quantity: u32) -> CartLine {
        CartLine {
            id: CartItemId::generate(),
            account_id: AccountId::generate(),
            title: "Premium Java + Bedrock".to_string(),
            game: GameTag::parse("minecraft").unwrap(),
            image_url: None,
            unit_price: Price::parse(price).unwrap(),
            quantity,
        }
    }

    #[test]
    fn test_totals() {
        let cart = Cart::new(vec![line("45", 2), line("89.99", 1)]);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total().display(), "$179.99");

        let summary = cart.summary();
        assert_eq!(summary.tax, Price::ZERO);
        assert_eq!(summary.total, summary.subtotal);
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::default();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_quantity_update() {
        assert_eq!(QuantityUpdate::from_requested(0), QuantityUpdate::Remove);
        assert_eq!(QuantityUpdate::from_requested(-4), QuantityUpdate::Remove);
        assert_eq!(QuantityUpdate::from_requested(3), QuantityUpdate::Set(3));
        assert_eq!(
            QuantityUpdate::from_requested(1_000),
            QuantityUpdate::Set(MAX_QUANTITY)
        );
        assert_eq!(
            QuantityUpdate::from_requested(i64::MAX),
            QuantityUpdate::Set(MAX_QUANTITY)
        );
    }
}
