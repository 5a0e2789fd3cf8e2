//! Cart totals and quantity rules.

use gamehub_core::cart::{Cart, CartLine, MAX_QUANTITY, QuantityUpdate};
use gamehub_core::{AccountId, CartItemId, Price};
use gamehub_integration_tests::tag;

fn line(title: &str, price: u32, quantity: u32) -> CartLine {
    CartLine {
        id: CartItemId::generate(),
        account_id: AccountId::generate(),
        title: title.to_string(),
        game: tag("valorant"),
        image_url: None,
        unit_price: Price::from_dollars(price),
        quantity,
    }
}

#[test]
fn test_totals_count_quantities() {
    let cart = Cart::new(vec![
        line("Diamond Account - Elderflame", 125, 2),
        line("Immortal Smurf - Glitchpop", 189, 1),
    ]);

    assert_eq!(cart.item_count(), 3);
    assert_eq!(cart.total(), Price::from_dollars(439));

    let summary = cart.summary();
    assert_eq!(summary.subtotal, Price::from_dollars(439));
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
fn test_quantity_updates() {
    assert_eq!(QuantityUpdate::from_requested(0), QuantityUpdate::Remove);
    assert_eq!(QuantityUpdate::from_requested(-3), QuantityUpdate::Remove);
    assert_eq!(QuantityUpdate::from_requested(4), QuantityUpdate::Set(4));
    assert_eq!(
        QuantityUpdate::from_requested(10_000),
        QuantityUpdate::Set(MAX_QUANTITY)
    );
}
