//! # Cart Module
//!
//! The pure checkout engine: line accumulation and total derivation.
//!
//! ## Totals Derivation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     How Cart Totals Are Derived                         │
//! │                                                                         │
//! │  Per line (qty, unit price, discount, VAT rate, incl/excl flag):       │
//! │                                                                         │
//! │    line_total = qty × unit_price                                        │
//! │    taxable    = line_total − discount                                   │
//! │                                                                         │
//! │    VAT-exclusive line:  vat = taxable × rate     (added on top)        │
//! │    VAT-inclusive line:  vat = taxable × rate/(1+rate)  (contained)     │
//! │                                                                         │
//! │  Cart:                                                                  │
//! │    subtotal       = Σ line_total                                        │
//! │    discount_total = Σ discount                                          │
//! │    vat_total      = Σ vat              (both kinds, for reporting)     │
//! │    net            = subtotal − discount_total + Σ exclusive vat        │
//! │                                                                         │
//! │  Every totals call re-derives from the lines. There is NO cached       │
//! │  arithmetic to fall out of sync with the items.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `product_id` (adding the same product merges
//!   quantity)
//! - Quantity is 1..=999; setting 0 removes the line
//! - At most 100 distinct lines
//! - A line discount never exceeds the line total
//! - No side effects: nothing is persisted until checkout commit

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, VatRate};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Item
// =============================================================================

/// A line in the cart.
///
/// ## Price Freezing
/// Product data (name, price, VAT) is captured when the line is added.
/// If the product changes in the database afterwards, the cart keeps
/// the frozen values: what the cashier saw is what gets sold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product ID (UUID)
    pub product_id: String,

    /// Product name at time of adding (frozen)
    pub name: String,

    /// Price in kuruş at time of adding (frozen)
    pub unit_price_kurus: i64,

    /// VAT rate in basis points at time of adding (frozen)
    pub vat_rate_bps: u32,

    /// Whether the frozen price contains VAT
    pub vat_included: bool,

    /// Quantity in cart
    pub quantity: i64,

    /// Absolute discount for the whole line, in kuruş
    pub discount_kurus: i64,

    /// When this line was added
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a new cart line from a product and quantity.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_kurus: product.price_kurus,
            vat_rate_bps: product.vat_rate_bps,
            vat_included: product.vat_included,
            quantity,
            discount_kurus: 0,
            added_at: Utc::now(),
        }
    }

    /// Line total before discount and VAT (unit price × quantity).
    pub fn line_total(&self) -> Money {
        Money::from_kurus(self.unit_price_kurus).multiply_quantity(self.quantity)
    }

    /// The discounted base the VAT applies to.
    pub fn taxable(&self) -> Money {
        self.line_total() - Money::from_kurus(self.discount_kurus)
    }

    /// VAT for this line, per its frozen rate and inclusive flag.
    pub fn vat(&self) -> Money {
        let rate = VatRate::from_bps(self.vat_rate_bps);
        if self.vat_included {
            self.taxable().vat_in(rate)
        } else {
            self.taxable().vat_on(rate)
        }
    }

    /// What this line contributes to the amount due.
    ///
    /// Exclusive lines add their VAT on top of the taxable base;
    /// inclusive lines already carry it inside the price.
    pub fn net_contribution(&self) -> Money {
        if self.vat_included {
            self.taxable()
        } else {
            self.taxable() + self.vat()
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Lines in the cart
    pub items: Vec<CartItem>,

    /// When the cart was created/last cleared
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a product to the cart or increases quantity if already present.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return Err(CoreError::InvalidPaymentAmount {
                reason: "quantity must be positive".to_string(),
            });
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            let new_qty = item.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            item.quantity = new_qty;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        self.items.push(CartItem::from_product(product, quantity));
        Ok(())
    }

    /// Updates the quantity of a line. Quantity 0 removes the line.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(product_id);
        }

        if quantity < 0 || quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                item.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::ProductNotFound(product_id.to_string())),
        }
    }

    /// Sets the absolute discount of a line.
    pub fn set_discount(&mut self, product_id: &str, discount_kurus: i64) -> CoreResult<()> {
        if discount_kurus < 0 {
            return Err(CoreError::InvalidPaymentAmount {
                reason: "discount cannot be negative".to_string(),
            });
        }

        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                let line_total = item.line_total().kurus();
                if discount_kurus > line_total {
                    return Err(CoreError::DiscountTooLarge {
                        discount_kurus,
                        line_total_kurus: line_total,
                    });
                }
                item.discount_kurus = discount_kurus;
                Ok(())
            }
            None => Err(CoreError::ProductNotFound(product_id.to_string())),
        }
    }

    /// Removes a line by product ID.
    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        if self.items.len() == initial_len {
            Err(CoreError::ProductNotFound(product_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Subtotal: Σ(qty × unit price), before discount and VAT.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(|i| i.line_total()).fold(Money::zero(), |a, b| a + b)
    }

    /// Total line discounts.
    pub fn discount_total(&self) -> Money {
        self.items
            .iter()
            .map(|i| Money::from_kurus(i.discount_kurus))
            .fold(Money::zero(), |a, b| a + b)
    }

    /// Total VAT across all lines (inclusive and exclusive alike).
    pub fn vat_total(&self) -> Money {
        self.items.iter().map(|i| i.vat()).fold(Money::zero(), |a, b| a + b)
    }

    /// The amount due: subtotal − discounts + VAT of exclusive lines.
    pub fn net(&self) -> Money {
        self.items
            .iter()
            .map(|i| i.net_contribution())
            .fold(Money::zero(), |a, b| a + b)
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Cart Totals DTO
// =============================================================================

/// Cart totals summary for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal_kurus: i64,
    pub discount_kurus: i64,
    pub vat_kurus: i64,
    pub net_kurus: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal_kurus: cart.subtotal().kurus(),
            discount_kurus: cart.discount_total().kurus(),
            vat_kurus: cart.vat_total().kurus(),
            net_kurus: cart.net().kurus(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product(id: &str, price_kurus: i64, vat_bps: u32, vat_included: bool) -> Product {
        Product {
            id: id.to_string(),
            barcode: Some(format!("869{:010}", id.len())),
            name: format!("Product {}", id),
            price_kurus,
            cost_kurus: None,
            vat_rate_bps: vat_bps,
            vat_included,
            stock_quantity: 100,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_cart_add_item() {
        let mut cart = Cart::new();
        let product = test_product("1", 999, 2000, false);

        cart.add_item(&product, 2).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.subtotal().kurus(), 1998);
    }

    #[test]
    fn test_cart_add_same_product_increases_quantity() {
        let mut cart = Cart::new();
        let product = test_product("1", 999, 2000, false);

        cart.add_item(&product, 2).unwrap();
        cart.add_item(&product, 3).unwrap();

        assert_eq!(cart.item_count(), 1); // Still one line
        assert_eq!(cart.total_quantity(), 5);
    }

    /// The end-to-end arithmetic fixture: qty 2 × ₺50.00, no discount,
    /// 20% VAT exclusive → subtotal ₺100.00, VAT ₺20.00, net ₺120.00.
    #[test]
    fn test_cart_exclusive_vat_totals() {
        let mut cart = Cart::new();
        let product = test_product("1", 5000, 2000, false);

        cart.add_item(&product, 2).unwrap();

        assert_eq!(cart.subtotal().kurus(), 10_000);
        assert_eq!(cart.vat_total().kurus(), 2_000);
        assert_eq!(cart.net().kurus(), 12_000);
    }

    #[test]
    fn test_cart_inclusive_vat_totals() {
        let mut cart = Cart::new();
        // ₺120.00 shelf price containing 20% VAT
        let product = test_product("1", 12_000, 2000, true);

        cart.add_item(&product, 1).unwrap();

        assert_eq!(cart.subtotal().kurus(), 12_000);
        assert_eq!(cart.vat_total().kurus(), 2_000);
        // VAT is inside the price; nothing is added on top
        assert_eq!(cart.net().kurus(), 12_000);
    }

    #[test]
    fn test_cart_discount_applies_before_vat() {
        let mut cart = Cart::new();
        let product = test_product("1", 5000, 2000, false);

        cart.add_item(&product, 2).unwrap();
        cart.set_discount("1", 1000).unwrap();

        // taxable = 10000 - 1000 = 9000, VAT = 1800
        assert_eq!(cart.discount_total().kurus(), 1000);
        assert_eq!(cart.vat_total().kurus(), 1800);
        assert_eq!(cart.net().kurus(), 10_800);
    }

    #[test]
    fn test_cart_discount_cannot_exceed_line_total() {
        let mut cart = Cart::new();
        let product = test_product("1", 5000, 2000, false);

        cart.add_item(&product, 1).unwrap();
        let err = cart.set_discount("1", 6000).unwrap_err();
        assert!(matches!(err, CoreError::DiscountTooLarge { .. }));
    }

    #[test]
    fn test_cart_update_quantity_zero_removes() {
        let mut cart = Cart::new();
        let product = test_product("1", 999, 2000, false);

        cart.add_item(&product, 2).unwrap();
        cart.update_quantity("1", 0).unwrap();

        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_quantity_cap() {
        let mut cart = Cart::new();
        let product = test_product("1", 999, 2000, false);

        cart.add_item(&product, 990).unwrap();
        let err = cart.add_item(&product, 10).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { .. }));
    }

    #[test]
    fn test_cart_clear() {
        let mut cart = Cart::new();
        let product = test_product("1", 999, 2000, false);

        cart.add_item(&product, 2).unwrap();
        assert!(!cart.is_empty());

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.net().kurus(), 0);
    }

    #[test]
    fn test_mixed_cart_totals_rederive() {
        let mut cart = Cart::new();
        let a = test_product("a", 5000, 2000, false);
        let b = test_product("b", 1200, 1000, true);

        cart.add_item(&a, 2).unwrap(); // 10000 + 2000 VAT
        cart.add_item(&b, 3).unwrap(); // 3600 gross, 327 VAT inside

        assert_eq!(cart.subtotal().kurus(), 13_600);
        assert_eq!(cart.vat_total().kurus(), 2000 + 327);
        assert_eq!(cart.net().kurus(), 12_000 + 3_600);

        // Removing a line re-derives everything
        cart.remove_item("a").unwrap();
        assert_eq!(cart.subtotal().kurus(), 3_600);
        assert_eq!(cart.net().kurus(), 3_600);
    }
}
