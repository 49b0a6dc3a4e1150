//! # Order Ledger Rules
//!
//! Checkout validation, order pricing and the order status machine.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        place_order (fail-fast)                          │
//! │                                                                         │
//! │  1. store slug ──► active tenant?              ✗ NotFound               │
//! │  2. CheckoutRequest::validate                  ✗ InvalidInput           │
//! │  3. product owned + active?                    ✗ NotFound               │
//! │  4. shipping class owned?                      ✗ InvalidShippingOption  │
//! │  5. price_order(unit, qty, fee)                ✗ InvalidInput (overflow)│
//! │  6. insert with status `new`                                            │
//! │  7. notify (fire-and-forget)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Steps 1, 3, 4, 6 and 7 need I/O and live in the service layer; this
//! module provides steps 2 and 5 and the order record itself.
//!
//! ## Status Machine
//! ```text
//! new ──► confirmed ──► shipped ──► delivered
//!  │          │            │            │
//!  └──────────┴────────────┴────────────┴──► cancelled
//! ```
//! Re-writing the current status is a no-op and always allowed. Everything
//! else outside the table is rejected under [`OrderStatusPolicy::Strict`];
//! [`OrderStatusPolicy::Permissive`] accepts any write for manual
//! corrections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{new_id, Money};
use crate::types::{Order, OrderStatus, Product, ShippingClass, Variant};
use crate::validation::{normalize_phone, validate_address, validate_customer_name, validate_quantity};

// =============================================================================
// Checkout Request
// =============================================================================

/// A checkout form as submitted on the public storefront.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub product_id: String,
    #[serde(default)]
    pub variant_id: Option<String>,
    pub shipping_class_id: String,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub quantity: i64,
}

/// Customer fields after validation and normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub customer_name: String,
    /// Local format, country code stripped.
    pub phone: String,
    pub address: String,
    pub quantity: i64,
}

impl CheckoutRequest {
    /// Validates the customer-supplied fields.
    ///
    /// Order of checks: name, phone, address, quantity. The first failure
    /// is returned.
    pub fn validate(&self, min_address_len: usize) -> Result<CustomerDetails, ValidationError> {
        let customer_name = validate_customer_name(&self.customer_name)?;
        let phone = normalize_phone(&self.phone)?;
        let address = validate_address(&self.address, min_address_len)?;
        validate_quantity(self.quantity)?;

        Ok(CustomerDetails {
            customer_name,
            phone,
            address,
            quantity: self.quantity,
        })
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// The three computed amounts of an order plus the unit price they came from.
///
/// ## Invariants
/// - `subtotal == unit_price × quantity`
/// - `total == subtotal + shipping_fee`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderPricing {
    pub unit_price: Money,
    pub quantity: i64,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total: Money,
}

/// Prices an order line.
///
/// ```rust
/// use storefront_core::order::price_order;
/// use storefront_core::Money;
///
/// let pricing = price_order(Money::parse("500.00").unwrap(), 2, Money::parse("60.00").unwrap()).unwrap();
/// assert_eq!(pricing.subtotal.to_fixed2(), "1000.00");
/// assert_eq!(pricing.total.to_fixed2(), "1060.00");
/// ```
pub fn price_order(unit_price: Money, quantity: i64, shipping_fee: Money) -> CoreResult<OrderPricing> {
    validate_quantity(quantity)?;

    let overflow = || ValidationError::InvalidFormat {
        field: "quantity".to_string(),
        reason: "order amount is too large".to_string(),
    };

    let subtotal = unit_price.checked_mul_quantity(quantity).ok_or_else(overflow)?;
    let total = subtotal.checked_add(shipping_fee).ok_or_else(overflow)?;

    Ok(OrderPricing {
        unit_price,
        quantity,
        subtotal,
        shipping_fee,
        total,
    })
}

/// Picks the unit price and the variant id to store on the order.
///
/// A variant is only honoured if it belongs to `product`; otherwise the
/// product price is used and no variant is recorded.
pub fn resolve_unit_price(product: &Product, variant: Option<&Variant>) -> (Money, Option<String>) {
    match variant {
        Some(v) if v.product_id == product.id => (v.unit_price(product), Some(v.id.clone())),
        _ => (product.price(), None),
    }
}

impl Order {
    /// Builds a new ledger entry with status `new`.
    ///
    /// The amounts are copied from `pricing` and never recomputed.
    pub fn place(
        product: &Product,
        variant_id: Option<String>,
        shipping: &ShippingClass,
        customer: CustomerDetails,
        pricing: OrderPricing,
        now: DateTime<Utc>,
    ) -> Order {
        Order {
            id: new_id(),
            tenant_id: product.tenant_id.clone(),
            product_id: product.id.clone(),
            variant_id,
            shipping_class_id: shipping.id.clone(),
            customer_name: customer.customer_name,
            phone: customer.phone,
            address: customer.address,
            quantity: pricing.quantity,
            unit_price_cents: pricing.unit_price.cents(),
            subtotal_cents: pricing.subtotal.cents(),
            shipping_fee_cents: pricing.shipping_fee.cents(),
            total_cents: pricing.total.cents(),
            status: OrderStatus::New,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Status Machine
// =============================================================================

impl OrderStatus {
    /// Returns true if the transition table allows `self → next`.
    pub const fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (*self, next),
            (New, Confirmed) | (Confirmed, Shipped) | (Shipped, Delivered) | (_, Cancelled)
        )
    }
}

/// How strictly status writes follow the transition table.
///
/// `Strict` is the default. `Permissive` restores the unconditional write
/// (any status to any status) for stores that correct orders by hand; set
/// `ORDER_STATUS_POLICY=permissive` to select it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusPolicy {
    /// Only table transitions and same-status writes.
    #[default]
    Strict,
    /// Any status may be written (manual correction workflows).
    Permissive,
}

impl OrderStatusPolicy {
    /// Checks a single status write.
    pub fn check(&self, from: OrderStatus, to: OrderStatus) -> CoreResult<()> {
        match self {
            OrderStatusPolicy::Permissive => Ok(()),
            OrderStatusPolicy::Strict if from == to || from.can_transition_to(to) => Ok(()),
            OrderStatusPolicy::Strict => Err(CoreError::InvalidStatusTransition { from, to }),
        }
    }

    /// Checks every current status of a batch; the first illegal one fails
    /// the whole batch.
    pub fn check_all<I>(&self, current: I, to: OrderStatus) -> CoreResult<()>
    where
        I: IntoIterator<Item = OrderStatus>,
    {
        current.into_iter().try_for_each(|from| self.check(from, to))
    }
}

impl fmt::Display for OrderStatusPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatusPolicy::Strict => write!(f, "strict"),
            OrderStatusPolicy::Permissive => write!(f, "permissive"),
        }
    }
}

impl FromStr for OrderStatusPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(OrderStatusPolicy::Strict),
            "permissive" => Ok(OrderStatusPolicy::Permissive),
            _ => Err(ValidationError::NotAllowed {
                field: "order status policy".to_string(),
                allowed: vec!["strict".to_string(), "permissive".to_string()],
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProductStatus, VariantAttributes};
    use crate::{DEFAULT_MIN_ADDRESS_LENGTH, MAX_ORDER_QUANTITY};

    fn money(s: &str) -> Money {
        Money::parse(s).unwrap()
    }

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            product_id: "p1".into(),
            variant_id: None,
            shipping_class_id: "s1".into(),
            customer_name: "  Karim Uddin ".into(),
            phone: "+880 1712-345678".into(),
            address: "House 12, Road 5, Mirpur, Dhaka".into(),
            quantity: 2,
        }
    }

    fn product() -> Product {
        let now = Utc::now();
        Product {
            id: "p1".into(),
            tenant_id: "t1".into(),
            name: "Panjabi".into(),
            slug: "panjabi".into(),
            description: None,
            price_cents: 50_000,
            status: ProductStatus::Active,
            images: vec![],
            created_at: now,
            updated_at: now,
            variants: vec![],
        }
    }

    fn variant(product_id: &str, price_cents: Option<i64>) -> Variant {
        Variant {
            id: "v1".into(),
            product_id: product_id.into(),
            name: "XL".into(),
            sku: Some("PJ-XL".into()),
            price_cents,
            stock: 10,
            attributes: VariantAttributes::new(),
            is_default: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_checkout_happy_path_pricing() {
        let pricing = price_order(money("500.00"), 2, money("60.00")).unwrap();
        assert_eq!(pricing.subtotal.to_fixed2(), "1000.00");
        assert_eq!(pricing.shipping_fee.to_fixed2(), "60.00");
        assert_eq!(pricing.total.to_fixed2(), "1060.00");
    }

    #[test]
    fn test_repeating_decimal_price_is_exact() {
        let pricing = price_order(money("33.33"), 3, money("0")).unwrap();
        assert_eq!(pricing.subtotal.to_fixed2(), "99.99");
        assert_eq!(pricing.total.cents(), 9_999);
    }

    #[test]
    fn test_total_is_subtotal_plus_fee_across_quantities() {
        let unit = money("19.99");
        let fee = money("120.50");
        for qty in [1, 2, 7, 333, MAX_ORDER_QUANTITY] {
            let p = price_order(unit, qty, fee).unwrap();
            assert_eq!(p.subtotal.cents(), unit.cents() * qty);
            assert_eq!(p.total, p.subtotal + p.shipping_fee);
        }
    }

    #[test]
    fn test_pricing_rejects_bad_quantity_and_overflow() {
        assert!(price_order(money("10"), 0, money("0")).is_err());
        let huge = Money::from_cents(i64::MAX / 2);
        let err = price_order(huge, 3, money("0")).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_validate_normalises_customer_fields() {
        let details = request().validate(DEFAULT_MIN_ADDRESS_LENGTH).unwrap();
        assert_eq!(details.customer_name, "Karim Uddin");
        assert_eq!(details.phone, "01712345678");
        assert_eq!(details.quantity, 2);
    }

    #[test]
    fn test_validate_reports_which_field_failed() {
        let mut req = request();
        req.phone = "12345".into();
        let err = req.validate(DEFAULT_MIN_ADDRESS_LENGTH).unwrap_err();
        assert!(err.to_string().starts_with("phone"));

        let mut req = request();
        req.address = "Dhaka".into();
        let err = req.validate(DEFAULT_MIN_ADDRESS_LENGTH).unwrap_err();
        assert_eq!(err.to_string(), "address must be at least 10 characters");

        let mut req = request();
        req.quantity = 0;
        let err = req.validate(DEFAULT_MIN_ADDRESS_LENGTH).unwrap_err();
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_variant_price_override() {
        let product = product();

        let v = variant("p1", Some(55_000));
        let (unit, id) = resolve_unit_price(&product, Some(&v));
        assert_eq!(unit.cents(), 55_000);
        assert_eq!(id.as_deref(), Some("v1"));

        let v = variant("p1", None);
        let (unit, _) = resolve_unit_price(&product, Some(&v));
        assert_eq!(unit.cents(), 50_000);
    }

    #[test]
    fn test_variant_of_other_product_is_ignored() {
        let product = product();
        let v = variant("p2", Some(1));
        let (unit, id) = resolve_unit_price(&product, Some(&v));
        assert_eq!(unit.cents(), 50_000);
        assert!(id.is_none());
    }

    #[test]
    fn test_placed_order_snapshots_amounts() {
        let product = product();
        let shipping = ShippingClass {
            id: "s1".into(),
            tenant_id: "t1".into(),
            name: "Inside Dhaka".into(),
            fee_cents: 6_000,
            is_default: true,
            created_at: Utc::now(),
        };
        let details = request().validate(DEFAULT_MIN_ADDRESS_LENGTH).unwrap();
        let pricing = price_order(product.price(), details.quantity, shipping.fee()).unwrap();

        let order = Order::place(&product, None, &shipping, details, pricing, Utc::now());

        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.tenant_id, "t1");
        assert_eq!(order.unit_price_cents, 50_000);
        assert_eq!(order.subtotal_cents, 100_000);
        assert_eq!(order.shipping_fee_cents, 6_000);
        assert_eq!(order.total_cents, 106_000);
        assert_eq!(order.total().to_fixed2(), "1060.00");
    }

    #[test]
    fn test_strict_policy_transition_table() {
        use OrderStatus::*;
        let strict = OrderStatusPolicy::Strict;

        assert!(strict.check(New, Confirmed).is_ok());
        assert!(strict.check(Confirmed, Shipped).is_ok());
        assert!(strict.check(Shipped, Delivered).is_ok());
        for from in OrderStatus::ALL {
            assert!(strict.check(*from, Cancelled).is_ok());
            assert!(strict.check(*from, *from).is_ok());
        }

        assert!(strict.check(Delivered, New).is_err());
        assert!(strict.check(New, Delivered).is_err());
        assert!(strict.check(Cancelled, Confirmed).is_err());
    }

    #[test]
    fn test_permissive_policy_accepts_regressions() {
        let policy = OrderStatusPolicy::Permissive;
        assert!(policy.check(OrderStatus::Delivered, OrderStatus::New).is_ok());
        assert!(policy.check(OrderStatus::Cancelled, OrderStatus::Shipped).is_ok());
    }

    #[test]
    fn test_check_all_fails_on_one_illegal_row() {
        use OrderStatus::*;
        let strict = OrderStatusPolicy::Strict;
        assert!(strict.check_all([New, New, Confirmed], Confirmed).is_ok());

        let err = strict.check_all([New, Delivered], Confirmed).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidStatusTransition { from: Delivered, to: Confirmed }
        ));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("strict".parse::<OrderStatusPolicy>().unwrap(), OrderStatusPolicy::Strict);
        assert_eq!(" Permissive ".parse::<OrderStatusPolicy>().unwrap(), OrderStatusPolicy::Permissive);
        assert!("loose".parse::<OrderStatusPolicy>().is_err());
        assert_eq!(OrderStatusPolicy::default(), OrderStatusPolicy::Strict);
    }
}
