//! # Analytics Aggregation Engine
//!
//! Derives time-bucketed sales views from one tenant's order history.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  orders (one tenant) ──► filter created_at >= period cutoff             │
//! │                                   │                                     │
//! │                          single pass over the window                    │
//! │        ┌──────────────┬───────────┼────────────┬──────────────┐         │
//! │        ▼              ▼           ▼            ▼              ▼         │
//! │   sales trend    status       revenue      top products   conversion    │
//! │   (per day)      breakdown    trend        (by product)   rate          │
//! │                               (day | week)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Revenue Rules
//! | View              | Which orders contribute `total` to revenue        |
//! |-------------------|---------------------------------------------------|
//! | sales trend       | every order in the window                         |
//! | revenue trend     | every order in the window                         |
//! | status breakdown  | `delivered` only (other statuses report 0)        |
//! | top products      | every order, regardless of status                 |
//!
//! The breakdown measures recognised revenue while top products measures
//! demand. Keep the two rules different.
//!
//! ## Bucketing
//! Day boundaries are UTC calendar days. Weeks start on Sunday: an order
//! on Wednesday 2024-03-13 lands in the bucket dated Sunday 2024-03-10.
//! Empty days and weeks are not filled in.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{Money, Percent};
use crate::types::{Order, OrderStatus};
use crate::{TOP_PRODUCTS_LIMIT, UNKNOWN_PRODUCT_LABEL};

// =============================================================================
// Period
// =============================================================================

/// Reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Period {
    #[serde(rename = "7d")]
    Last7Days,
    #[default]
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
    #[serde(rename = "all")]
    AllTime,
}

impl Period {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Period::Last7Days => "7d",
            Period::Last30Days => "30d",
            Period::Last90Days => "90d",
            Period::AllTime => "all",
        }
    }

    /// Window length in days, `None` for all time.
    pub const fn days(&self) -> Option<i64> {
        match self {
            Period::Last7Days => Some(7),
            Period::Last30Days => Some(30),
            Period::Last90Days => Some(90),
            Period::AllTime => None,
        }
    }

    /// Earliest `created_at` included in the window (`now − N days`).
    ///
    /// `None` means no lower bound.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.days().map(|d| now - Duration::days(d))
    }

    /// Parses an optional query parameter; absent means 30 days.
    pub fn from_query(raw: Option<&str>) -> Result<Period, ValidationError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => s.parse(),
            None => Ok(Period::default()),
        }
    }

    /// Short windows read better daily, long windows weekly.
    #[inline]
    pub const fn revenue_granularity(&self) -> Granularity {
        match self {
            Period::Last7Days => Granularity::Day,
            _ => Granularity::Week,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "7d" => Ok(Period::Last7Days),
            "30d" => Ok(Period::Last30Days),
            "90d" => Ok(Period::Last90Days),
            "all" => Ok(Period::AllTime),
            _ => Err(ValidationError::NotAllowed {
                field: "period".to_string(),
                allowed: vec!["7d".into(), "30d".into(), "90d".into(), "all".into()],
            }),
        }
    }
}

/// Trend bucket size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
}

impl Granularity {
    /// Returns the bucket key (start date) for a timestamp.
    pub fn bucket(&self, at: DateTime<Utc>) -> NaiveDate {
        let day = at.date_naive();
        match self {
            Granularity::Day => day,
            Granularity::Week => {
                day - Duration::days(i64::from(day.weekday().num_days_from_sunday()))
            }
        }
    }
}

// =============================================================================
// Report
// =============================================================================

/// One bucket of a sales or revenue trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Bucket start (day, or the Sunday that opens the week).
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[serde(with = "crate::money::fixed2")]
    #[ts(type = "string")]
    pub revenue: Money,
    pub orders: u64,
}

/// Count and recognised revenue for one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub status: OrderStatus,
    pub count: u64,
    /// Zero unless `status` is `delivered`.
    #[serde(with = "crate::money::fixed2")]
    #[ts(type = "string")]
    pub revenue: Money,
}

/// One entry of the top products ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_id: String,
    /// Current catalog name, or a placeholder if the product is gone.
    pub name: String,
    pub orders: u64,
    /// All statuses count here.
    #[serde(with = "crate::money::fixed2")]
    #[ts(type = "string")]
    pub revenue: Money,
}

/// The five analytics views for one tenant and period.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub period: Period,
    pub total_orders: u64,
    pub sales_trend: Vec<TrendPoint>,
    pub status_breakdown: Vec<StatusBreakdown>,
    pub revenue_granularity: Granularity,
    pub revenue_trend: Vec<TrendPoint>,
    pub top_products: Vec<TopProduct>,
    /// Delivered share of the window's orders, in percent.
    #[ts(type = "number")]
    pub conversion_rate: Percent,
}

#[derive(Default)]
struct Bucket {
    revenue: Money,
    orders: u64,
}

impl Bucket {
    fn add(&mut self, revenue: Money) {
        self.revenue += revenue;
        self.orders += 1;
    }
}

fn into_points(buckets: BTreeMap<NaiveDate, Bucket>) -> Vec<TrendPoint> {
    buckets
        .into_iter()
        .map(|(date, b)| TrendPoint {
            date,
            revenue: b.revenue,
            orders: b.orders,
        })
        .collect()
}

/// Builds the report from a tenant's orders.
///
/// Orders created before the period's cutoff are ignored, so the caller
/// may pass a superset. `product_name` resolves current catalog names for
/// the top products; `None` yields the placeholder label.
///
/// ```rust
/// use chrono::Utc;
/// use storefront_core::analytics::{build_report, Period};
///
/// let report = build_report(&[], Period::Last30Days, Utc::now(), |_| None);
/// assert_eq!(report.total_orders, 0);
/// assert_eq!(report.conversion_rate.bps(), 0);
/// ```
pub fn build_report<F>(orders: &[Order], period: Period, now: DateTime<Utc>, product_name: F) -> AnalyticsReport
where
    F: Fn(&str) -> Option<String>,
{
    let cutoff = period.cutoff(now);
    let granularity = period.revenue_granularity();

    let mut total_orders = 0u64;
    let mut delivered = 0u64;
    let mut sales: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();
    let mut revenue: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();
    let mut statuses: BTreeMap<OrderStatus, Bucket> = BTreeMap::new();
    let mut products: HashMap<&str, Bucket> = HashMap::new();

    for order in orders.iter().filter(|o| cutoff.map_or(true, |c| o.created_at >= c)) {
        let total = order.total();
        total_orders += 1;

        sales.entry(Granularity::Day.bucket(order.created_at)).or_default().add(total);
        revenue.entry(granularity.bucket(order.created_at)).or_default().add(total);

        let recognised = if order.status.recognizes_revenue() {
            delivered += 1;
            total
        } else {
            Money::zero()
        };
        statuses.entry(order.status).or_default().add(recognised);

        products.entry(order.product_id.as_str()).or_default().add(total);
    }

    let status_breakdown = statuses
        .into_iter()
        .map(|(status, b)| StatusBreakdown {
            status,
            count: b.orders,
            revenue: b.revenue,
        })
        .collect();

    let mut ranked: Vec<(&str, Bucket)> = products.into_iter().collect();
    ranked.sort_by(|(a_id, a), (b_id, b)| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| b.orders.cmp(&a.orders))
            .then_with(|| a_id.cmp(b_id))
    });
    ranked.truncate(TOP_PRODUCTS_LIMIT);

    let top_products = ranked
        .into_iter()
        .map(|(id, b)| TopProduct {
            product_id: id.to_string(),
            name: product_name(id).unwrap_or_else(|| UNKNOWN_PRODUCT_LABEL.to_string()),
            orders: b.orders,
            revenue: b.revenue,
        })
        .collect();

    AnalyticsReport {
        period,
        total_orders,
        sales_trend: into_points(sales),
        status_breakdown,
        revenue_granularity: granularity,
        revenue_trend: into_points(revenue),
        top_products,
        conversion_rate: Percent::from_ratio(delivered, total_orders),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
