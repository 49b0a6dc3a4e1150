//! # Plan Resource Governor
//!
//! Evaluates a tenant's plan against an attempted action before it reaches
//! persistence.
//!
//! ```text
//! ┌───────────────────┬───────────────────────────────┬──────────────────┐
//! │ Action            │ Check                         │ Failure          │
//! ├───────────────────┼───────────────────────────────┼──────────────────┤
//! │ create product    │ owned_count < product_limit   │ LimitExceeded    │
//! │ add custom domain │ custom_domain_allowed         │ Forbidden        │
//! │ set tracking ids  │ tracking_allowed              │ Forbidden        │
//! └───────────────────┴───────────────────────────────┴──────────────────┘
//! ```
//!
//! Checks read the plan as it is *now*: reassigning a plan takes effect on
//! the next check and never deletes data already over the new limit.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, PlanFeature, ValidationError};
use crate::types::Plan;
use crate::validation::{validate_name, validate_non_negative_cents, validate_slug};
use crate::{DEFAULT_PLAN_CODE, DEFAULT_PLAN_PRODUCT_LIMIT};

/// Plan checks for one tenant.
#[derive(Debug, Clone, Copy)]
pub struct PlanGovernor<'a> {
    plan: &'a Plan,
}

impl<'a> PlanGovernor<'a> {
    pub fn new(plan: &'a Plan) -> Self {
        Self { plan }
    }

    /// Returns true if a tenant owning `current_count` products may add one more.
    #[inline]
    pub fn can_create_product(&self, current_count: i64) -> bool {
        current_count < self.plan.product_limit
    }

    #[inline]
    pub fn can_use_custom_domain(&self) -> bool {
        self.plan.custom_domain_allowed
    }

    #[inline]
    pub fn can_use_tracking(&self) -> bool {
        self.plan.tracking_allowed
    }

    /// Fails with `ProductLimitReached` carrying the plan's limit.
    pub fn check_product_creation(&self, current_count: i64) -> CoreResult<()> {
        if self.can_create_product(current_count) {
            Ok(())
        } else {
            Err(CoreError::ProductLimitReached {
                limit: self.plan.product_limit,
            })
        }
    }

    pub fn require_custom_domain(&self) -> CoreResult<()> {
        self.require(PlanFeature::CustomDomain, self.can_use_custom_domain())
    }

    pub fn require_tracking(&self) -> CoreResult<()> {
        self.require(PlanFeature::Tracking, self.can_use_tracking())
    }

    fn require(&self, feature: PlanFeature, allowed: bool) -> CoreResult<()> {
        if allowed {
            Ok(())
        } else {
            Err(CoreError::FeatureNotAllowed {
                feature,
                plan: self.plan.name.clone(),
            })
        }
    }
}

/// Field values for a new or edited plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDraft {
    pub code: String,
    pub name: String,
    pub product_limit: i64,
    pub custom_domain_allowed: bool,
    pub tracking_allowed: bool,
    pub monthly_price_cents: i64,
    pub is_active: bool,
}

impl PlanDraft {
    /// The plan registration creates when no active plan exists.
    ///
    /// 5 products, tracking allowed, no custom domain, free.
    pub fn free_tier() -> Self {
        Self {
            code: DEFAULT_PLAN_CODE.to_string(),
            name: "Free".to_string(),
            product_limit: DEFAULT_PLAN_PRODUCT_LIMIT,
            custom_domain_allowed: false,
            tracking_allowed: true,
            monthly_price_cents: 0,
            is_active: true,
        }
    }

    /// Checks field formats and returns the draft with a trimmed name.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        validate_slug(&self.code)?;
        self.name = validate_name("plan name", &self.name)?;
        if self.product_limit < 0 {
            return Err(ValidationError::OutOfRange {
                field: "product limit".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
        validate_non_negative_cents("monthly price", self.monthly_price_cents)?;
        Ok(self)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn plan(limit: i64, custom_domain: bool, tracking: bool) -> Plan {
        Plan {
            id: "plan-1".into(),
            code: "basic".into(),
            name: "Basic".into(),
            product_limit: limit,
            custom_domain_allowed: custom_domain,
            tracking_allowed: tracking,
            monthly_price_cents: 50_000,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_sixth_product_on_five_limit_is_rejected() {
        let plan = plan(5, false, true);
        let governor = PlanGovernor::new(&plan);

        assert!(governor.can_create_product(4));
        assert!(governor.check_product_creation(4).is_ok());

        let err = governor.check_product_creation(5).unwrap_err();
        assert_eq!(err.to_string(), "product limit reached (5)");
    }

    #[test]
    fn test_over_limit_tenant_stays_blocked_after_downgrade() {
        let plan = plan(3, false, false);
        assert!(!PlanGovernor::new(&plan).can_create_product(7));
    }

    #[test]
    fn test_feature_flags() {
        let plan = plan(5, false, true);
        let governor = PlanGovernor::new(&plan);

        assert!(governor.require_tracking().is_ok());
        let err = governor.require_custom_domain().unwrap_err();
        assert_eq!(err.to_string(), "custom domain is not available on the Basic plan");

        let plan = plan_with_domain();
        assert!(PlanGovernor::new(&plan).require_custom_domain().is_ok());
    }

    fn plan_with_domain() -> Plan {
        plan(100, true, true)
    }

    #[test]
    fn test_free_tier_defaults() {
        let free = PlanDraft::free_tier();
        assert_eq!(free.code, "free");
        assert_eq!(free.product_limit, 5);
        assert!(free.tracking_allowed);
        assert!(!free.custom_domain_allowed);
        assert_eq!(free.monthly_price_cents, 0);
        assert!(free.is_active);
        assert!(free.validate().is_ok());
    }

    #[test]
    fn test_draft_validation() {
        let mut draft = PlanDraft::free_tier();
        draft.product_limit = -1;
        assert!(draft.validate().is_err());

        let mut draft = PlanDraft::free_tier();
        draft.code = "Pro Plan".into();
        assert!(draft.validate().is_err());

        let mut draft = PlanDraft::free_tier();
        draft.name = "  Pro  ".into();
        assert_eq!(draft.validate().unwrap().name, "Pro");
    }
}
