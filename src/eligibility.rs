//! Order eligibility.
//!
//! A profile may place an order while it has placed fewer orders than its limit and its
//! ordering window (if any) has not closed. Every caller (dashboards, catalog, and the
//! `place_order` transaction) goes through [`check`].

use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    models::{EligibilityReport, Profile},
};

/// Order limit applied when a profile's `user_limit` is null.
pub const DEFAULT_USER_LIMIT: i32 = 5;

/// OrderLimits
///
/// The two gating scalars of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrderLimits {
    pub user_limit: Option<i32>,
    pub order_time_limit: Option<DateTime<Utc>>,
}

impl From<&Profile> for OrderLimits {
    fn from(profile: &Profile) -> Self {
        Self {
            user_limit: profile.user_limit,
            order_time_limit: profile.order_time_limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Eligibility {
    Eligible,
    LimitReached { limit: i32 },
    TimeLimitExpired { expired_at: DateTime<Utc> },
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }

    /// Converts a rejection into the error returned to the client.
    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            Eligibility::Eligible => Ok(()),
            Eligibility::LimitReached { limit } => Err(AppError::OrderLimitReached { limit }),
            Eligibility::TimeLimitExpired { expired_at } => {
                Err(AppError::OrderWindowExpired { expired_at })
            }
        }
    }

    pub fn reason(&self) -> Option<String> {
        match self {
            Eligibility::Eligible => None,
            Eligibility::LimitReached { limit } => {
                Some(format!("You have reached your order limit of {}", limit))
            }
            Eligibility::TimeLimitExpired { expired_at } => Some(format!(
                "Your ordering window closed at {}",
                expired_at.to_rfc3339()
            )),
        }
    }
}

pub fn effective_limit(user_limit: Option<i32>) -> i32 {
    user_limit.unwrap_or(DEFAULT_USER_LIMIT)
}

/// check
///
/// eligible ⇔ `orders_placed < limit` and (`order_time_limit` is null or `>= now`).
/// An expired window is reported ahead of an exhausted limit.
pub fn check(limits: OrderLimits, orders_placed: i64, now: DateTime<Utc>) -> Eligibility {
    if let Some(expired_at) = limits.order_time_limit {
        if expired_at < now {
            return Eligibility::TimeLimitExpired { expired_at };
        }
    }

    let limit = effective_limit(limits.user_limit);
    if orders_placed >= i64::from(limit) {
        return Eligibility::LimitReached { limit };
    }

    Eligibility::Eligible
}

/// Remaining orders, or 0 when the profile cannot order at all.
pub fn orders_left(limits: OrderLimits, orders_placed: i64, now: DateTime<Utc>) -> i64 {
    if check(limits, orders_placed, now).is_eligible() {
        i64::from(effective_limit(limits.user_limit)) - orders_placed
    } else {
        0
    }
}

pub fn report(profile: &Profile, orders_placed: i64, now: DateTime<Utc>) -> EligibilityReport {
    let limits = OrderLimits::from(profile);
    let outcome = check(limits, orders_placed, now);

    EligibilityReport {
        can_order: outcome.is_eligible(),
        orders_placed,
        user_limit: effective_limit(limits.user_limit),
        orders_left: orders_left(limits, orders_placed, now),
        order_time_limit: limits.order_time_limit,
        reason: outcome.reason(),
    }
}
