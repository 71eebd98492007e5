/// Order value types
///
/// An order's priority class is fixed when it enters the queue. The two
/// flags a caller submits (`is_vip`, `is_express`) are folded into a single
/// [`Tier`] so comparisons never have to re-derive precedence.

use serde::{Deserialize, Serialize};

/// 订单优先级，按声明顺序排列：VIP < Express < Normal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    Vip,
    Express,
    Normal,
}

impl Tier {
    /// Classifies a submission. VIP wins when both flags are set.
    pub fn classify(is_vip: bool, is_express: bool) -> Self {
        if is_vip {
            Tier::Vip
        } else if is_express {
            Tier::Express
        } else {
            Tier::Normal
        }
    }

    /// Whether orders of this tier are kept sorted by prep time.
    ///
    /// Express orders form a plain arrival-order run.
    #[inline]
    pub fn sorts_by_prep_time(self) -> bool {
        !matches!(self, Tier::Express)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Vip => "vip",
            Tier::Express => "express",
            Tier::Normal => "normal",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 新订单请求，由调度器或 HTTP 接口构造
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderRequest {
    pub id: i64,
    pub items: String,
    pub prep_time: u32,
    pub is_express: bool,
}

impl NewOrderRequest {
    pub fn new(id: i64, items: impl Into<String>, prep_time: u32, is_express: bool) -> Self {
        Self {
            id,
            items: items.into(),
            prep_time,
            is_express,
        }
    }
}

/// An order held by the kitchen queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: i64,
    pub items: String,
    pub tier: Tier,
    /// Express flag exactly as submitted. Only echoed back to clients,
    /// ordering always goes through `tier`.
    pub is_express: bool,
    pub prep_time: u32,
}

impl Order {
    pub fn from_request(request: NewOrderRequest, is_vip: bool) -> Self {
        Order {
            id: request.id,
            tier: Tier::classify(is_vip, request.is_express),
            items: request.items,
            is_express: request.is_express,
            prep_time: request.prep_time,
        }
    }

    #[inline]
    pub fn is_vip(&self) -> bool {
        self.tier == Tier::Vip
    }

    /// Returns true if `incoming` belongs somewhere after `self` in the queue.
    ///
    /// Lower tiers always go after higher ones. Inside a tier the newcomer
    /// passes every order with prep time <= its own, which keeps equal keys
    /// in arrival order; express orders pass every other express order.
    #[inline]
    pub fn is_passed_by(&self, incoming: &Order) -> bool {
        match self.tier.cmp(&incoming.tier) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => {
                !incoming.tier.sorts_by_prep_time() || self.prep_time <= incoming.prep_time
            }
        }
    }
}
