use crate::framework::RoutingSystem;
use crate::router::INFINITY;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Path cost to a destination
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Metric {
    /// may exceed INFINITY inside the table, see `clamp`
    Finite(u32),
    Unreachable,
}

impl Metric {
    /// numeric cost, `Unreachable` counts as INFINITY
    pub fn cost(&self) -> u32 {
        match self {
            Metric::Finite(cost) => *cost,
            Metric::Unreachable => INFINITY,
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.cost() < INFINITY
    }

    /// Caps the cost at the advertised ceiling
    pub fn clamp(self) -> Metric {
        if self.is_reachable() {
            self
        } else {
            Metric::Unreachable
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Expiry {
    /// time since the router clock's epoch
    At(Duration),
    /// static, directly attached routes
    Never,
}

impl Expiry {
    pub fn has_passed(&self, now: Duration) -> bool {
        match self {
            Expiry::At(at) => *at < now,
            Expiry::Never => false,
        }
    }
}

#[derive(Educe, Serialize, Deserialize)]
#[educe(Clone(bound()), Debug(bound()))]
#[serde(bound = "")]
pub struct Route<T: RoutingSystem + ?Sized> {
    pub destination: T::HostAddress,
    /// the port leading to the next hop
    pub port: T::Port,
    pub latency: Metric,
    pub expiry: Expiry,
}
