use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::feedback::RoutingError;

pub trait RoutingSystem {
    /// Identifier of a destination host, MUST be globally unique
    type HostAddress: Ord + PartialOrd + Debug + RootData + RootKey;
    /// Identifier of a local interface, only meaningful to this router
    type Port: Ord + PartialOrd + Debug + RootData + RootKey;
    /// The data packets this router forwards
    type Packet: DataPacket<Self>;
    /// Source of monotonic time used for route expiry
    type Clock: Clock;
    fn config() -> ProtocolParams {
        Default::default()
    }
}

pub trait RootData: Clone + Serialize + DeserializeOwned + Sized {}
pub trait RootKey: Eq + PartialEq + Hash {}
impl<T: Eq + PartialEq + Hash> RootKey for T {}
impl<T: Clone + Serialize + DeserializeOwned + Sized> RootData for T {}

pub trait DataPacket<T: RoutingSystem + ?Sized>: Debug + RootData {
    fn destination(&self) -> &T::HostAddress;
}

pub trait Clock {
    /// Monotonic time elapsed since the clock's epoch
    fn now(&self) -> Duration;
}

/// Resolved loop mitigation applied when advertising a route back out its own next-hop port
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum LoopAvoidance {
    /// Advertise the true latency back to the next hop
    None,
    /// Never advertise a route back out the port it was learned from
    SplitHorizon,
    /// Advertise the route back out its port as unreachable
    PoisonReverse,
}

/// Protocol parameters, fixed for the lifetime of a router
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolParams {
    /// how long a learned route lives without being refreshed
    pub route_ttl: Duration,
    /// how often the scheduler should call `Router::handle_timer`
    pub timer_interval: Duration,
    /// at most one of `split_horizon` and `poison_reverse` may be set
    pub split_horizon: bool,
    pub poison_reverse: bool,
    /// poison expired routes instead of dropping them
    pub poison_expired: bool,
    /// advertise the table to a port as soon as its link comes up
    pub send_on_link_up: bool,
    /// poison routes through a port when its link goes down instead of dropping them
    pub poison_on_link_down: bool,
    /// force a full advertisement on every timer tick
    pub advertise_on_timer: bool,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            route_ttl: Duration::from_secs(15),
            timer_interval: Duration::from_secs(5),
            split_horizon: false,
            poison_reverse: false,
            poison_expired: false,
            send_on_link_up: false,
            poison_on_link_down: false,
            advertise_on_timer: true,
        }
    }
}

impl ProtocolParams {
    pub fn validate<T: RoutingSystem + ?Sized>(&self) -> Result<LoopAvoidance, RoutingError<T>> {
        match (self.split_horizon, self.poison_reverse) {
            (true, true) => Err(RoutingError::ConflictingLoopAvoidance),
            (true, false) => Ok(LoopAvoidance::SplitHorizon),
            (false, true) => Ok(LoopAvoidance::PoisonReverse),
            (false, false) => Ok(LoopAvoidance::None),
        }
    }
}
