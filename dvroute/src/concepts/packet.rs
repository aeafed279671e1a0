use crate::concepts::route::Metric;
use crate::framework::RoutingSystem;
use educe::Educe;
use serde::{Deserialize, Serialize};

#[derive(Educe, Serialize, Deserialize)]
#[educe(Clone(bound()), Debug(bound()))]
#[serde(bound = "")]
pub enum Packet<T: RoutingSystem + ?Sized> {
    /// user traffic, forwarded along the table
    Data(T::Packet),
    /// a single route advertisement for one destination
    RouteAdvertisement(RouteUpdate<T>),
}

#[derive(Educe, Serialize, Deserialize)]
#[educe(Clone(bound()), Debug(bound()))]
#[serde(bound = "")]
pub struct RouteUpdate<T: RoutingSystem + ?Sized> {
    pub destination: T::HostAddress,
    /// always clamped, never above INFINITY
    pub latency: Metric,
}

#[derive(Educe, Serialize, Deserialize)]
#[educe(Clone(bound()), Debug(bound()))]
#[serde(bound = "")]
pub struct OutboundPacket<T: RoutingSystem + ?Sized> {
    /// send out of this port
    pub port: T::Port,
    pub packet: Packet<T>,
}
