use crate::concepts::route::Metric;
use crate::framework::RoutingSystem;
use educe::Educe;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::collections::HashMap;

/// Last latency advertised for each destination, per port. Only used to suppress repeated advertisements.
#[serde_as]
#[derive(Educe, Serialize, Deserialize)]
#[educe(Default(bound()))]
#[serde(bound = "")]
pub struct AdvertisementHistory<T: RoutingSystem + ?Sized> {
    #[serde_as(as = "Vec<(_, Vec<(_, _)>)>")]
    sent: HashMap<T::Port, HashMap<T::HostAddress, Metric>>,
}

impl<T: RoutingSystem + ?Sized> AdvertisementHistory<T> {
    pub fn new() -> Self {
        Self {
            sent: HashMap::new(),
        }
    }

    pub fn last_sent(&self, port: &T::Port, dst: &T::HostAddress) -> Option<Metric> {
        self.sent.get(port).and_then(|dsts| dsts.get(dst)).copied()
    }

    pub fn record(&mut self, port: T::Port, dst: T::HostAddress, latency: Metric) {
        self.sent.entry(port).or_default().insert(dst, latency);
    }

    /// forgets everything advertised on a port
    pub fn clear_port(&mut self, port: &T::Port) {
        self.sent.remove(port);
    }
}
