use crate::feedback::RoutingError;
use crate::framework::RoutingSystem;
use educe::Educe;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::collections::BTreeMap;

/// Ports whose links are up, with the cost of each link. A port is either present or down.
#[serde_as]
#[derive(Educe, Serialize, Deserialize)]
#[educe(Default(bound()))]
#[serde(bound = "")]
pub struct PortSet<T: RoutingSystem + ?Sized> {
    #[serde_as(as = "Vec<(_, _)>")]
    links: BTreeMap<T::Port, u32>,
}

impl<T: RoutingSystem + ?Sized> PortSet<T> {
    pub fn new() -> Self {
        Self {
            links: BTreeMap::new(),
        }
    }

    /// returns the previous link cost if the port was already up
    pub fn add(&mut self, port: T::Port, latency: u32) -> Option<u32> {
        self.links.insert(port, latency)
    }

    pub fn remove(&mut self, port: &T::Port) -> Option<u32> {
        self.links.remove(port)
    }

    pub fn latency_of(&self, port: &T::Port) -> Result<u32, RoutingError<T>> {
        self.links
            .get(port)
            .copied()
            .ok_or_else(|| RoutingError::UnknownPort { port: port.clone() })
    }

    /// Snapshot of the ports that are currently up, in port order
    pub fn all_ports(&self) -> Vec<T::Port> {
        self.links.keys().cloned().collect()
    }
}
