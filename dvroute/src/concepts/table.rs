use crate::concepts::route::Route;
use crate::framework::RoutingSystem;
use educe::Educe;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::collections::BTreeMap;

/// Best known route per destination, at most one each. Iterates in destination order.
#[serde_as]
#[derive(Educe, Serialize, Deserialize)]
#[educe(Default(bound()))]
#[serde(bound = "")]
pub struct RoutingTable<T: RoutingSystem + ?Sized> {
    #[serde_as(as = "Vec<(_, _)>")]
    routes: BTreeMap<T::HostAddress, Route<T>>,
}

impl<T: RoutingSystem + ?Sized> RoutingTable<T> {
    pub fn new() -> Self {
        Self {
            routes: BTreeMap::new(),
        }
    }

    pub fn lookup(&self, dst: &T::HostAddress) -> Option<&Route<T>> {
        self.routes.get(dst)
    }

    /// replaces the existing route to `dst`, if any
    pub fn upsert(&mut self, dst: T::HostAddress, route: Route<T>) -> Option<Route<T>> {
        self.routes.insert(dst, route)
    }

    pub fn remove(&mut self, dst: &T::HostAddress) -> Option<Route<T>> {
        self.routes.remove(dst)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T::HostAddress, &Route<T>)> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concepts::route::{Expiry, Metric};
    use crate::testing::TestSystem;

    fn route(dst: &str, port: u32, cost: u32) -> Route<TestSystem> {
        Route {
            destination: dst.to_string(),
            port,
            latency: Metric::Finite(cost),
            expiry: Expiry::Never,
        }
    }

    #[test]
    fn upsert_replaces() {
        let mut table = RoutingTable::<TestSystem>::new();
        assert!(table.upsert("h1".to_string(), route("h1", 1, 4)).is_none());
        let old = table.upsert("h1".to_string(), route("h1", 2, 3));
        assert_eq!(old.map(|r| r.port), Some(1));
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(&"h1".to_string()).map(|r| r.port), Some(2));
    }

    #[test]
    fn remove_missing_is_none() {
        let mut table = RoutingTable::<TestSystem>::new();
        table.upsert("h1".to_string(), route("h1", 1, 4));
        assert!(table.remove(&"h2".to_string()).is_none());
        assert!(table.remove(&"h1".to_string()).is_some());
        assert!(table.is_empty());
    }
}
