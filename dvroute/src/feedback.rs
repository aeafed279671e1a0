use educe::Educe;
use thiserror::Error;
use crate::framework::RoutingSystem;

/// Configuration and precondition failures. Everything else the router absorbs as ordinary control flow.
#[derive(Error)]
#[derive(Educe)]
#[educe(Debug(bound()))]
pub enum RoutingError<T: RoutingSystem + ?Sized> {
    /// Split horizon and poison reverse were both enabled
    #[error("Split horizon and poison reverse can't both be on.")]
    ConflictingLoopAvoidance,
    /// A static route was bound to a port whose link is not up
    #[error("Link for port {port:?} should be up, but is not.")]
    LinkDown {
        port: T::Port
    },
    /// The port is not in the port set
    #[error("Port {port:?} is unknown.")]
    UnknownPort {
        port: T::Port
    },
}
