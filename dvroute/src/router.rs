use crate::concepts::history::AdvertisementHistory;
use crate::concepts::packet::{OutboundPacket, Packet, RouteUpdate};
use crate::concepts::ports::PortSet;
use crate::concepts::route::{Expiry, Metric, Route};
use crate::concepts::table::RoutingTable;
use crate::feedback::RoutingError;
use crate::framework::{Clock, DataPacket, LoopAvoidance, ProtocolParams, RoutingSystem};
use crate::util::sum_inf;
use log::{debug, warn};
use serde::Serialize;
use serde_json::json;

/// Cost ceiling, anything at or above this is unreachable
pub const INFINITY: u32 = 16;

#[derive(Serialize)]
#[serde(bound = "")]
pub struct Router<T: RoutingSystem + ?Sized> {
    table: RoutingTable<T>,
    ports: PortSet<T>,
    history: AdvertisementHistory<T>,
    /// packets and advertisements waiting to be sent by the environment
    pub outbound_packets: Vec<OutboundPacket<T>>,
    params: ProtocolParams,
    loop_avoidance: LoopAvoidance,
    #[serde(skip_serializing)]
    clock: T::Clock,
}

impl<T: RoutingSystem + ?Sized> Router<T> {
    pub fn new(params: ProtocolParams, clock: T::Clock) -> Result<Self, RoutingError<T>> {
        let loop_avoidance = params.validate::<T>()?;
        Ok(Self {
            table: RoutingTable::new(),
            ports: PortSet::new(),
            history: AdvertisementHistory::new(),
            outbound_packets: Vec::new(),
            params,
            loop_avoidance,
            clock,
        })
    }

    /// creates a router using the system's default parameters
    pub fn with_clock(clock: T::Clock) -> Result<Self, RoutingError<T>> {
        Self::new(T::config(), clock)
    }

    pub fn table(&self) -> &RoutingTable<T> {
        &self.table
    }

    pub fn ports(&self) -> &PortSet<T> {
        &self.ports
    }

    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    pub fn loop_avoidance(&self) -> LoopAvoidance {
        self.loop_avoidance
    }

    pub fn drain_outbound(&mut self) -> Vec<OutboundPacket<T>> {
        std::mem::take(&mut self.outbound_packets)
    }

    fn fresh_expiry(&self) -> Expiry {
        Expiry::At(self.clock.now() + self.params.route_ttl)
    }

    // region Interface
    fn send(&mut self, packet: T::Packet, port: T::Port) {
        self.outbound_packets.push(OutboundPacket {
            port,
            packet: Packet::Data(packet),
        });
    }

    fn send_route(&mut self, port: T::Port, destination: T::HostAddress, latency: Metric) {
        self.outbound_packets.push(OutboundPacket {
            port,
            packet: Packet::RouteAdvertisement(RouteUpdate { destination, latency }),
        });
    }
    // endregion

    /// Binds a directly attached host to a port that is already up. The route never expires.
    pub fn add_static_route(&mut self, host: T::HostAddress, port: T::Port) -> Result<(), RoutingError<T>> {
        let Ok(latency) = self.ports.latency_of(&port) else {
            return Err(RoutingError::LinkDown { port });
        };
        debug!("Static route to {} via port {}", json!(host), json!(port));
        self.table.upsert(
            host.clone(),
            Route {
                destination: host,
                port,
                latency: Metric::Finite(latency),
                expiry: Expiry::Never,
            },
        );
        Ok(())
    }

    /// handle a single inbound packet
    pub fn handle_packet(&mut self, packet: Packet<T>, in_port: &T::Port) {
        match packet {
            Packet::Data(data) => self.handle_data_packet(data, in_port),
            Packet::RouteAdvertisement(RouteUpdate { destination, latency }) => {
                self.handle_route_advertisement(destination, latency, in_port)
            }
        }
    }

    /// Forwards along the table, silently dropping packets without a reachable route
    pub fn handle_data_packet(&mut self, packet: T::Packet, in_port: &T::Port) {
        match self.table.lookup(packet.destination()) {
            Some(route) if route.latency.is_reachable() => {
                let port = route.port.clone();
                self.send(packet, port);
            }
            _ => {
                debug!(
                    "Dropped packet for {} from port {}, no route",
                    json!(packet.destination()),
                    json!(in_port)
                );
            }
        }
    }

    // region Route Selection

    /// Bellman-Ford update. The current next hop is always trusted, so regressions through it are accepted.
    pub fn handle_route_advertisement(&mut self, dst: T::HostAddress, latency: Metric, port: &T::Port) {
        let link_cost = match self.ports.latency_of(port) {
            Ok(cost) => cost,
            Err(err) => {
                warn!("Ignored advertisement for {}: {err}", json!(dst));
                return;
            }
        };
        let candidate = sum_inf(latency, link_cost);

        let changed = match self.table.lookup(&dst) {
            None => true,
            Some(existing) => {
                let current = existing.latency.cost();
                (candidate.cost() < current || existing.port == *port) && candidate.cost() != current
            }
        };
        if !changed {
            return;
        }

        debug!(
            "Route to {} via port {} with latency {}",
            json!(dst),
            json!(port),
            candidate.cost()
        );
        let expiry = self.fresh_expiry();
        self.table.upsert(
            dst.clone(),
            Route {
                destination: dst,
                port: port.clone(),
                latency: candidate,
                expiry,
            },
        );
        self.send_routes(false, None);
    }
    // endregion

    /// Advertises the table to every port, or only `single_port`. Unless forced, only values that differ
    /// from what was last advertised on a port are sent.
    pub fn send_routes(&mut self, force: bool, single_port: Option<&T::Port>) {
        let targets = match single_port {
            Some(port) => vec![port.clone()],
            None => self.ports.all_ports(),
        };

        let mut updates = Vec::new();
        for (dst, route) in self.table.iter() {
            let advertised = route.latency.clamp();
            for port in &targets {
                let previous = self.history.last_sent(port, dst);
                if !force && previous == Some(advertised) {
                    continue;
                }
                let latency = if route.port == *port {
                    match self.loop_avoidance {
                        LoopAvoidance::PoisonReverse => {
                            if !force && previous == Some(Metric::Unreachable) {
                                continue;
                            }
                            Metric::Unreachable
                        }
                        LoopAvoidance::SplitHorizon => continue,
                        LoopAvoidance::None => advertised,
                    }
                } else {
                    advertised
                };
                updates.push((port.clone(), dst.clone(), latency));
            }
        }

        for (port, dst, latency) in updates {
            self.history.record(port.clone(), dst.clone(), latency);
            self.send_route(port, dst, latency);
        }
    }

    /// Drops or poisons routes whose TTL has passed. Static routes never expire.
    pub fn expire_routes(&mut self) {
        let now = self.clock.now();
        let expired: Vec<(T::HostAddress, T::Port)> = self
            .table
            .iter()
            .filter(|(_, route)| route.expiry.has_passed(now))
            .map(|(dst, route)| (dst.clone(), route.port.clone()))
            .collect();

        for (dst, port) in expired {
            debug!("Route to {} expired", json!(dst));
            if self.params.poison_expired {
                self.poison(dst, port);
            } else {
                self.table.remove(&dst);
            }
        }
    }

    fn poison(&mut self, dst: T::HostAddress, port: T::Port) {
        let expiry = self.fresh_expiry();
        self.table.upsert(
            dst.clone(),
            Route {
                destination: dst,
                port,
                latency: Metric::Unreachable,
                expiry,
            },
        );
    }

    /// Tells every port that was last told a reachable latency for `dsts` that they are now unreachable
    fn retract(&mut self, dsts: &[T::HostAddress]) {
        for port in self.ports.all_ports() {
            for dst in dsts {
                let reachable = self
                    .history
                    .last_sent(&port, dst)
                    .is_some_and(|latency| latency.is_reachable());
                if reachable {
                    self.history.record(port.clone(), dst.clone(), Metric::Unreachable);
                    self.send_route(port.clone(), dst.clone(), Metric::Unreachable);
                }
            }
        }
    }

    pub fn handle_link_up(&mut self, port: T::Port, latency: u32) {
        match self.ports.add(port.clone(), latency) {
            Some(previous) => debug!(
                "Link cost of port {} changed from {previous} to {latency}",
                json!(port)
            ),
            None => debug!("Link up on port {} with cost {latency}", json!(port)),
        }

        if self.params.send_on_link_up {
            self.send_routes(false, Some(&port));
        }
    }

    pub fn handle_link_down(&mut self, port: &T::Port) {
        if self.ports.remove(port).is_none() {
            debug!("Link on port {} is already down", json!(port));
            return;
        }
        self.history.clear_port(port);

        let affected: Vec<T::HostAddress> = self
            .table
            .iter()
            .filter(|(_, route)| route.port == *port)
            .map(|(dst, _)| dst.clone())
            .collect();
        debug!(
            "Link down on port {}, {} routes affected",
            json!(port),
            affected.len()
        );

        if self.params.poison_on_link_down {
            for dst in affected {
                self.poison(dst, port.clone());
            }
        } else {
            for dst in &affected {
                self.table.remove(dst);
            }
            self.retract(&affected);
        }

        self.send_routes(false, None);
    }

    /// periodic tick from the scheduler
    pub fn handle_timer(&mut self) {
        self.expire_routes();
        if self.params.advertise_on_timer {
            self.send_routes(true, None);
        }
    }
}
