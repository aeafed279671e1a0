use std::collections::BTreeMap;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use dvroute::clock::ManualClock;
use dvroute::concepts::packet::{OutboundPacket, Packet};
use dvroute::concepts::route::Metric;
use dvroute::framework::{DataPacket, ProtocolParams, RoutingSystem};
use dvroute::router::Router;

pub struct VirtualSystem;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VirtualPacket {
    pub dst: String,
    pub payload: String,
}

impl DataPacket<VirtualSystem> for VirtualPacket {
    fn destination(&self) -> &String {
        &self.dst
    }
}

impl RoutingSystem for VirtualSystem {
    type HostAddress = String;
    type Port = u32;
    type Packet = VirtualPacket;
    type Clock = ManualClock;
}

/// Routers joined by point to point links. A link uses its id as the port number on both ends.
pub struct VirtualNetwork {
    pub clock: ManualClock,
    pub routers: BTreeMap<String, Router<VirtualSystem>>,
    links: Vec<(u32, String, String)>,
    hosts: BTreeMap<(String, u32), String>,
    in_flight: Vec<(String, u32, Packet<VirtualSystem>)>,
    pub delivered: Vec<(String, VirtualPacket)>,
    interval: Duration,
}

impl VirtualNetwork {
    pub fn create(nodes: &[&str], links: &[(u32, &str, &str, u32)], params: ProtocolParams) -> VirtualNetwork {
        let clock = ManualClock::new();
        let interval = params.timer_interval;
        let mut routers = BTreeMap::new();
        for id in nodes {
            let mut router = Router::<VirtualSystem>::new(params.clone(), clock.clone()).unwrap();
            for (lid, a, b, cost) in links {
                if a == id || b == id {
                    router.handle_link_up(*lid, *cost);
                }
            }
            routers.insert(id.to_string(), router);
        }
        let mut network = VirtualNetwork {
            clock,
            routers,
            links: links.iter().map(|(lid, a, b, _)| (*lid, a.to_string(), b.to_string())).collect(),
            hosts: BTreeMap::new(),
            in_flight: Vec::new(),
            delivered: Vec::new(),
            interval,
        };
        network.flush_packets();
        network
    }

    pub fn attach_host(&mut self, node: &str, host: &str, port: u32, cost: u32) {
        let router = self.get_node(node);
        router.handle_link_up(port, cost);
        router.add_static_route(host.to_string(), port).unwrap();
        self.hosts.insert((node.to_string(), port), host.to_string());
    }

    pub fn get_node(&mut self, node: &str) -> &mut Router<VirtualSystem> {
        self.routers.get_mut(node).unwrap_or_else(|| panic!("No node {node} found"))
    }

    pub fn route(&self, node: &str, host: &str) -> Option<(u32, Metric)> {
        let router = self.routers.get(node).unwrap_or_else(|| panic!("No node {node} found"));
        router.table().lookup(&host.to_string()).map(|r| (r.port, r.latency))
    }

    pub fn send_from(&mut self, node: &str, host_port: u32, dst: &str, payload: &str) {
        let packet = VirtualPacket { dst: dst.to_string(), payload: payload.to_string() };
        self.in_flight.push((node.to_string(), host_port, Packet::Data(packet)));
    }

    pub fn link_up(&mut self, lid: u32, a: &str, b: &str, cost: u32) {
        self.links.push((lid, a.to_string(), b.to_string()));
        self.get_node(a).handle_link_up(lid, cost);
        self.get_node(b).handle_link_up(lid, cost);
        self.flush_packets();
    }

    pub fn link_down(&mut self, lid: u32) {
        if let Some(pos) = self.links.iter().position(|(id, _, _)| *id == lid) {
            let (_, a, b) = self.links.remove(pos);
            self.get_node(&a).handle_link_down(&lid);
            self.get_node(&b).handle_link_down(&lid);
        }
        self.flush_packets();
    }

    fn peer_of(&self, node: &str, port: u32) -> Option<String> {
        self.links.iter().find(|(lid, _, _)| *lid == port).and_then(|(_, a, b)| {
            if a == node {
                Some(b.clone())
            } else if b == node {
                Some(a.clone())
            } else {
                None
            }
        })
    }

    /// moves every outbound packet onto its link, returning what was sent
    pub fn flush_packets(&mut self) -> Vec<(String, OutboundPacket<VirtualSystem>)> {
        let mut sent = Vec::new();
        for (node, router) in &mut self.routers {
            for packet in router.drain_outbound() {
                sent.push((node.clone(), packet));
            }
        }
        for (node, OutboundPacket { port, packet }) in sent.clone() {
            if let Some(peer) = self.peer_of(&node, port) {
                self.in_flight.push((peer, port, packet));
            } else if let Some(host) = self.hosts.get(&(node, port)) {
                if let Packet::Data(data) = packet {
                    self.delivered.push((host.clone(), data));
                }
            }
        }
        sent
    }

    /// delivers in flight packets until the network is quiet
    pub fn converge(&mut self) {
        for _ in 0..1000 {
            if self.in_flight.is_empty() {
                return;
            }
            for (node, port, packet) in std::mem::take(&mut self.in_flight) {
                if let Some(router) = self.routers.get_mut(&node) {
                    router.handle_packet(packet, &port);
                }
            }
            self.flush_packets();
        }
        panic!("network did not converge");
    }

    /// advances time by one timer interval and ticks every router, returns the timer's own traffic
    pub fn timer(&mut self) -> Vec<(String, OutboundPacket<VirtualSystem>)> {
        self.clock.advance(self.interval);
        for router in self.routers.values_mut() {
            router.handle_timer();
        }
        let sent = self.flush_packets();
        self.converge();
        sent
    }

    pub fn timer_n(&mut self, times: u32) {
        for _ in 0..times {
            self.timer();
        }
    }

    /// snapshot of every routing table
    pub fn freeze(&self) -> String {
        let tables: BTreeMap<&String, _> = self.routers.iter().map(|(node, router)| (node, router.table())).collect();
        serde_json::to_string(&tables).unwrap()
    }
}
