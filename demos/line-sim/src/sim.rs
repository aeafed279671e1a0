use std::collections::BTreeMap;
use std::time::Duration;

use dvroute::clock::ManualClock;
use dvroute::concepts::packet::{OutboundPacket, Packet};
use dvroute::framework::{Clock, DataPacket, ProtocolParams, RoutingSystem};
use dvroute::router::Router;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::topology::{Link, Scripted, Topology};

pub struct DemoSystem;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DemoPacket {
    pub dst: String,
    pub id: u64,
}

impl DataPacket<DemoSystem> for DemoPacket {
    fn destination(&self) -> &String {
        &self.dst
    }
}

impl RoutingSystem for DemoSystem {
    type HostAddress = String;
    type Port = u32;
    type Packet = DemoPacket;
    type Clock = ManualClock;
    fn config() -> ProtocolParams {
        ProtocolParams {
            poison_reverse: true,
            poison_expired: true,
            send_on_link_up: true,
            poison_on_link_down: true,
            ..Default::default()
        }
    }
}

enum Event {
    Deliver { router: String, port: u32, packet: Packet<DemoSystem> },
    Timer { router: String },
    LinkDown(u32),
    LinkUp(Link),
    Inject { router: String, port: u32, dst: String },
}

/// Runs every router on one thread, interleaving their events in time order
pub struct Simulation {
    clock: ManualClock,
    interval: Duration,
    pub routers: BTreeMap<String, Router<DemoSystem>>,
    /// link id -> (router, router, cost), the id doubles as the port on both ends
    links: BTreeMap<u32, (String, String, u32)>,
    hosts: BTreeMap<(String, u32), String>,
    queue: BTreeMap<(Duration, u64), Event>,
    seq: u64,
    next_packet: u64,
    pub delivered: Vec<(String, DemoPacket)>,
}

/// time a packet spends on a link of the given cost
fn transit(cost: u32) -> Duration {
    Duration::from_millis(10 * u64::from(cost.max(1)))
}

impl Simulation {
    pub fn new(topology: Topology, params: ProtocolParams) -> anyhow::Result<Self> {
        let clock = ManualClock::new();
        let mut sim = Self {
            clock: clock.clone(),
            interval: params.timer_interval,
            routers: BTreeMap::new(),
            links: BTreeMap::new(),
            hosts: BTreeMap::new(),
            queue: BTreeMap::new(),
            seq: 0,
            next_packet: 0,
            delivered: Vec::new(),
        };

        for (idx, name) in topology.routers().into_iter().enumerate() {
            sim.routers.insert(name.clone(), Router::new(params.clone(), clock.clone())?);
            // stagger timers so routers don't tick in lockstep
            let offset = Duration::from_millis(100 * idx as u64);
            sim.schedule(offset, Event::Timer { router: name });
        }
        for link in topology.links {
            sim.connect(link);
        }
        for host in topology.hosts {
            let Some(router) = sim.routers.get_mut(&host.router) else {
                continue;
            };
            router.handle_link_up(host.port, host.cost);
            router.add_static_route(host.name.clone(), host.port)?;
            sim.hosts.insert((host.router.clone(), host.port), host.name);
            sim.dispatch(&host.router);
        }
        for scripted in topology.script {
            match scripted {
                Scripted::LinkDown { at, link } => sim.schedule(at, Event::LinkDown(link)),
                Scripted::LinkUp { at, link } => sim.schedule(at, Event::LinkUp(link)),
                Scripted::Send { at, router, port, dst } => {
                    sim.schedule(at, Event::Inject { router, port, dst })
                }
            }
        }
        Ok(sim)
    }

    fn schedule(&mut self, at: Duration, event: Event) {
        self.seq += 1;
        self.queue.insert((at, self.seq), event);
    }

    fn connect(&mut self, link: Link) {
        for end in [&link.a, &link.b] {
            if let Some(router) = self.routers.get_mut(end) {
                router.handle_link_up(link.id, link.cost);
            }
        }
        self.links.insert(link.id, (link.a.clone(), link.b.clone(), link.cost));
        self.dispatch(&link.a);
        self.dispatch(&link.b);
    }

    fn peer(&self, router: &str, port: u32) -> Option<(String, u32)> {
        let (a, b, cost) = self.links.get(&port)?;
        if a == router {
            Some((b.clone(), *cost))
        } else if b == router {
            Some((a.clone(), *cost))
        } else {
            None
        }
    }

    /// puts everything a router wants to send onto the wire
    fn dispatch(&mut self, router: &str) {
        let Some(outbound) = self.routers.get_mut(router).map(|r| r.drain_outbound()) else {
            return;
        };
        let now = self.clock.now();
        for OutboundPacket { port, packet } in outbound {
            if let Some((peer, cost)) = self.peer(router, port) {
                self.schedule(now + transit(cost), Event::Deliver { router: peer, port, packet });
            } else if let Some(host) = self.hosts.get(&(router.to_string(), port)).cloned() {
                if let Packet::Data(data) = packet {
                    info!("[{:?}] packet {} delivered to {host}", now, data.id);
                    self.delivered.push((host, data));
                }
            }
        }
    }

    fn handle(&mut self, event: Event) {
        let now = self.clock.now();
        match event {
            Event::Deliver { router, port, packet } => {
                // packets in flight on a link that went down are lost
                if self.peer(&router, port).is_none() {
                    debug!("[{:?}] lost packet on link {port}", now);
                    return;
                }
                if let Some(r) = self.routers.get_mut(&router) {
                    r.handle_packet(packet, &port);
                }
                self.dispatch(&router);
            }
            Event::Timer { router } => {
                if let Some(r) = self.routers.get_mut(&router) {
                    r.handle_timer();
                }
                self.dispatch(&router);
                self.schedule(now + self.interval, Event::Timer { router });
            }
            Event::LinkDown(id) => {
                let Some((a, b, _)) = self.links.remove(&id) else {
                    return;
                };
                info!("[{:?}] link {id} between {a} and {b} is down", now);
                for end in [a, b] {
                    if let Some(r) = self.routers.get_mut(&end) {
                        r.handle_link_down(&id);
                    }
                    self.dispatch(&end);
                }
            }
            Event::LinkUp(link) => {
                info!("[{:?}] link {} between {} and {} is up", now, link.id, link.a, link.b);
                self.connect(link);
            }
            Event::Inject { router, port, dst } => {
                self.next_packet += 1;
                let packet = DemoPacket { dst, id: self.next_packet };
                info!("[{:?}] packet {} for {} enters at {router}", now, packet.id, packet.dst);
                if let Some(r) = self.routers.get_mut(&router) {
                    r.handle_data_packet(packet, &port);
                }
                self.dispatch(&router);
            }
        }
    }

    pub fn run(&mut self, until: Duration) {
        while let Some(entry) = self.queue.first_entry() {
            if entry.key().0 > until {
                break;
            }
            let ((at, _), event) = entry.remove_entry();
            self.clock.set(at);
            self.handle(event);
        }
        self.clock.set(until);
    }
}
