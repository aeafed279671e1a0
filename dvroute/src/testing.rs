use serde::{Deserialize, Serialize};

use crate::clock::ManualClock;
use crate::framework::{DataPacket, RoutingSystem};

pub struct TestSystem;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestPacket {
    pub dst: String,
}

impl DataPacket<TestSystem> for TestPacket {
    fn destination(&self) -> &String {
        &self.dst
    }
}

impl RoutingSystem for TestSystem {
    type HostAddress = String;
    type Port = u32;
    type Packet = TestPacket;
    type Clock = ManualClock;
}
