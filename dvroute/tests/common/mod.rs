pub mod virtual_network;

use dvroute::framework::ProtocolParams;
use virtual_network::VirtualNetwork;

/// a - b - c - d, host "hd" behind d
pub fn vnet_line(params: ProtocolParams) -> VirtualNetwork {
    let mut network = VirtualNetwork::create(
        &["a", "b", "c", "d"],
        &[(1, "a", "b", 1), (2, "b", "c", 2), (3, "c", "d", 3)],
        params,
    );
    network.attach_host("a", "ha", 100, 1);
    network.attach_host("d", "hd", 100, 1);
    network
}

/// a square, the path a - b - d is cheaper than a - c - d
pub fn vnet_square(params: ProtocolParams) -> VirtualNetwork {
    let mut network = VirtualNetwork::create(
        &["a", "b", "c", "d"],
        &[(1, "a", "b", 1), (2, "b", "d", 1), (3, "a", "c", 2), (4, "c", "d", 2)],
        params,
    );
    network.attach_host("d", "hd", 100, 1);
    network
}
