use std::net::{Ipv4Addr, SocketAddr, UdpSocket};

use artnet_node::{ArtNetNode, NodeConfig, Opcode, PortAddress};

fn main() {
    // Use the default ArtNet Port
    let port = artnet_node::PORT;

    // Address and mask reported in ArtPollReply, e.g. `2.0.0.10 255.0.0.0 6`
    let mut args = std::env::args().skip(1);
    let ip_address: Ipv4Addr = args
        .next()
        .map(|arg| arg.parse().unwrap())
        .unwrap_or(Ipv4Addr::new(2, 0, 0, 10));
    let subnet_mask: Ipv4Addr = args
        .next()
        .map(|arg| arg.parse().unwrap())
        .unwrap_or(Ipv4Addr::new(255, 0, 0, 0));
    let universe: u8 = args.next().map(|arg| arg.parse().unwrap()).unwrap_or(0);

    // Open the UDP socket
    let mut socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))).unwrap();
    socket.set_broadcast(true).unwrap();

    let mut node = ArtNetNode::new(NodeConfig {
        ip_address,
        subnet_mask: Some(subnet_mask),
        port_address: PortAddress::new(0, 0, universe).unwrap(),
        short_name: "Demo Node",
        long_name: "artnet-node demo: one DMX512 output",
        firmware_version: 0x0100,
        ..Default::default()
    });

    node.set_address_callback(|| println!("RX: ArtAddress applied"));
    node.set_ip_prog_callback(|command, ip, mask| {
        println!("RX: ArtIpProg 0x{:02x} => {} / {}", command.0, ip, mask)
    });

    println!(
        "\n\nNode Started as {} on Port-Address {}, listening on port {}",
        ip_address,
        node.port_address(),
        port
    );

    loop {
        match node.read_packet(&mut socket) {
            Ok(Some(processed)) if processed.dmx_changed => {
                let data = node.dmx_data();
                println!(
                    "=> {} slots, merging: {}, first: {:?}",
                    data.len(),
                    node.is_merging(),
                    &data[..data.len().min(8)]
                );
            }
            Ok(Some(processed)) => {
                if let Some(reply) = processed.reply {
                    println!("RX: {:?}, replied to {}", processed.opcode, reply.destination);
                } else if let Opcode::Unsupported(code) = processed.opcode {
                    eprintln!("Unsupported OP_CODE = 0x{:0x}", code);
                }
            }
            Ok(None) => {}
            Err(err) => eprintln!("Error: {}", err),
        }
    }
}
