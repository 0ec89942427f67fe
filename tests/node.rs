use std::collections::VecDeque;
use std::net::{Ipv4Addr, SocketAddrV4};

use artnet_node::{
    codes, Address, AddressCommand, Art, ArtNetNode, IpProg, IpProgCommand, NodeConfig, NodeError,
    Opcode, Poll, PortAddress, Transport, PORT,
};

const CONSOLE: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 5), PORT);
const BACKUP: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 6), PORT);
const THIRD: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 7), PORT);
const POLLER: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 9), PORT);

#[derive(Default)]
struct MockTransport {
    inbound: VecDeque<(Vec<u8>, SocketAddrV4)>,
    sent: Vec<(Vec<u8>, SocketAddrV4)>,
    fail_send: bool,
}

#[derive(Debug, PartialEq)]
struct SendFailed;

impl MockTransport {
    fn push(&mut self, packet: &[u8], sender: SocketAddrV4) {
        self.inbound.push_back((packet.to_vec(), sender));
    }
}

impl Transport for MockTransport {
    type Error = SendFailed;

    fn receive(&mut self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddrV4)>, SendFailed> {
        Ok(self.inbound.pop_front().map(|(packet, sender)| {
            let len = packet.len().min(buf.len());
            buf[..len].copy_from_slice(&packet[..len]);
            (len, sender)
        }))
    }

    fn send(&mut self, bytes: &[u8], destination: SocketAddrV4) -> Result<(), SendFailed> {
        if self.fail_send {
            return Err(SendFailed);
        }
        self.sent.push((bytes.to_vec(), destination));
        Ok(())
    }
}

fn node<'a>() -> ArtNetNode<'a> {
    ArtNetNode::new(NodeConfig {
        ip_address: Ipv4Addr::new(10, 0, 0, 2),
        short_name: "bar 1",
        long_name: "truss bar 1",
        mac_address: [0x02, 0, 0, 0, 0, 0x01],
        ..Default::default()
    })
}

fn dmx_packet(universe: u8, data: &[u8]) -> Vec<u8> {
    let mut packet = b"Art-Net\0\x00\x50\x00\x0e\x01\x00".to_vec();
    packet.extend_from_slice(&[universe, 0x00]);
    packet.extend_from_slice(&(data.len() as u16).to_be_bytes());
    packet.extend_from_slice(data);
    packet
}

fn encode(art: Art<'_>) -> Vec<u8> {
    let mut buf = [0; codes::PACKET_BUFFER_SIZE];
    let len = art.serialize(&mut buf).unwrap();
    buf[..len].to_vec()
}

#[test]
fn idle_transport_yields_nothing() {
    let mut node = node();
    let mut transport = MockTransport::default();
    assert_eq!(node.read_packet(&mut transport).unwrap(), None);
    assert!(!node.read_dmx_packet(&mut transport).unwrap());
}

#[test]
fn dmx_then_poll() {
    let mut node = node();
    let mut transport = MockTransport::default();

    transport.push(&dmx_packet(0, &[10, 20, 30]), CONSOLE);
    assert!(node.read_dmx_packet(&mut transport).unwrap());
    assert_eq!(
        (node.get_slot(1), node.get_slot(2), node.get_slot(3)),
        (10, 20, 30)
    );
    assert!(transport.sent.is_empty());

    transport.push(&encode(Art::Poll(Poll::default())), POLLER);
    let processed = node.read_packet(&mut transport).unwrap().unwrap();
    assert_eq!(processed.opcode, Opcode::Poll);

    let (reply, destination) = &transport.sent[0];
    assert_eq!(*destination, POLLER);
    assert_eq!(reply.len(), 239);

    let Art::PollReply(poll_reply) = Art::from_slice(reply).unwrap() else {
        panic!("expected ArtPollReply");
    };
    assert_eq!(poll_reply.port_address(0), PortAddress::new(0, 0, 0).unwrap());
    assert_eq!(poll_reply.short_name, "bar 1");
    assert_eq!(poll_reply.mac_address, [0x02, 0, 0, 0, 0, 0x01]);
    assert_eq!(poll_reply.good_output_a[0], codes::GOOD_OUTPUT_DATA);
}

#[test]
fn malformed_packets_are_dropped() {
    let mut node = node();
    let mut transport = MockTransport::default();

    transport.push(&dmx_packet(0, &[1, 2, 3]), CONSOLE);
    node.read_packet(&mut transport).unwrap();

    let mut bad_signature = dmx_packet(0, &[255, 255, 255]);
    bad_signature[0] = b'X';
    transport.push(&bad_signature, BACKUP);
    transport.push(b"Art-Net\0\x00\x50\x00\x0e", BACKUP);
    transport.push(b"Art-Net\0\x00\x20\x00\x0d\x00\x00", BACKUP);

    for _ in 0..3 {
        assert_eq!(node.read_packet(&mut transport).unwrap(), None);
    }
    assert_eq!(node.dmx_data(), &[1, 2, 3]);
    assert_eq!(node.packet_size(), 21);
    assert!(!node.is_merging());
    assert!(transport.sent.is_empty());
}

#[test]
fn merge_cancel_and_rebind() {
    let mut node = node();
    let mut transport = MockTransport::default();

    transport.push(&dmx_packet(0, &[100, 0, 0, 40]), CONSOLE);
    transport.push(&dmx_packet(0, &[0, 200, 0]), BACKUP);
    transport.push(&dmx_packet(0, &[255; 4]), THIRD);
    for _ in 0..3 {
        node.read_packet(&mut transport).unwrap();
    }
    assert_eq!(node.dmx_data(), &[100, 200, 0, 40]);

    let cancel = Address {
        command: AddressCommand::CancelMerge,
        ..Default::default()
    };
    transport.push(&encode(Art::Address(cancel)), CONSOLE);
    node.read_packet(&mut transport).unwrap();
    assert!(!node.is_merging());
    assert_eq!(node.dmx_data(), &[100, 200, 0, 40]);

    transport.push(&dmx_packet(0, &[5]), THIRD);
    assert!(node.read_dmx_packet(&mut transport).unwrap());
    assert_eq!(node.dmx_data(), &[5]);
}

#[test]
fn address_reprograms_universe_and_replies() {
    let mut node = node();
    let mut transport = MockTransport::default();

    let address = Address {
        swout: [0x80 | 3, 0x7f, 0x7f, 0x7f],
        long_name: "truss bar 1 (moved)",
        ..Default::default()
    };
    transport.push(&encode(Art::Address(address)), CONSOLE);
    let processed = node.read_packet(&mut transport).unwrap().unwrap();

    assert_eq!(processed.opcode, Opcode::Address);
    assert_eq!(node.universe(), 3);
    assert_eq!(node.long_name(), "truss bar 1 (moved)");

    let Art::PollReply(poll_reply) = Art::from_slice(&transport.sent[0].0).unwrap() else {
        panic!("expected ArtPollReply");
    };
    assert_eq!(poll_reply.swout[0], 3);

    // the old universe is no longer ours
    transport.push(&dmx_packet(0, &[1]), CONSOLE);
    assert!(!node.read_dmx_packet(&mut transport).unwrap());
    transport.push(&dmx_packet(3, &[1]), CONSOLE);
    assert!(node.read_dmx_packet(&mut transport).unwrap());
}

#[test]
fn ip_prog_reply_goes_to_programmer() {
    let programmed = std::cell::RefCell::new(Vec::new());
    let mut node = node();
    node.set_ip_prog_callback(|command, ip, mask| programmed.borrow_mut().push((command, ip, mask)));
    let mut transport = MockTransport::default();

    let ip_prog = IpProg {
        command: IpProgCommand(codes::IP_PROG_ENABLE | codes::IP_PROG_IP),
        ip_address: Ipv4Addr::new(10, 0, 0, 50),
        ..Default::default()
    };
    transport.push(&encode(Art::IpProg(ip_prog)), BACKUP);
    node.read_packet(&mut transport).unwrap();

    let (reply, destination) = &transport.sent[0];
    assert_eq!(*destination, BACKUP);
    let Art::IpProgReply(ip_prog_reply) = Art::from_slice(reply).unwrap() else {
        panic!("expected ArtIpProgReply");
    };
    assert_eq!(ip_prog_reply.ip_address, Ipv4Addr::new(10, 0, 0, 50));
    assert_eq!(ip_prog_reply.port, PORT);

    drop(node);
    assert_eq!(programmed.borrow().len(), 1);
    assert_eq!(programmed.borrow()[0].1, Ipv4Addr::new(10, 0, 0, 50));
}

#[test]
fn send_dmx_uses_current_port_address() {
    let mut node = node();
    node.set_net(1).unwrap();
    node.set_sub_net_universe(2, 3).unwrap();
    node.set_number_of_slots(3);
    node.set_slot(3, 77).unwrap();
    let mut transport = MockTransport::default();

    let destination = SocketAddrV4::new(Ipv4Addr::new(10, 255, 255, 255), PORT);
    // three slots go out padded to four
    assert_eq!(node.send_dmx(&mut transport, destination).unwrap(), 22);
    node.send_dmx(&mut transport, destination).unwrap();

    let Art::Dmx(dmx) = Art::from_slice(&transport.sent[1].0).unwrap() else {
        panic!("expected ArtDmx");
    };
    assert_eq!(dmx.port_address, PortAddress::new(1, 2, 3).unwrap());
    assert_eq!(dmx.sequence.map(|seq| *seq), Some(2));
    assert_eq!(dmx.data, &[0, 0, 77, 0]);
}

#[test]
fn transport_errors_are_reported() {
    let mut node = node();
    let mut transport = MockTransport {
        fail_send: true,
        ..Default::default()
    };

    transport.push(&encode(Art::Poll(Poll::default())), POLLER);
    assert!(matches!(
        node.read_packet(&mut transport),
        Err(NodeError::Transport(SendFailed))
    ));
    assert!(matches!(
        node.send_poll_reply(&mut transport, POLLER),
        Err(NodeError::Transport(SendFailed))
    ));
}
