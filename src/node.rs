//! The node engine: one packet buffer, the merge state, the Port-Address and
//! the identity reported in ArtPollReply.
//!
//! Everything happens synchronously inside [`ArtNetNode::process_packet`] (or
//! [`ArtNetNode::read_packet`], which also talks to the [`Transport`]). The
//! engine holds no locks; callers sharing a node between threads must
//! serialize access themselves.

use alloc::boxed::Box;
use core::fmt::Write;
use core::net::{Ipv4Addr, SocketAddrV4};
use core::ops::{Deref, DerefMut};

use crate::codes::{self, LONG_NAME_LENGTH, NODE_REPORT_LENGTH, PACKET_BUFFER_SIZE, SHORT_NAME_LENGTH};
use crate::error::{Error, Result};
use crate::merge::{MergeOutcome, Merger};
use crate::name::FixedStr;
use crate::transport::Transport;
use crate::{
    Address, AddressCommand, Art, Dmx, ESTAManufacturerCode, IpProg, IpProgCommand, IpProgReply,
    Opcode, Poll, PollReply, PortAddress, Sequence, PORT,
};

/// Settings the node starts from, decoded by the host from wherever it keeps them.
#[derive(Debug, Clone)]
pub struct NodeConfig<'a> {
    pub ip_address: Ipv4Addr,
    /// When set, poll replies are broadcast on the subnet it describes;
    /// otherwise they go back to whoever polled.
    pub subnet_mask: Option<Ipv4Addr>,
    pub port_address: PortAddress,
    /// Truncated to 17 bytes.
    pub short_name: &'a str,
    /// Truncated to 63 bytes.
    pub long_name: &'a str,
    pub mac_address: [u8; 6],
    pub firmware_version: u16,
    pub oem: u16,
    pub esta_manufacturer: ESTAManufacturerCode,
    pub status_1: u8,
    pub status_2: u8,
}

impl<'a> Default for NodeConfig<'a> {
    fn default() -> Self {
        Self {
            ip_address: Ipv4Addr::UNSPECIFIED,
            subnet_mask: None,
            port_address: PortAddress::default(),
            short_name: "Art-Net Node",
            long_name: "Art-Net DMX Node",
            mac_address: [0; 6],
            firmware_version: 1,
            oem: 0xffff,
            esta_manufacturer: ('\0', '\0'),
            status_1: codes::STATUS1_INDICATOR_NORMAL | codes::STATUS1_PORT_PROG,
            status_2: codes::STATUS2_ARTNET3_CAPABLE,
        }
    }
}

/// Storage for incoming and outgoing datagrams: allocated by the node, or
/// lent to it by the caller for the node's lifetime.
///
/// Replies are written here, over the request. Nodes sharing one receive
/// buffer use [`ArtNetNode::process_packet_contents`] instead, which reads
/// the shared bytes and replies from each node's own packet buffer.
pub enum PacketBuffer<'a> {
    Owned(Box<[u8; PACKET_BUFFER_SIZE]>),
    Borrowed(&'a mut [u8; PACKET_BUFFER_SIZE]),
}

impl<'a> PacketBuffer<'a> {
    pub fn is_owned(&self) -> bool {
        matches!(self, PacketBuffer::Owned(_))
    }
}

impl<'a> Deref for PacketBuffer<'a> {
    type Target = [u8; PACKET_BUFFER_SIZE];

    fn deref(&self) -> &Self::Target {
        match self {
            PacketBuffer::Owned(buf) => buf,
            PacketBuffer::Borrowed(buf) => buf,
        }
    }
}

impl<'a> DerefMut for PacketBuffer<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            PacketBuffer::Owned(buf) => buf,
            PacketBuffer::Borrowed(buf) => buf,
        }
    }
}

/// A reply sitting at the start of the packet buffer.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct Reply {
    pub len: usize,
    pub destination: SocketAddrV4,
}

/// The result of handling one datagram.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct Processed {
    pub opcode: Opcode,
    /// The merged output was rewritten.
    pub dmx_changed: bool,
    pub reply: Option<Reply>,
}

#[derive(Debug, thiserror::Error)]
pub enum NodeError<E> {
    #[error(transparent)]
    Protocol(#[from] Error),
    #[error("transport error: {0:?}")]
    Transport(E),
}

type AddressCallback<'a> = Box<dyn FnMut() + 'a>;
type IpProgCallback<'a> = Box<dyn FnMut(IpProgCommand, Ipv4Addr, Ipv4Addr) + 'a>;

enum PendingReply {
    PollReply(SocketAddrV4),
    IpProgReply(SocketAddrV4),
}

struct State<'a> {
    merger: Merger,
    port_address: PortAddress,
    sequence: Sequence,
    poll_reply_counter: u16,

    ip_address: Ipv4Addr,
    subnet_mask: Ipv4Addr,
    broadcast_address: Option<Ipv4Addr>,
    default_ip_address: Ipv4Addr,
    default_subnet_mask: Ipv4Addr,

    short_name: FixedStr<{ SHORT_NAME_LENGTH - 1 }>,
    long_name: FixedStr<{ LONG_NAME_LENGTH - 1 }>,
    mac_address: [u8; 6],
    firmware_version: u16,
    oem: u16,
    esta_manufacturer: ESTAManufacturerCode,
    status_1: u8,
    status_2: u8,

    on_address: Option<AddressCallback<'a>>,
    on_ip_prog: Option<IpProgCallback<'a>>,
}

fn broadcast_for(ip_address: Ipv4Addr, subnet_mask: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(ip_address) | !u32::from(subnet_mask))
}

impl<'a> State<'a> {
    fn new(config: &NodeConfig<'_>) -> Self {
        let subnet_mask = config.subnet_mask.unwrap_or(Ipv4Addr::UNSPECIFIED);

        Self {
            merger: Merger::new(),
            port_address: config.port_address,
            sequence: Sequence::default(),
            poll_reply_counter: 0,
            ip_address: config.ip_address,
            subnet_mask,
            broadcast_address: config
                .subnet_mask
                .map(|mask| broadcast_for(config.ip_address, mask)),
            default_ip_address: config.ip_address,
            default_subnet_mask: subnet_mask,
            short_name: FixedStr::with_text(config.short_name),
            long_name: FixedStr::with_text(config.long_name),
            mac_address: config.mac_address,
            firmware_version: config.firmware_version,
            oem: config.oem,
            esta_manufacturer: config.esta_manufacturer,
            status_1: config.status_1,
            status_2: config.status_2,
            on_address: None,
            on_ip_prog: None,
        }
    }

    fn handle(&mut self, art: Art<'_>, sender: SocketAddrV4) -> (bool, Option<PendingReply>) {
        match art {
            Art::Dmx(dmx) => (self.handle_dmx(&dmx, sender), None),
            Art::Poll(poll) => (false, self.handle_poll(&poll, sender)),
            Art::Address(address) => (false, Some(self.handle_address(&address, sender))),
            Art::IpProg(ip_prog) => (false, Some(self.handle_ip_prog(&ip_prog, sender))),
            Art::PollReply(_) | Art::IpProgReply(_) | Art::Unsupported(_) => (false, None),
        }
    }

    fn handle_dmx(&mut self, dmx: &Dmx<'_>, sender: SocketAddrV4) -> bool {
        if dmx.port_address != self.port_address {
            log::trace!(
                "ignoring ArtDmx for {} (listening on {})",
                dmx.port_address,
                self.port_address
            );
            return false;
        }

        matches!(
            self.merger.merge(*sender.ip(), dmx.data),
            MergeOutcome::Merged(_)
        )
    }

    fn handle_poll(&self, poll: &Poll, sender: SocketAddrV4) -> Option<PendingReply> {
        if poll.flags & codes::POLL_FLAG_TARGETED != 0
            && !poll.target_port_addresses.contains(&self.port_address.as_u16())
        {
            log::trace!("targeted ArtPoll from {} does not include {}", sender, self.port_address);
            return None;
        }

        Some(PendingReply::PollReply(self.poll_reply_destination(sender)))
    }

    fn handle_address(&mut self, address: &Address<'_>, sender: SocketAddrV4) -> PendingReply {
        let before = self.port_address;
        self.port_address.apply_net_command(address.net_switch);
        self.port_address.apply_sub_net_command(address.sub_switch);
        self.port_address.apply_universe_command(address.swout[0]);
        if self.port_address != before {
            log::debug!("Port-Address {} -> {} by {}", before, self.port_address, sender);
        }

        if !address.short_name.is_empty() {
            self.short_name.set(address.short_name);
        }
        if !address.long_name.is_empty() {
            self.long_name.set(address.long_name);
        }

        match address.command {
            AddressCommand::None => {}
            AddressCommand::CancelMerge => self.merger.cancel(),
            AddressCommand::LedNormal => self.set_indicators(codes::STATUS1_INDICATOR_NORMAL),
            AddressCommand::LedMute => self.set_indicators(codes::STATUS1_INDICATOR_MUTE),
            AddressCommand::LedLocate => self.set_indicators(codes::STATUS1_INDICATOR_LOCATE),
            AddressCommand::Other(command) => {
                log::debug!("ignoring ArtAddress command 0x{:02x}", command)
            }
        }

        if let Some(callback) = self.on_address.as_mut() {
            callback();
        }

        PendingReply::PollReply(self.poll_reply_destination(sender))
    }

    fn handle_ip_prog(&mut self, ip_prog: &IpProg, sender: SocketAddrV4) -> PendingReply {
        let command = ip_prog.command;

        if command.is_programming() {
            if command.enable_dhcp() {
                self.status_2 |= codes::STATUS2_DHCP_USED;
            } else {
                if command.reset_to_default() {
                    // reset wins over the program bits
                    self.ip_address = self.default_ip_address;
                    self.subnet_mask = self.default_subnet_mask;
                    self.status_2 &= !codes::STATUS2_DHCP_USED;
                } else {
                    if command.program_ip() {
                        self.ip_address = ip_prog.ip_address;
                        self.status_2 &= !codes::STATUS2_DHCP_USED;
                    }
                    if command.program_subnet_mask() {
                        self.subnet_mask = ip_prog.subnet_mask;
                    }
                }
            }

            if self.broadcast_address.is_some() {
                self.broadcast_address = Some(broadcast_for(self.ip_address, self.subnet_mask));
            }

            log::debug!(
                "ArtIpProg 0x{:02x} from {}: {}/{}",
                command.0,
                sender,
                self.ip_address,
                self.subnet_mask
            );

            if let Some(callback) = self.on_ip_prog.as_mut() {
                callback(command, self.ip_address, self.subnet_mask);
            }
        }

        PendingReply::IpProgReply(SocketAddrV4::new(*sender.ip(), PORT))
    }

    fn set_indicators(&mut self, indicators: u8) {
        self.status_1 = (self.status_1 & !codes::STATUS1_INDICATOR_MASK) | indicators;
    }

    fn poll_reply_destination(&self, sender: SocketAddrV4) -> SocketAddrV4 {
        SocketAddrV4::new(self.broadcast_address.unwrap_or(*sender.ip()), PORT)
    }

    fn poll_reply<'r>(&'r self, node_report: &'r str) -> PollReply<'r> {
        let mut good_output = 0;
        if !self.merger.output().is_empty() {
            good_output |= codes::GOOD_OUTPUT_DATA;
        }
        if self.merger.is_merging() {
            good_output |= codes::GOOD_OUTPUT_MERGING;
        }

        PollReply {
            ip_address: self.ip_address.octets(),
            port: PORT,
            firmware_version: self.firmware_version,
            net_switch: self.port_address.net(),
            sub_switch: self.port_address.sub_net(),
            oem: self.oem,
            status_1: self.status_1,
            esta_manufacturer: self.esta_manufacturer,
            short_name: self.short_name.as_str(),
            long_name: self.long_name.as_str(),
            node_report,
            num_ports: 1,
            port_types: [codes::PORT_TYPE_DMX512_OUTPUT, 0, 0, 0],
            good_output_a: [good_output, 0, 0, 0],
            swout: [self.port_address.universe(), 0, 0, 0],
            mac_address: self.mac_address,
            bind_ip_address: self.ip_address.octets(),
            status_2: self.status_2,
            ..Default::default()
        }
    }
}

/// An Art-Net node receiving one universe.
///
/// ArtDmx from the first two senders is merged highest-takes-precedence into
/// the output returned by [`ArtNetNode::dmx_data`]; ArtPoll, ArtAddress and
/// ArtIpProg are answered from the same packet buffer the request arrived in.
pub struct ArtNetNode<'a> {
    buffer: PacketBuffer<'a>,
    packet_size: usize,
    state: State<'a>,
}

impl<'a> ArtNetNode<'a> {
    /// Creates a node that allocates its own packet buffer.
    pub fn new(config: NodeConfig<'_>) -> Self {
        Self::with_packet_buffer(
            &config,
            PacketBuffer::Owned(Box::new([0; PACKET_BUFFER_SIZE])),
        )
    }

    /// Creates a node that works in a caller-supplied packet buffer.
    pub fn with_buffer(config: NodeConfig<'_>, buffer: &'a mut [u8; PACKET_BUFFER_SIZE]) -> Self {
        Self::with_packet_buffer(&config, PacketBuffer::Borrowed(buffer))
    }

    fn with_packet_buffer(config: &NodeConfig<'_>, buffer: PacketBuffer<'a>) -> Self {
        Self {
            buffer,
            packet_size: 0,
            state: State::new(config),
        }
    }

    /// UDP port used by the protocol.
    pub fn port(&self) -> u16 {
        PORT
    }

    pub fn port_address(&self) -> PortAddress {
        self.state.port_address
    }

    pub fn universe(&self) -> u8 {
        self.state.port_address.universe()
    }

    pub fn sub_net(&self) -> u8 {
        self.state.port_address.sub_net()
    }

    pub fn net(&self) -> u8 {
        self.state.port_address.net()
    }

    pub fn set_universe(&mut self, universe: u8) -> Result<()> {
        self.state.port_address.set_universe(universe)
    }

    pub fn set_sub_net(&mut self, sub_net: u8) -> Result<()> {
        self.state.port_address.set_sub_net(sub_net)
    }

    pub fn set_net(&mut self, net: u8) -> Result<()> {
        self.state.port_address.set_net(net)
    }

    /// Sets subnet and universe together; neither changes if either is out of range.
    pub fn set_sub_net_universe(&mut self, sub_net: u8, universe: u8) -> Result<()> {
        let net = self.state.port_address.net();
        self.state.port_address = PortAddress::new(net, sub_net, universe)?;
        Ok(())
    }

    /// Applies an ArtAddress SwOut byte. See [`crate::AddressUpdate`].
    pub fn apply_universe_command(&mut self, raw: u8) -> bool {
        self.state.port_address.apply_universe_command(raw)
    }

    /// Applies an ArtAddress SubSwitch byte.
    pub fn apply_sub_net_command(&mut self, raw: u8) -> bool {
        self.state.port_address.apply_sub_net_command(raw)
    }

    /// Applies an ArtAddress NetSwitch byte.
    pub fn apply_net_command(&mut self, raw: u8) -> bool {
        self.state.port_address.apply_net_command(raw)
    }

    pub fn number_of_slots(&self) -> usize {
        self.state.merger.output().len()
    }

    /// Sets how many output slots are valid, at most 512.
    pub fn set_number_of_slots(&mut self, slots: usize) {
        self.state.merger.output_mut().set_len(slots);
    }

    /// Merged level of `slot` (1 to 512); 0 outside the valid slots.
    pub fn get_slot(&self, slot: usize) -> u8 {
        slot.checked_sub(1)
            .map_or(0, |index| self.state.merger.output().get(index))
    }

    /// Sets the output level of `slot` (1 to [`ArtNetNode::number_of_slots`]).
    pub fn set_slot(&mut self, slot: usize, level: u8) -> Result<()> {
        let written = slot
            .checked_sub(1)
            .is_some_and(|index| self.state.merger.output_mut().set(index, level));
        if written {
            Ok(())
        } else {
            Err(Error::InvalidSlot(slot))
        }
    }

    /// The merged output, slot 1 first.
    pub fn dmx_data(&self) -> &[u8] {
        self.state.merger.output().as_slice()
    }

    pub fn merger(&self) -> &Merger {
        &self.state.merger
    }

    pub fn is_merging(&self) -> bool {
        self.state.merger.is_merging()
    }

    /// Forgets both merge sources, as an ArtAddress cancel-merge does.
    pub fn cancel_merge(&mut self) {
        self.state.merger.cancel();
    }

    pub fn packet_buffer(&self) -> &[u8] {
        &self.buffer[..]
    }

    pub fn packet_buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer[..]
    }

    /// Whether the packet buffer was allocated by this node.
    pub fn owns_buffer(&self) -> bool {
        self.buffer.is_owned()
    }

    /// Size of the last packet processed.
    pub fn packet_size(&self) -> usize {
        self.packet_size
    }

    pub fn short_name(&self) -> &str {
        self.state.short_name.as_str()
    }

    pub fn set_short_name(&mut self, name: &str) {
        self.state.short_name.set(name);
    }

    pub fn long_name(&self) -> &str {
        self.state.long_name.as_str()
    }

    pub fn set_long_name(&mut self, name: &str) {
        self.state.long_name.set(name);
    }

    pub fn ip_address(&self) -> Ipv4Addr {
        self.state.ip_address
    }

    pub fn subnet_mask(&self) -> Ipv4Addr {
        self.state.subnet_mask
    }

    /// Where poll replies are broadcast, if the node was given a subnet mask.
    pub fn broadcast_address(&self) -> Option<Ipv4Addr> {
        self.state.broadcast_address
    }

    pub fn status_1(&self) -> u8 {
        self.state.status_1
    }

    pub fn status_2(&self) -> u8 {
        self.state.status_2
    }

    pub fn set_status1_flag(&mut self, flag: u8, on: bool) {
        if on {
            self.state.status_1 |= flag;
        } else {
            self.state.status_1 &= !flag;
        }
    }

    pub fn set_status2_flag(&mut self, flag: u8, on: bool) {
        if on {
            self.state.status_2 |= flag;
        } else {
            self.state.status_2 &= !flag;
        }
    }

    pub fn poll_reply_counter(&self) -> u16 {
        self.state.poll_reply_counter
    }

    /// Sequence number the next outgoing ArtDmx will carry.
    pub fn sequence(&self) -> Sequence {
        self.state.sequence
    }

    /// Called after every ArtAddress is applied. Replaces any earlier callback.
    pub fn set_address_callback<F>(&mut self, callback: F)
    where
        F: FnMut() + 'a,
    {
        self.state.on_address = Some(Box::new(callback));
    }

    /// Called with the command, new IP and new subnet mask after an ArtIpProg
    /// that programs (rather than queries) the node. Replaces any earlier callback.
    pub fn set_ip_prog_callback<F>(&mut self, callback: F)
    where
        F: FnMut(IpProgCommand, Ipv4Addr, Ipv4Addr) + 'a,
    {
        self.state.on_ip_prog = Some(Box::new(callback));
    }

    /// Handles the `len` byte datagram already in the packet buffer.
    ///
    /// A malformed packet changes nothing and produces no reply. When a
    /// reply is due it has been written to the start of the packet buffer.
    pub fn process_packet(&mut self, len: usize, sender: SocketAddrV4) -> Result<Processed> {
        let len = len.min(PACKET_BUFFER_SIZE);
        let art = Art::from_slice(&self.buffer[..len])?;
        self.packet_size = len;

        let opcode = art.op_code();
        log::trace!("{:?} ({} bytes) from {}", opcode, len, sender);

        let (dmx_changed, pending) = self.state.handle(art, sender);
        self.finish(opcode, dmx_changed, pending)
    }

    /// Handles a datagram the caller already received into its own buffer.
    ///
    /// `packet` is only read, so one receive buffer can be handed to several
    /// nodes in turn; each writes its reply into its own packet buffer.
    pub fn process_packet_contents(
        &mut self,
        packet: &[u8],
        sender: SocketAddrV4,
    ) -> Result<Processed> {
        let packet = &packet[..packet.len().min(PACKET_BUFFER_SIZE)];
        let art = Art::from_slice(packet)?;
        self.packet_size = packet.len();

        let opcode = art.op_code();
        log::trace!("{:?} ({} bytes) from {}", opcode, packet.len(), sender);

        let (dmx_changed, pending) = self.state.handle(art, sender);
        self.finish(opcode, dmx_changed, pending)
    }

    fn finish(
        &mut self,
        opcode: Opcode,
        dmx_changed: bool,
        pending: Option<PendingReply>,
    ) -> Result<Processed> {
        let reply = match pending {
            Some(PendingReply::PollReply(destination)) => Some(Reply {
                len: self.build_poll_reply()?,
                destination,
            }),
            Some(PendingReply::IpProgReply(destination)) => Some(Reply {
                len: self.build_ip_prog_reply()?,
                destination,
            }),
            None => None,
        };

        Ok(Processed {
            opcode,
            dmx_changed,
            reply,
        })
    }

    /// Receives and handles one datagram, sending any reply.
    ///
    /// Returns `None` when nothing was waiting or the datagram was dropped as
    /// malformed.
    pub fn read_packet<T: Transport>(
        &mut self,
        transport: &mut T,
    ) -> core::result::Result<Option<Processed>, NodeError<T::Error>> {
        let Some((len, sender)) = transport
            .receive(&mut self.buffer[..])
            .map_err(NodeError::Transport)?
        else {
            return Ok(None);
        };

        let processed = match self.process_packet(len, sender) {
            Ok(processed) => processed,
            Err(err) if err.is_malformed() || matches!(err, Error::UnsupportedProtocolVersion(_)) => {
                log::warn!("dropping packet from {}: {}", sender, err);
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        if let Some(reply) = processed.reply {
            transport
                .send(&self.buffer[..reply.len], reply.destination)
                .map_err(NodeError::Transport)?;
        }

        Ok(Some(processed))
    }

    /// Like [`ArtNetNode::read_packet`], but only reports whether the output changed.
    pub fn read_dmx_packet<T: Transport>(
        &mut self,
        transport: &mut T,
    ) -> core::result::Result<bool, NodeError<T::Error>> {
        Ok(self
            .read_packet(transport)?
            .is_some_and(|processed| processed.dmx_changed))
    }

    /// Writes an ArtDmx with the output slots into the packet buffer and
    /// advances the sequence number.
    ///
    /// The slot count on the wire is even and at least 2; padding slots are 0.
    pub fn encode_dmx(&mut self) -> Result<usize> {
        let state = &mut self.state;
        let output = state.merger.output();
        let len = (output.len() + output.len() % 2).max(2);
        let dmx = Dmx {
            sequence: Some(state.sequence),
            physical: 0,
            port_address: state.port_address,
            data: &output.slots()[..len],
        };
        let len = dmx.serialize(&mut self.buffer[..])?;
        state.sequence.increment();

        Ok(len)
    }

    pub fn send_dmx<T: Transport>(
        &mut self,
        transport: &mut T,
        destination: SocketAddrV4,
    ) -> core::result::Result<usize, NodeError<T::Error>> {
        let len = self.encode_dmx()?;
        transport
            .send(&self.buffer[..len], destination)
            .map_err(NodeError::Transport)?;
        Ok(len)
    }

    /// Writes an ArtPollReply into the packet buffer, advancing the reply counter.
    pub fn build_poll_reply(&mut self) -> Result<usize> {
        let state = &mut self.state;
        state.poll_reply_counter = state.poll_reply_counter.wrapping_add(1);

        let mut node_report = FixedStr::<{ NODE_REPORT_LENGTH - 1 }>::new();
        // RcPowerOk; the report text is cut to fit
        let _ = write!(
            node_report,
            "#0001 [{:04}] OK",
            state.poll_reply_counter % 10000
        );

        state
            .poll_reply(node_report.as_str())
            .serialize(&mut self.buffer[..])
    }

    /// Writes an ArtIpProgReply with the current IP settings into the packet buffer.
    pub fn build_ip_prog_reply(&mut self) -> Result<usize> {
        let status = if self.state.status_2 & codes::STATUS2_DHCP_USED != 0 {
            codes::IP_PROG_REPLY_DHCP
        } else {
            0
        };
        let reply = IpProgReply {
            ip_address: self.state.ip_address,
            subnet_mask: self.state.subnet_mask,
            port: PORT,
            status,
        };
        reply.serialize(&mut self.buffer[..])
    }

    /// Sends an ArtPollReply to `poller`, or to the broadcast address when
    /// the node has one.
    pub fn send_poll_reply<T: Transport>(
        &mut self,
        transport: &mut T,
        poller: SocketAddrV4,
    ) -> core::result::Result<(), NodeError<T::Error>> {
        let len = self.build_poll_reply()?;
        let destination = self.state.poll_reply_destination(poller);
        transport
            .send(&self.buffer[..len], destination)
            .map_err(NodeError::Transport)
    }
}
