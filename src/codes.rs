//! Op codes, packet sizes and status flags from the Art-Net 4 specification.

pub const OP_POLL: u16 = 0x2000;
pub const OP_POLL_REPLY: u16 = 0x2100;
pub const OP_DMX: u16 = 0x5000;
pub const OP_ADDRESS: u16 = 0x6000;
pub const OP_IP_PROG: u16 = 0xf800;
pub const OP_IP_PROG_REPLY: u16 = 0xf900;

/// Signature, op code and protocol version.
pub const HEADER_SIZE: usize = 12;
/// Largest packet the node ever handles: an ArtDmx with 512 slots.
pub const PACKET_BUFFER_SIZE: usize = 530;
pub const DMX_HEADER_SIZE: usize = 18;
pub const POLL_MIN_SIZE: usize = 14;
pub const POLL_REPLY_SIZE: usize = 239;
pub const ADDRESS_SIZE: usize = 107;
pub const IP_PROG_SIZE: usize = 34;
pub const IP_PROG_REPLY_SIZE: usize = 34;

pub const SHORT_NAME_LENGTH: usize = 18;
pub const LONG_NAME_LENGTH: usize = 64;
pub const NODE_REPORT_LENGTH: usize = 64;

/// ArtPoll flag: only nodes inside the target Port-Address range reply.
pub const POLL_FLAG_TARGETED: u8 = 0x20;

/// ArtAddress sub-field value meaning "leave as is".
pub const ADDRESS_NO_CHANGE: u8 = 0x7f;
/// ArtAddress sub-field flag marking the low bits as a new value.
pub const ADDRESS_PROGRAM_BIT: u8 = 0x80;

pub const ADDRESS_COMMAND_NONE: u8 = 0x00;
pub const ADDRESS_COMMAND_CANCEL_MERGE: u8 = 0x01;
pub const ADDRESS_COMMAND_LED_NORMAL: u8 = 0x02;
pub const ADDRESS_COMMAND_LED_MUTE: u8 = 0x03;
pub const ADDRESS_COMMAND_LED_LOCATE: u8 = 0x04;

pub const IP_PROG_ENABLE: u8 = 0x80;
pub const IP_PROG_DHCP: u8 = 0x40;
pub const IP_PROG_RESET: u8 = 0x08;
pub const IP_PROG_IP: u8 = 0x04;
pub const IP_PROG_SUBNET_MASK: u8 = 0x02;
pub const IP_PROG_PORT: u8 = 0x01;

/// ArtIpProgReply status bit: DHCP enabled.
pub const IP_PROG_REPLY_DHCP: u8 = 0x40;

/// Status1 bits 7-6.
pub const STATUS1_INDICATOR_MASK: u8 = 0xc0;
pub const STATUS1_INDICATOR_NORMAL: u8 = 0xc0;
pub const STATUS1_INDICATOR_MUTE: u8 = 0x80;
pub const STATUS1_INDICATOR_LOCATE: u8 = 0x40;
/// Port-Address programmed over the network.
pub const STATUS1_PORT_PROG: u8 = 0x20;
pub const STATUS1_FACTORY_BOOT: u8 = 0x04;

pub const STATUS2_SACN_CAPABLE: u8 = 0x10;
/// 15-bit Port-Address support.
pub const STATUS2_ARTNET3_CAPABLE: u8 = 0x08;
pub const STATUS2_DHCP_CAPABLE: u8 = 0x04;
pub const STATUS2_DHCP_USED: u8 = 0x02;

/// PortTypes: output from Art-Net, DMX512 protocol.
pub const PORT_TYPE_DMX512_OUTPUT: u8 = 0x80;
/// GoodOutput: data is being transmitted.
pub const GOOD_OUTPUT_DATA: u8 = 0x80;
/// GoodOutput: output is merging two sources.
pub const GOOD_OUTPUT_MERGING: u8 = 0x08;

pub const STYLE_NODE: u8 = 0x00;
