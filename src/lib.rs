//! A `no_std` Art-Net 4 node.
//!
//! Implemented:
//!
//! ✓ Node Discovery:
//!     ✓ ArtPoll: Parser, Serialization (targeted mode included)
//!     ✓ ArtPollReply: Parser, Serialization
//! ✓ DMX Lighting Control:
//!     ✓ ArtDmx: Parser, Serialization
//!     ✓ Two-source HTP merge
//! ✓ Re-Programming:
//!     ✓ ArtAddress: Parser, Serialization
//!     ✓ ArtIpProg: Parser, Serialization
//!     ✓ ArtIpProgReply: Parser, Serialization
//!
//! The [`ArtNetNode`] engine ties the codec to a [`Transport`]: feed it
//! datagrams and it keeps the merged DMX output, the Port-Address and the
//! node identity up to date, answering polls and programming requests.
//!
//! ArtNet 4 Spec: https://artisticlicence.com/WebSiteMaster/User%20Guides/art-net.pdf
#![cfg_attr(all(not(test), not(feature = "std")), no_std)]

extern crate alloc;

pub mod codes;

mod address;
mod address_command;
mod dmx;
mod error;
mod ip_prog;
mod merge;
mod name;
mod node;
mod poll;
mod poll_reply;
mod transport;

pub use address::*;
pub use address_command::*;
pub use dmx::*;
pub use error::{Error, Result};
pub use ip_prog::*;
pub use merge::*;
pub use node::*;
pub use poll::*;
pub use poll_reply::*;
pub use transport::*;

use byte::{BytesExt, BE, LE};
use core::ops::Deref;

use nom::{
    bytes::complete::tag,
    number::complete as number,
    number::complete::{be_u16, le_u16},
    sequence::tuple,
    IResult,
};

const ID: &[u8] = b"Art-Net\0";
pub const PORT: u16 = 0x1936;

pub const PROTOCOL_VERSION: u16 = 14;

/// The op code of a packet whose signature checked out.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Opcode {
    Poll,
    PollReply,
    Dmx,
    Address,
    IpProg,
    IpProgReply,
    /// A valid Art-Net header carrying an op code this node does not handle.
    Unsupported(u16),
}

impl Opcode {
    pub fn from_u16(code: u16) -> Self {
        match code {
            codes::OP_POLL => Opcode::Poll,
            codes::OP_POLL_REPLY => Opcode::PollReply,
            codes::OP_DMX => Opcode::Dmx,
            codes::OP_ADDRESS => Opcode::Address,
            codes::OP_IP_PROG => Opcode::IpProg,
            codes::OP_IP_PROG_REPLY => Opcode::IpProgReply,
            other => Opcode::Unsupported(other),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            Opcode::Poll => codes::OP_POLL,
            Opcode::PollReply => codes::OP_POLL_REPLY,
            Opcode::Dmx => codes::OP_DMX,
            Opcode::Address => codes::OP_ADDRESS,
            Opcode::IpProg => codes::OP_IP_PROG,
            Opcode::IpProgReply => codes::OP_IP_PROG_REPLY,
            Opcode::Unsupported(code) => *code,
        }
    }

    /// Smallest packet, header included, that can carry this op code.
    pub fn min_size(&self) -> usize {
        match self {
            Opcode::Poll => codes::POLL_MIN_SIZE,
            Opcode::PollReply => poll_reply::POLL_REPLY_MIN_SIZE,
            Opcode::Dmx => codes::DMX_HEADER_SIZE,
            Opcode::Address => codes::ADDRESS_SIZE,
            Opcode::IpProg => codes::IP_PROG_SIZE,
            Opcode::IpProgReply => codes::IP_PROG_REPLY_SIZE,
            Opcode::Unsupported(_) => 10,
        }
    }
}

/// Checks the signature and reads the op code.
///
/// Anything that does not start with `Art-Net\0` followed by an op code is
/// rejected; an unknown op code is not an error but [`Opcode::Unsupported`].
pub fn decode(buf: &[u8]) -> Result<Opcode> {
    let (s, _) = tag::<_, _, nom::error::Error<&[u8]>>(ID)(buf)
        .map_err(|_| Error::InvalidSignature)?;
    let (_, op_code) = le_u16::<_, nom::error::Error<&[u8]>>(s).map_err(|_| Error::Truncated {
        opcode: 0,
        expected: 10,
        actual: buf.len(),
    })?;

    Ok(Opcode::from_u16(op_code))
}

#[derive(Debug)]
pub enum Art<'a> {
    Poll(Poll),
    PollReply(PollReply<'a>),
    Dmx(Dmx<'a>),
    Address(Address<'a>),
    IpProg(IpProg),
    IpProgReply(IpProgReply),
    Unsupported(u16),
}

impl<'a> Art<'a> {
    pub fn from_slice(buf: &'a [u8]) -> Result<Self> {
        let op_code = decode(buf)?;

        if let Opcode::Unsupported(code) = op_code {
            return Ok(Art::Unsupported(code));
        }

        let expected = op_code.min_size();
        if buf.len() < expected {
            return Err(Error::Truncated {
                opcode: op_code.code(),
                expected,
                actual: buf.len(),
            });
        }

        let s = &buf[10..];

        // ArtPollReply is the only packet without a protocol version
        if op_code == Opcode::PollReply {
            return Ok(Art::PollReply(poll_reply::parse_poll_reply(s)?));
        }

        let (s, protocol_version) = be_u16::<_, nom::error::Error<&[u8]>>(s)?;
        // Not malformed, but pre-Art-Net 4 layouts differ; the node drops
        // these the same way and never replies to them.
        if protocol_version < PROTOCOL_VERSION {
            return Err(Error::UnsupportedProtocolVersion(protocol_version));
        }

        let message = match op_code {
            Opcode::Poll => Art::Poll(poll::parse_poll(s)?),
            Opcode::Dmx => Art::Dmx(dmx::parse_dmx(s)?),
            Opcode::Address => Art::Address(address_command::parse_address(s)?),
            Opcode::IpProg => Art::IpProg(ip_prog::parse_ip_prog(s)?),
            Opcode::IpProgReply => Art::IpProgReply(ip_prog::parse_ip_prog_reply(s)?),
            Opcode::PollReply | Opcode::Unsupported(_) => unreachable!(),
        };

        Ok(message)
    }

    pub fn op_code(&self) -> Opcode {
        match self {
            Art::Poll(_) => Opcode::Poll,
            Art::PollReply(_) => Opcode::PollReply,
            Art::Dmx(_) => Opcode::Dmx,
            Art::Address(_) => Opcode::Address,
            Art::IpProg(_) => Opcode::IpProg,
            Art::IpProgReply(_) => Opcode::IpProgReply,
            Art::Unsupported(code) => Opcode::Unsupported(*code),
        }
    }

    /// Writes the packet into `buf` and returns the number of bytes used.
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize> {
        match self {
            Art::Dmx(dmx) => dmx.serialize(buf),
            Art::PollReply(reply) => reply.serialize(buf),
            Art::IpProgReply(reply) => reply.serialize(buf),
            Art::Poll(poll) => poll.serialize(buf),
            Art::Address(address) => address.serialize(buf),
            Art::IpProg(ip_prog) => ip_prog.serialize(buf),
            Art::Unsupported(_) => Ok(0),
        }
    }
}

/// Writes the signature, op code and (unless it is a poll reply) the protocol version.
pub(crate) fn put_header(offset: &mut usize, buf: &mut [u8], op_code: Opcode) -> Result<()> {
    buf.write::<&[u8]>(offset, ID)?;
    buf.write_with::<u16>(offset, op_code.code(), LE)?;
    if op_code != Opcode::PollReply {
        buf.write_with::<u16>(offset, PROTOCOL_VERSION, BE)?;
    }
    Ok(())
}

pub(crate) fn ensure_capacity(buf: &[u8], needed: usize) -> Result<()> {
    if buf.len() < needed {
        return Err(Error::BufferTooSmall {
            needed,
            available: buf.len(),
        });
    }
    Ok(())
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug)]
pub struct Sequence(u8);

impl Default for Sequence {
    fn default() -> Self {
        Self(1)
    }
}

impl Deref for Sequence {
    type Target = u8;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Sequence> for u8 {
    fn from(value: Sequence) -> Self {
        value.0
    }
}

impl core::fmt::Display for Sequence {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{}", self.0))
    }
}

impl Sequence {
    pub fn new(value: u8) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
        // 0 means "sequencing disabled" on the wire
        if self.0 == 0 {
            self.0 = 1;
        }
    }
}

/// (ESTAManLo, ESTAManHi)
pub type ESTAManufacturerCode = (char, char);

fn parse_esta_manufacturer_code(s: &[u8]) -> IResult<&[u8], ESTAManufacturerCode> {
    let (s, (lo, hi)) = tuple((number::u8, number::u8))(s)?;
    Ok((s, (lo as char, hi as char)))
}

pub fn put_esta_manufacturer_code(
    offset: &mut usize,
    buf: &mut [u8],
    manufacturer_code: &ESTAManufacturerCode,
) -> Result<()> {
    buf.write::<u8>(offset, manufacturer_code.0 as u8)?;
    buf.write::<u8>(offset, manufacturer_code.1 as u8)?;
    Ok(())
}

// Appends a Nul terminated ASCII string truncated (or padded) to N bytes
fn put_padded_str<const N: usize>(offset: &mut usize, buf: &mut [u8], input: &str) -> Result<()> {
    let mut padded_bytes = [0; N];

    let bytes = input.as_bytes();
    // Truncate to N minus 1 to leave 1 byte for the NUL character
    let truncated_bytes = if bytes.len() > N - 1 {
        &bytes[..N - 1]
    } else {
        bytes
    };

    padded_bytes[..truncated_bytes.len()].copy_from_slice(truncated_bytes);

    buf.write::<&[u8]>(offset, &padded_bytes)?;
    Ok(())
}

// Reads a fixed N byte field holding a Nul terminated string
fn parse_padded_str<const N: usize>(s: &[u8]) -> IResult<&[u8], &str> {
    let (rest, field) = nom::bytes::complete::take(N)(s)?;
    let end = field.iter().position(|&b| b == 0).unwrap_or(N);
    // keep the valid prefix of a badly encoded name rather than dropping the packet
    let text = match core::str::from_utf8(&field[..end]) {
        Ok(text) => text,
        Err(err) => core::str::from_utf8(&field[..err.valid_up_to()]).unwrap_or_default(),
    };
    Ok((rest, text))
}

// Reads a fixed N byte field into an array
fn take_array<const N: usize>(s: &[u8]) -> IResult<&[u8], [u8; N]> {
    let (s, bytes) = nom::bytes::complete::take(N)(s)?;
    let mut array = [0; N];
    array.copy_from_slice(bytes);
    Ok((s, array))
}
