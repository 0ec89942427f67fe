use byte::{BytesExt, BE};
use core::net::Ipv4Addr;
use nom::number::complete as number;
use nom::number::complete::be_u16;
use nom::IResult;

use crate::codes::{self, IP_PROG_REPLY_SIZE, IP_PROG_SIZE};
use crate::error::Result;
use crate::{ensure_capacity, put_header, take_array, Opcode, PORT};

/// The Command byte of an ArtIpProg. Without the enable bit it is a query.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct IpProgCommand(pub u8);

impl IpProgCommand {
    pub fn is_programming(&self) -> bool {
        self.0 & codes::IP_PROG_ENABLE != 0
    }

    fn flag(&self, bit: u8) -> bool {
        self.is_programming() && self.0 & bit != 0
    }

    pub fn enable_dhcp(&self) -> bool {
        self.flag(codes::IP_PROG_DHCP)
    }

    pub fn reset_to_default(&self) -> bool {
        self.flag(codes::IP_PROG_RESET)
    }

    pub fn program_ip(&self) -> bool {
        self.flag(codes::IP_PROG_IP)
    }

    pub fn program_subnet_mask(&self) -> bool {
        self.flag(codes::IP_PROG_SUBNET_MASK)
    }

    pub fn program_port(&self) -> bool {
        self.flag(codes::IP_PROG_PORT)
    }
}

/// ArtIpProg: reprogram or query a node's IP settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpProg {
    pub command: IpProgCommand,
    pub ip_address: Ipv4Addr,
    pub subnet_mask: Ipv4Addr,
    pub port: u16,
}

impl Default for IpProg {
    fn default() -> Self {
        Self {
            command: IpProgCommand::default(),
            ip_address: Ipv4Addr::UNSPECIFIED,
            subnet_mask: Ipv4Addr::UNSPECIFIED,
            port: PORT,
        }
    }
}

impl IpProg {
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize> {
        ensure_capacity(buf, IP_PROG_SIZE)?;
        buf[..IP_PROG_SIZE].fill(0);

        let offset = &mut 0;
        put_header(offset, buf, Opcode::IpProg)?;
        // Filler1, Filler2
        *offset += 2;
        buf.write::<u8>(offset, self.command.0)?;
        // Filler4
        *offset += 1;
        buf.write::<&[u8]>(offset, &self.ip_address.octets())?;
        buf.write::<&[u8]>(offset, &self.subnet_mask.octets())?;
        buf.write_with::<u16>(offset, self.port, BE)?;

        Ok(IP_PROG_SIZE)
    }
}

fn ip_prog(s: &[u8]) -> IResult<&[u8], IpProg> {
    let (s, _filler) = take_array::<2>(s)?;
    let (s, command) = number::u8(s)?;
    let (s, _filler) = number::u8(s)?;
    let (s, ip_address) = take_array::<4>(s)?;
    let (s, subnet_mask) = take_array::<4>(s)?;
    let (s, port) = be_u16(s)?;

    Ok((
        s,
        IpProg {
            command: IpProgCommand(command),
            ip_address: Ipv4Addr::from(ip_address),
            subnet_mask: Ipv4Addr::from(subnet_mask),
            port,
        },
    ))
}

/// Parses the ArtIpProg body that follows the protocol version.
pub(crate) fn parse_ip_prog(s: &[u8]) -> Result<IpProg> {
    let (_, ip_prog) = ip_prog(s)?;
    Ok(ip_prog)
}

/// ArtIpProgReply: the node's IP settings after an ArtIpProg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpProgReply {
    pub ip_address: Ipv4Addr,
    pub subnet_mask: Ipv4Addr,
    pub port: u16,
    /// Bit 6 set when DHCP is enabled.
    pub status: u8,
}

impl IpProgReply {
    pub fn dhcp_enabled(&self) -> bool {
        self.status & codes::IP_PROG_REPLY_DHCP != 0
    }

    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize> {
        ensure_capacity(buf, IP_PROG_REPLY_SIZE)?;
        buf[..IP_PROG_REPLY_SIZE].fill(0);

        let offset = &mut 0;
        put_header(offset, buf, Opcode::IpProgReply)?;
        // Filler1..Filler4
        *offset += 4;
        buf.write::<&[u8]>(offset, &self.ip_address.octets())?;
        buf.write::<&[u8]>(offset, &self.subnet_mask.octets())?;
        buf.write_with::<u16>(offset, self.port, BE)?;
        buf.write::<u8>(offset, self.status)?;

        Ok(IP_PROG_REPLY_SIZE)
    }
}

fn ip_prog_reply(s: &[u8]) -> IResult<&[u8], IpProgReply> {
    let (s, _filler) = take_array::<4>(s)?;
    let (s, ip_address) = take_array::<4>(s)?;
    let (s, subnet_mask) = take_array::<4>(s)?;
    let (s, port) = be_u16(s)?;
    let (s, status) = number::u8(s)?;

    Ok((
        s,
        IpProgReply {
            ip_address: Ipv4Addr::from(ip_address),
            subnet_mask: Ipv4Addr::from(subnet_mask),
            port,
            status,
        },
    ))
}

/// Parses the ArtIpProgReply body that follows the protocol version.
pub(crate) fn parse_ip_prog_reply(s: &[u8]) -> Result<IpProgReply> {
    let (_, reply) = ip_prog_reply(s)?;
    Ok(reply)
}
