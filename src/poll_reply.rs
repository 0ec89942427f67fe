use byte::{BytesExt, BE, LE};
use nom::number::complete as number;
use nom::number::complete::{be_u16, le_u16};
use nom::IResult;

use crate::address::PortAddress;
use crate::codes::{
    self, LONG_NAME_LENGTH, NODE_REPORT_LENGTH, POLL_REPLY_SIZE, SHORT_NAME_LENGTH,
};
use crate::error::Result;
use crate::{
    ensure_capacity, parse_esta_manufacturer_code, parse_padded_str, put_esta_manufacturer_code,
    put_header, put_padded_str, take_array, ESTAManufacturerCode, Opcode, PORT,
};

/// Art-Net 3 replies end after Status2; newer fields are optional when parsing.
pub(crate) const POLL_REPLY_MIN_SIZE: usize = 213;

/// An ArtPollReply. Serialized as the full 239-byte Art-Net 4 layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReply<'a> {
    pub ip_address: [u8; 4],
    pub port: u16,
    pub firmware_version: u16,
    /// Bits 14-8 of the Port-Address.
    pub net_switch: u8,
    /// Bits 7-4 of the Port-Address.
    pub sub_switch: u8,
    pub oem: u16,
    pub ubea_version: u8,
    pub status_1: u8,
    pub esta_manufacturer: ESTAManufacturerCode,
    pub short_name: &'a str,
    pub long_name: &'a str,
    /// `#xxxx [yyyy] text`: status code, poll reply counter and free text.
    pub node_report: &'a str,
    pub num_ports: u16,
    pub port_types: [u8; 4],
    pub good_input: [u8; 4],
    pub good_output_a: [u8; 4],
    /// Bits 3-0 of the Port-Address for each input.
    pub swin: [u8; 4],
    /// Bits 3-0 of the Port-Address for each output.
    pub swout: [u8; 4],
    pub sw_video: u8,
    pub sw_macro: u8,
    pub sw_remote: u8,
    pub style: u8,
    pub mac_address: [u8; 6],
    pub bind_ip_address: [u8; 4],
    pub bind_index: u8,
    pub status_2: u8,
}

impl<'a> Default for PollReply<'a> {
    fn default() -> Self {
        Self {
            ip_address: [0; 4],
            port: PORT,
            firmware_version: 0,
            net_switch: 0,
            sub_switch: 0,
            oem: 0xffff,
            ubea_version: 0,
            status_1: 0,
            esta_manufacturer: ('\0', '\0'),
            short_name: "",
            long_name: "",
            node_report: "",
            num_ports: 0,
            port_types: [0; 4],
            good_input: [0; 4],
            good_output_a: [0; 4],
            swin: [0; 4],
            swout: [0; 4],
            sw_video: 0,
            sw_macro: 0,
            sw_remote: 0,
            style: codes::STYLE_NODE,
            mac_address: [0; 6],
            bind_ip_address: [0; 4],
            bind_index: 1,
            status_2: 0,
        }
    }
}

impl<'a> PollReply<'a> {
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize> {
        ensure_capacity(buf, POLL_REPLY_SIZE)?;
        buf[..POLL_REPLY_SIZE].fill(0);

        let offset = &mut 0;
        put_header(offset, buf, Opcode::PollReply)?;
        buf.write::<&[u8]>(offset, &self.ip_address)?;
        buf.write_with::<u16>(offset, self.port, LE)?;
        buf.write_with::<u16>(offset, self.firmware_version, BE)?;
        buf.write::<u8>(offset, self.net_switch)?;
        buf.write::<u8>(offset, self.sub_switch)?;
        buf.write_with::<u16>(offset, self.oem, BE)?;
        buf.write::<u8>(offset, self.ubea_version)?;
        buf.write::<u8>(offset, self.status_1)?;
        put_esta_manufacturer_code(offset, buf, &self.esta_manufacturer)?;
        put_padded_str::<SHORT_NAME_LENGTH>(offset, buf, self.short_name)?;
        put_padded_str::<LONG_NAME_LENGTH>(offset, buf, self.long_name)?;
        put_padded_str::<NODE_REPORT_LENGTH>(offset, buf, self.node_report)?;
        buf.write_with::<u16>(offset, self.num_ports, BE)?;
        buf.write::<&[u8]>(offset, &self.port_types)?;
        buf.write::<&[u8]>(offset, &self.good_input)?;
        buf.write::<&[u8]>(offset, &self.good_output_a)?;
        buf.write::<&[u8]>(offset, &self.swin)?;
        buf.write::<&[u8]>(offset, &self.swout)?;
        buf.write::<u8>(offset, self.sw_video)?;
        buf.write::<u8>(offset, self.sw_macro)?;
        buf.write::<u8>(offset, self.sw_remote)?;
        // Spare
        *offset += 3;
        buf.write::<u8>(offset, self.style)?;
        buf.write::<&[u8]>(offset, &self.mac_address)?;
        buf.write::<&[u8]>(offset, &self.bind_ip_address)?;
        buf.write::<u8>(offset, self.bind_index)?;
        buf.write::<u8>(offset, self.status_2)?;

        // Art-Net 4 extensions and filler stay zeroed
        Ok(POLL_REPLY_SIZE)
    }

    /// The Port-Address served by output `port` (0..4).
    pub fn port_address(&self, port: usize) -> PortAddress {
        let universe = self.swout.get(port).copied().unwrap_or_default() & 0x0f;
        PortAddress::from_bytes((self.sub_switch << 4) | universe, self.net_switch)
    }
}

fn poll_reply(s: &[u8]) -> IResult<&[u8], PollReply<'_>> {
    let (s, ip_address) = take_array::<4>(s)?;
    let (s, port) = le_u16(s)?;
    let (s, firmware_version) = be_u16(s)?;
    let (s, net_switch) = number::u8(s)?;
    let (s, sub_switch) = number::u8(s)?;
    let (s, oem) = be_u16(s)?;
    let (s, ubea_version) = number::u8(s)?;
    let (s, status_1) = number::u8(s)?;
    let (s, esta_manufacturer) = parse_esta_manufacturer_code(s)?;
    let (s, short_name) = parse_padded_str::<SHORT_NAME_LENGTH>(s)?;
    let (s, long_name) = parse_padded_str::<LONG_NAME_LENGTH>(s)?;
    let (s, node_report) = parse_padded_str::<NODE_REPORT_LENGTH>(s)?;
    let (s, num_ports) = be_u16(s)?;
    let (s, port_types) = take_array::<4>(s)?;
    let (s, good_input) = take_array::<4>(s)?;
    let (s, good_output_a) = take_array::<4>(s)?;
    let (s, swin) = take_array::<4>(s)?;
    let (s, swout) = take_array::<4>(s)?;
    let (s, sw_video) = number::u8(s)?;
    let (s, sw_macro) = number::u8(s)?;
    let (s, sw_remote) = number::u8(s)?;
    let (s, _spare) = take_array::<3>(s)?;
    let (s, style) = number::u8(s)?;
    let (s, mac_address) = take_array::<6>(s)?;
    let (s, bind_ip_address) = take_array::<4>(s)?;
    let (s, bind_index) = number::u8(s)?;
    let (s, status_2) = number::u8(s)?;

    Ok((
        s,
        PollReply {
            ip_address,
            port,
            firmware_version,
            net_switch,
            sub_switch,
            oem,
            ubea_version,
            status_1,
            esta_manufacturer,
            short_name,
            long_name,
            node_report,
            num_ports,
            port_types,
            good_input,
            good_output_a,
            swin,
            swout,
            sw_video,
            sw_macro,
            sw_remote,
            style,
            mac_address,
            bind_ip_address,
            bind_index,
            status_2,
        },
    ))
}

/// Parses the ArtPollReply body that follows the op code.
pub(crate) fn parse_poll_reply(s: &[u8]) -> Result<PollReply<'_>> {
    let (_, reply) = poll_reply(s)?;
    Ok(reply)
}
