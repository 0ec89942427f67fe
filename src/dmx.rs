use byte::{BytesExt, BE};
use nom::number::complete as number;
use nom::number::complete::be_u16;

use crate::address::{parse_port_address, PortAddress};
use crate::codes::DMX_HEADER_SIZE;
use crate::error::Result;
use crate::{ensure_capacity, put_header, Opcode, Sequence};

/// Number of slots in a DMX512 universe.
pub const DMX_UNIVERSE_SIZE: usize = 512;

#[derive(PartialEq, Eq, Debug)]
pub struct Dmx<'a> {
    /// The sequence number is used to ensure that
    /// ArtDmx packets are used in the correct order.
    /// When Art-Net is carried over a medium such as
    /// the Internet, it is possible that ArtDmx packets
    /// will reach the receiver out of order.
    ///
    /// This field is incremented in the range 0x01 to
    /// 0xff to allow the receiving node to re-sequence
    /// packets.
    ///
    /// The Sequence field is set to 0x00 to disable this
    /// feature.
    pub sequence: Option<Sequence>,
    /// The physical input port from which DMX512
    /// data was input. This field is used by the
    /// receiving device to discriminate between
    /// packets with identical Port-Address that have
    /// been generated by different input ports and so
    /// need to be merged.
    pub physical: u8,
    pub port_address: PortAddress,
    /// Slot values, slot 1 first. At most 512 entries after parsing.
    pub data: &'a [u8],
}

impl<'a> Dmx<'a> {
    /// Writes a complete ArtDmx packet. Data beyond 512 slots is not sent.
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize> {
        let data = &self.data[..self.data.len().min(DMX_UNIVERSE_SIZE)];
        ensure_capacity(buf, DMX_HEADER_SIZE + data.len())?;

        let offset = &mut 0;
        put_header(offset, buf, Opcode::Dmx)?;
        buf.write::<u8>(offset, self.sequence.map(|seq| seq.into()).unwrap_or_default())?;
        buf.write::<u8>(offset, self.physical)?;
        self.port_address.serialize(offset, buf)?;
        buf.write_with::<u16>(offset, data.len() as u16, BE)?;
        buf.write::<&[u8]>(offset, data)?;

        Ok(*offset)
    }
}

impl<'a> core::fmt::Display for Dmx<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "ArtDMX Port-Address = {} Seq: {:3} Slots: {}",
            self.port_address,
            self.sequence.map(Into::<u8>::into).unwrap_or_default(),
            self.data.len(),
        )?;
        for level in self.data.iter().take(4) {
            write!(f, " [{:3}]", level)?;
        }
        if self.data.len() > 4 {
            f.write_str(" [...]")?;
        }
        Ok(())
    }
}

/// Parses the ArtDmx body that follows the protocol version.
///
/// The declared length is clamped to 512 and to the bytes actually present,
/// so an oversized or short frame still yields whatever slots it carries.
pub(crate) fn parse_dmx(s: &[u8]) -> Result<Dmx<'_>> {
    let (s, sequence) = number::u8::<_, nom::error::Error<&[u8]>>(s)?;
    let (s, physical) = number::u8::<_, nom::error::Error<&[u8]>>(s)?;
    let (s, port_address) = parse_port_address(s)?;
    let (s, length) = be_u16::<_, nom::error::Error<&[u8]>>(s)?;

    let length = (length as usize).min(DMX_UNIVERSE_SIZE).min(s.len());
    if length != s.len() {
        log::trace!("ArtDmx length clamped to {} ({} bytes present)", length, s.len());
    }

    Ok(Dmx {
        sequence: Sequence::new(sequence),
        physical,
        port_address,
        data: &s[..length],
    })
}
