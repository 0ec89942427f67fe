use byte::{BytesExt, BE};
use core::ops::RangeInclusive;
use nom::number::complete as number;
use nom::number::complete::be_u16;

use crate::codes::POLL_MIN_SIZE;
use crate::error::Result;
use crate::{ensure_capacity, put_header, Opcode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    pub flags: u8,
    pub min_diagnostic_priority: u8,
    pub target_port_addresses: RangeInclusive<u16>,
}

impl Default for Poll {
    fn default() -> Self {
        Self {
            flags: 0,
            min_diagnostic_priority: 0,
            target_port_addresses: 0..=u16::MAX,
        }
    }
}

impl Poll {
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize> {
        let targeted = self.target_port_addresses != (0..=u16::MAX);
        let size = if targeted { POLL_MIN_SIZE + 4 } else { POLL_MIN_SIZE };
        ensure_capacity(buf, size)?;

        let offset = &mut 0;
        put_header(offset, buf, Opcode::Poll)?;
        buf.write::<u8>(offset, self.flags)?;
        buf.write::<u8>(offset, self.min_diagnostic_priority)?;
        if targeted {
            // TargetPortAddressTop, then Bottom
            buf.write_with::<u16>(offset, *self.target_port_addresses.end(), BE)?;
            buf.write_with::<u16>(offset, *self.target_port_addresses.start(), BE)?;
        }

        Ok(*offset)
    }
}

pub(crate) fn parse_poll(s: &[u8]) -> Result<Poll> {
    let (s, flags) = number::u8::<_, nom::error::Error<&[u8]>>(s)?;
    let (s, min_diagnostic_priority) = number::u8::<_, nom::error::Error<&[u8]>>(s)?;

    let target_port_addresses = if s.len() >= 4 {
        let (s, target_port_top) = be_u16::<_, nom::error::Error<&[u8]>>(s)?;
        let (_s, target_port_bottom) = be_u16::<_, nom::error::Error<&[u8]>>(s)?;

        target_port_bottom..=target_port_top
    } else {
        0..=u16::MAX
    };

    Ok(Poll {
        flags,
        min_diagnostic_priority,
        target_port_addresses,
    })
}
