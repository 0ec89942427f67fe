use byte::BytesExt;
use nom::{sequence::tuple, IResult};

use crate::codes::{ADDRESS_NO_CHANGE, ADDRESS_PROGRAM_BIT};
use crate::error::{Error, Result};

const NIBBLE: u8 = 0x0f;
const NET_BITS: u8 = 0x7f;

/// One of the 32,768 possible addresses to which a DMX frame can be
/// directed. The Port-Address is a 15-bit number composed of Net+Sub-Net+Universe.
///
/// Bits:
///     | 15 | 8-14 | 4-7    | 0-3      |
///     | 0  | Net  | SubNet | Universe |
#[derive(PartialEq, Eq, Debug, Hash, Clone, Copy, Default)]
pub struct PortAddress {
    net: u8,
    sub_net: u8,
    universe: u8,
}

pub(crate) fn parse_port_address(s: &[u8]) -> IResult<&[u8], PortAddress> {
    use nom::bits::complete as bits;

    let (s, (sub_net, universe, _, net)): (&[u8], (u8, u8, u8, u8)) = nom::bits::bits(tuple((
        // Low Byte (SubUni)
        bits::take::<&[u8], u8, usize, nom::error::Error<(&[u8], usize)>>(4usize),
        bits::take(4usize),
        // High Byte (Net)
        bits::take(1usize),
        bits::take(7usize),
    )))(s)?;

    Ok((
        s,
        PortAddress {
            net,
            sub_net,
            universe,
        },
    ))
}

impl PortAddress {
    pub fn new(net: u8, sub_net: u8, universe: u8) -> Result<Self> {
        let mut address = Self::default();
        address.set_net(net)?;
        address.set_sub_net(sub_net)?;
        address.set_universe(universe)?;
        Ok(address)
    }

    /// Builds an address from its wire bytes; the reserved top bit of `hi` is dropped.
    pub fn from_bytes(lo: u8, hi: u8) -> Self {
        Self {
            net: hi & NET_BITS,
            sub_net: lo >> 4,
            universe: lo & NIBBLE,
        }
    }

    /// `(SubUni, Net)` as sent over the wire.
    pub fn to_bytes(&self) -> (u8, u8) {
        ((self.sub_net << 4) | self.universe, self.net)
    }

    /// The full 15-bit Port-Address.
    pub fn as_u16(&self) -> u16 {
        let (lo, hi) = self.to_bytes();
        u16::from_be_bytes([hi, lo])
    }

    pub(crate) fn serialize(&self, offset: &mut usize, buf: &mut [u8]) -> Result<()> {
        let (lo, hi) = self.to_bytes();
        buf.write::<u8>(offset, lo)?;
        buf.write::<u8>(offset, hi)?;
        Ok(())
    }

    pub fn net(&self) -> u8 {
        self.net
    }

    pub fn sub_net(&self) -> u8 {
        self.sub_net
    }

    pub fn universe(&self) -> u8 {
        self.universe
    }

    pub fn set_net(&mut self, net: u8) -> Result<()> {
        if net > NET_BITS {
            return Err(Error::InvalidNet(net));
        }
        self.net = net;
        Ok(())
    }

    pub fn set_sub_net(&mut self, sub_net: u8) -> Result<()> {
        if sub_net > NIBBLE {
            return Err(Error::InvalidSubnet(sub_net));
        }
        self.sub_net = sub_net;
        Ok(())
    }

    pub fn set_universe(&mut self, universe: u8) -> Result<()> {
        if universe > NIBBLE {
            return Err(Error::InvalidUniverse(universe));
        }
        self.universe = universe;
        Ok(())
    }

    /// Applies an ArtAddress SwOut byte to the universe. Returns true if it changed.
    pub fn apply_universe_command(&mut self, raw: u8) -> bool {
        AddressUpdate::from_nibble(raw).apply(&mut self.universe)
    }

    /// Applies an ArtAddress SubSwitch byte to the subnet. Returns true if it changed.
    pub fn apply_sub_net_command(&mut self, raw: u8) -> bool {
        AddressUpdate::from_nibble(raw).apply(&mut self.sub_net)
    }

    /// Applies an ArtAddress NetSwitch byte to the net. Returns true if it changed.
    pub fn apply_net_command(&mut self, raw: u8) -> bool {
        AddressUpdate::from_net(raw).apply(&mut self.net)
    }
}

impl core::fmt::Display for PortAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}:{}", self.net, self.sub_net, self.universe)
    }
}

/// A decoded ArtAddress switch byte.
///
/// `0x7f` leaves the field alone, a byte with the top bit set carries a new
/// value in its low bits, and anything else (e.g. `0x00`, "reset to the
/// physical switch") is ignored by this node.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum AddressUpdate {
    NoChange,
    SetTo(u8),
    Ignore,
}

impl AddressUpdate {
    fn decode(raw: u8, mask: u8) -> Self {
        if raw == ADDRESS_NO_CHANGE {
            AddressUpdate::NoChange
        } else if raw & ADDRESS_PROGRAM_BIT != 0 {
            AddressUpdate::SetTo(raw & mask)
        } else {
            AddressUpdate::Ignore
        }
    }

    /// Decodes a universe or subnet switch (4 value bits).
    pub fn from_nibble(raw: u8) -> Self {
        Self::decode(raw, NIBBLE)
    }

    /// Decodes a net switch (7 value bits).
    pub fn from_net(raw: u8) -> Self {
        Self::decode(raw, NET_BITS)
    }

    fn apply(self, field: &mut u8) -> bool {
        match self {
            AddressUpdate::SetTo(value) if *field != value => {
                *field = value;
                true
            }
            _ => false,
        }
    }
}
