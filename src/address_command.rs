use byte::BytesExt;
use nom::number::complete as number;
use nom::IResult;

use crate::codes::{self, ADDRESS_NO_CHANGE, ADDRESS_SIZE, LONG_NAME_LENGTH, SHORT_NAME_LENGTH};
use crate::error::Result;
use crate::{ensure_capacity, parse_padded_str, put_header, put_padded_str, take_array, Opcode};

/// The Command field of an ArtAddress.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum AddressCommand {
    None,
    /// Forget both merge sources.
    CancelMerge,
    LedNormal,
    LedMute,
    LedLocate,
    /// Recognised by Art-Net but not acted on by this node.
    Other(u8),
}

impl From<u8> for AddressCommand {
    fn from(value: u8) -> Self {
        match value {
            codes::ADDRESS_COMMAND_NONE => AddressCommand::None,
            codes::ADDRESS_COMMAND_CANCEL_MERGE => AddressCommand::CancelMerge,
            codes::ADDRESS_COMMAND_LED_NORMAL => AddressCommand::LedNormal,
            codes::ADDRESS_COMMAND_LED_MUTE => AddressCommand::LedMute,
            codes::ADDRESS_COMMAND_LED_LOCATE => AddressCommand::LedLocate,
            other => AddressCommand::Other(other),
        }
    }
}

impl From<AddressCommand> for u8 {
    fn from(value: AddressCommand) -> Self {
        match value {
            AddressCommand::None => codes::ADDRESS_COMMAND_NONE,
            AddressCommand::CancelMerge => codes::ADDRESS_COMMAND_CANCEL_MERGE,
            AddressCommand::LedNormal => codes::ADDRESS_COMMAND_LED_NORMAL,
            AddressCommand::LedMute => codes::ADDRESS_COMMAND_LED_MUTE,
            AddressCommand::LedLocate => codes::ADDRESS_COMMAND_LED_LOCATE,
            AddressCommand::Other(other) => other,
        }
    }
}

/// ArtAddress: remote programming of a node's names and Port-Address.
///
/// The switch fields hold raw bytes; see [`crate::AddressUpdate`] for how a
/// node interprets them. Empty names mean "keep the current name".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address<'a> {
    pub net_switch: u8,
    pub bind_index: u8,
    pub short_name: &'a str,
    pub long_name: &'a str,
    pub swin: [u8; 4],
    pub swout: [u8; 4],
    pub sub_switch: u8,
    pub sw_video: u8,
    pub command: AddressCommand,
}

impl<'a> Default for Address<'a> {
    fn default() -> Self {
        Self {
            net_switch: ADDRESS_NO_CHANGE,
            bind_index: 1,
            short_name: "",
            long_name: "",
            swin: [ADDRESS_NO_CHANGE; 4],
            swout: [ADDRESS_NO_CHANGE; 4],
            sub_switch: ADDRESS_NO_CHANGE,
            sw_video: 0,
            command: AddressCommand::None,
        }
    }
}

impl<'a> Address<'a> {
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize> {
        ensure_capacity(buf, ADDRESS_SIZE)?;

        let offset = &mut 0;
        put_header(offset, buf, Opcode::Address)?;
        buf.write::<u8>(offset, self.net_switch)?;
        buf.write::<u8>(offset, self.bind_index)?;
        put_padded_str::<SHORT_NAME_LENGTH>(offset, buf, self.short_name)?;
        put_padded_str::<LONG_NAME_LENGTH>(offset, buf, self.long_name)?;
        buf.write::<&[u8]>(offset, &self.swin)?;
        buf.write::<&[u8]>(offset, &self.swout)?;
        buf.write::<u8>(offset, self.sub_switch)?;
        buf.write::<u8>(offset, self.sw_video)?;
        buf.write::<u8>(offset, self.command.into())?;

        Ok(*offset)
    }
}

fn address(s: &[u8]) -> IResult<&[u8], Address<'_>> {
    let (s, net_switch) = number::u8(s)?;
    let (s, bind_index) = number::u8(s)?;
    let (s, short_name) = parse_padded_str::<SHORT_NAME_LENGTH>(s)?;
    let (s, long_name) = parse_padded_str::<LONG_NAME_LENGTH>(s)?;
    let (s, swin) = take_array::<4>(s)?;
    let (s, swout) = take_array::<4>(s)?;
    let (s, sub_switch) = number::u8(s)?;
    let (s, sw_video) = number::u8(s)?;
    let (s, command) = number::u8(s)?;

    Ok((
        s,
        Address {
            net_switch,
            bind_index,
            short_name,
            long_name,
            swin,
            swout,
            sub_switch,
            sw_video,
            command: command.into(),
        },
    ))
}

/// Parses the ArtAddress body that follows the protocol version.
pub(crate) fn parse_address(s: &[u8]) -> Result<Address<'_>> {
    let (_, address) = address(s)?;
    Ok(address)
}
