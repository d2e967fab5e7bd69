//! Control codes and the two-byte control sequences built from them
//!
//! Every control sequence on the wire is DLE followed by one code byte.

/// Start of text, opens a frame after DLE
pub const STX: u8 = 0x02;
/// End of text, closes a frame after DLE
pub const ETX: u8 = 0x03;
/// Enquiry, the line bid
pub const ENQ: u8 = 0x05;
/// Positive acknowledge
pub const ACK: u8 = 0x06;
/// Data link escape, prefixes every control code
pub const DLE: u8 = 0x10;
/// Negative acknowledge
pub const NAK: u8 = 0x15;

/// Acknowledge sequence
pub const DLE_ACK: [u8; 2] = [DLE, ACK];
/// Negative-acknowledge sequence
pub const DLE_NAK: [u8; 2] = [DLE, NAK];
/// Frame start sequence
pub const DLE_STX: [u8; 2] = [DLE, STX];
/// Frame end sequence
pub const DLE_ETX: [u8; 2] = [DLE, ETX];
/// Line bid sequence
pub const DLE_ENQ: [u8; 2] = [DLE, ENQ];
