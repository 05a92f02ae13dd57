//! Byte-order accessor
//!
//! The code stream is big-endian no matter which host runs it. `HostOrder`
//! models a host's native load of raw stream bytes so the normalization can be
//! checked for both orders on any machine.

#[inline]
pub fn read_u32(bytes: [u8; 4]) -> u32 {
    u32::from_be_bytes(bytes)
}

#[inline]
pub fn read_u16(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

#[inline]
pub fn read_u8(bytes: [u8; 1]) -> u8 {
    bytes[0]
}

#[inline]
pub fn write_u32_be(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

#[inline]
pub fn write_u16_be(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}

/// Native byte order of a host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostOrder {
    Big,
    Little,
}

impl HostOrder {
    /// Order of the machine running this code
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            HostOrder::Big
        } else {
            HostOrder::Little
        }
    }

    /// Interpret raw stream bytes the way this host's load instruction would
    pub fn load_u32(self, raw: [u8; 4]) -> u32 {
        match self {
            HostOrder::Big => u32::from_be_bytes(raw),
            HostOrder::Little => u32::from_le_bytes(raw),
        }
    }

    /// Turn a natively loaded word into its big-endian stream value
    pub fn to_big_endian(self, native: u32) -> u32 {
        match self {
            HostOrder::Big => native,
            HostOrder::Little => native.swap_bytes(),
        }
    }

    /// Bytes this host's store instruction would produce for a native word
    pub fn store_u32(self, native: u32) -> [u8; 4] {
        match self {
            HostOrder::Big => native.to_be_bytes(),
            HostOrder::Little => native.to_le_bytes(),
        }
    }
}
