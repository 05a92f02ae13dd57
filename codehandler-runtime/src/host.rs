//! Host capabilities
//!
//! The interpreter never touches foreign memory itself. Everything that
//! reaches outside the VM goes through [`Host`], and the [`Access`] gate in
//! front of it turns the whole run into a dry run when memory access is
//! disabled.

use codehandler_spec::MAX_CALL_ARGUMENTS;

use crate::vm::InterpreterConfig;

/// Capabilities the interpreter consumes from the patched process.
///
/// Multi-byte reads and writes use the process's big-endian layout.
pub trait Host {
    fn read_u8(&self, address: u32) -> u8;
    fn read_u16(&self, address: u32) -> u16;
    fn read_u32(&self, address: u32) -> u32;

    fn write_u8(&mut self, address: u32, value: u8);
    fn write_u16(&mut self, address: u32, value: u16);
    fn write_u32(&mut self, address: u32, value: u32);

    /// Copy raw bytes to consecutive addresses
    fn write_bytes(&mut self, address: u32, bytes: &[u8]) {
        for (offset, byte) in bytes.iter().enumerate() {
            self.write_u8(address.wrapping_add(offset as u32), *byte);
        }
    }

    /// Run native instructions supplied by the stream
    fn execute_raw_instructions(&mut self, code: &[u8]);

    /// Trigger a console system call
    fn trigger_system_call(&mut self, code: u16);

    /// Call a foreign function with up to 8 integer arguments.
    ///
    /// Slots past `argument_count` are zero.
    fn invoke_foreign_function(
        &mut self,
        address: u32,
        arguments: &[u32; MAX_CALL_ARGUMENTS],
        argument_count: usize,
    ) -> u64;
}

/// Dry-run gate in front of a host.
///
/// With memory access enabled every call is forwarded. Disabled, reads return
/// the configured sentinel word truncated to the read width, writes and native
/// execution do nothing, and foreign calls return the sentinel result.
pub struct Access<'h, H: Host + ?Sized> {
    host: &'h mut H,
    enabled: bool,
    read_value: u32,
    call_result: u64,
}

impl<'h, H: Host + ?Sized> Access<'h, H> {
    pub fn new(host: &'h mut H, config: &InterpreterConfig) -> Self {
        Access {
            host,
            enabled: config.memory_access_enabled,
            read_value: config.dry_run_read_value,
            call_result: config.dry_run_call_result,
        }
    }

    /// Whether calls reach the host
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl<H: Host + ?Sized> Host for Access<'_, H> {
    fn read_u8(&self, address: u32) -> u8 {
        if self.enabled {
            self.host.read_u8(address)
        } else {
            self.read_value as u8
        }
    }

    fn read_u16(&self, address: u32) -> u16 {
        if self.enabled {
            self.host.read_u16(address)
        } else {
            self.read_value as u16
        }
    }

    fn read_u32(&self, address: u32) -> u32 {
        if self.enabled {
            self.host.read_u32(address)
        } else {
            self.read_value
        }
    }

    fn write_u8(&mut self, address: u32, value: u8) {
        if self.enabled {
            self.host.write_u8(address, value);
        }
    }

    fn write_u16(&mut self, address: u32, value: u16) {
        if self.enabled {
            self.host.write_u16(address, value);
        }
    }

    fn write_u32(&mut self, address: u32, value: u32) {
        if self.enabled {
            self.host.write_u32(address, value);
        }
    }

    fn write_bytes(&mut self, address: u32, bytes: &[u8]) {
        if self.enabled {
            self.host.write_bytes(address, bytes);
        }
    }

    fn execute_raw_instructions(&mut self, code: &[u8]) {
        if self.enabled {
            self.host.execute_raw_instructions(code);
        }
    }

    fn trigger_system_call(&mut self, code: u16) {
        if self.enabled {
            self.host.trigger_system_call(code);
        }
    }

    fn invoke_foreign_function(
        &mut self,
        address: u32,
        arguments: &[u32; MAX_CALL_ARGUMENTS],
        argument_count: usize,
    ) -> u64 {
        if self.enabled {
            self.host.invoke_foreign_function(address, arguments, argument_count)
        } else {
            self.call_result
        }
    }
}
