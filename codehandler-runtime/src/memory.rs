//! Simulated process memory
//!
//! Sparse, byte-addressed, big-endian. Unwritten bytes read as zero. Native
//! code, system calls and foreign calls are recorded instead of executed.

use std::collections::HashMap;

use codehandler_spec::MAX_CALL_ARGUMENTS;

use crate::host::Host;

/// A recorded foreign function call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignCall {
    pub address: u32,
    pub arguments: Vec<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct SimulatedMemory {
    data: HashMap<u32, u8>,
    writes: usize,
    executed: Vec<Vec<u8>>,
    system_calls: Vec<u16>,
    calls: Vec<ForeignCall>,
    call_result: u64,
}

impl SimulatedMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload bytes without counting them as interpreter writes
    pub fn load(&mut self, address: u32, bytes: &[u8]) {
        for (offset, byte) in bytes.iter().enumerate() {
            self.store(address.wrapping_add(offset as u32), *byte);
        }
    }

    /// Read `length` consecutive bytes
    pub fn bytes(&self, address: u32, length: usize) -> Vec<u8> {
        (0..length)
            .map(|offset| self.read_u8(address.wrapping_add(offset as u32)))
            .collect()
    }

    /// Value returned by every foreign call
    pub fn set_call_result(&mut self, result: u64) {
        self.call_result = result;
    }

    /// Number of write calls received
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn executed_code(&self) -> &[Vec<u8>] {
        &self.executed
    }

    pub fn system_calls(&self) -> &[u16] {
        &self.system_calls
    }

    pub fn foreign_calls(&self) -> &[ForeignCall] {
        &self.calls
    }

    /// Number of non-zero bytes held
    pub fn resident_bytes(&self) -> usize {
        self.data.len()
    }

    fn store(&mut self, address: u32, byte: u8) {
        if byte == 0 {
            self.data.remove(&address);
        } else {
            self.data.insert(address, byte);
        }
    }

    fn load_array<const N: usize>(&self, address: u32) -> [u8; N] {
        let mut out = [0u8; N];
        for (offset, slot) in out.iter_mut().enumerate() {
            *slot = self.read_u8(address.wrapping_add(offset as u32));
        }
        out
    }
}

impl Host for SimulatedMemory {
    fn read_u8(&self, address: u32) -> u8 {
        self.data.get(&address).copied().unwrap_or(0)
    }

    fn read_u16(&self, address: u32) -> u16 {
        u16::from_be_bytes(self.load_array(address))
    }

    fn read_u32(&self, address: u32) -> u32 {
        u32::from_be_bytes(self.load_array(address))
    }

    fn write_u8(&mut self, address: u32, value: u8) {
        self.writes += 1;
        self.store(address, value);
    }

    fn write_u16(&mut self, address: u32, value: u16) {
        self.writes += 1;
        self.load(address, &value.to_be_bytes());
    }

    fn write_u32(&mut self, address: u32, value: u32) {
        self.writes += 1;
        self.load(address, &value.to_be_bytes());
    }

    fn write_bytes(&mut self, address: u32, bytes: &[u8]) {
        self.writes += 1;
        self.load(address, bytes);
    }

    fn execute_raw_instructions(&mut self, code: &[u8]) {
        tracing::trace!(bytes = code.len(), "recording native code");
        self.executed.push(code.to_vec());
    }

    fn trigger_system_call(&mut self, code: u16) {
        self.system_calls.push(code);
    }

    fn invoke_foreign_function(
        &mut self,
        address: u32,
        arguments: &[u32; MAX_CALL_ARGUMENTS],
        argument_count: usize,
    ) -> u64 {
        let count = argument_count.min(MAX_CALL_ARGUMENTS);
        self.calls.push(ForeignCall {
            address,
            arguments: arguments[..count].to_vec(),
        });
        self.call_result
    }
}
