//! Transfer buffer over the module's linear memory
//!
//! Input and output share one region starting at address 0. The host writes
//! the input there, the module overwrites it with the output. Views into the
//! memory are always taken fresh from the store because growth (by the host
//! before a call, or by the module during one) invalidates earlier slices.

use crate::abi::{pages_for, TRANSFER_ADDR, WASM_PAGE_SIZE};
use crate::error::{TransformError, TransformResult};
use wasmtime::{AsContext, AsContextMut, Memory};

/// Fixed-origin exchange region inside an instance's memory
#[derive(Debug, Clone, Copy)]
pub struct TransferBuffer {
    memory: Memory,
    /// Largest input accepted, in bytes
    limit: usize,
}

impl TransferBuffer {
    pub fn new(memory: Memory, limit: usize) -> Self {
        Self { memory, limit }
    }

    /// Current memory size in bytes
    pub fn capacity(&self, store: &impl AsContext) -> usize {
        self.memory.data_size(store)
    }

    /// Grow memory in whole pages until `len` bytes fit at the origin
    pub fn ensure_capacity(
        &self,
        store: &mut impl AsContextMut,
        len: usize,
    ) -> TransformResult<()> {
        if len > self.limit {
            return Err(TransformError::InputTooLarge {
                len,
                limit: self.limit,
            });
        }

        let current = self.memory.data_size(&*store);
        if len <= current {
            return Ok(());
        }

        let additional = pages_for(len) - (current / WASM_PAGE_SIZE) as u64;
        tracing::debug!(
            "Growing transfer buffer by {} pages for {} byte input",
            additional,
            len
        );
        self.memory
            .grow(&mut *store, additional)
            .map_err(|_e| TransformError::InputTooLarge {
                len,
                limit: self.limit,
            })?;
        Ok(())
    }

    /// Write `input` at the origin and return the number of bytes written
    pub fn write_input(&self, store: &mut impl AsContextMut, input: &str) -> TransformResult<u32> {
        let bytes = input.as_bytes();
        self.ensure_capacity(store, bytes.len())?;

        let len = u32::try_from(bytes.len()).map_err(|_e| TransformError::InputTooLarge {
            len: bytes.len(),
            limit: u32::MAX as usize,
        })?;

        let start = TRANSFER_ADDR as usize;
        let data = self.memory.data_mut(store.as_context_mut());
        data[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(len)
    }

    /// Copy `len` output bytes from the origin
    pub fn read_output(&self, store: &impl AsContext, len: u32) -> TransformResult<Vec<u8>> {
        let data = self.memory.data(store.as_context());
        let start = TRANSFER_ADDR as usize;
        let end = start.checked_add(len as usize).ok_or_else(|| {
            TransformError::memory_access("Memory address overflow")
        })?;

        if end > data.len() {
            return Err(TransformError::memory_access(format!(
                "Output length {} exceeds memory size {}",
                len,
                data.len()
            )));
        }

        Ok(data[start..end].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasmtime::{Engine, MemoryType, Store};

    fn buffer_with(pages: u32, max: Option<u32>, limit: usize) -> (Store<()>, TransferBuffer) {
        let engine = Engine::default();
        let mut store = Store::new(&engine, ());
        let memory = Memory::new(&mut store, MemoryType::new(pages, max)).unwrap();
        (store, TransferBuffer::new(memory, limit))
    }

    #[test]
    fn test_write_then_read() {
        let (mut store, buffer) = buffer_with(1, None, 1 << 20);
        let written = buffer.write_input(&mut store, "héllo").unwrap();
        assert_eq!(written, 6);
        let bytes = buffer.read_output(&store, written).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "héllo");
    }

    #[test]
    fn test_grows_for_large_input() {
        let (mut store, buffer) = buffer_with(1, None, 1 << 20);
        let input = "x".repeat(WASM_PAGE_SIZE * 2 + 1);
        buffer.write_input(&mut store, &input).unwrap();
        assert_eq!(buffer.capacity(&store), WASM_PAGE_SIZE * 3);
    }

    #[test]
    fn test_rejects_input_over_limit() {
        let (mut store, buffer) = buffer_with(1, None, 16);
        let err = buffer.write_input(&mut store, &"x".repeat(17)).unwrap_err();
        assert!(matches!(err, TransformError::InputTooLarge { len: 17, limit: 16 }));
    }

    #[test]
    fn test_grow_failure_is_reported() {
        let (mut store, buffer) = buffer_with(1, Some(1), 1 << 20);
        let err = buffer
            .write_input(&mut store, &"x".repeat(WASM_PAGE_SIZE + 1))
            .unwrap_err();
        assert!(matches!(
            err,
            TransformError::InputTooLarge { len, limit: 1_048_576 } if len == WASM_PAGE_SIZE + 1
        ));
    }

    #[test]
    fn test_read_out_of_bounds() {
        let (store, buffer) = buffer_with(1, None, 1 << 20);
        let err = buffer
            .read_output(&store, WASM_PAGE_SIZE as u32 + 1)
            .unwrap_err();
        assert!(matches!(err, TransformError::MemoryAccess { .. }));
    }

    #[test]
    fn test_empty_input() {
        let (mut store, buffer) = buffer_with(1, None, 1 << 20);
        assert_eq!(buffer.write_input(&mut store, "").unwrap(), 0);
        assert!(buffer.read_output(&store, 0).unwrap().is_empty());
    }
}
