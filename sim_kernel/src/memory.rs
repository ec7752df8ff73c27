//! Simulated guest RAM

use kernel_api::{GuestMemory, KernelError};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One contiguous block of guest memory mapped at `base`
#[derive(Debug)]
pub struct GuestRam {
    base: u64,
    bytes: Mutex<Vec<u8>>,
}

impl GuestRam {
    /// Creates zeroed RAM of `size` bytes starting at guest address `base`
    pub fn new(base: u64, size: usize) -> Self {
        Self {
            base,
            bytes: Mutex::new(vec![0; size]),
        }
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn size(&self) -> usize {
        self.lock().len()
    }

    /// Converts a guest range to an offset into the backing store
    fn offset(&self, address: u64, length: usize, size: usize) -> Result<usize, KernelError> {
        let invalid = || KernelError::InvalidAddress { address, length };
        let offset = address
            .checked_sub(self.base)
            .and_then(|offset| usize::try_from(offset).ok())
            .ok_or_else(invalid)?;
        let end = offset.checked_add(length).ok_or_else(invalid)?;
        if end > size {
            return Err(invalid());
        }
        Ok(offset)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GuestMemory for GuestRam {
    fn read_bytes(&self, address: u64, length: usize) -> Result<Vec<u8>, KernelError> {
        let bytes = self.lock();
        let offset = self.offset(address, length, bytes.len())?;
        Ok(bytes[offset..offset + length].to_vec())
    }

    fn write_bytes(&self, address: u64, data: &[u8]) -> Result<(), KernelError> {
        let mut bytes = self.lock();
        let offset = self.offset(address, data.len(), bytes.len())?;
        bytes[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let ram = GuestRam::new(0x8000_0000, 0x100);
        ram.write_bytes(0x8000_0010, &[1, 2, 3]).unwrap();
        assert_eq!(ram.read_bytes(0x8000_000f, 5).unwrap(), vec![0, 1, 2, 3, 0]);
    }

    #[test]
    fn test_out_of_range() {
        let ram = GuestRam::new(0x1000, 0x10);

        assert_eq!(
            ram.read_bytes(0xfff, 1),
            Err(KernelError::InvalidAddress {
                address: 0xfff,
                length: 1
            })
        );
        assert!(ram.read_bytes(0x1008, 9).is_err());
        assert!(ram.write_bytes(0x1010, &[0]).is_err());
        assert!(ram.read_bytes(u64::MAX, usize::MAX).is_err());
    }

    #[test]
    fn test_edge_of_range() {
        let ram = GuestRam::new(0x1000, 0x10);
        ram.write_bytes(0x100f, &[0xaa]).unwrap();
        assert_eq!(ram.read_bytes(0x1000, 0x10).unwrap()[15], 0xaa);
        assert_eq!(ram.read_bytes(0x1010, 0).unwrap(), Vec::<u8>::new());
    }
}
