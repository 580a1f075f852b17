//! This module contains the byte-addressed symbolic memory of the modelled
//! machine.

use std::collections::HashMap;

use crate::{
    constant::WORD_SIZE_BYTES,
    error::memory::{Error, Result},
    value::{BoxedVal, SymbolicValue},
};

/// The access permissions of a mapped memory region.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Permissions {
    read: bool,
    write: bool,
    execute: bool,
}

impl Permissions {
    /// Constructs permissions allowing reads only.
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            read: true,
            write: false,
            execute: false,
        }
    }

    /// Constructs permissions allowing reads and writes.
    #[must_use]
    pub fn read_write() -> Self {
        Self {
            read: true,
            write: true,
            execute: false,
        }
    }

    /// Constructs permissions allowing reads and instruction fetches.
    #[must_use]
    pub fn read_execute() -> Self {
        Self {
            read: true,
            write: false,
            execute: true,
        }
    }

    /// Checks whether these permissions allow reading.
    #[must_use]
    pub fn allows_read(&self) -> bool {
        self.read
    }

    /// Checks whether these permissions allow writing.
    #[must_use]
    pub fn allows_write(&self) -> bool {
        self.write
    }

    /// Checks whether these permissions allow instruction fetches.
    #[must_use]
    pub fn allows_execute(&self) -> bool {
        self.execute
    }
}

/// A contiguous mapped region of the address space.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Region {
    start: u64,
    size: u64,
    permissions: Permissions,
}

impl Region {
    /// Gets the first address of the region.
    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Gets the size of the region in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Gets the permissions of the region.
    #[must_use]
    pub fn permissions(&self) -> Permissions {
        self.permissions
    }

    /// Checks whether `address` falls inside the region.
    #[must_use]
    pub fn contains(&self, address: u64) -> bool {
        address >= self.start && address - self.start < self.size
    }

    /// Gets the last address inside the region.
    ///
    /// Mapping rejects empty regions and regions that would wrap the
    /// address space, so this cannot overflow for any region that is
    /// actually mapped.
    #[must_use]
    pub fn last(&self) -> u64 {
        self.start + (self.size - 1)
    }
}

/// A representation of the memory of the modelled machine.
///
/// Memory is an explicit map of permissioned regions over a sparse store of
/// symbolic bytes. Mapped bytes that have never been written read as
/// concrete zero. Accesses outside every region, or against a region's
/// permissions, fail. These failures are the raw material for the fatal
/// path terminations of the execution core, so they are never silently
/// papered over.
///
/// No capacity checking beyond the region map is performed: writing past
/// the end of a buffer that is still inside a mapped region is a bug in the
/// modelled program, to be discovered rather than prevented.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Memory {
    /// The mapped regions of the address space.
    regions: Vec<Region>,

    /// The bytes that have been written, by address.
    cells: HashMap<u64, BoxedVal>,
}

impl Memory {
    /// Constructs a memory with no mapped regions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps the region of `size` bytes starting at `start` with the
    /// provided `permissions`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the new region overlaps an existing mapping, if
    /// it is empty, or if it would wrap around the top of the address
    /// space.
    pub fn map(&mut self, start: u64, size: u64, permissions: Permissions) -> Result<()> {
        // Inclusive-end bounds let a region reach the very top of the
        // address space. A wrapping request would overlap the bottom of
        // the space, so it is rejected as the overlap it is.
        let last = size
            .checked_sub(1)
            .and_then(|span| start.checked_add(span));
        let Some(last) = last else {
            return Err(Error::RegionOverlap { start, size });
        };
        let overlaps = self
            .regions
            .iter()
            .any(|region| start <= region.last() && region.start <= last);
        if overlaps {
            return Err(Error::RegionOverlap { start, size });
        }

        self.regions.push(Region {
            start,
            size,
            permissions,
        });

        Ok(())
    }

    /// Gets the mapped region containing `address`, if any.
    #[must_use]
    pub fn region_containing(&self, address: u64) -> Option<&Region> {
        self.regions.iter().find(|region| region.contains(address))
    }

    /// Checks whether `address` falls inside any mapped region.
    #[must_use]
    pub fn is_mapped(&self, address: u64) -> bool {
        self.region_containing(address).is_some()
    }

    /// Reads `count` bytes starting at `address`.
    ///
    /// Each byte is returned as-is: symbolic bytes stay symbolic, and
    /// mapped-but-unwritten bytes read as concrete zero.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if any byte of the range is unmapped or not
    /// readable.
    pub fn read(&self, address: u64, count: usize) -> Result<Vec<BoxedVal>> {
        self.check(address, count, AccessKind::Read)?;

        let bytes = (0..count as u64)
            .map(|offset| {
                self.cells
                    .get(&(address + offset))
                    .cloned()
                    .unwrap_or_else(|| SymbolicValue::known(0_u64))
            })
            .collect();

        Ok(bytes)
    }

    /// Writes the provided `bytes` starting at `address`.
    ///
    /// Bytes are written as-is, without forcing concreteness.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if any byte of the range is unmapped or not
    /// writable.
    pub fn write(&mut self, address: u64, bytes: &[BoxedVal]) -> Result<()> {
        self.check(address, bytes.len(), AccessKind::Write)?;

        for (offset, byte) in bytes.iter().enumerate() {
            self.cells.insert(address + offset as u64, byte.clone());
        }

        Ok(())
    }

    /// Reads the `size`-byte little-endian quantity at `address` as a
    /// single value.
    ///
    /// The result is a concrete word when every byte is concrete, and a
    /// byte-composition expression otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if any byte of the range is unmapped or not
    /// readable.
    ///
    /// # Panics
    ///
    /// Panics if `size` exceeds the machine word width; quantities wider
    /// than a word have no single-value reading.
    pub fn read_int(&self, address: u64, size: usize) -> Result<BoxedVal> {
        assert!(
            size > 0 && size <= WORD_SIZE_BYTES,
            "Integer reads must be between 1 and word-sized bytes"
        );
        let bytes = self.read(address, size)?;

        if let Some(word) = all_known_le(&bytes) {
            return Ok(SymbolicValue::known(word));
        }
        if size == 1 {
            return Ok(bytes.into_iter().next().expect("One byte was read"));
        }

        Ok(SymbolicValue::concat(bytes))
    }

    /// Writes `value` at `address` as a `size`-byte little-endian quantity.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if any byte of the range is unmapped or not
    /// writable.
    ///
    /// # Panics
    ///
    /// Panics if `size` exceeds the machine word width.
    pub fn write_int(&mut self, address: u64, value: u64, size: usize) -> Result<()> {
        assert!(
            size > 0 && size <= WORD_SIZE_BYTES,
            "Integer writes must be between 1 and word-sized bytes"
        );
        let bytes: Vec<BoxedVal> = value
            .to_le_bytes()
            .into_iter()
            .take(size)
            .map(SymbolicValue::known)
            .collect();

        self.write(address, &bytes)
    }

    /// Checks that every byte of the access is inside a mapped region with
    /// the required permission.
    fn check(&self, address: u64, count: usize, kind: AccessKind) -> Result<()> {
        let mut offset = 0_u64;
        while offset < count as u64 {
            let byte_address = address + offset;
            let region = self.region_containing(byte_address).ok_or({
                Error::UnmappedAccess {
                    address: byte_address,
                    size: count,
                }
            })?;

            let allowed = match kind {
                AccessKind::Read => region.permissions.allows_read(),
                AccessKind::Write => region.permissions.allows_write(),
            };
            if !allowed {
                return Err(Error::PermissionViolation {
                    address: byte_address,
                    operation: kind.to_string(),
                });
            }

            // The whole remainder of this region is known good for this
            // access kind, so skip ahead to its end.
            offset = (region.last() - address).saturating_add(1);
        }

        Ok(())
    }
}

/// The kind of memory access being permission-checked.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AccessKind {
    Read,
    Write,
}

impl std::fmt::Display for AccessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// Composes the provided bytes into a little-endian word if every one of
/// them is concrete.
fn all_known_le(bytes: &[BoxedVal]) -> Option<u64> {
    let mut word = 0_u64;
    for (index, byte) in bytes.iter().enumerate() {
        let value = byte.as_known()?.value() & 0xff;
        word |= value << (index * crate::constant::BYTE_SIZE_BITS);
    }

    Some(word)
}

#[cfg(test)]
mod test {
    use super::{Memory, Permissions};
    use crate::value::SymbolicValue;

    fn mapped_memory() -> Memory {
        let mut memory = Memory::new();
        memory
            .map(0x1000, 0x1000, Permissions::read_write())
            .expect("The address space was empty");
        memory
    }

    #[test]
    fn unwritten_mapped_bytes_read_as_zero() -> anyhow::Result<()> {
        let memory = mapped_memory();
        let bytes = memory.read(0x1000, 4)?;

        assert!(bytes
            .iter()
            .all(|byte| byte.as_known().unwrap().value() == 0));

        Ok(())
    }

    #[test]
    fn round_trips_symbolic_bytes() -> anyhow::Result<()> {
        let mut memory = mapped_memory();
        let byte = SymbolicValue::unknown_byte();
        memory.write(0x1100, &[byte.clone()])?;

        assert_eq!(memory.read(0x1100, 1)?, vec![byte]);

        Ok(())
    }

    #[test]
    fn rejects_unmapped_accesses() {
        let memory = mapped_memory();

        assert!(memory.read(0x4000, 1).is_err());
    }

    #[test]
    fn rejects_accesses_that_run_off_the_region() {
        let memory = mapped_memory();

        assert!(memory.read(0x1ffe, 4).is_err());
    }

    #[test]
    fn honours_region_permissions() -> anyhow::Result<()> {
        let mut memory = Memory::new();
        memory.map(0x4000, 0x100, Permissions::read_only())?;

        assert!(memory.read(0x4000, 1).is_ok());
        assert!(memory
            .write(0x4000, &[SymbolicValue::known(1_u64)])
            .is_err());

        Ok(())
    }

    #[test]
    fn rejects_overlapping_mappings() {
        let mut memory = mapped_memory();

        assert!(memory
            .map(0x1800, 0x1000, Permissions::read_write())
            .is_err());
    }

    #[test]
    fn regions_may_reach_the_top_of_the_address_space() -> anyhow::Result<()> {
        let mut memory = Memory::new();
        let start = u64::MAX - 0xfff;
        memory.map(start, 0x1000, Permissions::read_write())?;

        memory.write_int(start, 0xab, 1)?;
        assert_eq!(memory.read_int(start, 1)?.as_known().unwrap().value(), 0xab);

        // Unrelated mappings still pass the overlap check.
        memory.map(0x1000, 0x1000, Permissions::read_only())?;

        Ok(())
    }

    #[test]
    fn rejects_wrapping_and_empty_mappings() {
        let mut memory = Memory::new();

        assert!(memory
            .map(u64::MAX - 0xf, 0x100, Permissions::read_write())
            .is_err());
        assert!(memory.map(0x5000, 0, Permissions::read_write()).is_err());
    }

    #[test]
    fn integer_reads_compose_concrete_bytes() -> anyhow::Result<()> {
        let mut memory = mapped_memory();
        memory.write_int(0x1200, 0xdead_beef, 4)?;

        let word = memory.read_int(0x1200, 4)?;
        assert_eq!(word.as_known().unwrap().value(), 0xdead_beef);

        Ok(())
    }

    #[test]
    fn integer_reads_stay_symbolic_when_a_byte_is() -> anyhow::Result<()> {
        let mut memory = mapped_memory();
        memory.write_int(0x1200, 0xbeef, 2)?;
        memory.write(0x1201, &[SymbolicValue::unknown_byte()])?;

        let word = memory.read_int(0x1200, 2)?;
        assert!(word.as_known().is_none());

        Ok(())
    }
}
