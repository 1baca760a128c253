//! Bounded Descriptor Sets
//!
//! Each subsystem reports the sockets it wants watched into its own
//! [`DescriptorSet`], capped at [`MAX_DESCRIPTORS`] per direction. The sets
//! are then merged into [`ReadinessSets`] for a single wait.
//!
//! Descriptors are borrowed from the subsystem that owns them, so a set can
//! never outlive the tick that built it.

use std::fmt;
use std::os::fd::{AsRawFd, BorrowedFd, RawFd};

use thiserror::Error;

/// Hard per-direction, per-subsystem descriptor limit
pub const MAX_DESCRIPTORS: usize = 32;

/// Readiness direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Readable
    Read,
    /// Writable
    Write,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Read => f.write_str("read"),
            Direction::Write => f.write_str("write"),
        }
    }
}

/// A subsystem tried to add more descriptors than the set holds
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{direction} descriptor set is full ({capacity} entries)")]
pub struct CapacityExceeded {
    /// Direction that overflowed
    pub direction: Direction,
    /// Capacity of that direction
    pub capacity: usize,
}

/// Descriptors reported by one subsystem for one tick
#[derive(Debug)]
pub struct DescriptorSet<'fd> {
    read: Vec<BorrowedFd<'fd>>,
    write: Vec<BorrowedFd<'fd>>,
    read_capacity: usize,
    write_capacity: usize,
    overflow: Option<CapacityExceeded>,
}

impl<'fd> DescriptorSet<'fd> {
    /// Create a set with the full capacity in both directions
    pub fn new() -> Self {
        Self::with_capacity(MAX_DESCRIPTORS, MAX_DESCRIPTORS)
    }

    /// Create a set with reduced capacities (clamped to [`MAX_DESCRIPTORS`])
    pub fn with_capacity(read_capacity: usize, write_capacity: usize) -> Self {
        let read_capacity = read_capacity.min(MAX_DESCRIPTORS);
        let write_capacity = write_capacity.min(MAX_DESCRIPTORS);

        Self {
            read: Vec::with_capacity(read_capacity),
            write: Vec::with_capacity(write_capacity),
            read_capacity,
            write_capacity,
            overflow: None,
        }
    }

    /// Watch `fd` for readability
    pub fn add_read(&mut self, fd: BorrowedFd<'fd>) -> Result<(), CapacityExceeded> {
        if self.read.len() >= self.read_capacity {
            return Err(self.reject(Direction::Read, self.read_capacity));
        }
        self.read.push(fd);
        Ok(())
    }

    /// Watch `fd` for writability
    pub fn add_write(&mut self, fd: BorrowedFd<'fd>) -> Result<(), CapacityExceeded> {
        if self.write.len() >= self.write_capacity {
            return Err(self.reject(Direction::Write, self.write_capacity));
        }
        self.write.push(fd);
        Ok(())
    }

    /// First rejected add, if any
    ///
    /// Sticks even when the caller discards the error returned by
    /// [`DescriptorSet::add_read`] or [`DescriptorSet::add_write`], so a
    /// truncated set is never mistaken for a complete one.
    pub fn overflow(&self) -> Option<CapacityExceeded> {
        self.overflow
    }

    fn reject(&mut self, direction: Direction, capacity: usize) -> CapacityExceeded {
        let err = CapacityExceeded {
            direction,
            capacity,
        };
        if self.overflow.is_none() {
            self.overflow = Some(err);
        }
        err
    }

    /// Descriptors watched for readability
    pub fn read(&self) -> &[BorrowedFd<'fd>] {
        &self.read
    }

    /// Descriptors watched for writability
    pub fn write(&self) -> &[BorrowedFd<'fd>] {
        &self.write
    }

    /// Total descriptors in both directions
    pub fn len(&self) -> usize {
        self.read.len() + self.write.len()
    }

    /// No descriptors in either direction
    pub fn is_empty(&self) -> bool {
        self.read.is_empty() && self.write.is_empty()
    }
}

impl Default for DescriptorSet<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// All descriptors of one tick, merged across subsystems
#[derive(Debug)]
pub struct ReadinessSets<'fd> {
    read: Vec<BorrowedFd<'fd>>,
    write: Vec<BorrowedFd<'fd>>,
    max_fd: Option<RawFd>,
}

impl<'fd> ReadinessSets<'fd> {
    /// Merge per-subsystem sets in order
    pub fn aggregate<'s, I>(sets: I) -> Self
    where
        I: IntoIterator<Item = &'s DescriptorSet<'fd>>,
        'fd: 's,
    {
        let mut read = Vec::new();
        let mut write = Vec::new();

        for set in sets {
            read.extend_from_slice(set.read());
            write.extend_from_slice(set.write());
        }

        let max_fd = read.iter().chain(write.iter()).map(AsRawFd::as_raw_fd).max();

        Self {
            read,
            write,
            max_fd,
        }
    }

    /// Descriptors watched for readability
    pub fn read(&self) -> &[BorrowedFd<'fd>] {
        &self.read
    }

    /// Descriptors watched for writability
    pub fn write(&self) -> &[BorrowedFd<'fd>] {
        &self.write
    }

    /// Highest descriptor number, `None` when empty
    pub fn max_fd(&self) -> Option<RawFd> {
        self.max_fd
    }

    /// Total descriptors in both directions
    pub fn len(&self) -> usize {
        self.read.len() + self.write.len()
    }

    /// No descriptors in either direction
    pub fn is_empty(&self) -> bool {
        self.read.is_empty() && self.write.is_empty()
    }
}
