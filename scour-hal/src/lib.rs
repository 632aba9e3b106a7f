//! Scour hardware boundary.
//!
//! This crate is the boundary for "world-touching" code: the [`Execute`]
//! process capability, parsers for the LVM/device-mapper/RAID tool output
//! the cleanup engine trusts, and the [`DiskOps`] capability set with two
//! implementations:
//! - `LinuxDiskOps`: real implementation shelling out through an executor
//! - `FakeDiskOps`: recording implementation for CI-safe testing

pub mod error;
pub mod exec;
pub mod ops;
pub mod path;
pub mod toolout;

pub use error::{OpsError, OpsResult};
pub use exec::{Execute, FakeExecutor, ShellExecutor};
pub use ops::{DiskOps, DmOps, FakeDiskOps, LinuxDiskOps, LvmOps, Operation, RaidOps, WipeOps};
