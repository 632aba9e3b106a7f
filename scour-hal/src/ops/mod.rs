//! Disk operation trait definitions and implementations.
//!
//! This module defines the per-disk teardown capabilities and provides both
//! real (`LinuxDiskOps`) and fake (`FakeDiskOps`) implementations.

pub mod dm_ops;
pub mod fake_ops;
pub mod linux_ops;
pub mod lvm_ops;
pub mod raid_ops;
pub mod wipe_ops;

pub use dm_ops::DmOps;
pub use fake_ops::{FakeDiskOps, Operation};
pub use linux_ops::LinuxDiskOps;
pub use lvm_ops::LvmOps;
pub use raid_ops::RaidOps;
pub use wipe_ops::WipeOps;

/// Complete per-disk operation set consumed by the cleanup orchestrator.
pub trait DiskOps: LvmOps + DmOps + RaidOps + WipeOps + Send + Sync {}

/// Automatically implement DiskOps for any type implementing all required traits.
impl<T> DiskOps for T where T: LvmOps + DmOps + RaidOps + WipeOps + Send + Sync {}
