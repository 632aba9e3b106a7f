//! Block-device cleanup engine for host provisioning.
//!
//! Immediately before an OS image is written to a target disk, the disk may
//! still be enlisted in LVM volume groups, device-mapper mappings (including
//! thin-pool meta/data pairs), or software RAID arrays. [`CleanupDevice`]
//! demolishes that stack in a safe order through the [`scour_hal::DiskOps`]
//! capability set, continuing past individual failures and reporting the
//! first one to the caller.

pub mod cleanup;
pub mod logging;

pub use cleanup::CleanupDevice;
