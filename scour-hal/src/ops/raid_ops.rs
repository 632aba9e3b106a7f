//! Software RAID operations.

use anyhow::Result;

/// mdadm operations scoped to a named disk.
pub trait RaidOps {
    /// Whether the device carries an mdadm superblock. Tool failures are
    /// collapsed to `false`; RAID detection never fails the cleanup.
    fn is_raid_member(&self, disk: &str) -> bool;

    /// Software RAID arrays that enlist the disk among their members.
    fn get_raid_devices(&self, disk: &str) -> Result<Vec<String>>;

    /// Zero the mdadm superblock on the disk and on each of its partitions
    /// that carries one.
    fn clean_raid_membership(&self, disk: &str) -> Result<()>;
}
