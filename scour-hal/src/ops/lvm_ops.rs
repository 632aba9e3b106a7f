//! LVM teardown operations.

use anyhow::Result;

/// LVM operations scoped to a named disk.
pub trait LvmOps {
    /// Volume groups with at least one physical volume on the disk.
    fn get_volume_groups_by_disk(&self, disk: &str) -> Result<Vec<String>>;

    /// Remove a volume group together with its logical volumes.
    fn remove_vg(&self, vg_name: &str) -> Result<()>;

    /// Remove every physical volume that sits on the disk.
    ///
    /// Stops at the first removal failure; a disk without matching PVs is a
    /// no-op success.
    fn remove_all_pvs_on_device(&self, disk: &str) -> Result<()>;
}
