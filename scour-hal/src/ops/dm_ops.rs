//! Device-mapper teardown operations.

use anyhow::Result;

/// Device-mapper operations scoped to a named disk.
pub trait DmOps {
    /// Tear down every device-mapper mapping backed by the disk.
    ///
    /// Thin-pool groups are removed user-facing mapping first so the kernel
    /// releases the `_tdata`/`_tmeta` siblings.
    fn remove_all_dm_devices_on_disk(&self, disk: &str) -> Result<()>;
}
