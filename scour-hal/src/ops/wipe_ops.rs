//! Signature wiping.

use anyhow::Result;

pub trait WipeOps {
    /// Erase filesystem and partition-table signatures from the device.
    fn wipefs(&self, disk: &str) -> Result<()>;
}
