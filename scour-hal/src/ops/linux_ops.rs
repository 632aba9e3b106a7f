//! Disk operations backed by the real user-space tools.

use super::{DmOps, LvmOps, RaidOps, WipeOps};
use crate::exec::Execute;
use crate::path::belongs_to_disk;
use crate::toolout::{dmsetup, lsblk, lvm, mdadm};
use anyhow::{Context, Result};
use log::{debug, info};

/// `DiskOps` implementation that shells out through an injected executor.
///
/// Stateless: every method is scoped to the objects it names and trusts the
/// tools' textual output as its source of truth.
#[derive(Debug, Clone)]
pub struct LinuxDiskOps<E> {
    exec: E,
}

impl<E: Execute> LinuxDiskOps<E> {
    pub fn new(exec: E) -> Self {
        Self { exec }
    }

    fn has_superblock(&self, device: &str) -> bool {
        // `mdadm --examine` exits non-zero when no superblock is present;
        // either way the answer is "not a member".
        match self.exec.execute("mdadm", &["--examine", device]) {
            Ok(output) => !output.trim().is_empty(),
            Err(err) => {
                debug!("mdadm --examine {device}: {err}");
                false
            }
        }
    }
}

impl<E: Execute> LvmOps for LinuxDiskOps<E> {
    fn get_volume_groups_by_disk(&self, disk: &str) -> Result<Vec<String>> {
        let output = self
            .exec
            .execute("vgs", &["--noheadings", "-o", "vg_name,pv_name"])
            .with_context(|| format!("failed to list volume groups for {disk}"))?;
        Ok(lvm::vgs_on_disk(&output, disk))
    }

    fn remove_vg(&self, vg_name: &str) -> Result<()> {
        info!("Removing volume group {vg_name}");
        self.exec
            .execute("vgremove", &["-y", vg_name])
            .with_context(|| format!("failed to remove volume group {vg_name}"))?;
        Ok(())
    }

    fn remove_all_pvs_on_device(&self, disk: &str) -> Result<()> {
        let output = self
            .exec
            .execute("pvs", &["--noheadings", "-o", "pv_name"])
            .with_context(|| format!("failed to list physical volumes for {disk}"))?;
        for pv in lvm::pvs_on_disk(&output, disk) {
            info!("Removing physical volume {pv}");
            self.exec
                .execute("pvremove", &[&pv, "-y", "-ff"])
                .with_context(|| format!("failed to remove physical volume {pv}"))?;
        }
        Ok(())
    }
}

impl<E: Execute> DmOps for LinuxDiskOps<E> {
    fn remove_all_dm_devices_on_disk(&self, disk: &str) -> Result<()> {
        let output = self
            .exec
            .execute("dmsetup", &["ls"])
            .context("failed to list device-mapper mappings")?;
        if output.trim() == dmsetup::NO_DEVICES_FOUND {
            return Ok(());
        }

        let names = dmsetup::mapping_names(&output);
        let mut marked = Vec::new();
        for candidate in dmsetup::probe_candidates(&names) {
            let deps = self
                .exec
                .execute("dmsetup", &["deps", "-o", "devname", &candidate])
                .with_context(|| format!("failed to query dependencies of mapping {candidate}"))?;
            let devices = dmsetup::deps_devnames(&deps)
                .with_context(|| format!("malformed `dmsetup deps` output for {candidate}"))?;
            if devices.iter().any(|device| belongs_to_disk(disk, device)) {
                marked.push(candidate);
            }
        }

        for mapping in dmsetup::removal_order(&marked) {
            info!("Removing device-mapper mapping {mapping}");
            self.exec
                .execute("dmsetup", &["remove", "--retry", &mapping])
                .with_context(|| format!("failed to remove mapping {mapping}"))?;
        }
        Ok(())
    }
}

impl<E: Execute> RaidOps for LinuxDiskOps<E> {
    fn is_raid_member(&self, disk: &str) -> bool {
        self.has_superblock(disk)
    }

    fn get_raid_devices(&self, disk: &str) -> Result<Vec<String>> {
        let output = self
            .exec
            .execute("mdadm", &["--detail", "--scan", "--verbose"])
            .with_context(|| format!("failed to scan RAID arrays for {disk}"))?;
        Ok(mdadm::arrays_with_member(&output, disk))
    }

    fn clean_raid_membership(&self, disk: &str) -> Result<()> {
        let output = self
            .exec
            .execute(
                "lsblk",
                &["--noheadings", "--list", "--paths", "-o", "NAME,TYPE", disk],
            )
            .with_context(|| format!("failed to list partitions of {disk}"))?;

        // Superblocks live on the disk node itself for whole-disk members,
        // otherwise on the partitions.
        let mut candidates = vec![disk.to_string()];
        candidates.extend(lsblk::partitions(&output));

        for candidate in candidates {
            if !self.has_superblock(&candidate) {
                continue;
            }
            info!("Zeroing RAID superblock on {candidate}");
            self.exec
                .execute("mdadm", &["--zero-superblock", &candidate])
                .with_context(|| format!("failed to zero RAID superblock on {candidate}"))?;
        }
        Ok(())
    }
}

impl<E: Execute> WipeOps for LinuxDiskOps<E> {
    fn wipefs(&self, disk: &str) -> Result<()> {
        info!("Wiping filesystem signatures on {disk}");
        self.exec
            .execute("wipefs", &["--all", disk])
            .with_context(|| format!("failed to wipe signatures on {disk}"))?;
        Ok(())
    }
}
