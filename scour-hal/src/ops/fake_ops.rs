//! Fake disk operations for testing.
//!
//! Records every operation without touching the system and serves scripted
//! results, so orchestration flows can be tested without root privileges or
//! real block devices.

use super::{DmOps, LvmOps, RaidOps, WipeOps};
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Operation records for testing and verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    GetVolumeGroups { disk: String },
    RemoveVg { vg_name: String },
    RemovePvs { disk: String },
    RemoveDmDevices { disk: String },
    IsRaidMember { disk: String },
    GetRaidDevices { disk: String },
    CleanRaidMembership { disk: String },
    Wipefs { disk: String },
}

#[derive(Debug, Default)]
struct FakeDiskOpsState {
    operations: Vec<Operation>,
    volume_groups: HashMap<String, Vec<String>>,
    raid_members: HashSet<String>,
    raid_devices: HashMap<String, Vec<String>>,
    vg_listing_error: Option<String>,
    failing_vgs: HashMap<String, String>,
    pv_removal_error: Option<String>,
    dm_removal_error: Option<String>,
    raid_scan_error: Option<String>,
    raid_membership_error: Option<String>,
    wipefs_error: Option<String>,
}

/// Fake `DiskOps` implementation that records operations without executing
/// them.
#[derive(Debug, Clone, Default)]
pub struct FakeDiskOps {
    state: Arc<Mutex<FakeDiskOpsState>>,
}

impl FakeDiskOps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<Operation> {
        self.state.lock().unwrap().operations.clone()
    }

    pub fn operation_count(&self) -> usize {
        self.state.lock().unwrap().operations.len()
    }

    /// Check if a specific operation was recorded.
    pub fn has_operation(&self, check: impl Fn(&Operation) -> bool) -> bool {
        self.state.lock().unwrap().operations.iter().any(check)
    }

    /// Script the volume groups reported for a disk.
    pub fn set_volume_groups(&self, disk: &str, vgs: &[&str]) {
        self.state.lock().unwrap().volume_groups.insert(
            disk.to_string(),
            vgs.iter().map(|vg| vg.to_string()).collect(),
        );
    }

    /// Mark a disk as carrying an mdadm superblock.
    pub fn set_raid_member(&self, disk: &str) {
        self.state.lock().unwrap().raid_members.insert(disk.to_string());
    }

    /// Script the arrays a disk is enlisted in.
    pub fn set_raid_devices(&self, disk: &str, arrays: &[&str]) {
        self.state.lock().unwrap().raid_devices.insert(
            disk.to_string(),
            arrays.iter().map(|array| array.to_string()).collect(),
        );
    }

    pub fn fail_vg_listing(&self, message: &str) {
        self.state.lock().unwrap().vg_listing_error = Some(message.to_string());
    }

    pub fn fail_remove_vg(&self, vg_name: &str, message: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_vgs
            .insert(vg_name.to_string(), message.to_string());
    }

    pub fn fail_pv_removal(&self, message: &str) {
        self.state.lock().unwrap().pv_removal_error = Some(message.to_string());
    }

    pub fn fail_dm_removal(&self, message: &str) {
        self.state.lock().unwrap().dm_removal_error = Some(message.to_string());
    }

    pub fn fail_raid_scan(&self, message: &str) {
        self.state.lock().unwrap().raid_scan_error = Some(message.to_string());
    }

    pub fn fail_clean_raid_membership(&self, message: &str) {
        self.state.lock().unwrap().raid_membership_error = Some(message.to_string());
    }

    pub fn fail_wipefs(&self, message: &str) {
        self.state.lock().unwrap().wipefs_error = Some(message.to_string());
    }

    fn record(&self, op: Operation) {
        self.state.lock().unwrap().operations.push(op);
    }
}

impl LvmOps for FakeDiskOps {
    fn get_volume_groups_by_disk(&self, disk: &str) -> Result<Vec<String>> {
        self.record(Operation::GetVolumeGroups {
            disk: disk.to_string(),
        });
        let state = self.state.lock().unwrap();
        if let Some(message) = &state.vg_listing_error {
            return Err(anyhow!(message.clone()));
        }
        Ok(state.volume_groups.get(disk).cloned().unwrap_or_default())
    }

    fn remove_vg(&self, vg_name: &str) -> Result<()> {
        self.record(Operation::RemoveVg {
            vg_name: vg_name.to_string(),
        });
        match self.state.lock().unwrap().failing_vgs.get(vg_name) {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }

    fn remove_all_pvs_on_device(&self, disk: &str) -> Result<()> {
        self.record(Operation::RemovePvs {
            disk: disk.to_string(),
        });
        match &self.state.lock().unwrap().pv_removal_error {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }
}

impl DmOps for FakeDiskOps {
    fn remove_all_dm_devices_on_disk(&self, disk: &str) -> Result<()> {
        self.record(Operation::RemoveDmDevices {
            disk: disk.to_string(),
        });
        match &self.state.lock().unwrap().dm_removal_error {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }
}

impl RaidOps for FakeDiskOps {
    fn is_raid_member(&self, disk: &str) -> bool {
        self.record(Operation::IsRaidMember {
            disk: disk.to_string(),
        });
        self.state.lock().unwrap().raid_members.contains(disk)
    }

    fn get_raid_devices(&self, disk: &str) -> Result<Vec<String>> {
        self.record(Operation::GetRaidDevices {
            disk: disk.to_string(),
        });
        let state = self.state.lock().unwrap();
        if let Some(message) = &state.raid_scan_error {
            return Err(anyhow!(message.clone()));
        }
        Ok(state.raid_devices.get(disk).cloned().unwrap_or_default())
    }

    fn clean_raid_membership(&self, disk: &str) -> Result<()> {
        self.record(Operation::CleanRaidMembership {
            disk: disk.to_string(),
        });
        match &self.state.lock().unwrap().raid_membership_error {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }
}

impl WipeOps for FakeDiskOps {
    fn wipefs(&self, disk: &str) -> Result<()> {
        self.record(Operation::Wipefs {
            disk: disk.to_string(),
        });
        match &self.state.lock().unwrap().wipefs_error {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_records_operations_in_order() {
        let ops = FakeDiskOps::new();
        ops.set_volume_groups("/dev/sdx", &["vg1"]);

        let vgs = ops.get_volume_groups_by_disk("/dev/sdx").unwrap();
        ops.remove_vg(&vgs[0]).unwrap();
        ops.wipefs("/dev/sdx").unwrap();

        assert_eq!(
            ops.operations(),
            vec![
                Operation::GetVolumeGroups {
                    disk: "/dev/sdx".to_string()
                },
                Operation::RemoveVg {
                    vg_name: "vg1".to_string()
                },
                Operation::Wipefs {
                    disk: "/dev/sdx".to_string()
                },
            ]
        );
    }

    #[test]
    fn unscripted_disks_report_nothing() {
        let ops = FakeDiskOps::new();

        assert!(ops.get_volume_groups_by_disk("/dev/sdx").unwrap().is_empty());
        assert!(!ops.is_raid_member("/dev/sdx"));
        assert!(ops.get_raid_devices("/dev/sdx").unwrap().is_empty());
    }

    #[test]
    fn scripted_failures_surface_as_errors() {
        let ops = FakeDiskOps::new();
        ops.fail_remove_vg("vg2", "dummy1");

        assert!(ops.remove_vg("vg1").is_ok());
        let err = ops.remove_vg("vg2").unwrap_err();
        assert_eq!(err.to_string(), "dummy1");
    }
}
