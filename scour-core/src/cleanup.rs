//! Install-device cleanup orchestration.

use anyhow::Result;
use log::{info, warn};
use scour_hal::DiskOps;

/// Sequences the teardown of the LVM -> DM -> RAID stack on one device.
///
/// Every step runs regardless of earlier failures; the first error is kept
/// and returned at the end, so a partially-cleaned disk still fails the
/// install loudly while later steps get their chance to make progress.
pub struct CleanupDevice<D> {
    ops: D,
}

impl<D: DiskOps> CleanupDevice<D> {
    pub fn new(ops: D) -> Self {
        Self { ops }
    }

    /// Bring `device` to a state where a fresh image can be written to it.
    ///
    /// A non-`Ok` return means the disk must not be considered clean and the
    /// install should be aborted upstream.
    pub fn cleanup_install_device(&self, device: &str) -> Result<()> {
        info!("Cleaning install device {device}");
        let mut first_err = None;

        self.clean_device_stack(device, &mut first_err);

        if self.ops.is_raid_member(device) {
            info!("{device} is part of a software RAID array");
            match self.ops.get_raid_devices(device) {
                Ok(arrays) => {
                    for array in arrays {
                        // The array sits on top of the member disk; its own
                        // LVM/DM stack has to go before the superblocks do.
                        self.clean_device_stack(&array, &mut first_err);
                    }
                }
                Err(err) => record(&mut first_err, "listing RAID arrays", device, err),
            }
            if let Err(err) = self.ops.clean_raid_membership(device) {
                record(&mut first_err, "cleaning RAID membership", device, err);
            }
        }

        if let Err(err) = self.ops.wipefs(device) {
            record(&mut first_err, "wiping signatures", device, err);
        }

        match first_err {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// Volume groups, physical volumes, then DM mappings. Shared by the
    /// target disk and each RAID array discovered above it.
    fn clean_device_stack(&self, device: &str, first_err: &mut Option<anyhow::Error>) {
        match self.ops.get_volume_groups_by_disk(device) {
            Ok(vgs) => {
                for vg in vgs {
                    if let Err(err) = self.ops.remove_vg(&vg) {
                        record(first_err, "removing volume group", &vg, err);
                    }
                }
            }
            Err(err) => record(first_err, "listing volume groups", device, err),
        }

        if let Err(err) = self.ops.remove_all_pvs_on_device(device) {
            record(first_err, "removing physical volumes", device, err);
        }
        if let Err(err) = self.ops.remove_all_dm_devices_on_disk(device) {
            record(first_err, "removing device-mapper mappings", device, err);
        }
    }
}

fn record(first_err: &mut Option<anyhow::Error>, action: &str, subject: &str, err: anyhow::Error) {
    warn!("{action} for {subject} failed: {err:#}");
    if first_err.is_none() {
        *first_err = Some(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scour_hal::{FakeDiskOps, Operation};

    const DEVICE: &str = "/dev/vda";
    const RAID_DEVICE: &str = "/dev/md0";

    fn op_position(ops: &[Operation], wanted: &Operation) -> usize {
        ops.iter()
            .position(|op| op == wanted)
            .unwrap_or_else(|| panic!("operation {wanted:?} was never recorded"))
    }

    #[test]
    fn removes_volume_groups_and_pvs_for_a_disk() {
        let fake = FakeDiskOps::new();
        fake.set_volume_groups(DEVICE, &["vg1", "vg2"]);

        let cleanup = CleanupDevice::new(fake.clone());
        cleanup.cleanup_install_device(DEVICE).unwrap();

        assert_eq!(
            fake.operations(),
            vec![
                Operation::GetVolumeGroups {
                    disk: DEVICE.to_string()
                },
                Operation::RemoveVg {
                    vg_name: "vg1".to_string()
                },
                Operation::RemoveVg {
                    vg_name: "vg2".to_string()
                },
                Operation::RemovePvs {
                    disk: DEVICE.to_string()
                },
                Operation::RemoveDmDevices {
                    disk: DEVICE.to_string()
                },
                Operation::IsRaidMember {
                    disk: DEVICE.to_string()
                },
                Operation::Wipefs {
                    disk: DEVICE.to_string()
                },
            ]
        );
    }

    #[test]
    fn vg_removal_failure_does_not_stop_the_sweep() {
        let fake = FakeDiskOps::new();
        fake.set_volume_groups(DEVICE, &["vg1", "vg2", "vg3"]);
        fake.fail_remove_vg("vg2", "Failed to remove VG vg2");

        let cleanup = CleanupDevice::new(fake.clone());
        let err = cleanup.cleanup_install_device(DEVICE).unwrap_err();

        assert!(err.to_string().contains("vg2"));
        for vg in ["vg1", "vg2", "vg3"] {
            assert!(fake.has_operation(|op| matches!(
                op,
                Operation::RemoveVg { vg_name } if vg_name == vg
            )));
        }
        assert!(fake.has_operation(|op| matches!(op, Operation::RemovePvs { .. })));
        assert!(fake.has_operation(|op| matches!(op, Operation::RemoveDmDevices { .. })));
        assert!(fake.has_operation(|op| matches!(op, Operation::Wipefs { .. })));
    }

    #[test]
    fn vg_listing_failure_skips_removal_but_not_later_steps() {
        let fake = FakeDiskOps::new();
        fake.fail_vg_listing("vgs exploded");

        let cleanup = CleanupDevice::new(fake.clone());
        let err = cleanup.cleanup_install_device(DEVICE).unwrap_err();

        assert_eq!(err.to_string(), "vgs exploded");
        assert!(!fake.has_operation(|op| matches!(op, Operation::RemoveVg { .. })));
        assert!(fake.has_operation(|op| matches!(op, Operation::RemovePvs { .. })));
        assert!(fake.has_operation(|op| matches!(op, Operation::Wipefs { .. })));
    }

    #[test]
    fn raid_members_get_their_arrays_cleaned_too() {
        let fake = FakeDiskOps::new();
        fake.set_raid_member(DEVICE);
        fake.set_raid_devices(DEVICE, &[RAID_DEVICE]);

        let cleanup = CleanupDevice::new(fake.clone());
        cleanup.cleanup_install_device(DEVICE).unwrap();

        let ops = fake.operations();
        let array_vgs = op_position(
            &ops,
            &Operation::GetVolumeGroups {
                disk: RAID_DEVICE.to_string(),
            },
        );
        let membership = op_position(
            &ops,
            &Operation::CleanRaidMembership {
                disk: DEVICE.to_string(),
            },
        );
        let wipe = op_position(
            &ops,
            &Operation::Wipefs {
                disk: DEVICE.to_string(),
            },
        );

        // Array stack first, then superblocks, then signatures.
        assert!(array_vgs < membership);
        assert!(membership < wipe);
        assert!(fake.has_operation(|op| matches!(
            op,
            Operation::RemoveDmDevices { disk } if disk == RAID_DEVICE
        )));
        // No recursion into the array's own RAID layer.
        assert!(!fake.has_operation(|op| matches!(
            op,
            Operation::IsRaidMember { disk } if disk == RAID_DEVICE
        )));
    }

    #[test]
    fn raid_membership_failure_still_wipes_and_is_returned() {
        let fake = FakeDiskOps::new();
        fake.set_raid_member(DEVICE);
        fake.set_raid_devices(DEVICE, &[RAID_DEVICE]);
        fake.fail_clean_raid_membership("dummy1");

        let cleanup = CleanupDevice::new(fake.clone());
        let err = cleanup.cleanup_install_device(DEVICE).unwrap_err();

        assert_eq!(err.to_string(), "dummy1");
        assert!(fake.has_operation(|op| matches!(op, Operation::Wipefs { .. })));
    }

    #[test]
    fn only_the_first_error_is_returned() {
        let fake = FakeDiskOps::new();
        fake.fail_pv_removal("first failure");
        fake.fail_dm_removal("second failure");
        fake.fail_wipefs("third failure");

        let cleanup = CleanupDevice::new(fake.clone());
        let err = cleanup.cleanup_install_device(DEVICE).unwrap_err();

        assert_eq!(err.to_string(), "first failure");
        assert!(fake.has_operation(|op| matches!(op, Operation::RemoveDmDevices { .. })));
        assert!(fake.has_operation(|op| matches!(op, Operation::Wipefs { .. })));
    }

    #[test]
    fn clean_disk_is_a_cheap_noop() {
        let fake = FakeDiskOps::new();

        let cleanup = CleanupDevice::new(fake.clone());
        cleanup.cleanup_install_device(DEVICE).unwrap();

        assert_eq!(
            fake.operations(),
            vec![
                Operation::GetVolumeGroups {
                    disk: DEVICE.to_string()
                },
                Operation::RemovePvs {
                    disk: DEVICE.to_string()
                },
                Operation::RemoveDmDevices {
                    disk: DEVICE.to_string()
                },
                Operation::IsRaidMember {
                    disk: DEVICE.to_string()
                },
                Operation::Wipefs {
                    disk: DEVICE.to_string()
                },
            ]
        );
    }
}
