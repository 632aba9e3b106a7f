//! Parsers for LVM reporting output (`vgs`, `pvs`).

use crate::path::belongs_to_disk;

/// Volume group names from `vgs --noheadings -o vg_name,pv_name` output
/// whose PV column sits on the given disk.
///
/// Lines are two whitespace-separated columns with leading whitespace
/// tolerated. Emitted order is preserved; a VG backed by several PVs on the
/// same disk appears once.
pub fn vgs_on_disk(output: &str, disk: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for line in output.lines() {
        let mut fields = line.split_whitespace();
        let (Some(vg), Some(pv)) = (fields.next(), fields.next()) else {
            continue;
        };
        if belongs_to_disk(disk, pv) && !found.iter().any(|seen| seen == vg) {
            found.push(vg.to_string());
        }
    }
    found
}

/// Physical volume paths from `pvs --noheadings -o pv_name` output that sit
/// on the given disk.
pub fn pvs_on_disk(output: &str, disk: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let pv = line.trim();
            (!pv.is_empty() && belongs_to_disk(disk, pv)).then(|| pv.to_string())
        })
        .collect()
}
