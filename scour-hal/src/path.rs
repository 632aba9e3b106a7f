//! Block-device path helpers.

/// Final path component of a device path (`/dev/sdx1` -> `sdx1`).
pub fn device_basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Whether `candidate` names `disk` itself or one of its partitions.
///
/// Partition nodes are `<disk><digits>` or `<disk>p<digits>` (`/dev/sdx1`,
/// `/dev/nvme0n1p2`). Both sides are reduced to their base name, so the bare
/// device names reported by `dmsetup deps -o devname` match full `/dev`
/// paths.
pub fn belongs_to_disk(disk: &str, candidate: &str) -> bool {
    let disk = device_basename(disk);
    let candidate = device_basename(candidate);
    match candidate.strip_prefix(disk) {
        Some("") => true,
        Some(rest) => {
            let digits = rest.strip_prefix('p').unwrap_or(rest);
            !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}
