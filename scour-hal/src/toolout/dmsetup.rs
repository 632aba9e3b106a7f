//! Parsers and ordering rules for `dmsetup` output.
//!
//! Thin-provisioned logical volumes are backed by `_tdata`/`_tmeta` sibling
//! mappings; the kernel only releases the siblings once the user-facing
//! mapping is gone, so removal order matters.

use crate::OpsError;

/// Sentinel `dmsetup ls` prints when the mapper table is empty.
pub const NO_DEVICES_FOUND: &str = "No devices found";

const TDATA_SUFFIX: &str = "_tdata";
const TMETA_SUFFIX: &str = "_tmeta";

/// Mapping names from `dmsetup ls` output (`name\t(major:minor)` per line).
pub fn mapping_names(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let name = line.split_whitespace().next()?;
            Some(name.to_string())
        })
        .collect()
}

/// Expand listed mapping names into the set of names worth probing with
/// `dmsetup deps`.
///
/// Whenever a `_tmeta` mapping is listed, the whole thin group (`base`,
/// `base_tdata`, `base_tmeta`) is probed: the `_tdata` sibling is often
/// absent from `ls` while its mapping still exists. First-seen order is
/// kept and duplicates dropped.
pub fn probe_candidates(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if let Some(base) = name.strip_suffix(TMETA_SUFFIX) {
            for candidate in [
                base.to_string(),
                format!("{base}{TDATA_SUFFIX}"),
                format!("{base}{TMETA_SUFFIX}"),
            ] {
                if !out.contains(&candidate) {
                    out.push(candidate);
                }
            }
        } else if !out.contains(name) {
            out.push(name.clone());
        }
    }
    out
}

/// Backing device base names from `dmsetup deps -o devname` output, e.g.
/// `1 dependencies  : (sdx1)` or `2 dependencies  : (sda5) (sda6)`.
///
/// Output without any `(...)` group is a parse mismatch and treated like a
/// tool failure.
pub fn deps_devnames(output: &str) -> Result<Vec<String>, OpsError> {
    let mut names = Vec::new();
    let mut saw_group = false;
    let mut rest = output;
    while let Some(open) = rest.find('(') {
        let Some(close) = rest[open..].find(')') else {
            break;
        };
        saw_group = true;
        for token in rest[open + 1..open + close].split_whitespace() {
            names.push(token.trim_matches(',').to_string());
        }
        rest = &rest[open + close + 1..];
    }
    if !saw_group {
        return Err(OpsError::Parse(format!(
            "no dependency group in `dmsetup deps` output: {:?}",
            output.trim()
        )));
    }
    Ok(names)
}

/// Compute the order in which marked mappings must be removed: the
/// user-facing mapping of a thin group strictly before its `_tdata` and
/// `_tmeta` siblings; groups and plain mappings otherwise in discovery
/// order.
pub fn removal_order(marked: &[String]) -> Vec<String> {
    let mut bases: Vec<&str> = Vec::new();
    for name in marked {
        let base = thin_base(name);
        if !bases.contains(&base) {
            bases.push(base);
        }
    }

    let mut ordered = Vec::new();
    for base in bases {
        for suffix in ["", TDATA_SUFFIX, TMETA_SUFFIX] {
            let candidate = format!("{base}{suffix}");
            if marked.contains(&candidate) && !ordered.contains(&candidate) {
                ordered.push(candidate);
            }
        }
    }
    ordered
}

fn thin_base(name: &str) -> &str {
    name.strip_suffix(TDATA_SUFFIX)
        .or_else(|| name.strip_suffix(TMETA_SUFFIX))
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn mapping_names_reads_tab_separated_lines() {
        let output = "volumegroup-logicalvolume\t(253:0)\npool-lv_tmeta\t(253:1)\n";
        assert_eq!(
            mapping_names(output),
            names(&["volumegroup-logicalvolume", "pool-lv_tmeta"])
        );
    }

    #[test]
    fn probe_candidates_passes_plain_names_through() {
        let candidates = probe_candidates(&names(&["vg-lv", "other-lv"]));
        assert_eq!(candidates, names(&["vg-lv", "other-lv"]));
    }

    #[test]
    fn probe_candidates_expands_thin_groups() {
        let candidates = probe_candidates(&names(&["pool-lv_tmeta", "pool-lv"]));
        assert_eq!(
            candidates,
            names(&["pool-lv", "pool-lv_tdata", "pool-lv_tmeta"])
        );
    }

    #[test]
    fn deps_devnames_reads_single_group() {
        assert_eq!(
            deps_devnames("1 dependencies  : (sdx1)").unwrap(),
            names(&["sdx1"])
        );
    }

    #[test]
    fn deps_devnames_reads_multiple_groups() {
        assert_eq!(
            deps_devnames("2 dependencies  : (sda5) (sda6)").unwrap(),
            names(&["sda5", "sda6"])
        );
    }

    #[test]
    fn deps_devnames_rejects_output_without_group() {
        let err = deps_devnames("garbage").unwrap_err();
        assert!(matches!(err, OpsError::Parse(_)));
    }

    #[test]
    fn removal_order_puts_thin_base_first() {
        let marked = names(&["pool-lv_tdata", "pool-lv", "pool-lv_tmeta"]);
        assert_eq!(
            removal_order(&marked),
            names(&["pool-lv", "pool-lv_tdata", "pool-lv_tmeta"])
        );
    }

    #[test]
    fn removal_order_keeps_discovery_order_for_plain_mappings() {
        let marked = names(&["vg-b", "vg-a"]);
        assert_eq!(removal_order(&marked), names(&["vg-b", "vg-a"]));
    }

    #[test]
    fn removal_order_handles_orphan_siblings() {
        // A group whose user-facing mapping is already gone still drains.
        let marked = names(&["pool-lv_tmeta", "pool-lv_tdata"]);
        assert_eq!(
            removal_order(&marked),
            names(&["pool-lv_tdata", "pool-lv_tmeta"])
        );
    }
}
