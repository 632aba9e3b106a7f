//! Parser for `lsblk --noheadings --list --paths -o NAME,TYPE` output.

/// Partition device paths reported for a disk.
pub fn partitions(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let name = fields.next()?;
            let kind = fields.next()?;
            (kind == "part").then(|| name.to_string())
        })
        .collect()
}
