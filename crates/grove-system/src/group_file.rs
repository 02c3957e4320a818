//! Parser for the `/etc/group` database format, as stored on disk or
//! printed by `getent group`.
//!
//! Each line is `name:password:gid:member,member,...`.

use grove_core::models::group::SystemGroup;
use tracing::warn;

/// Parse group database contents into groups, in database order.
///
/// Blank lines, `#` comments and NIS compat lines (`+`/`-`) are skipped.
/// Malformed lines are skipped with a warning, the way the C library's
/// files backend ignores them.
pub fn parse_group_file(contents: &str) -> Vec<SystemGroup> {
    contents
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let line = raw.trim_end();
            if line.is_empty() || line.starts_with(['#', '+', '-']) {
                return None;
            }
            match parse_line(line) {
                Ok(group) => Some(group),
                Err(reason) => {
                    warn!(line = index + 1, %reason, "Skipping malformed group database line");
                    None
                }
            }
        })
        .collect()
}

fn parse_line(line: &str) -> Result<SystemGroup, String> {
    let fields: Vec<&str> = line.split(':').collect();
    let [name, _password, gid, members] = fields.as_slice() else {
        return Err(format!("expected 4 fields, found {}", fields.len()));
    };
    if name.is_empty() {
        return Err("empty group name".into());
    }
    let gid = gid
        .parse::<u32>()
        .map_err(|e| format!("invalid gid {gid:?}: {e}"))?;

    Ok(SystemGroup {
        name: name.to_string(),
        gid,
        members: members
            .split(',')
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect(),
    })
}
