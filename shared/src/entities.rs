//! Entity lump extraction from compiled map files.

use crate::error::EntityError;
use serde_json::{Map, Value};

const HAMMER_ID: &str = "\"hammerid\" \"";

/// Pulls the `{ "key" "value" ... }` groups out of a map file.
///
/// The lump is taken to run from the `{` before the first `"hammerid"` entry
/// to the first `}` opening a line after the last one. Lines that are not a quoted key/value pair
/// are skipped.
pub fn extract_entities(bsp: &str) -> Result<Vec<Map<String, Value>>, EntityError> {
    let first = bsp.find(HAMMER_ID).ok_or(EntityError::NoEntities)?;
    let last = bsp.rfind(HAMMER_ID).ok_or(EntityError::NoEntities)?;

    let start = bsp[..first]
        .rfind('{')
        .ok_or(EntityError::LumpBoundary("start"))?;
    let end = bsp[last..]
        .find("\n}")
        .map(|ix| last + ix + 1)
        .ok_or(EntityError::LumpBoundary("end"))?;

    Ok(groups(&bsp[start + 1..=end])
        .into_iter()
        .filter(|group| !group.trim().is_empty())
        .map(|group| group.lines().filter_map(parse_property).collect())
        .collect())
}

/// Splits the lump body (after its opening `{`) into group contents.
///
/// A group ends at a `}` that opens its line and is followed only by
/// whitespace and then either the next `{` or the end of the lump. Braces
/// inside quoted values never qualify.
fn groups(body: &str) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut start = 0;

    for (ix, _) in body.match_indices('}') {
        if ix < start {
            continue;
        }
        let before = body[..ix].trim_end_matches([' ', '\t']);
        if !before.is_empty() && !before.ends_with('\n') {
            continue;
        }
        let rest = body[ix + 1..].trim_start();
        if rest.is_empty() {
            groups.push(&body[start..ix]);
            break;
        }
        if rest.starts_with('{') {
            groups.push(&body[start..ix]);
            start = body.len() - rest.len() + 1;
        }
    }
    groups
}

fn parse_property(line: &str) -> Option<(String, Value)> {
    let inner = line.trim().strip_prefix('"')?.strip_suffix('"')?;
    let (key, rest) = inner.split_once('"')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let value = rest.trim_start().strip_prefix('"')?;
    Some((key.to_string(), Value::String(value.to_string())))
}
