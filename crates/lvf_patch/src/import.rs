//! Parser for the line-oriented record export format.
//!
//! The format is sectioned by plugin:
//!
//! ```text
//! plugin: MyMod.esp
//! ; comment
//! 0012AB-Shotgun_Combat-Combat Shotgun | ammo: 1F2E3D | type: 4A0B1;4A0B8
//! ```
//!
//! A `plugin:` header switches the current plugin for the following record
//! lines. Lines that match neither form also act as bare plugin headers,
//! mirroring older exports that listed the plugin name on its own line.

use itertools::Itertools;
use regex::Regex;

use lvf_rules::normalize_form_id;

use crate::record::Record;

/// Parse sectioned record text into deduplicated, name-sorted records.
///
/// Malformed lines never fail the whole import; they are skipped (or treated
/// as plugin headers). Records missing a plugin, form id or editor id are
/// dropped, as are duplicate keys.
pub fn parse_records(text: &str) -> Vec<Record> {
    let line_re = Regex::new(r"^([0-9A-Fa-f]{1,8})-([^-]+)-(.*)$").unwrap();

    let mut records: Vec<Record> = Vec::new();
    let mut current_plugin = String::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = strip_plugin_header(line) {
            current_plugin = rest.to_string();
            continue;
        }

        let Some(caps) = line_re.captures(line) else {
            // Bare plugin header fallback
            current_plugin = line.to_string();
            continue;
        };

        let form_id = normalize_form_id(&caps[1]);
        let editor_id = caps[2].trim().to_string();
        if form_id.is_empty() || editor_id.is_empty() || current_plugin.is_empty() {
            tracing::debug!(line, "dropping incomplete record line");
            continue;
        }

        let (name, ammo, type_codes) = parse_payload(&caps[3]);
        let key = format!("{current_plugin}|{form_id}|{editor_id}");
        records.push(Record {
            key,
            plugin: current_plugin.clone(),
            form_id,
            editor_id,
            name,
            ammo,
            type_codes,
        });
    }

    let mut records: Vec<Record> = records
        .into_iter()
        .unique_by(|record| record.key.clone())
        .collect();
    records.sort_by_cached_key(|record| record.display_name().to_lowercase());
    records
}

fn strip_plugin_header(line: &str) -> Option<&str> {
    let (head, rest) = line.split_once(':')?;
    if head.trim().eq_ignore_ascii_case("plugin") {
        Some(rest.trim())
    } else {
        None
    }
}

/// Split a record payload into display name, ammo id and raw type codes.
///
/// Payload parts are `|`-separated; `ammo:` and `type:` parts are extracted
/// (types split on `;` or `,`), everything else joins back into the name.
fn parse_payload(payload: &str) -> (String, String, Vec<String>) {
    let mut name_parts: Vec<&str> = Vec::new();
    let mut ammo = String::new();
    let mut type_codes: Vec<String> = Vec::new();

    for part in payload.split('|').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some(value) = strip_prefix_ci(part, "ammo") {
            ammo = normalize_form_id(value);
            continue;
        }
        if let Some(value) = strip_prefix_ci(part, "type") {
            type_codes = value
                .split([';', ','])
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| v.to_uppercase())
                .collect();
            continue;
        }
        name_parts.push(part);
    }

    (name_parts.join(" | "), ammo, type_codes)
}

fn strip_prefix_ci<'a>(part: &'a str, prefix: &str) -> Option<&'a str> {
    let (head, rest) = part.split_once(':')?;
    if head.trim().eq_ignore_ascii_case(prefix) {
        Some(rest.trim())
    } else {
        None
    }
}
