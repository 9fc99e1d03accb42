//! Canonical naming for whiteboard entries.

use regex::Regex;
use std::sync::OnceLock;

/// Exact column names in the hourly operations CSV.
pub const CSV_COLUMNS: [(&str, &str); 7] = [
    ("Total Load [kW]", "LoadP"),
    ("Total Grid [kW]", "GridP"),
    ("Total Solar Conn [kW]", "PvP"),
    ("Total Solar Core [kW]", "PvAvailP"),
    ("Total Solar Slack [kW]", "PvSpillP"),
    ("All Generators [kW]", "GenP"),
    ("All Generators [L]", "GenFuelLperh"),
];

pub const GENERATOR_PREFIX: &str = "genset";

/// Per-generator column rules, tried in order: (pattern, prefix, suffix).
const GENERATOR_RULES: [(&str, &str, &str); 3] = [
    (r"^genset([0-9]+).*\[kW\]", "Gen", "P"),
    (r"^genset([0-9]+).*\[status\]", "Gen", "St"),
    (r"^genset([0-9]+).*\[L\]", "Gen", "FuelLperh"),
];

fn generator_rules() -> &'static [(Regex, &'static str, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        GENERATOR_RULES
            .iter()
            .filter_map(|(pat, pre, post)| Regex::new(pat).ok().map(|re| (re, *pre, *post)))
            .collect()
    })
}

/// `gen1_p` -> `Gen1P`: split on `_` and `.`, capitalize each segment.
pub fn to_canonical(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut upper = true;
    for c in raw.chars() {
        if c == '_' || c == '.' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Map an hourly CSV column to its canonical name, or `None` to drop it.
pub fn map_column_name(raw: &str) -> Option<String> {
    if let Some((_, name)) = CSV_COLUMNS.iter().find(|(col, _)| *col == raw) {
        return Some((*name).to_string());
    }
    generator_rules().iter().find_map(|(re, pre, post)| {
        re.captures(raw)
            .and_then(|caps| caps.get(1))
            .map(|n| format!("{}{}{}", pre, n.as_str(), post))
    })
}

/// `Gs<job>Iter<i><name>` for an iteration, `Gs<job><name>` for an aggregate run.
pub fn provenance_name(job: u64, iteration: Option<usize>, name: &str) -> String {
    match iteration {
        Some(i) => format!("Gs{}Iter{}{}", job, i, name),
        None => format!("Gs{}{}", job, name),
    }
}

/// Node name with the `genset` prefix stripped, if it is a generator node.
pub fn generator_suffix(node: &str) -> Option<&str> {
    node.strip_prefix(GENERATOR_PREFIX)
}
