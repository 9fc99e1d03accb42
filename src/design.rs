//! Extraction of scalars and generator capacities from `design.json`.

use serde_json::Value as Json;

use crate::error::IngestError;
use crate::names::{generator_suffix, to_canonical};
use crate::whiteboard::Value;

#[derive(Debug, Default)]
pub struct DesignParse {
    pub entries: Vec<(String, Value)>,
    /// Per-item schema failures; sibling items were still processed.
    pub failures: Vec<IngestError>,
}

/// Decode and parse a design payload. Invalid JSON is a parse failure.
pub fn parse_design_bytes(raw: &[u8]) -> Result<DesignParse, IngestError> {
    let doc: Json = serde_json::from_slice(raw).map_err(|e| IngestError::parse(crate::fetch::DESIGN, e))?;
    parse_design(&doc)
}

pub fn parse_design(doc: &Json) -> Result<DesignParse, IngestError> {
    let top = doc
        .as_object()
        .ok_or_else(|| IngestError::parse(crate::fetch::DESIGN, "document is not a JSON object"))?;

    let mut out = DesignParse::default();
    for (key, value) in top {
        if !value.is_object() {
            out.entries.push((to_canonical(key), Value::from_json(value)));
        }
    }

    let nodes = match doc.pointer("/electrical_view/nodes").and_then(Json::as_object) {
        Some(nodes) => nodes,
        None => {
            let reason = if doc.get("electrical_view").is_none() {
                "missing"
            } else {
                "missing nodes"
            };
            out.failures.push(IngestError::schema("electrical_view", reason));
            return Ok(out);
        }
    };
    let prices = doc.get("price_components").and_then(Json::as_object);

    for (node, descriptor) in nodes {
        let Some(suffix) = generator_suffix(node) else {
            continue;
        };
        let Some(prices) = prices else {
            out.failures.push(IngestError::schema("price_components", format!("missing, needed by {}", node)));
            continue;
        };
        match generator_capacity(node, descriptor, prices) {
            Ok((min_load, prime_kw)) => {
                out.entries.push((format!("Gen{}MaxPPa", suffix), Value::from_json(prime_kw)));
                out.entries.push((format!("Gen{}MinPPa", suffix), Value::from_json(min_load)));
            }
            Err(e) => out.failures.push(e),
        }
    }
    Ok(out)
}

/// `(min_load, prime__kw)` for one generator node; both resolve or neither.
fn generator_capacity<'a>(
    node: &str,
    descriptor: &Json,
    prices: &'a serde_json::Map<String, Json>,
) -> Result<(&'a Json, &'a Json), IngestError> {
    let cid = descriptor
        .pointer("/properties/component/component_id")
        .ok_or_else(|| {
            IngestError::schema(
                format!("electrical_view.nodes.{}.properties.component.component_id", node),
                "missing",
            )
        })?;
    let key = match cid {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    };
    let component = prices.get(&key).ok_or_else(|| {
        IngestError::schema(format!("price_components.{}", key), format!("not found for {}", node))
    })?;
    let field = |name: &str| {
        component
            .get(name)
            .ok_or_else(|| IngestError::schema(format!("price_components.{}.{}", key, name), "missing"))
    };
    Ok((field("min_load")?, field("prime__kw")?))
}
