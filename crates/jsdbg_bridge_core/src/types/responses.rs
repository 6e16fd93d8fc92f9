use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One frame of a pause snapshot (V8 inspector `CallFrame` shape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    pub call_frame_id: String,
    #[serde(default)]
    pub function_name: Option<String>,
    pub location: Location,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub scope_chain: Vec<Scope>,
}

/// 0-based position reported by the remote engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub line_number: u32,
    #[serde(default)]
    pub column_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub object: RemoteObject,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    /// `Some(Value::Null)` when the engine sent an explicit `null`, `None` when absent.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub object_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(default)]
    pub value: Option<RemoteObject>,
}

/// Status of a paused request, as reported by `xdmp.requestStatus`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInfo {
    #[serde(default)]
    pub request_text: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub start_time: Option<String>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(id_string(&value))
}

/// Request ids and timestamps arrive as strings or bare numbers depending on the endpoint.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Public form of the id deserializer, for argument structs that accept `"42"` or `42`.
pub fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    opt_id(deserializer)
}

/// Parses a property list element by element. Malformed entries are skipped
/// rather than failing the whole listing.
pub fn parse_properties(values: Vec<Value>) -> Vec<PropertyDescriptor> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<PropertyDescriptor>(value) {
            Ok(property) => Some(property),
            Err(e) => {
                tracing::warn!("Skipping malformed property descriptor: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_frame_from_v8_shape() {
        let frame: CallFrame = serde_json::from_value(json!({
            "callFrameId": "frame-0",
            "functionName": "",
            "location": {"scriptId": "7", "lineNumber": 3, "columnNumber": 0},
            "url": "/test.sjs",
            "scopeChain": [
                {"type": "local", "object": {"type": "object", "objectId": "scope-1"}},
                {"type": "global", "object": {"type": "object"}}
            ],
            "this": {"type": "undefined"}
        }))
        .expect("frame should parse");

        assert_eq!(frame.call_frame_id, "frame-0");
        assert_eq!(frame.location.line_number, 3);
        assert_eq!(frame.scope_chain.len(), 2);
        assert_eq!(frame.scope_chain[0].object.object_id.as_deref(), Some("scope-1"));
        assert_eq!(frame.scope_chain[1].kind, "global");
        assert!(frame.scope_chain[1].object.object_id.is_none());
    }

    #[test]
    fn test_remote_object_distinguishes_null_from_absent_value() {
        let explicit: RemoteObject =
            serde_json::from_value(json!({"type": "object", "subtype": "null", "value": null}))
                .expect("object should parse");
        assert_eq!(explicit.value, Some(Value::Null));

        let absent: RemoteObject =
            serde_json::from_value(json!({"type": "number"})).expect("object should parse");
        assert_eq!(absent.value, None);
        assert_eq!(absent.kind.as_deref(), Some("number"));
    }

    #[test]
    fn test_property_without_value_key() {
        let property: PropertyDescriptor =
            serde_json::from_value(json!({"name": "getter", "get": {"type": "function"}}))
                .expect("property should parse");
        assert_eq!(property.name, "getter");
        assert!(property.value.is_none());
    }

    #[test]
    fn test_parse_properties_skips_malformed_entries() {
        let properties = parse_properties(vec![
            json!({"name": "x", "value": {"type": "number", "value": 1}}),
            json!({"value": {"type": "number"}}),
            json!("garbage"),
            json!({"name": "y"}),
        ]);
        let names: Vec<&str> = properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn test_id_string_accepts_strings_and_numbers() {
        assert_eq!(id_string(&json!("1234")), Some("1234".to_string()));
        assert_eq!(id_string(&json!(42)), Some("42".to_string()));
        assert_eq!(id_string(&json!("")), None);
        assert_eq!(id_string(&json!(null)), None);
    }
}
