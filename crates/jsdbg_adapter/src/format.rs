use crate::handles::VariableTable;
use crate::location::LocationMapper;
use crate::protocol::{self, EvaluateBody, Source, StackFrame, Variable, ADAPTER_DATA};
use jsdbg_bridge_core::types::{CallFrame, PropertyDescriptor, RemoteObject, Scope};
use serde_json::Value;
use std::path::Path;

const ANONYMOUS: &str = "<anonymous>";

/// Renders a primitive the way the engine's `String(value)` would.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => {
                format!("{f:.0}")
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// `value`, else `description`, else `"undefined"`.
pub fn remote_object_text(object: &RemoteObject) -> String {
    match (&object.value, &object.description) {
        (Some(value), _) => display_value(value),
        (None, Some(description)) => description.clone(),
        (None, None) => "undefined".to_string(),
    }
}

fn reference(object: &RemoteObject, variables: &mut VariableTable) -> i64 {
    object
        .object_id
        .as_ref()
        .map_or(0, |id| variables.insert(id.clone()))
}

pub fn variable(property: &PropertyDescriptor, variables: &mut VariableTable) -> Variable {
    let Some(object) = &property.value else {
        return Variable {
            name: property.name.clone(),
            value: "null".to_string(),
            kind: None,
            variables_reference: 0,
        };
    };

    Variable {
        name: property.name.clone(),
        value: remote_object_text(object),
        kind: Some(object.kind.clone().unwrap_or_else(|| "undefined".to_string())),
        variables_reference: reference(object, variables),
    }
}

pub fn scope(scope: &Scope, variables: &mut VariableTable) -> protocol::Scope {
    protocol::Scope {
        name: scope.kind.clone(),
        variables_reference: reference(&scope.object, variables),
        expensive: scope.kind == "global",
    }
}

pub fn evaluate_body(object: &RemoteObject, variables: &mut VariableTable) -> EvaluateBody {
    EvaluateBody {
        result: remote_object_text(object),
        kind: object.kind.clone(),
        variables_reference: reference(object, variables),
    }
}

pub fn stack_frame(id: i64, frame: &CallFrame, mapper: &LocationMapper) -> StackFrame {
    let name = frame
        .function_name
        .clone()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| ANONYMOUS.to_string());

    StackFrame {
        id,
        name,
        source: source(&mapper.url_to_local(&frame.url)),
        line: mapper.line_to_client(frame.location.line_number),
        column: mapper.column_to_client(frame.location.column_number),
    }
}

fn source(local_path: &str) -> Source {
    let name = Path::new(local_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| local_path.to_string());

    Source {
        name: Some(name),
        path: Some(local_path.to_string()),
        adapter_data: Some(Value::String(ADAPTER_DATA.to_string())),
    }
}
