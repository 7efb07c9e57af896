//! Renders [`SchemaShape`]s as zod expressions.

use super::naming::{object_key, ts_string};
use super::INDENT;
use crate::schema::SchemaShape;
use serde_json::Value;

/// Renders `shape` as a zod expression whose first line sits at indentation `depth`.
///
/// Multi-line expressions (objects) indent their fields one level deeper and
/// close on `depth`.
pub fn render_shape(shape: &SchemaShape, depth: usize) -> String {
    match shape {
        SchemaShape::String => "z.string()".into(),
        SchemaShape::Number => "z.number()".into(),
        SchemaShape::Integer => "z.number().int()".into(),
        SchemaShape::Boolean => "z.boolean()".into(),
        SchemaShape::Null => "z.null()".into(),
        SchemaShape::Any => "z.unknown()".into(),
        SchemaShape::Bytes => "z.instanceof(Uint8Array)".into(),
        SchemaShape::Literal(value) => render_literal(value),
        SchemaShape::Enum(options) if options.is_empty() => "z.never()".into(),
        SchemaShape::Enum(options) => {
            let members: Vec<String> = options.iter().map(|o| ts_string(o)).collect();
            format!("z.enum([{}])", members.join(", "))
        }
        SchemaShape::Array(item) => format!("z.array({})", render_shape(item, depth)),
        SchemaShape::Record(inner) => {
            format!("z.record(z.string(), {})", render_shape(inner, depth))
        }
        SchemaShape::Optional(inner) => format!("{}.nullish()", render_shape(inner, depth)),
        SchemaShape::Nullable(inner) => format!("{}.nullable()", render_shape(inner, depth)),
        SchemaShape::Union(members) => match members.as_slice() {
            [] => "z.never()".into(),
            [only] => render_shape(only, depth),
            _ => {
                let rendered: Vec<String> = members.iter().map(|m| render_shape(m, depth)).collect();
                format!("z.union([{}])", rendered.join(", "))
            }
        },
        SchemaShape::Object(fields) if fields.is_empty() => "z.object({})".into(),
        SchemaShape::Object(fields) => {
            let inner = INDENT.repeat(depth + 1);
            let mut out = String::from("z.object({\n");
            for (name, field) in fields {
                out.push_str(&format!(
                    "{}{}: {},\n",
                    inner,
                    object_key(name),
                    render_shape(field, depth + 1)
                ));
            }
            out.push_str(&INDENT.repeat(depth));
            out.push_str("})");
            out
        }
    }
}

fn render_literal(value: &Value) -> String {
    match value {
        Value::Null => "z.null()".into(),
        Value::String(s) => format!("z.literal({})", ts_string(s)),
        Value::Bool(_) | Value::Number(_) => format!("z.literal({})", value),
        // zod literals are primitives only; compare structured values by their JSON text.
        other => format!(
            "z.custom<unknown>((value) => JSON.stringify(value) === {})",
            ts_string(&other.to_string())
        ),
    }
}
