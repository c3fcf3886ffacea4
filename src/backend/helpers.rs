//! Helper queries offered on table and view nodes.

use super::StructureKind;

/// Build the helper query named `helper` for a table or view.
///
/// Returns `None` for unknown helper names and for schema entries.
pub fn helper_query(helper: &str, kind: StructureKind, schema: Option<&str>, table: &str) -> Option<String> {
    if kind == StructureKind::Schema {
        return None;
    }
    let target = qualified_name(schema, table);
    let query = match helper {
        "Select" => format!("SELECT * FROM {} LIMIT 500", target),
        "Describe" => format!("DESCRIBE {}", target),
        "Count" => format!("SELECT COUNT(*) FROM {}", target),
        _ => return None,
    };
    Some(query)
}

fn qualified_name(schema: Option<&str>, table: &str) -> String {
    match schema {
        Some(schema) if !schema.is_empty() => format!("\"{}\".\"{}\"", schema, table),
        _ => format!("\"{}\"", table),
    }
}
