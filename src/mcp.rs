use serde_json::Value;

// Prune meta fields before wrapping:
// - When has_more is false/missing: drop has_more and next_cursor.
// - Drop meta entirely if it becomes empty.
fn prune_meta(structured: &mut Value) {
    let Some(obj) = structured.as_object_mut() else {
        return;
    };
    let Some(meta_val) = obj.get_mut("meta") else {
        return;
    };
    let Some(meta_obj) = meta_val.as_object_mut() else {
        return;
    };

    let has_more = meta_obj
        .get("has_more")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    if !has_more {
        meta_obj.remove("has_more");
        meta_obj.remove("next_cursor");
    }

    if meta_obj.is_empty() {
        obj.remove("meta");
    }
}

// Build an MCP-compliant result envelope for tools/call outputs.
// - content: always a single text block so clients can render something.
// - structuredContent: the structured JSON shape for clients that read it.
// - isError: included only when true to keep payloads small.
pub fn mcp_wrap(mut structured: Value, text_opt: Option<String>, is_error: bool) -> Value {
    prune_meta(&mut structured);
    let text = match text_opt {
        Some(s) => s,
        None => serde_json::to_string(&structured).unwrap_or_else(|_| "{}".to_string()),
    };
    let mut obj = serde_json::json!({
        "content": [{ "type": "text", "text": text }],
        "structuredContent": structured,
    });
    if is_error {
        if let Some(map) = obj.as_object_mut() {
            map.insert("isError".to_string(), Value::Bool(true));
        }
    }
    obj
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wrap_renders_text_from_structured_when_absent() {
        let out = mcp_wrap(json!({"items": []}), None, false);
        assert_eq!(out["content"][0]["type"], "text");
        let text = out["content"][0]["text"].as_str().unwrap();
        let parsed: Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed, json!({"items": []}));
        assert!(out.get("isError").is_none());
    }

    #[test]
    fn wrap_marks_errors() {
        let out = mcp_wrap(json!({"error": {"code": "bad_request"}}), None, true);
        assert_eq!(out["isError"], json!(true));
    }

    #[test]
    fn meta_without_next_page_is_pruned() {
        let out = mcp_wrap(
            json!({"items": [], "meta": {"has_more": false, "next_cursor": "abc"}}),
            None,
            false,
        );
        assert!(out["structuredContent"].get("meta").is_none());
    }

    #[test]
    fn meta_with_next_page_survives() {
        let out = mcp_wrap(
            json!({"items": [], "meta": {"has_more": true, "next_cursor": "abc", "total_results": 42}}),
            None,
            false,
        );
        let meta = &out["structuredContent"]["meta"];
        assert_eq!(meta["has_more"], json!(true));
        assert_eq!(meta["next_cursor"], json!("abc"));
        assert_eq!(meta["total_results"], json!(42));
    }
}
