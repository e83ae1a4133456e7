use assert_cmd::Command;
use httpmock::{Method::GET, MockServer};
use serde_json::{json, Value};
use std::io::Write;

const FARNELL_VARS: [&str; 10] = [
    "FARNELL_API_KEY",
    "FARNELL_STORE_ID",
    "FARNELL_ENVIRONMENT",
    "FARNELL_SANDBOX_USERNAME",
    "FARNELL_SANDBOX_PASSWORD",
    "FARNELL_SEARCH_API_URL",
    "FARNELL_ORDER_API_URL",
    "FARNELL_MAX_RETRIES",
    "FARNELL_RATE_LIMIT_PER_SEC",
    "FARNELL_RATE_LIMIT_BURST",
];

fn run_raw(input: &str, envs: &[(&str, &str)]) -> anyhow::Result<Vec<Value>> {
    let mut cmd = Command::cargo_bin("farnell-mcp")?;
    for k in FARNELL_VARS {
        cmd.env_remove(k);
    }
    for (k, v) in envs {
        cmd.env(k, v);
    }
    let assert = cmd
        .arg("--log-level")
        .arg("warn")
        .write_stdin(input.as_bytes().to_vec())
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    let mut out = Vec::new();
    for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
        out.push(serde_json::from_str(line)?);
    }
    Ok(out)
}

fn run_with_env(reqs: &[Value], envs: &[(&str, &str)]) -> anyhow::Result<Vec<Value>> {
    let mut input = Vec::new();
    for r in reqs {
        writeln!(input, "{}", serde_json::to_string(r)?)?;
    }
    run_raw(&String::from_utf8(input)?, envs)
}

fn by_id(responses: &[Value], id: i64) -> &Value {
    responses
        .iter()
        .find(|r| r["id"] == json!(id))
        .unwrap_or_else(|| panic!("no response with id {}", id))
}

#[test]
fn initialize_and_ping() -> anyhow::Result<()> {
    let out = run_with_env(
        &[
            json!({"jsonrpc":"2.0","method":"initialize","id":1,"params":{}}),
            json!({"jsonrpc":"2.0","method":"ping","id":2}),
        ],
        &[("FARNELL_API_KEY", "k")],
    )?;
    let init = &by_id(&out, 1)["result"];
    assert_eq!(init["protocolVersion"], json!("2024-11-05"));
    assert_eq!(init["serverInfo"]["name"], json!("farnell-mcp"));
    assert!(init["capabilities"].get("tools").is_some());
    assert!(init["capabilities"].get("resources").is_some());

    assert_eq!(by_id(&out, 2)["result"], json!({}));
    Ok(())
}

#[test]
fn tools_list_hides_sandbox_tools_outside_sandbox_mode() -> anyhow::Result<()> {
    let list_req = [json!({"jsonrpc":"2.0","method":"tools/list","id":1})];

    let production = run_with_env(
        &list_req,
        &[("FARNELL_API_KEY", "k"), ("FARNELL_ENVIRONMENT", "production")],
    )?;
    let tools = by_id(&production, 1)["result"]["tools"].as_array().unwrap().clone();
    assert_eq!(tools.len(), 6);
    assert!(tools
        .iter()
        .all(|t| !t["name"].as_str().unwrap().starts_with("sandbox_")));
    assert!(tools.iter().any(|t| t["name"] == json!("health_check")));

    let sandbox = run_with_env(
        &list_req,
        &[("FARNELL_API_KEY", "k"), ("FARNELL_ENVIRONMENT", "sandbox")],
    )?;
    let tools = by_id(&sandbox, 1)["result"]["tools"].as_array().unwrap().clone();
    assert_eq!(tools.len(), 17);
    assert!(tools.iter().any(|t| t["name"] == json!("sandbox_submit_order")));

    // Without configuration the catalog surface is still advertised.
    let unconfigured = run_with_env(&list_req, &[])?;
    let tools = by_id(&unconfigured, 1)["result"]["tools"].as_array().unwrap().clone();
    assert_eq!(tools.len(), 6);
    Ok(())
}

#[test]
fn unknown_tool_is_method_not_found_even_without_configuration() -> anyhow::Result<()> {
    let out = run_with_env(
        &[json!({
            "jsonrpc":"2.0","method":"tools/call","id":7,
            "params":{"name":"resolve_anything","arguments":{}}
        })],
        &[],
    )?;
    assert_eq!(by_id(&out, 7)["error"]["code"], json!(-32601));
    Ok(())
}

#[test]
fn validation_failures_map_to_invalid_params() -> anyhow::Result<()> {
    // Missing required argument: serde rejects before the gateway runs.
    let out = run_with_env(
        &[json!({
            "jsonrpc":"2.0","method":"tools/call","id":1,
            "params":{"name":"search_products_by_keyword","arguments":{}}
        })],
        &[("FARNELL_API_KEY", "k")],
    )?;
    assert_eq!(by_id(&out, 1)["error"]["code"], json!(-32602));

    // Present but empty: the gateway's own pre-flight check.
    let out = run_with_env(
        &[json!({
            "jsonrpc":"2.0","method":"tools/call","id":2,
            "params":{"name":"search_products_by_keyword","arguments":{"keyword":"  "}}
        })],
        &[("FARNELL_API_KEY", "k")],
    )?;
    assert_eq!(by_id(&out, 2)["error"]["code"], json!(-32602));
    Ok(())
}

#[test]
fn missing_configuration_yields_error_envelope_not_crash() -> anyhow::Result<()> {
    let out = run_with_env(
        &[json!({
            "jsonrpc":"2.0","method":"tools/call","id":3,
            "params":{"name":"search_products_by_keyword","arguments":{"keyword":"resistor"}}
        })],
        &[],
    )?;
    let result = &by_id(&out, 3)["result"];
    assert_eq!(result["isError"], json!(true));
    assert_eq!(
        result["structuredContent"]["error"]["code"],
        json!("configuration_error")
    );
    Ok(())
}

#[test]
fn health_check_answers_in_every_configuration_state() -> anyhow::Result<()> {
    let call = [json!({
        "jsonrpc":"2.0","method":"tools/call","id":1,
        "params":{"name":"health_check","arguments":{}}
    })];

    let healthy = run_with_env(
        &call,
        &[("FARNELL_API_KEY", "k"), ("FARNELL_ENVIRONMENT", "sandbox")],
    )?;
    let sc = &by_id(&healthy, 1)["result"]["structuredContent"];
    assert_eq!(sc["status"], json!("healthy"));
    assert_eq!(sc["environment"], json!("sandbox"));
    assert_eq!(sc["store_id"], json!("www.newark.com"));
    assert_eq!(sc["rate_limit"]["capacity"], json!(2));

    let unconfigured = run_with_env(&call, &[])?;
    let result = &by_id(&unconfigured, 1)["result"];
    assert_ne!(result["isError"], json!(true));
    let sc = &result["structuredContent"];
    assert_eq!(sc["status"], json!("unhealthy"));
    assert_eq!(sc["error"]["code"], json!("configuration_error"));
    Ok(())
}

#[test]
fn envelope_success_and_upstream_error() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _ok = server.mock(|when, then| {
        when.method(GET)
            .path("/catalog/products")
            .query_param("term", "any:resistor");
        then.status(200).json_body(json!({
            "keywordSearchReturn": {
                "numberOfResults": 1,
                "products": [{"sku": "1278613", "displayName": "LM339"}]
            }
        }));
    });
    let out = run_with_env(
        &[json!({
            "jsonrpc":"2.0","method":"tools/call","id":1,
            "params":{"name":"search_products_by_keyword","arguments":{"keyword":"resistor"}}
        })],
        &[
            ("FARNELL_API_KEY", "k"),
            ("FARNELL_SEARCH_API_URL", &server.url("/catalog/products")),
        ],
    )?;
    let result = &by_id(&out, 1)["result"];
    assert_eq!(result["content"][0]["type"], json!("text"));
    assert!(result.get("isError").is_none());
    let sc = &result["structuredContent"];
    assert_eq!(sc["items"][0]["order_code"], json!("1278613"));
    assert_eq!(sc["meta"]["total_results"], json!(1));
    // Exhausted page: continuation fields are pruned.
    assert!(sc["meta"].get("next_cursor").is_none());
    assert!(sc["meta"].get("has_more").is_none());

    let failing = MockServer::start();
    let _fault = failing.mock(|when, then| {
        when.method(GET).path("/catalog/products");
        then.status(403).json_body(json!({
            "fault": {
                "faultstring": "Rate limit quota violation. Quota limit exceeded.",
                "detail": {"errorcode": "policies.ratelimit.QuotaViolation"}
            }
        }));
    });
    let out = run_with_env(
        &[json!({
            "jsonrpc":"2.0","method":"tools/call","id":2,
            "params":{"name":"search_products_by_keyword","arguments":{"keyword":"resistor"}}
        })],
        &[
            ("FARNELL_API_KEY", "k"),
            ("FARNELL_SEARCH_API_URL", &failing.url("/catalog/products")),
        ],
    )?;
    let result = &by_id(&out, 2)["result"];
    assert_eq!(result["isError"], json!(true));
    assert_eq!(
        result["structuredContent"]["error"]["code"],
        json!("policies.ratelimit.QuotaViolation")
    );
    Ok(())
}

#[test]
fn malformed_line_is_a_parse_error() -> anyhow::Result<()> {
    let out = run_raw("this is not json\n", &[("FARNELL_API_KEY", "k")])?;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["error"]["code"], json!(-32700));
    Ok(())
}

#[test]
fn resources_and_prompts_surface() -> anyhow::Result<()> {
    let out = run_with_env(
        &[
            json!({"jsonrpc":"2.0","method":"resources/list","id":1}),
            json!({"jsonrpc":"2.0","method":"resources/read","id":2,"params":{"uri":"farnell://stores"}}),
            json!({"jsonrpc":"2.0","method":"prompts/list","id":3}),
            json!({"jsonrpc":"2.0","method":"prompts/get","id":4,"params":{"name":"ordering_workflow"}}),
        ],
        &[("FARNELL_API_KEY", "k")],
    )?;

    let resources = by_id(&out, 1)["result"]["resources"].as_array().unwrap().clone();
    assert!(resources.iter().any(|r| r["uri"] == json!("farnell://status")));
    assert!(resources.iter().any(|r| r["uri"] == json!("farnell://stores")));

    let text = by_id(&out, 2)["result"]["contents"][0]["text"].as_str().unwrap().to_string();
    assert!(text.contains("uk.farnell.com"));
    assert!(text.contains("au.element14.com"));

    let prompts = by_id(&out, 3)["result"]["prompts"].as_array().unwrap().clone();
    assert_eq!(prompts.len(), 3);

    let message = by_id(&out, 4)["result"]["messages"][0]["content"]["text"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(message.contains("sandbox_submit_order"));
    Ok(())
}
