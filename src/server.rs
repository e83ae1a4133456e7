//! Newline-delimited JSON-RPC 2.0 loop over stdio.
//!
//! One request per line in, one response per line out. Responses are
//! serialized through a single writer task so concurrent tool calls never
//! interleave bytes on stdout. Configuration failure at startup does not
//! kill the server: tools/list and health_check still answer, and every
//! other tool reports the configuration error in its result envelope.

use crate::config::Config;
use crate::error::Error;
use crate::gateway::{Gateway, SearchPage};
use crate::http;
use crate::mcp::mcp_wrap;
use crate::stores::{self, Region};
use crate::tools::{
    self, AckOutput, AddToCartInput, AddressesOutput, AvailabilityOutput, CartOutput,
    CheckAvailabilityInput, ConfirmShippingAddressInput, ConfirmShippingMethodInput,
    DeleteCartItemInput, GetByOrderCodeInput, GetPricingInput, MethodsOutput, Meta,
    PricingOutput, ProductOutput, ReviewOutput, SearchByKeywordInput, SearchByPartNumberInput,
    SearchOutput, SubmitOutput, UpdateCartItemInput, PROTOCOL_VERSION,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use uuid::Uuid;

// Minimal JSON-RPC 2.0 types
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Id {
    Str(String),
    Num(i64),
    Null,
}

#[derive(Debug, Serialize, Deserialize)]
struct Request {
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: Value,
    id: Option<Id>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Response {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
    id: Option<Id>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

fn rpc_error(id: Option<Id>, code: i64, message: &str, data: Option<Value>) -> Response {
    Response {
        jsonrpc: "2.0".into(),
        result: None,
        error: Some(RpcError { code, message: message.into(), data }),
        id,
    }
}

fn rpc_ok(id: Option<Id>, result: Value) -> Response {
    Response { jsonrpc: "2.0".into(), result: Some(result), error: None, id }
}

type Boot = Result<Arc<Gateway>, Error>;

pub async fn run_stdio_server() -> anyhow::Result<()> {
    let boot: Boot = Config::from_env().and_then(Gateway::new).map(Arc::new);
    match &boot {
        Ok(gw) => info!(
            "farnell-mcp serving store {} in {} mode; protocol={}",
            gw.store().id,
            gw.environment().as_str(),
            PROTOCOL_VERSION
        ),
        Err(e) => warn!("starting without a usable gateway: {}", e),
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<Response>();
    let writer = tokio::spawn(async move {
        let mut out = tokio::io::stdout();
        while let Some(resp) = rx.recv().await {
            let payload = match serde_json::to_string(&resp) {
                Ok(p) => p,
                Err(e) => {
                    warn!("failed to serialize response: {}", e);
                    continue;
                }
            };
            if out.write_all(payload.as_bytes()).await.is_err() {
                break;
            }
            if out.write_all(b"\n").await.is_err() {
                break;
            }
            let _ = out.flush().await;
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let req: Request = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                let _ = tx.send(rpc_error(None, -32700, &format!("Parse error: {}", e), None));
                continue;
            }
        };
        debug!("received method={}", req.method);

        // Notifications carry no id and expect no response.
        if req.id.is_none() && req.method.starts_with("notifications/") {
            continue;
        }

        if req.method == "tools/call" {
            // Tool calls hit the network; run them off the read loop so a
            // slow upstream does not block the next request.
            let boot = boot.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let resp = handle_tools_call(&boot, req.id, req.params).await;
                let _ = tx.send(resp);
            });
        } else {
            let resp = dispatch(&boot, req).await;
            let _ = tx.send(resp);
        }
    }

    // Let in-flight tool calls drain before exiting.
    drop(tx);
    let _ = writer.await;
    Ok(())
}

async fn dispatch(boot: &Boot, req: Request) -> Response {
    match req.method.as_str() {
        "initialize" => handle_initialize(req.id),
        "ping" => rpc_ok(req.id, json!({})),
        "tools/list" => handle_tools_list(boot, req.id),
        "resources/list" => handle_resources_list(req.id),
        "resources/read" => handle_resources_read(boot, req.id, req.params).await,
        "prompts/list" => handle_prompts_list(req.id),
        "prompts/get" => handle_prompts_get(req.id, req.params),
        other => rpc_error(req.id, -32601, &format!("Method not found: {}", other), None),
    }
}

fn handle_initialize(id: Option<Id>) -> Response {
    rpc_ok(
        id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": "farnell-mcp",
                "version": env!("CARGO_PKG_VERSION"),
            },
            "capabilities": {
                "tools": {},
                "resources": {},
                "prompts": {},
            }
        }),
    )
}

fn handle_tools_list(boot: &Boot, id: Option<Id>) -> Response {
    // Sandbox tools exist only when the gateway booted in sandbox mode.
    let include_sandbox = matches!(boot, Ok(gw) if gw.is_sandbox());
    let descriptors = tools::tool_descriptors(include_sandbox);
    rpc_ok(id, json!({ "tools": descriptors }))
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

fn handle_resources_list(id: Option<Id>) -> Response {
    rpc_ok(
        id,
        json!({
            "resources": [
                {
                    "uri": "farnell://status",
                    "name": "Server status",
                    "description": "Current configuration, environment mode and rate-limit headroom",
                    "mimeType": "application/json"
                },
                {
                    "uri": "farnell://stores",
                    "name": "Store directory",
                    "description": "Supported storefront domains grouped by region, with currencies",
                    "mimeType": "text/markdown"
                }
            ]
        }),
    )
}

#[derive(Deserialize)]
struct ResourceReadParams {
    uri: String,
}

async fn handle_resources_read(boot: &Boot, id: Option<Id>, params: Value) -> Response {
    let parsed: ResourceReadParams = match serde_json::from_value(params) {
        Ok(p) => p,
        Err(_) => return rpc_error(id, -32602, "Invalid params", None),
    };
    match parsed.uri.as_str() {
        "farnell://status" => {
            let status = match boot {
                Ok(gw) => serde_json::to_value(gw.health_check().await).unwrap_or_default(),
                Err(e) => json!({
                    "status": "unconfigured",
                    "server": "farnell-mcp",
                    "version": env!("CARGO_PKG_VERSION"),
                    "error": e.shape(),
                }),
            };
            rpc_ok(
                id,
                json!({
                    "contents": [{
                        "uri": "farnell://status",
                        "mimeType": "application/json",
                        "text": status.to_string(),
                    }]
                }),
            )
        }
        "farnell://stores" => rpc_ok(
            id,
            json!({
                "contents": [{
                    "uri": "farnell://stores",
                    "mimeType": "text/markdown",
                    "text": render_store_directory(),
                }]
            }),
        ),
        other => rpc_error(id, -32602, &format!("Unknown resource: {}", other), None),
    }
}

fn render_store_directory() -> String {
    let mut out = String::from("# Supported storefronts\n");
    for region in [Region::NorthAmerica, Region::Europe, Region::AsiaPacific] {
        let _ = write!(out, "\n## {}\n\n", region.label());
        for store in stores::STORES.iter().filter(|s| s.region == region) {
            let _ = write!(out, "- `{}`: {} ({})\n", store.id, store.label, store.currency);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

const PROMPTS: [(&str, &str); 3] = [
    (
        "getting_started",
        "Overview of the available tools and how they fit together",
    ),
    (
        "search_workflow",
        "How to search the catalog, paginate results and drill into one product",
    ),
    (
        "ordering_workflow",
        "The sandbox order sequence from cart to submission",
    ),
];

fn prompt_text(name: &str) -> Option<String> {
    let text = match name {
        "getting_started" => {
            "This server exposes the element14 distributor catalog (Farnell, Newark, \
             element14 storefronts). Start with health_check to confirm the configured \
             store and environment. Catalog tools work in every mode: \
             search_products_by_keyword, search_products_by_part_number, \
             get_product_by_order_code, check_product_availability and \
             get_product_pricing. Tools prefixed sandbox_ drive the order workflow and \
             are available only when the server runs in sandbox mode. Read the \
             farnell://stores resource for the supported storefront domains."
        }
        "search_workflow" => {
            "Search with search_products_by_keyword (free text) or \
             search_products_by_part_number (manufacturer part number). Narrow results \
             with in_stock_only and rohs_compliant_only, and pick a response_detail of \
             small, medium or large. When meta.has_more is true, pass meta.next_cursor \
             back as the cursor argument to fetch the next page. Once you have an order \
             code, use get_product_by_order_code for full details, or batch up to 20 \
             codes through check_product_availability and get_product_pricing."
        }
        "ordering_workflow" => {
            "The sandbox order flow (sandbox environment only): add items with \
             sandbox_add_to_cart, inspect with sandbox_get_cart, adjust with \
             sandbox_update_cart_item or sandbox_delete_cart_item. Then pick an address \
             via sandbox_get_shipping_addresses and sandbox_confirm_shipping_address, a \
             method via sandbox_get_shipping_methods and \
             sandbox_confirm_shipping_method, verify everything with \
             sandbox_review_order, and finish with sandbox_submit_order. No real order \
             is placed and nothing is charged."
        }
        _ => return None,
    };
    Some(text.to_string())
}

fn handle_prompts_list(id: Option<Id>) -> Response {
    let prompts: Vec<Value> = PROMPTS
        .iter()
        .map(|(name, description)| {
            json!({ "name": name, "description": description, "arguments": [] })
        })
        .collect();
    rpc_ok(id, json!({ "prompts": prompts }))
}

#[derive(Deserialize)]
struct PromptGetParams {
    name: String,
}

fn handle_prompts_get(id: Option<Id>, params: Value) -> Response {
    let parsed: PromptGetParams = match serde_json::from_value(params) {
        Ok(p) => p,
        Err(_) => return rpc_error(id, -32602, "Invalid params", None),
    };
    let Some(text) = prompt_text(&parsed.name) else {
        return rpc_error(id, -32602, &format!("Unknown prompt: {}", parsed.name), None);
    };
    let description = PROMPTS
        .iter()
        .find(|(name, _)| *name == parsed.name)
        .map(|(_, d)| *d)
        .unwrap_or_default();
    rpc_ok(
        id,
        json!({
            "description": description,
            "messages": [{
                "role": "user",
                "content": { "type": "text", "text": text }
            }]
        }),
    )
}

// ---------------------------------------------------------------------------
// Tool calls
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

async fn handle_tools_call(boot: &Boot, id: Option<Id>, params: Value) -> Response {
    let call: ToolCallParams = match serde_json::from_value(params) {
        Ok(c) => c,
        Err(_) => return rpc_error(id, -32602, "Invalid params", None),
    };
    // Unknown tool wins over a missing gateway: callers probing the tool
    // surface get the protocol-level answer either way.
    if !tools::is_known_tool(&call.name) {
        return rpc_error(id, -32601, &format!("Tool not found: {}", call.name), None);
    }
    let call_id = Uuid::new_v4();
    debug!("tools/call {} [{}]", call.name, call_id);

    if call.name == "health_check" {
        return handle_health_check(boot, id).await;
    }

    let gw = match boot {
        Ok(gw) => gw.as_ref(),
        Err(e) => {
            return rpc_ok(id, mcp_wrap(json!({ "error": e.shape() }), None, true));
        }
    };

    match call.name.as_str() {
        "search_products_by_keyword" => handle_search_by_keyword(gw, id, call.arguments).await,
        "search_products_by_part_number" => {
            handle_search_by_part_number(gw, id, call.arguments).await
        }
        "get_product_by_order_code" => handle_get_by_order_code(gw, id, call.arguments).await,
        "check_product_availability" => handle_check_availability(gw, id, call.arguments).await,
        "get_product_pricing" => handle_get_pricing(gw, id, call.arguments).await,
        "sandbox_add_to_cart" => handle_add_to_cart(gw, id, call.arguments).await,
        "sandbox_get_cart" => handle_get_cart(gw, id).await,
        "sandbox_update_cart_item" => handle_update_cart_item(gw, id, call.arguments).await,
        "sandbox_delete_cart_item" => handle_delete_cart_item(gw, id, call.arguments).await,
        "sandbox_clear_cart" => handle_clear_cart(gw, id).await,
        "sandbox_get_shipping_addresses" => handle_get_shipping_addresses(gw, id).await,
        "sandbox_confirm_shipping_address" => {
            handle_confirm_shipping_address(gw, id, call.arguments).await
        }
        "sandbox_get_shipping_methods" => handle_get_shipping_methods(gw, id).await,
        "sandbox_confirm_shipping_method" => {
            handle_confirm_shipping_method(gw, id, call.arguments).await
        }
        "sandbox_review_order" => handle_review_order(gw, id).await,
        "sandbox_submit_order" => handle_submit_order(gw, id).await,
        other => rpc_error(id, -32601, &format!("Tool not found: {}", other), None),
    }
}

async fn handle_health_check(boot: &Boot, id: Option<Id>) -> Response {
    let structured = match boot {
        Ok(gw) => serde_json::to_value(gw.health_check().await).unwrap_or_default(),
        Err(e) => json!({
            "status": "unhealthy",
            "server": "farnell-mcp",
            "version": env!("CARGO_PKG_VERSION"),
            "error": e.shape(),
        }),
    };
    rpc_ok(id, mcp_wrap(structured, None, false))
}

fn finish<T: Serialize>(id: Option<Id>, out: T, is_error: bool) -> Response {
    let structured = serde_json::to_value(out).unwrap_or_default();
    rpc_ok(id, mcp_wrap(structured, None, is_error))
}

/// A pre-flight validation failure is a caller mistake; it maps to the
/// JSON-RPC invalid-params code rather than an error envelope.
fn tool_error(id: Option<Id>, e: Error, build: impl FnOnce(crate::error::ErrorShape) -> Value) -> Response {
    match e {
        Error::InvalidInput(msg) => {
            rpc_error(id, -32602, &format!("Invalid params: {}", msg), None)
        }
        other => {
            let structured = build(other.shape());
            rpc_ok(id, mcp_wrap(structured, None, true))
        }
    }
}

/// Derive the continuation meta for one fetched page. The next cursor
/// reuses the page size the window was fetched with.
fn search_meta(page: &SearchPage) -> Meta {
    let fetched = page.offset as i64 + page.result.products.len() as i64;
    let has_more = page.result.total_results > fetched && !page.result.products.is_empty();
    let next_cursor = if has_more {
        Some(http::encode_search_cursor(http::SearchCursor {
            offset: page.offset + page.num_results,
            num_results: page.num_results,
        }))
    } else {
        None
    };
    Meta { next_cursor, has_more, total_results: Some(page.result.total_results) }
}

async fn handle_search_by_keyword(gw: &Gateway, id: Option<Id>, params: Value) -> Response {
    let input: SearchByKeywordInput = match serde_json::from_value(params) {
        Ok(v) => v,
        Err(e) => return rpc_error(id, -32602, &format!("Invalid params: {}", e), None),
    };
    match gw.search_products_by_keyword(input).await {
        Ok(page) => {
            let meta = search_meta(&page);
            finish(id, SearchOutput { items: Some(page.result.products), meta, error: None }, false)
        }
        Err(e) => tool_error(id, e, |shape| {
            serde_json::to_value(SearchOutput { items: None, meta: Meta::none(), error: Some(shape) })
                .unwrap_or_default()
        }),
    }
}

async fn handle_search_by_part_number(gw: &Gateway, id: Option<Id>, params: Value) -> Response {
    let input: SearchByPartNumberInput = match serde_json::from_value(params) {
        Ok(v) => v,
        Err(e) => return rpc_error(id, -32602, &format!("Invalid params: {}", e), None),
    };
    match gw.search_products_by_part_number(input).await {
        Ok(page) => {
            let meta = search_meta(&page);
            finish(id, SearchOutput { items: Some(page.result.products), meta, error: None }, false)
        }
        Err(e) => tool_error(id, e, |shape| {
            serde_json::to_value(SearchOutput { items: None, meta: Meta::none(), error: Some(shape) })
                .unwrap_or_default()
        }),
    }
}

async fn handle_get_by_order_code(gw: &Gateway, id: Option<Id>, params: Value) -> Response {
    let input: GetByOrderCodeInput = match serde_json::from_value(params) {
        Ok(v) => v,
        Err(e) => return rpc_error(id, -32602, &format!("Invalid params: {}", e), None),
    };
    match gw.get_product_by_order_code(input).await {
        Ok(Some(product)) => finish(
            id,
            ProductOutput { item: Some(product), meta: Meta::none(), error: None },
            false,
        ),
        Ok(None) => finish(
            id,
            ProductOutput {
                item: None,
                meta: Meta::none(),
                error: Some(crate::error::ErrorShape {
                    code: "not_found".into(),
                    message: "No product matches that order code".into(),
                    retriable: false,
                }),
            },
            true,
        ),
        Err(e) => tool_error(id, e, |shape| {
            serde_json::to_value(ProductOutput { item: None, meta: Meta::none(), error: Some(shape) })
                .unwrap_or_default()
        }),
    }
}

async fn handle_check_availability(gw: &Gateway, id: Option<Id>, params: Value) -> Response {
    let input: CheckAvailabilityInput = match serde_json::from_value(params) {
        Ok(v) => v,
        Err(e) => return rpc_error(id, -32602, &format!("Invalid params: {}", e), None),
    };
    match gw.check_product_availability(input).await {
        Ok(items) => finish(
            id,
            AvailabilityOutput { items: Some(items), meta: Meta::none(), error: None },
            false,
        ),
        Err(e) => tool_error(id, e, |shape| {
            serde_json::to_value(AvailabilityOutput {
                items: None,
                meta: Meta::none(),
                error: Some(shape),
            })
            .unwrap_or_default()
        }),
    }
}

async fn handle_get_pricing(gw: &Gateway, id: Option<Id>, params: Value) -> Response {
    let input: GetPricingInput = match serde_json::from_value(params) {
        Ok(v) => v,
        Err(e) => return rpc_error(id, -32602, &format!("Invalid params: {}", e), None),
    };
    match gw.get_product_pricing(input).await {
        Ok(items) => finish(
            id,
            PricingOutput { items: Some(items), meta: Meta::none(), error: None },
            false,
        ),
        Err(e) => tool_error(id, e, |shape| {
            serde_json::to_value(PricingOutput { items: None, meta: Meta::none(), error: Some(shape) })
                .unwrap_or_default()
        }),
    }
}

async fn handle_add_to_cart(gw: &Gateway, id: Option<Id>, params: Value) -> Response {
    let input: AddToCartInput = match serde_json::from_value(params) {
        Ok(v) => v,
        Err(e) => return rpc_error(id, -32602, &format!("Invalid params: {}", e), None),
    };
    match gw.sandbox_add_to_cart(input).await {
        Ok(cart) => finish(id, CartOutput { cart: Some(cart), meta: Meta::none(), error: None }, false),
        Err(e) => tool_error(id, e, |shape| {
            serde_json::to_value(CartOutput { cart: None, meta: Meta::none(), error: Some(shape) })
                .unwrap_or_default()
        }),
    }
}

async fn handle_get_cart(gw: &Gateway, id: Option<Id>) -> Response {
    match gw.sandbox_get_cart().await {
        Ok(cart) => finish(id, CartOutput { cart: Some(cart), meta: Meta::none(), error: None }, false),
        Err(e) => tool_error(id, e, |shape| {
            serde_json::to_value(CartOutput { cart: None, meta: Meta::none(), error: Some(shape) })
                .unwrap_or_default()
        }),
    }
}

async fn handle_update_cart_item(gw: &Gateway, id: Option<Id>, params: Value) -> Response {
    let input: UpdateCartItemInput = match serde_json::from_value(params) {
        Ok(v) => v,
        Err(e) => return rpc_error(id, -32602, &format!("Invalid params: {}", e), None),
    };
    match gw.sandbox_update_cart_item(input).await {
        Ok(cart) => finish(id, CartOutput { cart: Some(cart), meta: Meta::none(), error: None }, false),
        Err(e) => tool_error(id, e, |shape| {
            serde_json::to_value(CartOutput { cart: None, meta: Meta::none(), error: Some(shape) })
                .unwrap_or_default()
        }),
    }
}

async fn handle_delete_cart_item(gw: &Gateway, id: Option<Id>, params: Value) -> Response {
    let input: DeleteCartItemInput = match serde_json::from_value(params) {
        Ok(v) => v,
        Err(e) => return rpc_error(id, -32602, &format!("Invalid params: {}", e), None),
    };
    match gw.sandbox_delete_cart_item(input).await {
        Ok(cart) => finish(id, CartOutput { cart: Some(cart), meta: Meta::none(), error: None }, false),
        Err(e) => tool_error(id, e, |shape| {
            serde_json::to_value(CartOutput { cart: None, meta: Meta::none(), error: Some(shape) })
                .unwrap_or_default()
        }),
    }
}

async fn handle_clear_cart(gw: &Gateway, id: Option<Id>) -> Response {
    match gw.sandbox_clear_cart().await {
        Ok(ack) => finish(id, AckOutput { item: Some(ack), meta: Meta::none(), error: None }, false),
        Err(e) => tool_error(id, e, |shape| {
            serde_json::to_value(AckOutput { item: None, meta: Meta::none(), error: Some(shape) })
                .unwrap_or_default()
        }),
    }
}

async fn handle_get_shipping_addresses(gw: &Gateway, id: Option<Id>) -> Response {
    match gw.sandbox_get_shipping_addresses().await {
        Ok(items) => finish(
            id,
            AddressesOutput { items: Some(items), meta: Meta::none(), error: None },
            false,
        ),
        Err(e) => tool_error(id, e, |shape| {
            serde_json::to_value(AddressesOutput { items: None, meta: Meta::none(), error: Some(shape) })
                .unwrap_or_default()
        }),
    }
}

async fn handle_confirm_shipping_address(gw: &Gateway, id: Option<Id>, params: Value) -> Response {
    let input: ConfirmShippingAddressInput = match serde_json::from_value(params) {
        Ok(v) => v,
        Err(e) => return rpc_error(id, -32602, &format!("Invalid params: {}", e), None),
    };
    match gw.sandbox_confirm_shipping_address(input).await {
        Ok(ack) => finish(id, AckOutput { item: Some(ack), meta: Meta::none(), error: None }, false),
        Err(e) => tool_error(id, e, |shape| {
            serde_json::to_value(AckOutput { item: None, meta: Meta::none(), error: Some(shape) })
                .unwrap_or_default()
        }),
    }
}

async fn handle_get_shipping_methods(gw: &Gateway, id: Option<Id>) -> Response {
    match gw.sandbox_get_shipping_methods().await {
        Ok(items) => finish(
            id,
            MethodsOutput { items: Some(items), meta: Meta::none(), error: None },
            false,
        ),
        Err(e) => tool_error(id, e, |shape| {
            serde_json::to_value(MethodsOutput { items: None, meta: Meta::none(), error: Some(shape) })
                .unwrap_or_default()
        }),
    }
}

async fn handle_confirm_shipping_method(gw: &Gateway, id: Option<Id>, params: Value) -> Response {
    let input: ConfirmShippingMethodInput = match serde_json::from_value(params) {
        Ok(v) => v,
        Err(e) => return rpc_error(id, -32602, &format!("Invalid params: {}", e), None),
    };
    match gw.sandbox_confirm_shipping_method(input).await {
        Ok(ack) => finish(id, AckOutput { item: Some(ack), meta: Meta::none(), error: None }, false),
        Err(e) => tool_error(id, e, |shape| {
            serde_json::to_value(AckOutput { item: None, meta: Meta::none(), error: Some(shape) })
                .unwrap_or_default()
        }),
    }
}

async fn handle_review_order(gw: &Gateway, id: Option<Id>) -> Response {
    match gw.sandbox_review_order().await {
        Ok(review) => finish(
            id,
            ReviewOutput { item: Some(review), meta: Meta::none(), error: None },
            false,
        ),
        Err(e) => tool_error(id, e, |shape| {
            serde_json::to_value(ReviewOutput { item: None, meta: Meta::none(), error: Some(shape) })
                .unwrap_or_default()
        }),
    }
}

async fn handle_submit_order(gw: &Gateway, id: Option<Id>) -> Response {
    match gw.sandbox_submit_order().await {
        Ok(confirmation) => finish(
            id,
            SubmitOutput { item: Some(confirmation), meta: Meta::none(), error: None },
            false,
        ),
        Err(e) => tool_error(id, e, |shape| {
            serde_json::to_value(SubmitOutput { item: None, meta: Meta::none(), error: Some(shape) })
                .unwrap_or_default()
        }),
    }
}
