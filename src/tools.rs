use crate::types::*;
use serde::{Deserialize, Serialize};

pub use crate::error::ErrorShape;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

pub const CATALOG_TOOLS: [&str; 6] = [
    "health_check",
    "search_products_by_keyword",
    "search_products_by_part_number",
    "get_product_by_order_code",
    "check_product_availability",
    "get_product_pricing",
];

pub const SANDBOX_TOOLS: [&str; 11] = [
    "sandbox_add_to_cart",
    "sandbox_get_cart",
    "sandbox_update_cart_item",
    "sandbox_delete_cart_item",
    "sandbox_clear_cart",
    "sandbox_get_shipping_addresses",
    "sandbox_confirm_shipping_address",
    "sandbox_get_shipping_methods",
    "sandbox_confirm_shipping_method",
    "sandbox_review_order",
    "sandbox_submit_order",
];

pub fn is_known_tool(name: &str) -> bool {
    CATALOG_TOOLS.contains(&name) || SANDBOX_TOOLS.contains(&name)
}

/// Tool descriptors for tools/list. Sandbox-only tools are advertised only
/// when the environment mode is sandbox; they do not exist in production.
pub fn tool_descriptors(include_sandbox: bool) -> Vec<ToolDescriptor> {
    let response_detail = serde_json::json!({
        "type": "string",
        "enum": ["small", "medium", "large", "prices", "inventory"]
    });

    let health_check = ToolDescriptor {
        name: "health_check".into(),
        description: "Check server status, configuration, and rate-limit headroom.".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {}
        }),
    };

    let search_by_keyword = ToolDescriptor {
        name: "search_products_by_keyword".into(),
        description: "Search the catalog by keyword; returns products with pricing, stock and attributes.".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "keyword": {"type": "string"},
                "in_stock_only": {"type": "boolean"},
                "rohs_compliant_only": {"type": "boolean"},
                "max_results": {"type": "integer", "minimum": 1, "maximum": 100},
                "cursor": {"type": "string"},
                "response_detail": response_detail.clone()
            },
            "required": ["keyword"]
        }),
    };

    let search_by_part_number = ToolDescriptor {
        name: "search_products_by_part_number".into(),
        description: "Search by manufacturer part number (exact or partial).".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "manufacturer_part_number": {"type": "string"},
                "in_stock_only": {"type": "boolean"},
                "rohs_compliant_only": {"type": "boolean"},
                "max_results": {"type": "integer", "minimum": 1, "maximum": 100},
                "cursor": {"type": "string"},
                "response_detail": response_detail.clone()
            },
            "required": ["manufacturer_part_number"]
        }),
    };

    let get_by_order_code = ToolDescriptor {
        name: "get_product_by_order_code".into(),
        description: "Get one product by its Farnell/Newark/element14 order code.".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "order_code": {"type": "string"},
                "response_detail": response_detail
            },
            "required": ["order_code"]
        }),
    };

    let order_codes = serde_json::json!({
        "type": "array",
        "items": {"type": "string"},
        "minItems": 1,
        "maxItems": 20
    });

    let check_availability = ToolDescriptor {
        name: "check_product_availability".into(),
        description: "Check real-time stock levels and lead times for up to 20 order codes.".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {"order_codes": order_codes.clone()},
            "required": ["order_codes"]
        }),
    };

    let get_pricing = ToolDescriptor {
        name: "get_product_pricing".into(),
        description: "Get volume pricing tiers for up to 20 order codes.".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {"order_codes": order_codes},
            "required": ["order_codes"]
        }),
    };

    let mut tools = vec![
        health_check,
        search_by_keyword,
        search_by_part_number,
        get_by_order_code,
        check_availability,
        get_pricing,
    ];

    if !include_sandbox {
        return tools;
    }

    let empty_schema = serde_json::json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {}
    });

    tools.push(ToolDescriptor {
        name: "sandbox_add_to_cart".into(),
        description: "Add a product to the shopping cart (sandbox only).".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "order_code": {"type": "string"},
                "quantity": {"type": "integer", "minimum": 1}
            },
            "required": ["order_code", "quantity"]
        }),
    });
    tools.push(ToolDescriptor {
        name: "sandbox_get_cart".into(),
        description: "Retrieve current cart contents (sandbox only).".into(),
        input_schema: empty_schema.clone(),
    });
    tools.push(ToolDescriptor {
        name: "sandbox_update_cart_item".into(),
        description: "Change the quantity of a cart line item (sandbox only).".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "line_item_id": {"type": "string"},
                "quantity": {"type": "integer", "minimum": 1}
            },
            "required": ["line_item_id", "quantity"]
        }),
    });
    tools.push(ToolDescriptor {
        name: "sandbox_delete_cart_item".into(),
        description: "Remove a line item from the cart (sandbox only).".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {"line_item_id": {"type": "string"}},
            "required": ["line_item_id"]
        }),
    });
    tools.push(ToolDescriptor {
        name: "sandbox_clear_cart".into(),
        description: "Clear all items from the cart (sandbox only).".into(),
        input_schema: empty_schema.clone(),
    });
    tools.push(ToolDescriptor {
        name: "sandbox_get_shipping_addresses".into(),
        description: "List available shipping addresses (sandbox only).".into(),
        input_schema: empty_schema.clone(),
    });
    tools.push(ToolDescriptor {
        name: "sandbox_confirm_shipping_address".into(),
        description: "Select the shipping address for the order (sandbox only).".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {"address_id": {"type": "string"}},
            "required": ["address_id"]
        }),
    });
    tools.push(ToolDescriptor {
        name: "sandbox_get_shipping_methods".into(),
        description: "List available shipping methods (sandbox only).".into(),
        input_schema: empty_schema.clone(),
    });
    tools.push(ToolDescriptor {
        name: "sandbox_confirm_shipping_method".into(),
        description: "Select the shipping method for the order (sandbox only).".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {"method_id": {"type": "string"}},
            "required": ["method_id"]
        }),
    });
    tools.push(ToolDescriptor {
        name: "sandbox_review_order".into(),
        description: "Review the full order (cart, address, method, totals) before submission (sandbox only).".into(),
        input_schema: empty_schema.clone(),
    });
    tools.push(ToolDescriptor {
        name: "sandbox_submit_order".into(),
        description: "Submit the order for processing (sandbox only).".into(),
        input_schema: empty_schema,
    });

    tools
}

// Shared result meta across tools. `next_cursor` is an opaque continuation
// for the search window; pruned from the envelope when there is no next page.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_results: Option<i64>,
}

impl Meta {
    pub fn none() -> Self {
        Meta { next_cursor: None, has_more: false, total_results: None }
    }
}

// Tool inputs

#[derive(Debug, Deserialize)]
pub struct SearchByKeywordInput {
    pub keyword: String,
    pub in_stock_only: Option<bool>,
    pub rohs_compliant_only: Option<bool>,
    pub max_results: Option<u32>,
    pub cursor: Option<String>,
    pub response_detail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchByPartNumberInput {
    pub manufacturer_part_number: String,
    pub in_stock_only: Option<bool>,
    pub rohs_compliant_only: Option<bool>,
    pub max_results: Option<u32>,
    pub cursor: Option<String>,
    pub response_detail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetByOrderCodeInput {
    pub order_code: String,
    pub response_detail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckAvailabilityInput {
    pub order_codes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetPricingInput {
    pub order_codes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddToCartInput {
    pub order_code: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemInput {
    pub line_item_id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct DeleteCartItemInput {
    pub line_item_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmShippingAddressInput {
    pub address_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmShippingMethodInput {
    pub method_id: String,
}

// Tool outputs: { items/item/cart, meta, error? }

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub items: Option<Vec<Product>>,
    pub meta: Meta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorShape>,
}

#[derive(Debug, Serialize)]
pub struct ProductOutput {
    pub item: Option<Product>,
    pub meta: Meta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorShape>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityOutput {
    pub items: Option<Vec<ProductAvailability>>,
    pub meta: Meta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorShape>,
}

#[derive(Debug, Serialize)]
pub struct PricingOutput {
    pub items: Option<Vec<ProductPricing>>,
    pub meta: Meta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorShape>,
}

#[derive(Debug, Serialize)]
pub struct CartOutput {
    pub cart: Option<CartSummary>,
    pub meta: Meta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorShape>,
}

#[derive(Debug, Serialize)]
pub struct AddressesOutput {
    pub items: Option<Vec<ShippingAddress>>,
    pub meta: Meta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorShape>,
}

#[derive(Debug, Serialize)]
pub struct MethodsOutput {
    pub items: Option<Vec<ShippingMethod>>,
    pub meta: Meta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorShape>,
}

#[derive(Debug, Serialize)]
pub struct ReviewOutput {
    pub item: Option<OrderReview>,
    pub meta: Meta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorShape>,
}

#[derive(Debug, Serialize)]
pub struct SubmitOutput {
    pub item: Option<OrderConfirmation>,
    pub meta: Meta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorShape>,
}

#[derive(Debug, Serialize)]
pub struct AckOutput {
    pub item: Option<Ack>,
    pub meta: Meta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorShape>,
}
