//! Translates upstream Partner API payloads into the internal stable schema.
//!
//! Two error vocabularies arrive on the wire: the Apigee fault envelope
//! (`{"fault": {"faultstring", "detail": {"errorcode"}}}`, used by the
//! Product Search host for quota and key failures) and the Order API shape
//! (`{"error"|"errorCode", "message"}`). When either is present the call
//! fails with the original code and message, even if sibling data fields
//! exist; callers never see half-populated successes.

use crate::error::Error;
use crate::http::Envelope;
use crate::types::*;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

const SEARCH_ROOT_KEYS: [&str; 3] = [
    "keywordSearchReturn",
    "manufacturerPartNumberSearchReturn",
    "premierFarnellPartNumberReturn",
];

/// Decimal conversion from the serialized JSON number literal, not through
/// float arithmetic.
fn decimal_from_number(n: &serde_json::Number) -> Option<Decimal> {
    let s = n.to_string();
    Decimal::from_str(&s)
        .ok()
        .or_else(|| Decimal::from_scientific(&s).ok())
}

fn status_code_to_error(status: u16, text: &str) -> Error {
    let code = match status {
        400 => "bad_request",
        401 => "unauthorized",
        403 => "forbidden",
        404 => "not_found",
        409 => "conflict",
        429 => "rate_limited",
        500..=599 => "upstream_error",
        _ => "server_error",
    };
    let message = if text.trim().is_empty() {
        format!("HTTP {}", status)
    } else {
        text.to_string()
    };
    Error::upstream(code, message, Some(status))
}

fn extract_upstream_error(env: &Envelope) -> Option<Error> {
    let body = env.body.as_ref()?;
    if let Some(fault) = body.get("fault") {
        let message = fault
            .get("faultstring")
            .and_then(|v| v.as_str())
            .unwrap_or("upstream fault")
            .to_string();
        let code = fault
            .get("detail")
            .and_then(|d| d.get("errorcode"))
            .and_then(|v| v.as_str())
            .unwrap_or("upstream_fault")
            .to_string();
        return Some(Error::upstream(code, message, Some(env.status)));
    }
    for key in ["errorCode", "error"] {
        if let Some(code) = body.get(key).and_then(|v| v.as_str()) {
            let message = body
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or(code)
                .to_string();
            return Some(Error::upstream(code, message, Some(env.status)));
        }
    }
    None
}

/// Gatekeeper for every normalizer: a recognized error body wins over any
/// sibling data, then the raw status, then JSON parseability.
fn checked_body(env: &Envelope) -> Result<Value, Error> {
    if let Some(err) = extract_upstream_error(env) {
        return Err(err);
    }
    if !env.is_success() {
        return Err(status_code_to_error(env.status, &env.text));
    }
    match &env.body {
        Some(v) => Ok(v.clone()),
        None => Err(Error::upstream(
            "server_error",
            "response body was not valid JSON",
            Some(env.status),
        )),
    }
}

fn unexpected(env: &Envelope, what: &str) -> Error {
    Error::upstream(
        "server_error",
        format!("unexpected response payload: {}", what),
        Some(env.status),
    )
}

// ---------------------------------------------------------------------------
// Product Search wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireSearchRoot {
    number_of_results: i64,
    products: Vec<WireProduct>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireProduct {
    sku: Option<String>,
    display_name: Option<String>,
    brand_name: Option<String>,
    translated_manufacturer_part_number: Option<String>,
    product_status: Option<String>,
    rohs_status_code: Option<String>,
    pack_size: Option<i64>,
    unit_of_measure: Option<String>,
    translated_minimum_order_quality: Option<i64>,
    stock: Option<WireStock>,
    prices: Vec<WirePrice>,
    datasheets: Vec<WireDatasheet>,
    image: Option<WireImage>,
    attributes: Vec<WireAttribute>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireStock {
    level: Option<i64>,
    least_lead_time: Option<i64>,
    status: Option<i64>,
    ships_from_multiple_warehouses: Option<bool>,
    breakdown: Vec<WireBreakdown>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireBreakdown {
    inv: Option<i64>,
    region: Option<String>,
    warehouse: Option<String>,
    lead: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WirePrice {
    from: Option<i64>,
    to: Option<i64>,
    cost: Option<serde_json::Number>,
    currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireDatasheet {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireImage {
    base_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireAttribute {
    attribute_label: Option<String>,
    attribute_value: Option<String>,
    attribute_unit: Option<String>,
}

fn map_price(p: WirePrice, currency_hint: &str) -> Option<PriceBreak> {
    let cost = decimal_from_number(p.cost.as_ref()?)?;
    Some(PriceBreak {
        from: p.from.unwrap_or(1),
        to: p.to,
        cost,
        currency: p.currency.unwrap_or_else(|| currency_hint.to_string()),
    })
}

fn map_breakdown(b: WireBreakdown) -> StockBreakdown {
    StockBreakdown {
        warehouse: b.warehouse,
        region: b.region,
        level: b.inv.unwrap_or(0),
        lead_time_days: b.lead,
    }
}

fn map_stock(s: WireStock) -> Stock {
    Stock {
        level: s.level.unwrap_or(0),
        lead_time_days: s.least_lead_time,
        status: s.status,
        ships_from_multiple_warehouses: s.ships_from_multiple_warehouses.unwrap_or(false),
        breakdown: s.breakdown.into_iter().map(map_breakdown).collect(),
    }
}

fn map_product(w: WireProduct, currency_hint: &str) -> Product {
    Product {
        order_code: w.sku.unwrap_or_default(),
        display_name: w.display_name.unwrap_or_default(),
        manufacturer: w.brand_name,
        manufacturer_part_number: w.translated_manufacturer_part_number,
        product_status: w.product_status,
        rohs_status: w.rohs_status_code,
        pack_size: w.pack_size,
        unit_of_measure: w.unit_of_measure,
        minimum_order_quantity: w.translated_minimum_order_quality,
        stock: w.stock.map(map_stock),
        prices: w
            .prices
            .into_iter()
            .filter_map(|p| map_price(p, currency_hint))
            .collect(),
        datasheet_urls: w.datasheets.into_iter().filter_map(|d| d.url).collect(),
        image_base_name: w.image.and_then(|i| i.base_name),
        attributes: w
            .attributes
            .into_iter()
            .map(|a| ProductAttribute {
                label: a.attribute_label.unwrap_or_default(),
                value: a.attribute_value.unwrap_or_default(),
                unit: a.attribute_unit,
            })
            .collect(),
    }
}

/// Search responses arrive under one of three root keys depending on the
/// term prefix used; each carries `numberOfResults` and `products`.
pub fn normalize_search(env: &Envelope, currency_hint: &str) -> Result<SearchResult, Error> {
    let body = checked_body(env)?;
    let root = SEARCH_ROOT_KEYS
        .iter()
        .find_map(|k| body.get(*k))
        .ok_or_else(|| unexpected(env, "missing search result envelope"))?;
    let wire: WireSearchRoot = serde_json::from_value(root.clone())
        .map_err(|e| unexpected(env, &e.to_string()))?;
    Ok(SearchResult {
        total_results: wire.number_of_results,
        products: wire
            .products
            .into_iter()
            .map(|p| map_product(p, currency_hint))
            .collect(),
    })
}

pub fn normalize_availability(
    env: &Envelope,
    currency_hint: &str,
) -> Result<Vec<ProductAvailability>, Error> {
    let result = normalize_search(env, currency_hint)?;
    Ok(result
        .products
        .into_iter()
        .map(|p| {
            let stock = p.stock.unwrap_or(Stock {
                level: 0,
                lead_time_days: None,
                status: None,
                ships_from_multiple_warehouses: false,
                breakdown: Vec::new(),
            });
            ProductAvailability {
                order_code: p.order_code,
                in_stock: stock.level > 0,
                quantity_available: stock.level,
                lead_time_days: stock.lead_time_days,
                regional_stock: stock.breakdown,
            }
        })
        .collect())
}

pub fn normalize_pricing(
    env: &Envelope,
    currency_hint: &str,
) -> Result<Vec<ProductPricing>, Error> {
    let result = normalize_search(env, currency_hint)?;
    Ok(result
        .products
        .into_iter()
        .map(|p| {
            let currency = p
                .prices
                .first()
                .map(|b| b.currency.clone())
                .unwrap_or_else(|| currency_hint.to_string());
            ProductPricing {
                order_code: p.order_code,
                currency,
                price_breaks: p.prices,
                minimum_order_quantity: p.minimum_order_quantity,
                pack_size: p.pack_size,
                unit_of_measure: p.unit_of_measure,
            }
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Order API wire shapes (camelCase)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireCart {
    cart_id: Option<String>,
    line_items: Vec<WireCartLine>,
    subtotal: Option<serde_json::Number>,
    tax: Option<serde_json::Number>,
    shipping: Option<serde_json::Number>,
    total: Option<serde_json::Number>,
    currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireCartLine {
    line_item_id: Option<String>,
    order_code: Option<String>,
    manufacturer_part_number: Option<String>,
    description: Option<String>,
    quantity: Option<i64>,
    unit_price: Option<serde_json::Number>,
    line_total: Option<serde_json::Number>,
    currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireAddress {
    address_id: Option<String>,
    name: Option<String>,
    company: Option<String>,
    street1: Option<String>,
    street2: Option<String>,
    city: Option<String>,
    state_province: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
    is_default: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireMethod {
    method_id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    cost: Option<serde_json::Number>,
    currency: Option<String>,
    estimated_delivery_days: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireReview {
    cart: Option<WireCart>,
    shipping_address: Option<WireAddress>,
    shipping_method: Option<WireMethod>,
    subtotal: Option<serde_json::Number>,
    tax: Option<serde_json::Number>,
    shipping_cost: Option<serde_json::Number>,
    total: Option<serde_json::Number>,
    currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireSubmission {
    success: Option<bool>,
    order_id: Option<String>,
    order_number: Option<String>,
    message: Option<String>,
    errors: Vec<String>,
}

fn map_money(n: Option<serde_json::Number>) -> Option<Decimal> {
    n.as_ref().and_then(decimal_from_number)
}

fn map_cart(w: WireCart) -> CartSummary {
    CartSummary {
        cart_id: w.cart_id,
        line_items: w
            .line_items
            .into_iter()
            .map(|l| CartLine {
                line_item_id: l.line_item_id.unwrap_or_default(),
                order_code: l.order_code.unwrap_or_default(),
                manufacturer_part_number: l.manufacturer_part_number,
                description: l.description,
                quantity: l.quantity.unwrap_or(0),
                unit_price: map_money(l.unit_price),
                line_total: map_money(l.line_total),
                currency: l.currency,
            })
            .collect(),
        subtotal: map_money(w.subtotal),
        tax: map_money(w.tax),
        shipping: map_money(w.shipping),
        total: map_money(w.total),
        currency: w.currency,
    }
}

fn map_address(w: WireAddress) -> ShippingAddress {
    ShippingAddress {
        address_id: w.address_id.unwrap_or_default(),
        name: w.name.unwrap_or_default(),
        company: w.company,
        street1: w.street1.unwrap_or_default(),
        street2: w.street2,
        city: w.city.unwrap_or_default(),
        state_province: w.state_province,
        postal_code: w.postal_code.unwrap_or_default(),
        country: w.country.unwrap_or_default(),
        is_default: w.is_default.unwrap_or(false),
    }
}

fn map_method(w: WireMethod) -> ShippingMethod {
    ShippingMethod {
        method_id: w.method_id.unwrap_or_default(),
        name: w.name.unwrap_or_default(),
        description: w.description,
        cost: map_money(w.cost),
        currency: w.currency,
        estimated_delivery_days: w.estimated_delivery_days,
    }
}

/// Cart payloads arrive either bare or wrapped as `{success, message, cart}`.
pub fn normalize_cart(env: &Envelope) -> Result<CartSummary, Error> {
    let body = checked_body(env)?;
    let cart_value = body.get("cart").cloned().unwrap_or(body);
    let wire: WireCart = serde_json::from_value(cart_value)
        .map_err(|e| unexpected(env, &e.to_string()))?;
    Ok(map_cart(wire))
}

pub fn normalize_addresses(env: &Envelope) -> Result<Vec<ShippingAddress>, Error> {
    let body = checked_body(env)?;
    let list = body.get("addresses").cloned().unwrap_or(body);
    let wire: Vec<WireAddress> = serde_json::from_value(list)
        .map_err(|e| unexpected(env, &e.to_string()))?;
    Ok(wire.into_iter().map(map_address).collect())
}

pub fn normalize_methods(env: &Envelope) -> Result<Vec<ShippingMethod>, Error> {
    let body = checked_body(env)?;
    let list = body
        .get("shippingMethods")
        .or_else(|| body.get("methods"))
        .cloned()
        .unwrap_or(body);
    let wire: Vec<WireMethod> = serde_json::from_value(list)
        .map_err(|e| unexpected(env, &e.to_string()))?;
    Ok(wire.into_iter().map(map_method).collect())
}

pub fn normalize_review(env: &Envelope) -> Result<OrderReview, Error> {
    let body = checked_body(env)?;
    let wire: WireReview = serde_json::from_value(body)
        .map_err(|e| unexpected(env, &e.to_string()))?;
    Ok(OrderReview {
        cart: map_cart(wire.cart.unwrap_or_default()),
        shipping_address: wire.shipping_address.map(map_address),
        shipping_method: wire.shipping_method.map(map_method),
        subtotal: map_money(wire.subtotal),
        tax: map_money(wire.tax),
        shipping_cost: map_money(wire.shipping_cost),
        total: map_money(wire.total),
        currency: wire.currency,
    })
}

pub fn normalize_submission(env: &Envelope) -> Result<OrderConfirmation, Error> {
    let body = checked_body(env)?;
    let wire: WireSubmission = serde_json::from_value(body)
        .map_err(|e| unexpected(env, &e.to_string()))?;
    Ok(OrderConfirmation {
        success: wire.success.unwrap_or(true),
        order_id: wire.order_id,
        order_number: wire.order_number,
        message: wire.message,
        errors: wire.errors,
    })
}

pub fn normalize_ack(env: &Envelope) -> Result<Ack, Error> {
    let body = checked_body(env)?;
    Ok(Ack {
        success: body.get("success").and_then(|v| v.as_bool()).unwrap_or(true),
        message: body
            .get("message")
            .and_then(|v| v.as_str())
            .map(str::to_string),
    })
}

/// The `/auth/token` handshake response.
pub fn normalize_token(env: &Envelope) -> Result<String, Error> {
    let body = checked_body(env)?;
    body.get("token")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| unexpected(env, "no token in authentication response"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn envelope(status: u16, body: Value) -> Envelope {
        Envelope {
            status,
            text: body.to_string(),
            body: Some(body),
        }
    }

    #[test]
    fn keyword_search_maps_products_and_decimal_prices() {
        let env = envelope(
            200,
            json!({
                "keywordSearchReturn": {
                    "numberOfResults": 1234,
                    "products": [{
                        "sku": "1278613",
                        "displayName": "LM339 Comparator",
                        "brandName": "Texas Instruments",
                        "translatedManufacturerPartNumber": "LM339ADT",
                        "rohsStatusCode": "Compliant",
                        "packSize": 1,
                        "unitOfMeasure": "EACH",
                        "translatedMinimumOrderQuality": 5,
                        "stock": {
                            "level": 4281,
                            "leastLeadTime": 42,
                            "shipsFromMultipleWarehouses": true,
                            "breakdown": [
                                {"inv": 4000, "region": "UK", "warehouse": "Leeds", "lead": 2}
                            ]
                        },
                        "prices": [
                            {"from": 1, "to": 9, "cost": 0.339},
                            {"from": 10, "to": 99, "cost": 0.254}
                        ],
                        "datasheets": [{"url": "https://example.com/lm339.pdf", "type": "ds"}],
                        "image": {"baseName": "lm339.jpg"},
                        "attributes": [
                            {"attributeLabel": "Supply Voltage", "attributeValue": "36", "attributeUnit": "V"}
                        ]
                    }]
                }
            }),
        );
        let result = normalize_search(&env, "GBP").unwrap();
        assert_eq!(result.total_results, 1234);
        let p = &result.products[0];
        assert_eq!(p.order_code, "1278613");
        assert_eq!(p.manufacturer.as_deref(), Some("Texas Instruments"));
        assert_eq!(p.minimum_order_quantity, Some(5));
        assert_eq!(p.prices[0].cost, dec!(0.339));
        assert_eq!(p.prices[0].currency, "GBP");
        assert_eq!(p.prices[1].from, 10);
        let stock = p.stock.as_ref().unwrap();
        assert_eq!(stock.level, 4281);
        assert!(stock.ships_from_multiple_warehouses);
        assert_eq!(stock.breakdown[0].warehouse.as_deref(), Some("Leeds"));
        assert_eq!(p.attributes[0].unit.as_deref(), Some("V"));
    }

    #[test]
    fn missing_optional_fields_default_rather_than_error() {
        let env = envelope(
            200,
            json!({
                "manufacturerPartNumberSearchReturn": {
                    "numberOfResults": 1,
                    "products": [{"sku": "999", "displayName": "Bare part"}]
                }
            }),
        );
        let result = normalize_search(&env, "USD").unwrap();
        let p = &result.products[0];
        assert!(p.prices.is_empty());
        assert!(p.stock.is_none());
        assert!(p.attributes.is_empty());
        assert!(p.datasheet_urls.is_empty());
    }

    #[test]
    fn fault_envelope_wins_over_sibling_data() {
        let env = envelope(
            403,
            json!({
                "fault": {
                    "faultstring": "Rate limit quota violation. Quota limit exceeded.",
                    "detail": {"errorcode": "policies.ratelimit.QuotaViolation"}
                },
                "keywordSearchReturn": {"numberOfResults": 3, "products": []}
            }),
        );
        let err = normalize_search(&env, "USD").unwrap_err();
        match err {
            Error::UpstreamApi { code, message, status } => {
                assert_eq!(code, "policies.ratelimit.QuotaViolation");
                assert!(message.contains("Quota limit exceeded"));
                assert_eq!(status, Some(403));
            }
            other => panic!("expected UpstreamApi, got {:?}", other),
        }
    }

    #[test]
    fn order_api_error_shape_is_surfaced_verbatim() {
        let env = envelope(
            400,
            json!({"error": "INVALID_ORDER_CODE", "message": "Unknown order code 000"}),
        );
        let err = normalize_cart(&env).unwrap_err();
        match err {
            Error::UpstreamApi { code, message, .. } => {
                assert_eq!(code, "INVALID_ORDER_CODE");
                assert_eq!(message, "Unknown order code 000");
            }
            other => panic!("expected UpstreamApi, got {:?}", other),
        }
    }

    #[test]
    fn non_2xx_without_error_body_maps_to_status_vocabulary() {
        let not_found = Envelope { status: 404, body: None, text: "gone".into() };
        match normalize_search(&not_found, "USD").unwrap_err() {
            Error::UpstreamApi { code, .. } => assert_eq!(code, "not_found"),
            other => panic!("unexpected {:?}", other),
        }
        let server = Envelope { status: 503, body: None, text: String::new() };
        match normalize_search(&server, "USD").unwrap_err() {
            Error::UpstreamApi { code, message, .. } => {
                assert_eq!(code, "upstream_error");
                assert_eq!(message, "HTTP 503");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn cart_normalizes_wrapped_and_bare_shapes() {
        let wrapped = envelope(
            200,
            json!({
                "success": true,
                "message": "added",
                "cart": {
                    "cartId": "c-1",
                    "currency": "USD",
                    "subtotal": 12.70,
                    "lineItems": [{
                        "lineItemId": "li-1",
                        "orderCode": "1278613",
                        "description": "LM339",
                        "quantity": 50,
                        "unitPrice": 0.254,
                        "lineTotal": 12.70
                    }]
                }
            }),
        );
        let cart = normalize_cart(&wrapped).unwrap();
        assert_eq!(cart.cart_id.as_deref(), Some("c-1"));
        assert_eq!(cart.line_items[0].line_item_id, "li-1");
        assert_eq!(cart.line_items[0].unit_price, Some(dec!(0.254)));
        assert_eq!(cart.subtotal, Some(dec!(12.70)));

        let bare = envelope(
            200,
            json!({"cartId": "c-2", "lineItems": [], "currency": "GBP"}),
        );
        let cart = normalize_cart(&bare).unwrap();
        assert_eq!(cart.cart_id.as_deref(), Some("c-2"));
        assert!(cart.line_items.is_empty());
    }

    #[test]
    fn availability_projects_stock_fields() {
        let env = envelope(
            200,
            json!({
                "keywordSearchReturn": {
                    "numberOfResults": 2,
                    "products": [
                        {"sku": "1", "displayName": "a", "stock": {"level": 10, "leastLeadTime": 3}},
                        {"sku": "2", "displayName": "b"}
                    ]
                }
            }),
        );
        let avail = normalize_availability(&env, "USD").unwrap();
        assert!(avail[0].in_stock);
        assert_eq!(avail[0].quantity_available, 10);
        assert_eq!(avail[0].lead_time_days, Some(3));
        assert!(!avail[1].in_stock);
        assert_eq!(avail[1].quantity_available, 0);
    }

    #[test]
    fn pricing_carries_currency_from_breaks_or_hint() {
        let env = envelope(
            200,
            json!({
                "keywordSearchReturn": {
                    "numberOfResults": 1,
                    "products": [{
                        "sku": "1278613",
                        "displayName": "LM339",
                        "packSize": 5,
                        "translatedMinimumOrderQuality": 5,
                        "prices": [{"from": 1, "cost": 4.95, "currency": "EUR"}]
                    }]
                }
            }),
        );
        let pricing = normalize_pricing(&env, "USD").unwrap();
        assert_eq!(pricing[0].currency, "EUR");
        assert_eq!(pricing[0].price_breaks[0].cost, dec!(4.95));
        assert_eq!(pricing[0].minimum_order_quantity, Some(5));
    }

    #[test]
    fn review_and_submission_shapes() {
        let review = envelope(
            200,
            json!({
                "cart": {"cartId": "c-1", "lineItems": [], "currency": "USD"},
                "shippingAddress": {"addressId": "a-1", "name": "Lab", "street1": "1 Main", "city": "Chicago", "postalCode": "60601", "country": "US", "isDefault": true},
                "shippingMethod": {"methodId": "m-1", "name": "Ground", "cost": 7.99, "currency": "USD", "estimatedDeliveryDays": 3},
                "subtotal": 12.70, "tax": 1.05, "shippingCost": 7.99, "total": 21.74, "currency": "USD"
            }),
        );
        let r = normalize_review(&review).unwrap();
        assert_eq!(r.shipping_address.unwrap().address_id, "a-1");
        assert_eq!(r.shipping_method.unwrap().cost, Some(dec!(7.99)));
        assert_eq!(r.total, Some(dec!(21.74)));

        let submit = envelope(
            200,
            json!({"success": true, "orderId": "o-9", "orderNumber": "N-100", "message": "placed"}),
        );
        let c = normalize_submission(&submit).unwrap();
        assert!(c.success);
        assert_eq!(c.order_number.as_deref(), Some("N-100"));
    }

    #[test]
    fn token_extraction() {
        let ok = envelope(200, json!({"token": "jwt-abc"}));
        assert_eq!(normalize_token(&ok).unwrap(), "jwt-abc");
        let missing = envelope(200, json!({"expires": 3600}));
        assert!(matches!(
            normalize_token(&missing),
            Err(Error::UpstreamApi { .. })
        ));
    }
}
