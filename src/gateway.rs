//! The single entry point every tool invocation calls through.
//!
//! Each operation validates its own input, then composes limiter → resolver
//! (done once at construction) → executor → normalizer. Sandbox-only
//! operations are rejected in production before validation, permit use, or
//! any network access.

use crate::config::{Config, Environment};
use crate::error::Error;
use crate::http::{self, ApiRequest, Credential, Envelope};
use crate::limiter::RateLimiter;
use crate::normalize;
use crate::stores::{self, StoreDescriptor};
use crate::tools::{
    AddToCartInput, CheckAvailabilityInput, ConfirmShippingAddressInput,
    ConfirmShippingMethodInput, DeleteCartItemInput, GetByOrderCodeInput, GetPricingInput,
    SearchByKeywordInput, SearchByPartNumberInput, UpdateCartItemInput,
};
use crate::types::*;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use log::debug;
use reqwest::Method;
use serde_json::json;
use tokio::sync::Mutex;

const RESPONSE_GROUPS: [&str; 5] = ["small", "medium", "large", "prices", "inventory"];
const MAX_ORDER_CODE_BATCH: usize = 20;
const DEFAULT_MAX_RESULTS: u32 = 10;

/// One page of normalized search hits plus the window it was fetched with,
/// so the caller can mint the continuation cursor.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub result: SearchResult,
    pub offset: u32,
    pub num_results: u32,
}

#[derive(Debug, Clone)]
struct SandboxSession {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Owns the configuration, the HTTP client, the resolved store descriptor,
/// the process-wide rate limiter and the sandbox session cache. Built once
/// at startup and shared by reference for the process lifetime.
pub struct Gateway {
    cfg: Config,
    client: reqwest::Client,
    store: &'static StoreDescriptor,
    limiter: RateLimiter,
    session: Mutex<Option<SandboxSession>>,
}

impl Gateway {
    pub fn new(cfg: Config) -> Result<Self, Error> {
        let store = stores::resolve(&cfg.store_id)?;
        let client = http::build_client(&cfg)
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {}", e)))?;
        let limiter = RateLimiter::new(cfg.rate_limit_burst, cfg.rate_limit_per_sec)?;
        Ok(Self {
            cfg,
            client,
            store,
            limiter,
            session: Mutex::new(None),
        })
    }

    pub fn store(&self) -> &'static StoreDescriptor {
        self.store
    }

    pub fn environment(&self) -> Environment {
        self.cfg.environment
    }

    pub fn is_sandbox(&self) -> bool {
        self.cfg.is_sandbox()
    }

    pub async fn health_check(&self) -> HealthStatus {
        HealthStatus {
            status: "healthy".into(),
            server: "farnell-mcp".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            api_key_configured: !self.cfg.api_key.is_empty(),
            store_id: self.store.id.to_string(),
            environment: self.cfg.environment.as_str().to_string(),
            product_search_available: true,
            order_api_available: self.cfg.is_sandbox()
                && self.cfg.sandbox_username.is_some()
                && self.cfg.sandbox_password.is_some(),
            rate_limit: RateLimitStatus {
                capacity: self.limiter.capacity(),
                refill_per_sec: self.limiter.refill_per_sec(),
                available: self.limiter.available().await,
            },
        }
    }

    // -----------------------------------------------------------------------
    // Catalog operations (both modes)
    // -----------------------------------------------------------------------

    pub async fn search_products_by_keyword(
        &self,
        input: SearchByKeywordInput,
    ) -> Result<SearchPage, Error> {
        let keyword = non_empty("keyword", &input.keyword)?;
        let (offset, num_results) = page_window(input.cursor.as_deref(), input.max_results)?;
        let group = response_group(input.response_detail.as_deref(), "medium")?;
        let filters = build_filters(input.in_stock_only, input.rohs_compliant_only);
        let term = prefixed_term(keyword);
        let env = self
            .product_search(term, offset, num_results, filters, &group)
            .await?;
        let result = normalize::normalize_search(&env, self.store.currency)?;
        Ok(SearchPage { result, offset, num_results })
    }

    pub async fn search_products_by_part_number(
        &self,
        input: SearchByPartNumberInput,
    ) -> Result<SearchPage, Error> {
        let part = non_empty("manufacturer_part_number", &input.manufacturer_part_number)?;
        let (offset, num_results) = page_window(input.cursor.as_deref(), input.max_results)?;
        let group = response_group(input.response_detail.as_deref(), "medium")?;
        let filters = build_filters(input.in_stock_only, input.rohs_compliant_only);
        let env = self
            .product_search(format!("manuPartNum:{}", part), offset, num_results, filters, &group)
            .await?;
        let result = normalize::normalize_search(&env, self.store.currency)?;
        Ok(SearchPage { result, offset, num_results })
    }

    pub async fn get_product_by_order_code(
        &self,
        input: GetByOrderCodeInput,
    ) -> Result<Option<Product>, Error> {
        let code = non_empty("order_code", &input.order_code)?;
        let group = response_group(input.response_detail.as_deref(), "large")?;
        let env = self
            .product_search(format!("id:{}", code), 0, 1, None, &group)
            .await?;
        let result = normalize::normalize_search(&env, self.store.currency)?;
        Ok(result.products.into_iter().next())
    }

    pub async fn check_product_availability(
        &self,
        input: CheckAvailabilityInput,
    ) -> Result<Vec<ProductAvailability>, Error> {
        let codes = validate_order_codes(&input.order_codes)?;
        let term = order_code_term(&codes);
        let env = self
            .product_search(term, 0, codes.len() as u32, None, "inventory")
            .await?;
        normalize::normalize_availability(&env, self.store.currency)
    }

    pub async fn get_product_pricing(
        &self,
        input: GetPricingInput,
    ) -> Result<Vec<ProductPricing>, Error> {
        let codes = validate_order_codes(&input.order_codes)?;
        let term = order_code_term(&codes);
        let env = self
            .product_search(term, 0, codes.len() as u32, None, "prices")
            .await?;
        normalize::normalize_pricing(&env, self.store.currency)
    }

    // -----------------------------------------------------------------------
    // Order operations (sandbox only)
    // -----------------------------------------------------------------------

    pub async fn sandbox_add_to_cart(&self, input: AddToCartInput) -> Result<CartSummary, Error> {
        self.require_sandbox("sandbox_add_to_cart")?;
        let code = non_empty("order_code", &input.order_code)?;
        if input.quantity == 0 {
            return Err(Error::InvalidInput("quantity must be at least 1".into()));
        }
        let env = self
            .order_call(
                Method::POST,
                "/cart/addItem",
                Some(json!({"orderCode": code, "quantity": input.quantity})),
            )
            .await?;
        normalize::normalize_cart(&env)
    }

    pub async fn sandbox_get_cart(&self) -> Result<CartSummary, Error> {
        self.require_sandbox("sandbox_get_cart")?;
        let env = self.order_call(Method::GET, "/cart", None).await?;
        normalize::normalize_cart(&env)
    }

    pub async fn sandbox_update_cart_item(
        &self,
        input: UpdateCartItemInput,
    ) -> Result<CartSummary, Error> {
        self.require_sandbox("sandbox_update_cart_item")?;
        let line = non_empty("line_item_id", &input.line_item_id)?;
        if input.quantity == 0 {
            return Err(Error::InvalidInput(
                "quantity must be at least 1; use sandbox_delete_cart_item to remove a line".into(),
            ));
        }
        let env = self
            .order_call(
                Method::POST,
                "/cart/updateItem",
                Some(json!({"lineItemId": line, "quantity": input.quantity})),
            )
            .await?;
        normalize::normalize_cart(&env)
    }

    pub async fn sandbox_delete_cart_item(
        &self,
        input: DeleteCartItemInput,
    ) -> Result<CartSummary, Error> {
        self.require_sandbox("sandbox_delete_cart_item")?;
        let line = non_empty("line_item_id", &input.line_item_id)?;
        let env = self
            .order_call(
                Method::POST,
                "/cart/deleteItem",
                Some(json!({"lineItemId": line})),
            )
            .await?;
        normalize::normalize_cart(&env)
    }

    pub async fn sandbox_clear_cart(&self) -> Result<Ack, Error> {
        self.require_sandbox("sandbox_clear_cart")?;
        let env = self.order_call(Method::POST, "/cart/clear", None).await?;
        normalize::normalize_ack(&env)
    }

    pub async fn sandbox_get_shipping_addresses(&self) -> Result<Vec<ShippingAddress>, Error> {
        self.require_sandbox("sandbox_get_shipping_addresses")?;
        let env = self
            .order_call(Method::GET, "/order/shipping_address", None)
            .await?;
        normalize::normalize_addresses(&env)
    }

    pub async fn sandbox_confirm_shipping_address(
        &self,
        input: ConfirmShippingAddressInput,
    ) -> Result<Ack, Error> {
        self.require_sandbox("sandbox_confirm_shipping_address")?;
        let address = non_empty("address_id", &input.address_id)?;
        let env = self
            .order_call(
                Method::POST,
                "/order/shipping_address",
                Some(json!({"addressId": address})),
            )
            .await?;
        normalize::normalize_ack(&env)
    }

    pub async fn sandbox_get_shipping_methods(&self) -> Result<Vec<ShippingMethod>, Error> {
        self.require_sandbox("sandbox_get_shipping_methods")?;
        let env = self
            .order_call(Method::GET, "/order/shipping_methods", None)
            .await?;
        normalize::normalize_methods(&env)
    }

    pub async fn sandbox_confirm_shipping_method(
        &self,
        input: ConfirmShippingMethodInput,
    ) -> Result<Ack, Error> {
        self.require_sandbox("sandbox_confirm_shipping_method")?;
        let method = non_empty("method_id", &input.method_id)?;
        let env = self
            .order_call(
                Method::POST,
                "/order/shipping_method",
                Some(json!({"methodId": method})),
            )
            .await?;
        normalize::normalize_ack(&env)
    }

    pub async fn sandbox_review_order(&self) -> Result<OrderReview, Error> {
        self.require_sandbox("sandbox_review_order")?;
        let env = self
            .order_call(Method::GET, "/order/order_review", None)
            .await?;
        normalize::normalize_review(&env)
    }

    pub async fn sandbox_submit_order(&self) -> Result<OrderConfirmation, Error> {
        self.require_sandbox("sandbox_submit_order")?;
        let env = self
            .order_call(Method::POST, "/order/order_submit", None)
            .await?;
        normalize::normalize_submission(&env)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn require_sandbox(&self, operation: &str) -> Result<(), Error> {
        if !self.cfg.is_sandbox() {
            return Err(Error::UnsupportedOperation(operation.to_string()));
        }
        Ok(())
    }

    async fn product_search(
        &self,
        term: String,
        offset: u32,
        num_results: u32,
        filters: Option<String>,
        response_group: &str,
    ) -> Result<Envelope, Error> {
        self.limiter.acquire().await;
        let mut query = vec![
            ("term".to_string(), term),
            ("storeInfo.id".to_string(), self.store.id.to_string()),
            ("resultsSettings.offset".to_string(), offset.to_string()),
            ("resultsSettings.numberOfResults".to_string(), num_results.to_string()),
            ("resultsSettings.responseGroup".to_string(), response_group.to_string()),
            ("callInfo.responseDataFormat".to_string(), "json".to_string()),
        ];
        if let Some(f) = filters {
            query.push(("resultsSettings.refinements.filters".to_string(), f));
        }
        let request = ApiRequest {
            method: Method::GET,
            url: self.cfg.search_api_url.clone(),
            query,
            body: None,
        };
        http::execute(
            &self.client,
            &request,
            &Credential::ApiKey(self.cfg.api_key.clone()),
            self.cfg.max_retries,
        )
        .await
    }

    fn order_base_url(&self) -> String {
        self.cfg
            .order_api_url
            .clone()
            .unwrap_or_else(|| self.store.sandbox_order_host.to_string())
    }

    async fn order_call(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Envelope, Error> {
        let token = self.sandbox_token().await?;
        self.limiter.acquire().await;
        let request = ApiRequest {
            method,
            url: format!("{}{}", self.order_base_url(), path),
            query: Vec::new(),
            body,
        };
        http::execute(
            &self.client,
            &request,
            &Credential::Bearer(token),
            self.cfg.max_retries,
        )
        .await
    }

    /// Return the cached sandbox JWT, refreshing it through `/auth/token`
    /// when missing or expired. The handshake is itself an outbound partner
    /// call and consumes a permit like any other.
    ///
    /// The session lock is held across check-and-refresh so concurrent
    /// callers racing an expired token perform exactly one handshake; the
    /// losers wake up to a fresh token.
    async fn sandbox_token(&self) -> Result<String, Error> {
        let mut session = self.session.lock().await;
        if let Some(s) = session.as_ref() {
            if Utc::now() < s.expires_at {
                return Ok(s.token.clone());
            }
        }

        let (username, password) = match (&self.cfg.sandbox_username, &self.cfg.sandbox_password) {
            (Some(u), Some(p)) => (u.clone(), p.clone()),
            _ => {
                return Err(Error::Configuration(
                    "FARNELL_SANDBOX_USERNAME and FARNELL_SANDBOX_PASSWORD are required for the Order API"
                        .into(),
                ))
            }
        };

        self.limiter.acquire().await;
        let request = ApiRequest::post(
            format!("{}/auth/token", self.order_base_url()),
            Some(json!({"username": username, "password": password})),
        );
        let env = http::execute(&self.client, &request, &Credential::None, self.cfg.max_retries)
            .await?;
        let token = normalize::normalize_token(&env)?;

        let expires_at = Utc::now() + ChronoDuration::hours(1);
        debug!("sandbox session refreshed, expires at {}", expires_at);
        *session = Some(SandboxSession { token: token.clone(), expires_at });
        Ok(token)
    }
}

fn prefixed_term(keyword: &str) -> String {
    if keyword.starts_with("any:")
        || keyword.starts_with("id:")
        || keyword.starts_with("manuPartNum:")
    {
        keyword.to_string()
    } else {
        format!("any:{}", keyword)
    }
}

fn order_code_term(codes: &[String]) -> String {
    codes
        .iter()
        .map(|c| format!("id:{}", c))
        .collect::<Vec<_>>()
        .join(" OR ")
}

fn non_empty<'a>(field: &str, value: &'a str) -> Result<&'a str, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(trimmed)
}

fn bounded_results(requested: Option<u32>) -> Result<u32, Error> {
    let n = requested.unwrap_or(DEFAULT_MAX_RESULTS);
    if n == 0 || n > 100 {
        return Err(Error::InvalidInput("max_results must be 1..=100".into()));
    }
    Ok(n)
}

/// A continuation cursor carries its own window and wins over max_results.
fn page_window(cursor: Option<&str>, max_results: Option<u32>) -> Result<(u32, u32), Error> {
    match cursor {
        Some(c) => {
            let c = http::decode_search_cursor(c)
                .ok_or_else(|| Error::InvalidInput("cursor is not a valid continuation".into()))?;
            Ok((c.offset, bounded_results(Some(c.num_results))?))
        }
        None => Ok((0, bounded_results(max_results)?)),
    }
}

fn response_group(requested: Option<&str>, default: &str) -> Result<String, Error> {
    let group = requested.unwrap_or(default);
    if !RESPONSE_GROUPS.contains(&group) {
        return Err(Error::InvalidInput(format!(
            "response_detail must be one of small|medium|large|prices|inventory, got '{}'",
            group
        )));
    }
    Ok(group.to_string())
}

fn build_filters(in_stock: Option<bool>, rohs: Option<bool>) -> Option<String> {
    let mut filters = Vec::new();
    if in_stock.unwrap_or(false) {
        filters.push("inStock");
    }
    if rohs.unwrap_or(false) {
        filters.push("rohsCompliant");
    }
    if filters.is_empty() {
        None
    } else {
        Some(filters.join(","))
    }
}

fn validate_order_codes(codes: &[String]) -> Result<Vec<String>, Error> {
    if codes.is_empty() {
        return Err(Error::InvalidInput(
            "order_codes must contain at least one code".into(),
        ));
    }
    if codes.len() > MAX_ORDER_CODE_BATCH {
        return Err(Error::InvalidInput(format!(
            "order_codes is limited to {} codes per call",
            MAX_ORDER_CODE_BATCH
        )));
    }
    codes
        .iter()
        .map(|c| non_empty("order_code", c).map(str::to_string))
        .collect()
}
