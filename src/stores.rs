use crate::error::Error;

/// Documented Product Search endpoint. One host serves every storefront;
/// the store itself travels as the `storeInfo.id` query parameter.
pub const PRODUCT_SEARCH_ENDPOINT: &str = "https://api.element14.com/catalog/products";

const NEWARK_UAT: &str = "https://api-uat.newark.com";
const FARNELL_UAT: &str = "https://api-uat.farnell.com";
const ELEMENT14_UAT: &str = "https://api-uat.element14.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    NorthAmerica,
    Europe,
    AsiaPacific,
}

impl Region {
    pub fn label(&self) -> &'static str {
        match self {
            Region::NorthAmerica => "North America",
            Region::Europe => "Europe",
            Region::AsiaPacific => "Asia Pacific",
        }
    }
}

/// Resolved regional endpoint configuration for one distributor storefront.
/// Immutable; resolved once at gateway construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreDescriptor {
    pub id: &'static str,
    pub region: Region,
    pub label: &'static str,
    /// ISO currency the storefront quotes in, used when the response does
    /// not carry its own currency field.
    pub currency: &'static str,
    /// Sandbox Order API host for the store's brand.
    pub sandbox_order_host: &'static str,
}

impl StoreDescriptor {
    pub fn search_endpoint(&self) -> &'static str {
        PRODUCT_SEARCH_ENDPOINT
    }
}

pub static STORES: &[StoreDescriptor] = &[
    StoreDescriptor { id: "www.newark.com", region: Region::NorthAmerica, label: "Newark (US)", currency: "USD", sandbox_order_host: NEWARK_UAT },
    StoreDescriptor { id: "canada.newark.com", region: Region::NorthAmerica, label: "Newark Canada", currency: "CAD", sandbox_order_host: NEWARK_UAT },
    StoreDescriptor { id: "mexico.newark.com", region: Region::NorthAmerica, label: "Newark Mexico", currency: "MXN", sandbox_order_host: NEWARK_UAT },
    StoreDescriptor { id: "uk.farnell.com", region: Region::Europe, label: "Farnell UK", currency: "GBP", sandbox_order_host: FARNELL_UAT },
    StoreDescriptor { id: "de.farnell.com", region: Region::Europe, label: "Farnell Germany", currency: "EUR", sandbox_order_host: FARNELL_UAT },
    StoreDescriptor { id: "fr.farnell.com", region: Region::Europe, label: "Farnell France", currency: "EUR", sandbox_order_host: FARNELL_UAT },
    StoreDescriptor { id: "es.farnell.com", region: Region::Europe, label: "Farnell Spain", currency: "EUR", sandbox_order_host: FARNELL_UAT },
    StoreDescriptor { id: "it.farnell.com", region: Region::Europe, label: "Farnell Italy", currency: "EUR", sandbox_order_host: FARNELL_UAT },
    StoreDescriptor { id: "export.farnell.com", region: Region::Europe, label: "Farnell Export", currency: "USD", sandbox_order_host: FARNELL_UAT },
    StoreDescriptor { id: "au.element14.com", region: Region::AsiaPacific, label: "element14 Australia", currency: "AUD", sandbox_order_host: ELEMENT14_UAT },
    StoreDescriptor { id: "nz.element14.com", region: Region::AsiaPacific, label: "element14 New Zealand", currency: "NZD", sandbox_order_host: ELEMENT14_UAT },
    StoreDescriptor { id: "sg.element14.com", region: Region::AsiaPacific, label: "element14 Singapore", currency: "SGD", sandbox_order_host: ELEMENT14_UAT },
    StoreDescriptor { id: "hk.element14.com", region: Region::AsiaPacific, label: "element14 Hong Kong", currency: "HKD", sandbox_order_host: ELEMENT14_UAT },
    StoreDescriptor { id: "cn.element14.com", region: Region::AsiaPacific, label: "element14 China", currency: "CNY", sandbox_order_host: ELEMENT14_UAT },
];

/// Look up a storefront by its domain. The set is closed; anything else is
/// a configuration error, surfaced before any network access.
pub fn resolve(store_id: &str) -> Result<&'static StoreDescriptor, Error> {
    STORES
        .iter()
        .find(|s| s.id.eq_ignore_ascii_case(store_id))
        .ok_or_else(|| {
            Error::Configuration(format!(
                "unrecognized store id '{}'; see the farnell://stores resource for the supported set",
                store_id
            ))
        })
}
