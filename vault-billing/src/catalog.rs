/// A sellable catalog product. The catalog is fixed at build time and
/// never changes while the application runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Product {
    pub id: &'static str,
    pub name: &'static str,
    /// Unit price in rupees.
    pub price: f64,
}

pub const PRODUCTS: &[Product] = &[
    Product { id: "mainline", name: "Mainline Hot Wheels", price: 179.0 },
    Product { id: "silver", name: "Silver Series Hot Wheels", price: 299.0 },
    Product { id: "premium", name: "Premium Hot Wheels", price: 549.0 },
];

pub fn product_by_id(id: &str) -> Option<&'static Product> {
    PRODUCTS.iter().find(|p| p.id == id)
}

// ── shop identity ─────────────────────────────────────────────────────────────

pub const BRAND_WORDMARK: &str = "one:64.vault";
pub const SHOP_ADDRESS: &str = "Jalandhar, Punjab";
pub const THANK_YOU_NOTE: &str = "Thank you for shopping with us";

/// Fixed prefix of exported PDF filenames; the export timestamp in
/// Unix milliseconds is appended after an underscore.
pub const PDF_FILE_PREFIX: &str = "one_64_vault_Invoice";

pub const POLICY_TITLE: &str = "Payment & Delivery Policy";

pub const POLICY_LINES: &[&str] = &[
    "Payment must be completed within 24 hours of receiving this invoice.",
    "Cash on Delivery (COD) is not available. Only prepaid orders are accepted.",
    "Orders will be dispatched after successful payment confirmation.",
    "Delivery typically takes 3–4 working days from the date of dispatch.",
    "Delivery charges include packaging costs such as boxes, tape, and protective materials.",
];
