use crate::catalog::PRODUCTS;
use crate::state::InvoiceState;

/// One row of the invoice table.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
}

impl LineItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

/// Derived figures for one state. Nothing here is cached on the state;
/// callers compute a fresh `Totals` whenever they need current numbers,
/// so the figures can never lag behind an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    pub line_items: Vec<LineItem>,
    pub subtotal: f64,
    pub grand_total: f64,
    pub balance_due: f64,
}

impl Totals {
    /// Catalog picks in catalog order, then custom items in the order
    /// they were added. Custom names are carried as typed; display
    /// fallbacks for blank names belong to the page renderer.
    pub fn compute(state: &InvoiceState) -> Totals {
        let mut line_items = Vec::new();
        for product in PRODUCTS {
            if let Some(quantity) = state.quantity_of(product.id) {
                line_items.push(LineItem {
                    name: product.name.to_string(),
                    unit_price: product.price,
                    quantity,
                });
            }
        }
        for item in &state.custom_items {
            line_items.push(LineItem {
                name: item.name.clone(),
                unit_price: item.price,
                quantity: item.quantity,
            });
        }

        let subtotal: f64 = line_items.iter().map(|i| i.line_total()).sum();
        let grand_total = subtotal + state.shipping_charge;
        let balance_due = grand_total - state.amount_paid;
        Totals { line_items, subtotal, grand_total, balance_due }
    }

    pub fn fully_paid(&self) -> bool {
        self.balance_due <= 0.0
    }
}
