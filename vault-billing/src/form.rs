use std::path::{Path, PathBuf};

use chrono::Local;

use crate::export::{Alert, ExportError, ExportPipeline, ExportStage};
use crate::layout::{render_invoice_page, render_policy_page};
use crate::raster::Rasterizer;
use crate::state::{InvoiceState, Logo};
use crate::surface::PageSurface;
use crate::totals::Totals;

/// The invoice form as a whole: current state plus the machinery that
/// turns it into a saved PDF.
pub struct InvoiceForm {
    state: InvoiceState,
    rasterizer: Rasterizer,
    pipeline: ExportPipeline,
}

impl InvoiceForm {
    pub fn new() -> InvoiceForm {
        InvoiceForm {
            state: InvoiceState::new(),
            rasterizer: Rasterizer::new(),
            pipeline: ExportPipeline::new(),
        }
    }

    pub fn state(&self) -> &InvoiceState {
        &self.state
    }

    /// Derived fresh on every call, so the figures always reflect the
    /// latest edit.
    pub fn totals(&self) -> Totals {
        Totals::compute(&self.state)
    }

    pub fn set_logo(&mut self, logo: Option<Logo>) {
        self.state = self.state.set_logo(logo);
    }

    pub fn set_customer_name(&mut self, name: &str) {
        self.state = self.state.set_customer_name(name);
    }

    pub fn set_customer_phone(&mut self, phone: &str) {
        self.state = self.state.set_customer_phone(phone);
    }

    pub fn set_customer_address(&mut self, address: &str) {
        self.state = self.state.set_customer_address(address);
    }

    pub fn toggle_product(&mut self, product_id: &str) {
        self.state = self.state.toggle_product(product_id);
    }

    pub fn set_product_quantity(&mut self, product_id: &str, quantity: i64) {
        self.state = self.state.set_product_quantity(product_id, quantity);
    }

    pub fn add_custom_item(&mut self) {
        self.state = self.state.add_custom_item();
    }

    pub fn set_custom_item_name(&mut self, id: &str, name: &str) {
        self.state = self.state.set_custom_item_name(id, name);
    }

    pub fn set_custom_item_price(&mut self, id: &str, raw: &str) {
        self.state = self.state.set_custom_item_price(id, raw);
    }

    pub fn set_custom_item_quantity(&mut self, id: &str, raw: &str) {
        self.state = self.state.set_custom_item_quantity(id, raw);
    }

    pub fn remove_custom_item(&mut self, id: &str) {
        self.state = self.state.remove_custom_item(id);
    }

    pub fn set_shipping(&mut self, raw: &str) {
        self.state = self.state.set_shipping(raw);
    }

    pub fn set_amount_paid(&mut self, raw: &str) {
        self.state = self.state.set_amount_paid(raw);
    }

    /// The on-screen preview page, dated today, with the policy section
    /// shown inline.
    pub fn preview(&self) -> PageSurface {
        render_invoice_page(&self.state, &self.totals(), Local::now().date_naive(), true)
    }

    /// Lay out both export pages from the current state. The exported
    /// invoice page leaves the inline policy off; the policy gets its
    /// own page.
    pub fn stage(&self) -> ExportStage {
        let today = Local::now().date_naive();
        let totals = self.totals();
        ExportStage {
            invoice: Some(render_invoice_page(&self.state, &totals, today, false)),
            policy: Some(render_policy_page()),
        }
    }

    pub fn is_exporting(&self) -> bool {
        self.pipeline.is_exporting()
    }

    /// Stage fresh surfaces and export them to a timestamped PDF in
    /// `out_dir`.
    pub fn export_pdf(
        &mut self,
        out_dir: &Path,
        notifier: &mut dyn Alert,
    ) -> Result<PathBuf, ExportError> {
        let stage = self.stage();
        self.pipeline.export(&stage, &mut self.rasterizer, out_dir, notifier)
    }
}

impl Default for InvoiceForm {
    fn default() -> InvoiceForm {
        InvoiceForm::new()
    }
}
