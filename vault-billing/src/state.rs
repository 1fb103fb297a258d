use std::collections::BTreeMap;

use thiserror::Error;

use crate::catalog;

#[derive(Debug, Error)]
pub enum LogoError {
    #[error("PNG decode: {0}")]
    Png(#[from] png::DecodingError),
    #[error("unsupported logo image: {0}")]
    Unsupported(String),
    #[error("RGBA buffer holds {got} bytes, want {want} for {width}x{height}")]
    BufferSize { width: u32, height: u32, want: usize, got: usize },
}

/// Uploaded shop logo, held as straight (non-premultiplied) RGBA.
#[derive(Debug, Clone, PartialEq)]
pub struct Logo {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Logo {
    /// Decode a PNG upload. Any of the four plain color types is
    /// accepted and expanded to RGBA; palette and 16-bit files are not.
    pub fn from_png(bytes: &[u8]) -> Result<Logo, LogoError> {
        let decoder = png::Decoder::new(bytes);
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0u8; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        buf.truncate(info.buffer_size());

        if info.bit_depth != png::BitDepth::Eight {
            return Err(LogoError::Unsupported(format!(
                "bit depth {:?} (want 8-bit)",
                info.bit_depth
            )));
        }

        let (width, height) = (info.width, info.height);
        let pixels = (width * height) as usize;
        let rgba = match info.color_type {
            png::ColorType::Rgba => buf,
            png::ColorType::Rgb => {
                let mut out = Vec::with_capacity(pixels * 4);
                for px in buf.chunks_exact(3) {
                    out.extend_from_slice(px);
                    out.push(255);
                }
                out
            }
            png::ColorType::Grayscale => {
                let mut out = Vec::with_capacity(pixels * 4);
                for &g in &buf {
                    out.extend_from_slice(&[g, g, g, 255]);
                }
                out
            }
            png::ColorType::GrayscaleAlpha => {
                let mut out = Vec::with_capacity(pixels * 4);
                for px in buf.chunks_exact(2) {
                    out.extend_from_slice(&[px[0], px[0], px[0], px[1]]);
                }
                out
            }
            other => {
                return Err(LogoError::Unsupported(format!("color type {:?}", other)));
            }
        };

        Ok(Logo { width, height, rgba })
    }

    /// Wrap raw RGBA pixels. The buffer must hold exactly
    /// `width * height * 4` bytes.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Logo, LogoError> {
        let want = width as usize * height as usize * 4;
        if rgba.len() != want {
            return Err(LogoError::BufferSize { width, height, want, got: rgba.len() });
        }
        Ok(Logo { width, height, rgba })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// A free-form line added by hand alongside the catalog picks.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

/// Everything the invoice form holds. Mutators return a fresh value
/// and never touch `self`; callers replace their copy with the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceState {
    pub logo: Option<Logo>,
    pub customer: CustomerDetails,
    selected: BTreeMap<String, u32>,
    pub custom_items: Vec<CustomItem>,
    pub shipping_charge: f64,
    pub amount_paid: f64,
    custom_seq: u64,
}

impl InvoiceState {
    pub fn new() -> InvoiceState {
        InvoiceState::default()
    }

    pub fn is_selected(&self, product_id: &str) -> bool {
        self.selected.contains_key(product_id)
    }

    /// Chosen quantity for a catalog product, or `None` when unselected.
    pub fn quantity_of(&self, product_id: &str) -> Option<u32> {
        self.selected.get(product_id).copied()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    // ── logo and customer ──────────────────────────────────────────────

    #[must_use]
    pub fn set_logo(&self, logo: Option<Logo>) -> InvoiceState {
        let mut next = self.clone();
        next.logo = logo;
        next
    }

    #[must_use]
    pub fn set_customer_name(&self, name: &str) -> InvoiceState {
        let mut next = self.clone();
        next.customer.name = name.to_string();
        next
    }

    #[must_use]
    pub fn set_customer_phone(&self, phone: &str) -> InvoiceState {
        let mut next = self.clone();
        next.customer.phone = phone.to_string();
        next
    }

    #[must_use]
    pub fn set_customer_address(&self, address: &str) -> InvoiceState {
        let mut next = self.clone();
        next.customer.address = address.to_string();
        next
    }

    // ── catalog selection ──────────────────────────────────────────────

    /// Select a catalog product at quantity 1, or deselect it if already
    /// picked (the chosen quantity is forgotten). Unknown ids are ignored.
    #[must_use]
    pub fn toggle_product(&self, product_id: &str) -> InvoiceState {
        if catalog::product_by_id(product_id).is_none() {
            return self.clone();
        }
        let mut next = self.clone();
        if next.selected.remove(product_id).is_none() {
            next.selected.insert(product_id.to_string(), 1);
        }
        next
    }

    /// Set the quantity of a selected product, clamped to at least 1.
    /// Ignored when the product is not currently selected.
    #[must_use]
    pub fn set_product_quantity(&self, product_id: &str, requested: i64) -> InvoiceState {
        let mut next = self.clone();
        if let Some(qty) = next.selected.get_mut(product_id) {
            *qty = requested.clamp(1, u32::MAX as i64) as u32;
        }
        next
    }

    // ── custom items ───────────────────────────────────────────────────

    /// Append a blank custom line: empty name, zero price, quantity 1.
    /// Ids come from a counter and are never reused within this state's
    /// lineage, so removals cannot alias a later addition.
    #[must_use]
    pub fn add_custom_item(&self) -> InvoiceState {
        let mut next = self.clone();
        next.custom_seq += 1;
        next.custom_items.push(CustomItem {
            id: format!("custom-{}", next.custom_seq),
            name: String::new(),
            price: 0.0,
            quantity: 1,
        });
        next
    }

    #[must_use]
    pub fn set_custom_item_name(&self, id: &str, name: &str) -> InvoiceState {
        let mut next = self.clone();
        if let Some(item) = next.custom_items.iter_mut().find(|i| i.id == id) {
            item.name = name.to_string();
        }
        next
    }

    /// Price field edit. Unparseable or non-finite input coerces to 0,
    /// as does anything negative.
    #[must_use]
    pub fn set_custom_item_price(&self, id: &str, raw: &str) -> InvoiceState {
        let mut next = self.clone();
        if let Some(item) = next.custom_items.iter_mut().find(|i| i.id == id) {
            item.price = parse_amount(raw).max(0.0);
        }
        next
    }

    /// Quantity field edit. Unparseable input coerces to 1, and the
    /// result is clamped to at least 1.
    #[must_use]
    pub fn set_custom_item_quantity(&self, id: &str, raw: &str) -> InvoiceState {
        let mut next = self.clone();
        if let Some(item) = next.custom_items.iter_mut().find(|i| i.id == id) {
            let requested = raw.trim().parse::<i64>().unwrap_or(1);
            item.quantity = requested.clamp(1, u32::MAX as i64) as u32;
        }
        next
    }

    #[must_use]
    pub fn remove_custom_item(&self, id: &str) -> InvoiceState {
        let mut next = self.clone();
        next.custom_items.retain(|i| i.id != id);
        next
    }

    // ── charges ────────────────────────────────────────────────────────

    /// Shipping charge edit. Negative values pass through untouched;
    /// the totals block simply renders what was typed.
    #[must_use]
    pub fn set_shipping(&self, raw: &str) -> InvoiceState {
        let mut next = self.clone();
        next.shipping_charge = parse_amount(raw);
        next
    }

    /// Amount-paid edit. Negative values pass through untouched.
    #[must_use]
    pub fn set_amount_paid(&self, raw: &str) -> InvoiceState {
        let mut next = self.clone();
        next.amount_paid = parse_amount(raw);
        next
    }
}

/// Coerce a money field: unparseable or non-finite input becomes 0.
fn parse_amount(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_selects_at_quantity_one() {
        let state = InvoiceState::new().toggle_product("mainline");
        assert!(state.is_selected("mainline"));
        assert_eq!(state.quantity_of("mainline"), Some(1));
    }

    #[test]
    fn toggle_off_forgets_the_quantity() {
        let state = InvoiceState::new()
            .toggle_product("silver")
            .set_product_quantity("silver", 5)
            .toggle_product("silver");
        assert!(!state.is_selected("silver"));

        // Re-selecting starts over at 1.
        let state = state.toggle_product("silver");
        assert_eq!(state.quantity_of("silver"), Some(1));
    }

    #[test]
    fn toggle_ignores_unknown_ids() {
        let state = InvoiceState::new().toggle_product("diecast-64");
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn quantity_clamps_to_at_least_one() {
        let base = InvoiceState::new().toggle_product("premium");
        assert_eq!(base.set_product_quantity("premium", 0).quantity_of("premium"), Some(1));
        assert_eq!(base.set_product_quantity("premium", -3).quantity_of("premium"), Some(1));
        assert_eq!(base.set_product_quantity("premium", 12).quantity_of("premium"), Some(12));
    }

    #[test]
    fn quantity_of_unselected_product_is_ignored() {
        let state = InvoiceState::new().set_product_quantity("mainline", 4);
        assert!(!state.is_selected("mainline"));
    }

    #[test]
    fn custom_item_ids_count_up_and_survive_removal() {
        let state = InvoiceState::new().add_custom_item().add_custom_item();
        assert_eq!(state.custom_items[0].id, "custom-1");
        assert_eq!(state.custom_items[1].id, "custom-2");

        let state = state.remove_custom_item("custom-1").add_custom_item();
        let ids: Vec<&str> = state.custom_items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["custom-2", "custom-3"]);
    }

    #[test]
    fn custom_item_defaults_are_blank() {
        let state = InvoiceState::new().add_custom_item();
        let item = &state.custom_items[0];
        assert_eq!(item.name, "");
        assert_eq!(item.price, 0.0);
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn custom_item_edits_target_by_id() {
        let state = InvoiceState::new()
            .add_custom_item()
            .add_custom_item()
            .set_custom_item_name("custom-2", "Display case")
            .set_custom_item_price("custom-2", "120")
            .set_custom_item_quantity("custom-2", "3");
        assert_eq!(state.custom_items[0].name, "");
        assert_eq!(state.custom_items[1].name, "Display case");
        assert_eq!(state.custom_items[1].price, 120.0);
        assert_eq!(state.custom_items[1].quantity, 3);
    }

    #[test]
    fn custom_item_field_coercions() {
        let state = InvoiceState::new()
            .add_custom_item()
            .set_custom_item_price("custom-1", "abc")
            .set_custom_item_quantity("custom-1", "abc");
        assert_eq!(state.custom_items[0].price, 0.0);
        assert_eq!(state.custom_items[0].quantity, 1);

        let state = state
            .set_custom_item_price("custom-1", "-40")
            .set_custom_item_quantity("custom-1", "0");
        assert_eq!(state.custom_items[0].price, 0.0);
        assert_eq!(state.custom_items[0].quantity, 1);
    }

    #[test]
    fn removing_a_missing_item_changes_nothing() {
        let state = InvoiceState::new().add_custom_item();
        let next = state.remove_custom_item("custom-9");
        assert_eq!(next, state);
    }

    #[test]
    fn charge_coercions() {
        let state = InvoiceState::new().set_shipping("50");
        assert_eq!(state.shipping_charge, 50.0);
        assert_eq!(state.set_shipping("abc").shipping_charge, 0.0);
        assert_eq!(state.set_shipping("NaN").shipping_charge, 0.0);
        assert_eq!(state.set_shipping("inf").shipping_charge, 0.0);
        // Negative charges are kept as typed.
        assert_eq!(state.set_shipping("-20").shipping_charge, -20.0);
        assert_eq!(state.set_amount_paid("-1").amount_paid, -1.0);
    }

    #[test]
    fn mutators_leave_the_original_untouched() {
        let base = InvoiceState::new();
        let _changed = base.toggle_product("mainline").set_customer_name("Arjun");
        assert_eq!(base.selected_count(), 0);
        assert_eq!(base.customer.name, "");
    }

    #[test]
    fn logo_from_rgba_checks_the_buffer_length() {
        let logo = Logo::from_rgba(2, 1, vec![255, 0, 0, 255, 0, 255, 0, 255]).unwrap();
        assert_eq!((logo.width, logo.height), (2, 1));
    }

    #[test]
    fn logo_from_rgba_rejects_short_buffers() {
        let err = Logo::from_rgba(2, 2, vec![0; 4]).unwrap_err();
        assert!(matches!(err, LogoError::BufferSize { want: 16, got: 4, .. }));
    }

    #[test]
    fn logo_from_png_expands_rgb_to_rgba() {
        let mut bytes = Vec::new();
        {
            let mut enc = png::Encoder::new(&mut bytes, 2, 1);
            enc.set_color(png::ColorType::Rgb);
            enc.set_depth(png::BitDepth::Eight);
            let mut writer = enc.write_header().unwrap();
            writer.write_image_data(&[10, 20, 30, 40, 50, 60]).unwrap();
        }
        let logo = Logo::from_png(&bytes).unwrap();
        assert_eq!(logo.rgba, vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }
}
