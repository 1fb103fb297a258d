use chrono::NaiveDate;

use crate::catalog::{BRAND_WORDMARK, POLICY_LINES, POLICY_TITLE, SHOP_ADDRESS, THANK_YOU_NOTE};
use crate::money::format_inr;
use crate::state::InvoiceState;
use crate::surface::{FontWeight, PageSurface, Rgb, TextAlign, TextStyle};
use crate::totals::Totals;

/// Page geometry: A4 portrait at CSS resolution, 210mm x 297mm at 96 dpi.
pub const PAGE_W: f32 = 794.0;
pub const PAGE_MIN_H: f32 = 1123.0;

const MARGIN: f32 = 40.0;
const CONTENT_W: f32 = PAGE_W - 2.0 * MARGIN;
const RIGHT: f32 = PAGE_W - MARGIN;

// Grayscale ramp, darkest to lightest. Pure black is reserved for the
// strongest accents (wordmark, title, total rule, paid banner).
const INK: Rgb = Rgb::new(0x11, 0x18, 0x27);
const DARK: Rgb = Rgb::new(0x1F, 0x29, 0x37);
const BODY: Rgb = Rgb::new(0x4B, 0x55, 0x63);
const MUTED: Rgb = Rgb::new(0x6B, 0x72, 0x80);
const FAINT: Rgb = Rgb::new(0x9C, 0xA3, 0xAF);
const RULE_HEAVY: Rgb = Rgb::new(0xE5, 0xE7, 0xEB);
const RULE: Rgb = Rgb::new(0xF3, 0xF4, 0xF6);
const PANEL: Rgb = Rgb::new(0xF9, 0xFA, 0xFB);
const ALERT: Rgb = Rgb::new(0xDC, 0x26, 0x26);
// 30% ink flattened onto white, for the watermark-style policy footer.
const GHOST: Rgb = Rgb::new(188, 191, 195);

fn regular(size: f32, color: Rgb) -> TextStyle {
    TextStyle { size, weight: FontWeight::Regular, italic: false, color }
}

fn medium(size: f32, color: Rgb) -> TextStyle {
    TextStyle { size, weight: FontWeight::Medium, italic: false, color }
}

fn bold(size: f32, color: Rgb) -> TextStyle {
    TextStyle { size, weight: FontWeight::Bold, italic: false, color }
}

fn black(size: f32, color: Rgb) -> TextStyle {
    TextStyle { size, weight: FontWeight::Black, italic: false, color }
}

fn italic(style: TextStyle) -> TextStyle {
    TextStyle { italic: true, ..style }
}

/// Empty form fields print as a dash placeholder.
fn or_dashes(value: &str) -> &str {
    if value.is_empty() {
        "---"
    } else {
        value
    }
}

/// Scale that fits the logo into the 200x80 header box. Smaller logos
/// stay at their natural size.
fn logo_fit_scale(width: u32, height: u32) -> f32 {
    1.0_f32.min(200.0 / width as f32).min(80.0 / height as f32)
}

/// Lay out the invoice page for one state snapshot. `include_policy`
/// appends the policy section inline, as the on-screen preview shows it;
/// the exported page leaves it off because the policy gets a page of
/// its own.
pub fn render_invoice_page(
    state: &InvoiceState,
    totals: &Totals,
    date: NaiveDate,
    include_policy: bool,
) -> PageSurface {
    let mut page = PageSurface::new(PAGE_W as u32);
    let mut y = draw_header(&mut page, state, date, MARGIN);
    y = draw_bill_to(&mut page, state, y);
    y = draw_items_table(&mut page, totals, y);
    y = draw_totals(&mut page, state, totals, y);
    if include_policy {
        y += 48.0;
        page.hline(MARGIN, RIGHT, y, 1.0, RULE);
        y += 1.0 + 32.0;
        y = draw_policy_content(&mut page, MARGIN, CONTENT_W, y);
    }
    y = draw_closing(&mut page, y);
    page.height = (y + MARGIN).ceil().max(PAGE_MIN_H) as u32;
    page
}

/// Lay out the standalone policy page. Fixed height: this content never
/// outgrows one sheet.
pub fn render_policy_page() -> PageSurface {
    let mut page = PageSurface::new(PAGE_W as u32);
    let x = (PAGE_W - 672.0) / 2.0;
    let mut y = 80.0;

    page.text(x, y, 672.0, TextAlign::Center, black(30.0, DARK), POLICY_TITLE.to_uppercase());
    y += 36.0 + 32.0;
    page.hline(x, x + 672.0, y, 2.0, Rgb::BLACK);
    y += 2.0 + 48.0;

    let panel_h = 32.0 + policy_content_height() + 32.0;
    page.fill_rect(x, y, 672.0, panel_h, PANEL);
    page.stroke_rect(x, y, 672.0, panel_h, RULE, 1.0);
    draw_policy_content(&mut page, x + 32.0, 672.0 - 64.0, y + 32.0);

    let footer = format!("{} Policy Document", BRAND_WORDMARK).to_uppercase();
    page.text(x, PAGE_MIN_H - 80.0 - 13.0, 672.0, TextAlign::Center, bold(9.0, GHOST), footer);
    page.height = PAGE_MIN_H as u32;
    page
}

// ── header ─────────────────────────────────────────────────────────────

fn draw_header(page: &mut PageSurface, state: &InvoiceState, date: NaiveDate, y: f32) -> f32 {
    let mark_h = match &state.logo {
        Some(logo) => {
            let scale = logo_fit_scale(logo.width, logo.height);
            let (w, h) = (logo.width as f32 * scale, logo.height as f32 * scale);
            page.image(MARGIN, y, w, h, logo.clone());
            h
        }
        None => {
            page.text(MARGIN, y, CONTENT_W, TextAlign::Left, black(36.0, Rgb::BLACK), BRAND_WORDMARK);
            40.0
        }
    };
    let mut left = y + mark_h + 16.0;
    page.text(MARGIN, left, 300.0, TextAlign::Left, bold(14.0, INK), "Address:");
    left += 20.0;
    page.text(MARGIN, left, 300.0, TextAlign::Left, regular(14.0, BODY), SHOP_ADDRESS);
    left += 20.0;

    page.text(RIGHT - 300.0, y, 300.0, TextAlign::Right, black(36.0, Rgb::BLACK), "INVOICE");
    let date_y = y + 48.0;
    page.text(
        RIGHT - 300.0,
        date_y,
        300.0,
        TextAlign::Right,
        bold(14.0, MUTED),
        date.format("%d/%m/%Y").to_string(),
    );

    let rule_y = left.max(date_y + 20.0) + 32.0;
    page.hline(MARGIN, RIGHT, rule_y, 1.0, RULE);
    rule_y + 1.0 + 40.0
}

// ── bill-to ────────────────────────────────────────────────────────────

fn draw_bill_to(page: &mut PageSurface, state: &InvoiceState, mut y: f32) -> f32 {
    page.text(MARGIN, y, CONTENT_W, TextAlign::Left, bold(12.0, FAINT), "BILL TO:");
    y += 16.0 + 8.0;
    page.text(
        MARGIN,
        y,
        CONTENT_W,
        TextAlign::Left,
        bold(18.0, INK),
        or_dashes(&state.customer.name).to_uppercase(),
    );
    y += 22.0 + 4.0;
    page.text(MARGIN, y, CONTENT_W, TextAlign::Left, bold(14.0, BODY), or_dashes(&state.customer.phone));
    y += 20.0 + 4.0;
    // Address keeps its typed line breaks.
    for line in or_dashes(&state.customer.address).lines() {
        page.text(MARGIN, y, CONTENT_W, TextAlign::Left, bold(14.0, BODY), line);
        y += 18.0;
    }
    y + 40.0
}

// ── items table ────────────────────────────────────────────────────────

fn draw_items_table(page: &mut PageSurface, totals: &Totals, mut y: f32) -> f32 {
    let col_w = [0.55 * CONTENT_W, 0.15 * CONTENT_W, 0.10 * CONTENT_W, 0.20 * CONTENT_W];
    let col_x = [
        MARGIN,
        MARGIN + col_w[0],
        MARGIN + col_w[0] + col_w[1],
        MARGIN + col_w[0] + col_w[1] + col_w[2],
    ];

    let head = black(10.0, FAINT);
    y += 16.0;
    page.text(col_x[0], y, col_w[0], TextAlign::Left, head, "DESCRIPTION");
    page.text(col_x[1], y, col_w[1], TextAlign::Center, head, "PRICE");
    page.text(col_x[2], y, col_w[2], TextAlign::Center, head, "QTY");
    page.text(col_x[3], y, col_w[3], TextAlign::Right, head, "TOTAL");
    y += 15.0 + 16.0;
    page.hline(MARGIN, RIGHT, y, 2.0, RULE_HEAVY);
    y += 2.0;

    if totals.line_items.is_empty() {
        y += 80.0;
        page.text(MARGIN, y, CONTENT_W, TextAlign::Center, bold(16.0, FAINT), "NO ITEMS SELECTED");
        return y + 24.0 + 80.0;
    }

    for (i, item) in totals.line_items.iter().enumerate() {
        if i > 0 {
            page.hline(MARGIN, RIGHT, y, 1.0, RULE);
            y += 1.0;
        }
        y += 20.0;
        let name = if item.name.is_empty() { "Custom Item" } else { item.name.as_str() };
        page.text(col_x[0], y, col_w[0], TextAlign::Left, bold(14.0, INK), name);
        page.text(col_x[1], y, col_w[1], TextAlign::Center, medium(14.0, BODY), format_inr(item.unit_price));
        page.text(col_x[2], y, col_w[2], TextAlign::Center, medium(14.0, BODY), item.quantity.to_string());
        page.text(col_x[3], y, col_w[3], TextAlign::Right, black(14.0, INK), format_inr(item.line_total()));
        y += 20.0 + 20.0;
    }
    y
}

// ── totals ─────────────────────────────────────────────────────────────

fn draw_totals(page: &mut PageSurface, state: &InvoiceState, totals: &Totals, mut y: f32) -> f32 {
    y += 48.0;
    page.hline(MARGIN, RIGHT, y, 2.0, RULE);
    y += 2.0 + 32.0;

    let x = RIGHT - 320.0;
    page.text(x, y, 320.0, TextAlign::Left, bold(14.0, MUTED), "SUBTOTAL");
    page.text(x, y, 320.0, TextAlign::Right, bold(14.0, DARK), format_inr(totals.subtotal));
    y += 20.0 + 12.0;
    page.text(x, y, 320.0, TextAlign::Left, bold(14.0, MUTED), "SHIPPING");
    page.text(x, y, 320.0, TextAlign::Right, bold(14.0, DARK), format_inr(state.shipping_charge));
    y += 20.0 + 12.0;

    page.hline(x, RIGHT, y, 4.0, Rgb::BLACK);
    y += 4.0 + 12.0;
    page.text(x, y, 320.0, TextAlign::Left, black(24.0, DARK), "TOTAL");
    page.text(x, y, 320.0, TextAlign::Right, black(24.0, DARK), format_inr(totals.grand_total));
    y += 32.0 + 12.0 + 8.0;

    let paid = italic(bold(14.0, FAINT));
    page.text(x, y, 320.0, TextAlign::Left, paid, "Paid");
    page.text(x, y, 320.0, TextAlign::Right, paid, format_inr(state.amount_paid));
    y += 20.0 + 16.0;

    if totals.fully_paid() {
        page.fill_rect(x, y, 320.0, 32.0, Rgb::BLACK);
        page.text(
            x,
            y + 8.0,
            320.0,
            TextAlign::Center,
            black(12.0, Rgb::WHITE),
            "FULL PAYMENT DONE",
        );
    } else {
        page.stroke_rect(x, y, 320.0, 32.0, ALERT, 2.0);
        page.text(
            x,
            y + 8.0,
            320.0,
            TextAlign::Center,
            black(12.0, ALERT),
            format!("BALANCE DUE: {}", format_inr(totals.balance_due)),
        );
    }
    y + 32.0
}

// ── policy content ─────────────────────────────────────────────────────

/// Policy heading plus bullet list. Shared between the inline section on
/// the invoice preview and the panel on the policy page.
fn draw_policy_content(page: &mut PageSurface, x: f32, w: f32, mut y: f32) -> f32 {
    page.text(x, y, w, TextAlign::Left, black(10.0, INK), POLICY_TITLE.to_uppercase());
    y += 15.0 + 16.0;
    for (i, line) in POLICY_LINES.iter().enumerate() {
        if i > 0 {
            y += 8.0;
        }
        page.text(x, y, w, TextAlign::Left, medium(10.0, MUTED), format!("• {}", line));
        y += 16.0;
    }
    y
}

fn policy_content_height() -> f32 {
    let bullets = POLICY_LINES.len() as f32;
    15.0 + 16.0 + bullets * 16.0 + (bullets - 1.0) * 8.0
}

// ── closing ────────────────────────────────────────────────────────────

fn draw_closing(page: &mut PageSurface, mut y: f32) -> f32 {
    y += 80.0;
    page.hline(MARGIN, RIGHT, y, 1.0, RULE);
    y += 1.0 + 40.0;
    page.text(
        MARGIN,
        y,
        CONTENT_W,
        TextAlign::Center,
        italic(black(24.0, Rgb::BLACK)),
        THANK_YOU_NOTE.to_uppercase(),
    );
    y += 32.0 + 8.0;
    page.text(MARGIN, y, CONTENT_W, TextAlign::Center, black(10.0, INK), BRAND_WORDMARK.to_uppercase());
    y += 15.0 + 8.0;
    // The disclaimer's gray is pre-flattened onto white at the 80%
    // opacity it renders with.
    page.text(
        MARGIN,
        y,
        CONTENT_W,
        TextAlign::Center,
        black(9.0, Rgb::new(176, 181, 191)),
        "COMPUTER GENERATED INVOICE",
    );
    y + 13.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logo_scaling_never_upscales() {
        assert_eq!(logo_fit_scale(100, 40), 1.0);
        assert_eq!(logo_fit_scale(400, 40), 0.5);
        assert_eq!(logo_fit_scale(100, 160), 0.5);
        assert_eq!(logo_fit_scale(800, 40), 0.25);
    }

    #[test]
    fn empty_fields_fall_back_to_dashes() {
        assert_eq!(or_dashes(""), "---");
        assert_eq!(or_dashes(" "), " ");
        assert_eq!(or_dashes("Arjun"), "Arjun");
    }
}
