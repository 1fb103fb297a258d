/// Filled-in invoice: a typical order with a logo, catalog picks, a
/// custom line, shipping and a part payment.
///
/// Run with:
///   cargo run --example sample_invoice -p vault-demos [output-dir]
///
/// Writes output under: demos/output/ unless a directory is given.
use std::env;
use std::path::Path;

use tracing_subscriber::fmt::init as tracing_init;
use vault_billing::{Alert, InvoiceForm, Logo};

struct ConsoleAlert;

impl Alert for ConsoleAlert {
    fn alert(&mut self, message: &str) {
        eprintln!("[alert] {}", message);
    }
}

// ── logo ──────────────────────────────────────────────────────────────────────

/// A little procedural chequer mark, 120x48, standing in for an uploaded
/// file.
fn demo_logo() -> Logo {
    let (w, h) = (120u32, 48u32);
    let mut rgba = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            if (x / 8 + y / 8) % 2 == 0 {
                rgba.extend_from_slice(&[17, 24, 39, 255]);
            } else {
                rgba.extend_from_slice(&[220, 38, 38, 255]);
            }
        }
    }
    Logo::from_rgba(w, h, rgba).expect("demo logo buffer")
}

fn main() {
    tracing_init();

    let mut form = InvoiceForm::new();
    form.set_logo(Some(demo_logo()));
    form.set_customer_name("Suresh Kumar");
    form.set_customer_phone("98765 43210");
    form.set_customer_address("12 Model Town\nJalandhar, Punjab 144003");

    form.toggle_product("mainline");
    form.set_product_quantity("mainline", 2);
    form.toggle_product("premium");

    form.add_custom_item();
    let id = form.state().custom_items[0].id.clone();
    form.set_custom_item_name(&id, "Acrylic display case");
    form.set_custom_item_price(&id, "120");
    form.set_custom_item_quantity(&id, "2");

    form.set_shipping("80");
    form.set_amount_paid("1000");

    let out_dir = env::args().nth(1).unwrap_or_else(|| "demos/output".to_string());
    std::fs::create_dir_all(&out_dir).expect("create output dir");
    let path = form
        .export_pdf(Path::new(&out_dir), &mut ConsoleAlert)
        .expect("export PDF");
    println!("Written to {}", path.display());
}
