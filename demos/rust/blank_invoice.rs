/// Untouched form straight to PDF: placeholder dashes, the empty-table
/// row and a zero-balance banner.
///
/// Run with:
///   cargo run --example blank_invoice -p vault-demos [output-dir]
///
/// Writes output under: demos/output/ unless a directory is given.
use std::env;
use std::path::Path;

use tracing_subscriber::fmt::init as tracing_init;
use vault_billing::{Alert, InvoiceForm};

struct ConsoleAlert;

impl Alert for ConsoleAlert {
    fn alert(&mut self, message: &str) {
        eprintln!("[alert] {}", message);
    }
}

fn main() {
    tracing_init();

    let mut form = InvoiceForm::new();
    let out_dir = env::args().nth(1).unwrap_or_else(|| "demos/output".to_string());
    std::fs::create_dir_all(&out_dir).expect("create output dir");
    let path = form
        .export_pdf(Path::new(&out_dir), &mut ConsoleAlert)
        .expect("export PDF");
    println!("Written to {}", path.display());
}
