//! Render one page through the bridge and write it as PNG.
//!
//! cargo run --example render_to_png --features pdfium -- in.pdf 0 out.png [width] [565]

use pdfium_bridge::{HostBitmap, PdfBridge, PdfiumEngine, ReaderSource, SurfaceFormat};
use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 4 || args.len() > 6 {
        eprintln!(
            "Usage: {} <input.pdf> <page_num> <output.png> [width] [565]",
            args[0]
        );
        eprintln!("  page_num: 0-indexed page");
        eprintln!("  width: output width in pixels (default: page width in points)");
        eprintln!("  565: render through an RGB_565 surface");
        process::exit(1);
    }

    let page_index = args[2].parse::<usize>().unwrap_or_else(|_| {
        eprintln!("Error: page_num must be a number");
        process::exit(1);
    });
    let width = args.get(4).map(|w| {
        w.parse::<u32>().unwrap_or_else(|_| {
            eprintln!("Error: width must be a number");
            process::exit(1);
        })
    });
    let format = if args.get(5).map(String::as_str) == Some("565") {
        SurfaceFormat::Rgb565
    } else {
        SurfaceFormat::Rgba8888
    };

    if let Err(e) = render(&args[1], page_index, &args[3], width, format) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn render(
    pdf_path: &str,
    page_index: usize,
    output: &str,
    width: Option<u32>,
    format: SurfaceFormat,
) -> pdfium_bridge::Result<()> {
    let mut bridge = PdfBridge::new(PdfiumEngine::new());
    let doc = bridge.open_document(ReaderSource::open(pdf_path)?, None)?;

    let page_count = bridge.page_count(doc)?;
    let Some(page) = bridge.open_page(doc, page_index)? else {
        eprintln!(
            "Error: Invalid page number: {} (document has {} pages)",
            page_index, page_count
        );
        process::exit(1);
    };

    let size = bridge.page_dimensions(page)?.unwrap_or_default();
    let out_width = width.unwrap_or(size.width.max(1) as u32);
    let scale = out_width as f64 / size.width.max(1) as f64;
    let out_height = ((size.height as f64 * scale).round() as u32).max(1);

    let mut bitmap = HostBitmap::new(out_width, out_height, format);
    bridge.render(
        page,
        &mut bitmap,
        0,
        0,
        out_width as i32,
        out_height as i32,
        true,
    )?;
    bitmap.save_as_png(output)?;

    println!(
        "Rendered page {} of {} to {} ({}x{}, {:?})",
        page_index, pdf_path, output, out_width, out_height, format
    );
    bridge.close_document(doc);
    Ok(())
}
