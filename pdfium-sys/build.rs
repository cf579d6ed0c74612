use std::env;
use std::path::{Path, PathBuf};

/// Headers covering the document, page, text, search, bookmark and link APIs.
const HEADERS: &[&str] = &["fpdfview.h", "fpdf_text.h", "fpdf_doc.h"];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=PDFIUM_LIB_DIR");
    println!("cargo:rerun-if-env-changed=PDFIUM_INCLUDE_DIR");

    let lib_dir = match env::var("PDFIUM_LIB_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => panic!(
            "PDFIUM_LIB_DIR is not set. Point it at a directory containing \
             libpdfium (and optionally an include/ directory with the public headers)."
        ),
    };

    let include_dir = find_headers(&lib_dir).unwrap_or_else(|| {
        panic!(
            "Cannot find PDFium headers. Set PDFIUM_INCLUDE_DIR or place them in {}/include",
            lib_dir.display()
        )
    });

    setup_linking(&lib_dir);
    generate_bindings(&include_dir);
}

fn find_headers(lib_dir: &Path) -> Option<PathBuf> {
    if let Ok(dir) = env::var("PDFIUM_INCLUDE_DIR") {
        return Some(PathBuf::from(dir));
    }
    let candidates = [
        lib_dir.join("include"),
        lib_dir.join("../include"),
        lib_dir.join("../../public"),
    ];
    candidates
        .into_iter()
        .find(|dir| dir.join("fpdfview.h").exists())
}

fn setup_linking(lib_dir: &Path) {
    println!("cargo:rustc-link-search=native={}", lib_dir.display());
    println!("cargo:rustc-link-lib=dylib=pdfium");

    // rpath so test binaries find the library without LD_LIBRARY_PATH
    if cfg!(target_os = "macos") || cfg!(target_os = "linux") {
        println!("cargo:rustc-link-arg=-Wl,-rpath,{}", lib_dir.display());
    }
}

fn generate_bindings(include_dir: &Path) {
    println!("cargo:rerun-if-changed={}", include_dir.display());

    let mut builder = bindgen::Builder::default();
    for header in HEADERS {
        builder = builder.header(include_dir.join(header).to_string_lossy());
    }

    let bindings = builder
        .clang_arg(format!("-I{}", include_dir.display()))
        .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
        .allowlist_function("FPDF_.*")
        .allowlist_function("FPDFBitmap_.*")
        .allowlist_function("FPDFText_.*")
        .allowlist_function("FPDFBookmark_.*")
        .allowlist_function("FPDFDest_.*")
        .allowlist_function("FPDFLink_.*")
        .allowlist_function("FPDFAction_.*")
        .allowlist_type("FPDF.*")
        .allowlist_type("FS_.*")
        .allowlist_var("FPDF.*")
        .opaque_type("fpdf_.*")
        .generate()
        .expect("Unable to generate PDFium bindings");

    let out_path = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    bindings
        .write_to_file(out_path.join("bindings.rs"))
        .expect("Couldn't write bindings!");
}
