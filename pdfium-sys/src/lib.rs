//! FFI bindings to PDFium
//!
//! Raw bindgen output for the view, text and document headers. Generated at
//! build time from the headers found next to `PDFIUM_LIB_DIR`.
//!
//! Everything here is `unsafe`; use `pdfium-bridge` for a handle-based API.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(dead_code)]

include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
