use std::env;
use std::fs;
use std::path::Path;

fn main() {
    let crate_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");

    let lib_path = Path::new(&crate_dir).join("src/lib.rs");
    if !lib_path.exists() {
        panic!("src/lib.rs missing; create the file before building");
    }

    // C header for host stacks linking the staticlib
    let header_path = Path::new("include/le_privacy.h");
    if let Some(parent) = header_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            println!("cargo:warning=Failed to create include/ directory: {}", e);
        }
    }

    match cbindgen::generate(&crate_dir) {
        Ok(bindings) => {
            if !bindings.write_to_file(header_path) {
                println!("cargo:warning=Failed to write le_privacy.h: check permissions");
            }
        }
        Err(e) => println!("cargo:warning=cbindgen generation failed: {}", e),
    }

    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=build.rs");
}
