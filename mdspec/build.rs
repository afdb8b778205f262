//! Build script that embeds the spec corpus.
//!
//! Every `*.json` file under `specs/` is compiled into the library as a
//! `(name, bytes)` table, written to `$OUT_DIR/embedded_specs.rs`.

use std::fs;
use std::path::Path;

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let out_dir = std::env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let specs_dir = Path::new(&manifest_dir).join("specs");

    println!("cargo:rerun-if-changed=specs");
    println!("cargo:rerun-if-changed=build.rs");

    let mut names: Vec<String> = match fs::read_dir(&specs_dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().map_or(false, |e| e == "json"))
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect(),
        Err(_) => Vec::new(),
    };
    // Sorted for reproducible builds.
    names.sort();

    let mut table = String::from("pub(crate) static EMBEDDED_FILES: &[(&str, &[u8])] = &[\n");
    for name in &names {
        let path = specs_dir.join(name);
        table.push_str(&format!(
            "    ({:?}, include_bytes!({:?})),\n",
            name,
            path.display().to_string()
        ));
    }
    table.push_str("];\n");

    fs::write(Path::new(&out_dir).join("embedded_specs.rs"), table)
        .expect("failed to write embedded_specs.rs");
}
