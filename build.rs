//! Writes `include/<package>.h`, the C declarations of the `mylib_*` ABI.

use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};

fn header_path(manifest_dir: &Path) -> PathBuf {
    let package = env::var("CARGO_PKG_NAME").unwrap_or_else(|_| "mylib".to_owned());
    manifest_dir.join("include").join(format!("{}.h", package))
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=src/");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let settings = manifest_dir.join("cbindgen.toml");
    let config = if settings.exists() {
        cbindgen::Config::from_file(&settings)?
    } else {
        cbindgen::Config::default()
    };

    let header = header_path(&manifest_dir);
    if let Some(dir) = header.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let bindings = cbindgen::Builder::new()
        .with_crate(&manifest_dir)
        .with_config(config)
        .with_language(cbindgen::Language::C)
        .generate()?;
    bindings.write_to_file(&header);
    Ok(())
}
