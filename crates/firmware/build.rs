use std::env;
use std::fs;
use std::path::PathBuf;

/// Put the linker script somewhere the linker can find it.
fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("No out dir"));
    fs::write(out_dir.join("memory.x"), include_bytes!("memory.x")).expect("Could not write file");

    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("none") {
        println!("cargo:rustc-link-arg=-Tlink.x"); // linker script from cortex-m-rt
    }
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=LIGHT52_BUILD_DATE");
}
