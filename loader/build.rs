//! Build script for `handoff-loader`.

use std::env;

/// Build-time configuration forwarded to the loader, with its default value.
const CONFIGURATION: &[(&str, &str)] = &[("LOADER_MAX_CORES", "1"), ("LOADER_STACK_BITS", "14")];

fn main() -> Result<(), ()> {
    for (name, default) in CONFIGURATION {
        println!("cargo::rerun-if-env-changed={name}");

        let value = env::var(name).unwrap_or_else(|_| String::from(*default));
        println!("cargo::rustc-env={name}={value}");
    }

    if env::var("CARGO_CFG_TARGET_OS").is_ok_and(|os| os == "none") {
        let manifest_dir =
            env::var("CARGO_MANIFEST_DIR").expect("cargo didn't pass CARGO_MANIFEST_DIR");

        println!("cargo::rerun-if-changed={manifest_dir}/linker-script.ld");
        println!("cargo::rustc-link-arg=-T{manifest_dir}/linker-script.ld");

        // The image loader, device drivers and page table setup are provided as C objects.
        println!("cargo::rerun-if-env-changed=LOADER_PLATFORM_LIB");
        if let Ok(library) = env::var("LOADER_PLATFORM_LIB") {
            println!("cargo::rerun-if-changed={library}");
            println!("cargo::rustc-link-arg={library}");
        }
    }

    Ok(())
}
