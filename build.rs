fn main() {
    println!("cargo:rerun-if-changed=src/logger.c");

    cc::Build::new().file("src/logger.c").compile("logger");

    built::write_built_file().expect("Failed to acquire build-time information");
}
