fn main() {
    // rusty_v8 pulls in ETW and registry APIs on Windows; those live in advapi32.
    #[cfg(target_os = "windows")]
    {
        println!("cargo:rustc-link-lib=advapi32");
    }
}
