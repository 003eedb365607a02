/// Executed whenever Cargo builds reaper-abi
fn main() {
    compile_variadic_glue_code();
}

/// Compiles the only piece of glue code that can't be written in Rust.
///
/// `ProjectStateContext::AddLine()` is a printf-style variadic virtual function. Stable Rust can
/// call C-variadic functions but can't define them. So the vtable slot is filled with a C function
/// which renders the format string and its arguments and passes the finished line on to Rust.
fn compile_variadic_glue_code() {
    println!("cargo:rerun-if-changed=src/project_state_context.c");
    cc::Build::new()
        .warnings(false)
        .file("src/project_state_context.c")
        .compile("reaper_abi_glue");
}
