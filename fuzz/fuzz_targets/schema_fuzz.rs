//! Schema fuzz target: feed arbitrary text to the schema parser, linter and resolver.
//! None of them may panic; bad input must come back as Err or lint findings.
//! Build with: cargo fuzz run schema_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    if let Ok(file) = ktframe::parse(s) {
        for section in &file.schemas {
            let _ = ktframe::lint::lint(section);
            let _ = ktframe::Schema::resolve(section);
        }
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run schema_fuzz");
}
