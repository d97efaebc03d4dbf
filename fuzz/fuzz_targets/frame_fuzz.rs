//! Frame fuzz target: decode arbitrary bytes against both built-in models.
//! Short or long input exercises the length check; 2096/2120-byte input reaches the
//! markers and field decoders. The raw input is also read as a stream, which
//! exercises header realignment. Decoding must never panic.
//! Build with: cargo fuzz run frame_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    for model in ktframe::Model::ALL {
        let schema = model.schema().expect("built-in schema");
        let mut frame = data.to_vec();
        frame.resize(schema.frame_len(), b'0');
        let _ = ktframe::decode_frame(&schema, data);
        let _ = ktframe::decode_frame(&schema, &frame);
        let _ = ktframe::diagnose_frame(&schema, &frame);
        for record in ktframe::Records::new(data, &schema, ktframe::RejectPolicy::Skip) {
            let _ = record;
        }
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run frame_fuzz");
}
