#![no_main]

use grindgraph::{parse_reader, ParserConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Any byte sequence is a valid (possibly empty) profile
    let config = ParserConfig::default().with_forward_calls(true);
    if let Ok(graph) = parse_reader(data, &config) {
        for function in graph.functions() {
            for event in graph.events().names() {
                let _ = function.measurement(event);
            }
            for call in function.calls() {
                let _ = call.function();
            }
        }
    }
});
