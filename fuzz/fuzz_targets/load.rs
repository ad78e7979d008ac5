#![no_main]

use cilreader::{Universe, UniverseOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let universe = Universe::new(UniverseOptions::strict());
    let Ok(module) = universe.load_module_bytes(data.to_vec()) else {
        return;
    };
    if let Ok(types) = module.get_types() {
        for ty in types {
            let _ = ty.base_type();
            let _ = ty.full_name();
        }
    }
});
