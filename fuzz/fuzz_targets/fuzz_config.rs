#![no_main]

use epi_calculator::{Analyzer, IndexConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(config) = IndexConfig::from_toml_str(text) {
            if let Ok(report) = Analyzer::new(&config).run() {
                assert!(report.epi.is_finite());
            }
        }
    }
});
