#![no_main]
use libfuzzer_sys::fuzz_target;

use psutils::config::OutputConfig;
use psutils::pagespec;

fuzz_target!(|data: &str| {
    let cfg = OutputConfig::new().with_dimensions(595.28, 841.89);
    let _ = pagespec::parse(data, 1, &cfg);
});
