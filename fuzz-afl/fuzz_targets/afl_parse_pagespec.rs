#[macro_use]
extern crate afl;

use psutils::config::OutputConfig;
use psutils::pagespec;

fn main() {
    fuzz!(|data: String| {
        let cfg = OutputConfig::new().with_dimensions(595.28, 841.89);
        let _ = pagespec::parse(&data, 1, &cfg);
    });
}
