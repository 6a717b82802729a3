#[macro_use]
extern crate afl;

use std::io::Cursor;

fn main() {
    fuzz!(|data: &[u8]| {
        let mut cursor = Cursor::new(data);
        let _ = psutils::dsc::scan(&mut cursor);
    });
}
