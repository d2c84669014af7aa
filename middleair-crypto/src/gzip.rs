//! Gzip wrapping used by the secure channel's double-compression sandwich
//! (§4.2): inner compression shrinks plaintext before encryption, outer
//! compression shortens OpenPGP's packet framing.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use middleair_wire::Error;

/// Used for the handshake contribution records (§4.2 step 6): favors size
/// over speed since it happens once per connection.
pub fn gzip_best_compression(data: &[u8]) -> Result<Vec<u8>, Error> {
    gzip(data, Compression::best())
}

/// Used for every data record after the handshake (§4.2 "Data records"):
/// favors speed since it happens on every application payload.
pub fn gzip_best_speed(data: &[u8]) -> Result<Vec<u8>, Error> {
    gzip(data, Compression::fast())
}

fn gzip(data: &[u8], level: Compression) -> Result<Vec<u8>, Error> {
    let mut encoder = GzEncoder::new(Vec::new(), level);
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Reverse of either `gzip_*` function above.
pub fn gunzip(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
