//! Gzip decompression for response bodies sent with
//! `Content-Encoding: gzip`.

use std::io::Read;

use flate2::read::GzDecoder;

/// Decompress `bytes` as gzip. Returns `None` on any decode failure — a
/// parse failure here is treated the same as a malformed JSON body: the
/// exchange still contributes headers, the body is simply not extracted.
pub fn decompress(bytes: &[u8]) -> Option<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).ok()?;
    Some(out)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn round_trips_gzip_encoded_bytes() {
        let original = br#"{"ok":true}"#;
        let compressed = gzip(original);
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn malformed_input_returns_none() {
        assert!(decompress(b"not gzip").is_none());
    }
}
