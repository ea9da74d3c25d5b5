use std::io::Write;

use flate2::write::GzEncoder;
use packtrack_common::IngestError;

pub(crate) fn gzip(data: &[u8]) -> Result<Vec<u8>, IngestError> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn gzip_round_trips() {
        let payload = br#"[{"message":"hello"}]"#;
        let compressed = gzip(payload).unwrap();
        let mut decoder = flate2::read::GzDecoder::new(compressed.as_slice());
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(out, payload);
    }
}
