//! Text <-> IPM file conversion.
//!
//! Composes the EBCDIC, VBS and blocking layers over whole files: decode
//! turns a binary IPM container into one readable line per record, encode
//! builds a transmission-ready IPM container from a line-per-record text
//! file.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::error::Result;

use super::blocking::{apply_blocking, detect_blocked, remove_blocking, DATA_PER_BLOCK};
use super::ebcdic;
use super::{hex_bytes, vbs};

/// Outcome of a file decode.
#[derive(Debug)]
pub struct DecodeSummary {
    /// Size of the binary input in bytes
    pub input_bytes: usize,
    /// Whether 1014-blocking was detected and stripped
    pub blocked: bool,
    /// Number of records written out
    pub records: usize,
}

/// Outcome of a file encode.
#[derive(Debug)]
pub struct EncodeSummary {
    /// Lines read from the text input (including skipped empty lines)
    pub lines: usize,
    /// Records actually encoded
    pub records: usize,
    /// VBS stream size before blocking
    pub vbs_bytes: usize,
    /// Physical 1014-byte blocks emitted
    pub blocks: usize,
    /// Final output size in bytes
    pub output_bytes: usize,
}

/// Decode a binary IPM file into line-oriented text.
///
/// Blocking is auto-detected; input that is not a multiple of 1014 bytes is
/// treated as an already-unblocked VBS stream. Each record is decoded from
/// Cp500, sanitized to printable ASCII and written as one LF-terminated
/// line.
pub fn decode_file(input: &Path, output: &Path) -> Result<DecodeSummary> {
    let raw = fs::read(input)?;
    info!("Read {} ({} bytes)", input.display(), raw.len());
    if raw.len() >= 16 {
        trace!("Leading bytes: {}", hex_bytes(&raw[..16]));
    }

    let input_bytes = raw.len();
    let blocked = detect_blocked(&raw);
    debug!("1014-blocking detected: {}", blocked);

    let stream = if blocked { remove_blocking(&raw) } else { raw };
    let records = vbs::decode(&stream)?;
    info!("Parsed {} records", records.len());

    let mut writer = fs::File::create(output)?;
    for record in &records {
        let text = ebcdic::decode_string(record);
        writer.write_all(ebcdic::to_ascii_printable(&text).as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    Ok(DecodeSummary {
        input_bytes,
        blocked,
        records: records.len(),
    })
}

/// Encode a line-oriented text file into a binary IPM container.
///
/// Each non-empty line becomes one Cp500 record; empty lines are skipped.
/// Inner spaces are preserved and no line terminators are carried into the
/// records. A UTF-8 BOM on the first line is stripped.
pub fn encode_file(input: &Path, output: &Path) -> Result<EncodeSummary> {
    let reader = BufReader::new(fs::File::open(input)?);

    let mut lines = 0usize;
    let mut records: Vec<Vec<u8>> = Vec::new();
    for line in reader.lines() {
        let mut line = line?;
        if lines == 0 {
            if let Some(stripped) = line.strip_prefix('\u{FEFF}') {
                line = stripped.to_string();
            }
        }
        lines += 1;
        if line.is_empty() {
            continue;
        }
        records.push(ebcdic::encode_string(&line));
    }
    info!("Read {} lines, {} records", lines, records.len());

    let stream = vbs::encode(&records);
    let blocked = apply_blocking(&stream);
    fs::write(output, &blocked)?;

    let summary = EncodeSummary {
        lines,
        records: records.len(),
        vbs_bytes: stream.len(),
        blocks: stream.len().div_ceil(DATA_PER_BLOCK),
        output_bytes: blocked.len(),
    };
    info!(
        "Wrote {} ({} bytes, {} blocks)",
        output.display(),
        summary.output_bytes,
        summary.blocks
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_encode_skips_empty_lines_and_preserves_spaces() {
        let dir = tempdir().unwrap();
        let txt = dir.path().join("in.txt");
        let ipm = dir.path().join("out.ipm");
        fs::write(&txt, "first record\n\n  padded  \n").unwrap();

        let summary = encode_file(&txt, &ipm).unwrap();
        assert_eq!(summary.lines, 3);
        assert_eq!(summary.records, 2);

        let stream = remove_blocking(&fs::read(&ipm).unwrap());
        let records = vbs::decode(&stream).unwrap();
        assert_eq!(ebcdic::decode_string(&records[0]), "first record");
        assert_eq!(ebcdic::decode_string(&records[1]), "  padded  ");
    }

    #[test]
    fn test_encode_strips_bom() {
        let dir = tempdir().unwrap();
        let txt = dir.path().join("in.txt");
        let ipm = dir.path().join("out.ipm");
        fs::write(&txt, "\u{FEFF}DATA\n").unwrap();

        encode_file(&txt, &ipm).unwrap();

        let stream = remove_blocking(&fs::read(&ipm).unwrap());
        let records = vbs::decode(&stream).unwrap();
        assert_eq!(records, vec![ebcdic::encode_string("DATA")]);
    }

    #[test]
    fn test_text_roundtrip() {
        let dir = tempdir().unwrap();
        let txt = dir.path().join("in.txt");
        let ipm = dir.path().join("mid.ipm");
        let back = dir.path().join("out.txt");
        let content = "MTI0100 settlement\nR119 batch 42\nlast line\n";
        fs::write(&txt, content).unwrap();

        encode_file(&txt, &ipm).unwrap();
        let summary = decode_file(&ipm, &back).unwrap();
        assert!(summary.blocked);
        assert_eq!(summary.records, 3);
        assert_eq!(fs::read_to_string(&back).unwrap(), content);
    }

    #[test]
    fn test_decode_unblocked_input() {
        let dir = tempdir().unwrap();
        let ipm = dir.path().join("plain.vbs");
        let out = dir.path().join("out.txt");
        // Bare VBS stream, no 1014-blocking
        let stream = vbs::encode(&[ebcdic::encode_string("NOBLOCK")]);
        fs::write(&ipm, &stream).unwrap();

        let summary = decode_file(&ipm, &out).unwrap();
        assert!(!summary.blocked);
        assert_eq!(fs::read_to_string(&out).unwrap(), "NOBLOCK\n");
    }

    #[test]
    fn test_decode_sanitizes_binary_fields() {
        let dir = tempdir().unwrap();
        let ipm = dir.path().join("bin.ipm");
        let out = dir.path().join("out.txt");
        // 0x00 and 0xFF have no printable ASCII image
        let record = vec![0xC1, 0x00, 0xC2, 0xFF, 0xC3];
        fs::write(&ipm, apply_blocking(&vbs::encode(&[record]))).unwrap();

        decode_file(&ipm, &out).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "A.B.C\n");
    }
}
