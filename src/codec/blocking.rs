//! 1014-byte physical blocking.
//!
//! The outermost IPM container layer divides the VBS byte stream into
//! 1014-byte blocks: 1012 data bytes followed by two 0x40 (EBCDIC space)
//! trailer bytes. The final block is padded with 0x40 in the data region
//! when the stream runs out early.

use super::ebcdic::EBCDIC_SPACE;

/// Total size of a physical block.
pub const BLOCK_SIZE: usize = 1014;

/// Data bytes carried per block (block minus the two-byte trailer).
pub const DATA_PER_BLOCK: usize = 1012;

/// Wrap a VBS byte stream into consecutive 1014-byte blocks.
///
/// Output length is always `1014 * ceil(len / 1012)`.
pub fn apply_blocking(vbs: &[u8]) -> Vec<u8> {
    let blocks = vbs.len().div_ceil(DATA_PER_BLOCK);
    let mut out = Vec::with_capacity(blocks * BLOCK_SIZE);

    for chunk in vbs.chunks(DATA_PER_BLOCK) {
        out.extend_from_slice(chunk);
        // Pad the data region, then the two-byte block trailer
        out.resize(out.len() + (DATA_PER_BLOCK - chunk.len()) + 2, EBCDIC_SPACE);
    }

    out
}

/// Strip 1014-byte blocking, returning the raw VBS stream.
///
/// Each full block contributes its first 1012 bytes. A trailing partial
/// block (input not a multiple of 1014) contributes `min(remaining, 1012)`
/// bytes; callers normally gate on [`detect_blocked`] first.
pub fn remove_blocking(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut pos = 0;

    while pos < raw.len() {
        let remaining = raw.len() - pos;
        if remaining >= BLOCK_SIZE {
            out.extend_from_slice(&raw[pos..pos + DATA_PER_BLOCK]);
            pos += BLOCK_SIZE;
        } else {
            let take = remaining.min(DATA_PER_BLOCK);
            out.extend_from_slice(&raw[pos..pos + take]);
            break;
        }
    }

    out
}

/// Heuristically decide whether a file carries 1014-byte blocking.
///
/// Criteria, in order:
/// 1. A length that is not a multiple of 1014 is never blocked.
/// 2. With more than one block, blocked iff at least 60% of blocks end in
///    0x40 0x40.
/// 3. With exactly one block ending in 0x40 0x40, blocked.
/// 4. Otherwise, locate the first four-zero-byte VBS terminator; blocked
///    iff at least 80% of the bytes after it are 0x40.
pub fn detect_blocked(raw: &[u8]) -> bool {
    if raw.len() % BLOCK_SIZE != 0 {
        return false;
    }

    let blocks = raw.len() / BLOCK_SIZE;
    if blocks == 0 {
        return false;
    }

    let hits = (0..blocks)
        .filter(|b| {
            let end = (b + 1) * BLOCK_SIZE;
            raw[end - 2] == EBCDIC_SPACE && raw[end - 1] == EBCDIC_SPACE
        })
        .count();

    if blocks > 1 {
        return hits * 100 / blocks >= 60;
    }

    // Single block: padded trailer is decisive
    if hits == 1 {
        return true;
    }

    // No trailer match; fall back to pad density after the VBS terminator
    if let Some(after_eof) = find_vbs_eof(raw) {
        let tail = &raw[after_eof..];
        if tail.is_empty() {
            return false;
        }
        let pads = tail.iter().filter(|&&b| b == EBCDIC_SPACE).count();
        return pads * 100 / tail.len() >= 80;
    }

    false
}

/// Find the first four consecutive zero bytes (the VBS terminator) and
/// return the position just past them.
fn find_vbs_eof(data: &[u8]) -> Option<usize> {
    data.windows(4)
        .position(|w| w == [0, 0, 0, 0])
        .map(|i| i + 4)
}
