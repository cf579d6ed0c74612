//! UTF-16 helpers for engine string buffers

/// Decode a UTF-16LE byte buffer, stopping at the first NUL unit.
///
/// A trailing odd byte is ignored. Invalid surrogates become U+FFFD.
pub(crate) fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

/// Encode as NUL-terminated UTF-16.
pub(crate) fn encode_utf16z(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}
