//! Hex dump rendering

/// Bytes per space-separated group.
pub const GROUP_BYTES: usize = 4;

/// Bytes per output line.
pub const LINE_BYTES: usize = 16;

const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Renders bytes as uppercase, zero-padded hex.
///
/// Every byte takes two digits, groups of [`GROUP_BYTES`] bytes are separated
/// by a single space and lines hold [`LINE_BYTES`] bytes.
///
/// ```
/// use taglog::core::hex::hex_dump;
///
/// assert_eq!(hex_dump(&[0x0A, 0xFF]), "0AFF");
/// assert_eq!(hex_dump(&[1, 2, 3, 4, 5]), "01020304 05");
/// ```
pub fn hex_dump(bytes: &[u8]) -> String {
    let lines = bytes.len().div_ceil(LINE_BYTES);
    let mut out = String::with_capacity(bytes.len() * 2 + bytes.len() / GROUP_BYTES + lines);

    for (line_index, line) in bytes.chunks(LINE_BYTES).enumerate() {
        if line_index > 0 {
            out.push('\n');
        }
        for (group_index, group) in line.chunks(GROUP_BYTES).enumerate() {
            if group_index > 0 {
                out.push(' ');
            }
            for byte in group {
                out.push(DIGITS[(byte >> 4) as usize] as char);
                out.push(DIGITS[(byte & 0x0F) as usize] as char);
            }
        }
    }

    out
}
