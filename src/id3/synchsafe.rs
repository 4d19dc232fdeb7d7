//! Synchsafe integer decoding.
//!
//! ID3v2 stores sizes with the high bit of every byte clear so tag data can
//! never contain a false MPEG sync pattern. Each byte therefore carries 7
//! payload bits, giving 28 usable bits per 32-bit field. The tag size in the
//! outer header is always synchsafe; frame sizes are synchsafe in v2.4 only.

/// Decode a synchsafe integer read as a plain big-endian `u32`.
///
/// Collapses the low 7 bits of each byte, most significant byte first:
/// `0x7F7F7F7F` decodes to `0x0FFFFFFF`. A pure bit transform with no
/// failure cases; bit 7 of every byte is ignored.
pub fn decode(value: u32) -> u32 {
    let mut decoded: u32 = 0;
    let mut mask: u32 = 0x7F00_0000;

    while mask != 0 {
        decoded >>= 1;
        decoded |= value & mask;
        mask >>= 8;
    }

    decoded
}
