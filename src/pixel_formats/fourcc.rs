// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! fourcc packing and pretty-printing.

use super::DrmFormat;

const PREFIX: &str = "DRM_FOURCC_";

/// Packs four characters into a fourcc code, first character in the low byte.
///
/// This is the `fourcc_code` macro from `drm_fourcc.h`.
pub const fn fourcc(a: u8, b: u8, c: u8, d: u8) -> u32 {
    u32::from_le_bytes([a, b, c, d])
}

/// Renders a driver format for logs, e.g. `DRM_FOURCC_AR24`.
///
/// The bytes are read in native order, which is the order the constants were packed in,
/// so the label reads as the conventional 4-character name.  Presentational only.
pub fn format_string(format: DrmFormat) -> String {
    let mut s = String::with_capacity(PREFIX.len() + 4);
    s.push_str(PREFIX);
    s.extend(format.0.to_ne_bytes().iter().map(|&b| char::from(b)));
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_first_char_low() {
        assert_eq!(fourcc(b'A', b'R', b'2', b'4'), 0x3432_5241);
        assert_eq!(DrmFormat::ARGB8888.0, 0x3432_5241);
    }

    #[cfg(target_endian = "little")]
    #[test]
    fn stringify_native_order() {
        assert_eq!(format_string(DrmFormat(0x3432_5241)), "DRM_FOURCC_AR24");
        assert_eq!(format_string(DrmFormat::NONE), "DRM_FOURCC_0000");
        assert_eq!(format_string(DrmFormat::R8), "DRM_FOURCC_R8  ");
        assert_eq!(DrmFormat::YVU420_ANDROID.to_string(), "DRM_FOURCC_9997");
    }

    #[test]
    fn stringify_matches_bytes() {
        let code = 0x3432_5241u32;
        let expected: String = code.to_ne_bytes().iter().map(|&b| b as char).collect();
        assert_eq!(format_string(DrmFormat(code)), format!("DRM_FOURCC_{expected}"));
    }
}
