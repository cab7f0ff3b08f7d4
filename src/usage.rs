// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Buffer usage vocabularies and the translation between them.
//!
//! A gralloc client describes what it intends to do with a buffer as a [`GrallocUsage`]
//! bitmask.  The allocation driver wants a [`BoUsage`] bitmask instead.  The driver uses it
//! to pick tiling, memory placement and, for the flexible formats, the concrete format.
//!
//! The two vocabularies don't line up one-to-one:
//!
//! - CPU access is a pair of 2-bit *fields* on the gralloc side (never/rarely/often),
//!   compared by masked equality rather than tested bit-by-bit.
//! - Several display-related gralloc bits have no driver meaning at all and are dropped.
//! - A few gralloc bits deliberately map to something other than their literal meaning;
//!   see the rule table.
//!
//! Bits that aren't recognized are ignored.  A future platform bit must never cause an
//! allocation to fail here.
//!
//! # Examples
//!
//! ```
//! use gralloc_shim::usage::{translate_usage, BoUsage, GrallocUsage};
//!
//! let usage = GrallocUsage::HW_COMPOSER | GrallocUsage::SW_READ_OFTEN;
//! assert_eq!(
//!     translate_usage(usage),
//!     BoUsage::SCANOUT | BoUsage::TEXTURE | BoUsage::SW_READ_OFTEN
//! );
//! ```

bitflags::bitflags! {
    /// Android gralloc usage bits (`GRALLOC_USAGE_*` plus AIDL `BufferUsage` extensions).
    ///
    /// The `SW_*` constants are field values, not independent bits.  Use
    /// [`GrallocUsage::sw_read`] and [`GrallocUsage::sw_write`] to inspect them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GrallocUsage: u64 {
        const SW_READ_RARELY = 0x2;
        const SW_READ_OFTEN = 0x3;
        const SW_READ_MASK = 0xF;

        const SW_WRITE_RARELY = 0x20;
        const SW_WRITE_OFTEN = 0x30;
        const SW_WRITE_MASK = 0xF0;

        const HW_TEXTURE = 0x100;
        const HW_RENDER = 0x200;
        const HW_2D = 0x400;
        const HW_COMPOSER = 0x800;
        const HW_FB = 0x1000;
        const EXTERNAL_DISP = 0x2000;
        const PROTECTED = 0x4000;
        const CURSOR = 0x8000;
        const HW_VIDEO_ENCODER = 0x1_0000;
        const HW_CAMERA_WRITE = 0x2_0000;
        const HW_CAMERA_READ = 0x4_0000;
        const RENDERSCRIPT = 0x10_0000;

        /// AIDL `BufferUsage::VIDEO_DECODER`.
        const VIDEO_DECODER = 1 << 22;
        /// AIDL `BufferUsage::GPU_DATA_BUFFER`.
        const GPU_DATA_BUFFER = 1 << 24;
        /// AIDL `BufferUsage::FRONT_BUFFER`.
        const FRONT_BUFFER = 1 << 32;
    }
}

impl GrallocUsage {
    /// The CPU read field, e.g. [`GrallocUsage::SW_READ_OFTEN`].
    pub fn sw_read(self) -> GrallocUsage {
        self & GrallocUsage::SW_READ_MASK
    }

    /// The CPU write field, e.g. [`GrallocUsage::SW_WRITE_RARELY`].
    pub fn sw_write(self) -> GrallocUsage {
        self & GrallocUsage::SW_WRITE_MASK
    }
}

bitflags::bitflags! {
    /// Driver buffer-object usage bits (`BO_USE_*`).
    ///
    /// The empty set is `BO_USE_NONE`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BoUsage: u64 {
        const SCANOUT = 1 << 0;
        const CURSOR = 1 << 1;
        const RENDERING = 1 << 2;
        const LINEAR = 1 << 3;
        const TEXTURE = 1 << 4;
        const CAMERA_WRITE = 1 << 5;
        const CAMERA_READ = 1 << 6;
        const PROTECTED = 1 << 7;
        const SW_READ_OFTEN = 1 << 8;
        const SW_READ_RARELY = 1 << 9;
        const SW_WRITE_OFTEN = 1 << 10;
        const SW_WRITE_RARELY = 1 << 11;
        const HW_VIDEO_DECODER = 1 << 12;
        const HW_VIDEO_ENCODER = 1 << 13;
        const FRONT_RENDERING = 1 << 16;
        const RENDERSCRIPT = 1 << 17;
        const GPU_DATA_BUFFER = 1 << 18;
    }
}

impl BoUsage {
    pub const NONE: BoUsage = BoUsage::empty();
}

#[derive(Debug, Clone, Copy)]
enum Test {
    Bit(GrallocUsage),
    Field { mask: GrallocUsage, value: GrallocUsage },
}

impl Test {
    const fn matches(self, usage: GrallocUsage) -> bool {
        match self {
            Test::Bit(bit) => usage.bits() & bit.bits() != 0,
            Test::Field { mask, value } => usage.bits() & mask.bits() == value.bits(),
        }
    }
}

struct UsageRule {
    test: Test,
    adds: BoUsage,
}

const fn bit(bit: GrallocUsage, adds: BoUsage) -> UsageRule {
    UsageRule {
        test: Test::Bit(bit),
        adds,
    }
}

const fn field(mask: GrallocUsage, value: GrallocUsage, adds: BoUsage) -> UsageRule {
    UsageRule {
        test: Test::Field { mask, value },
        adds,
    }
}

const USAGE_RULES: &[UsageRule] = &[
    bit(GrallocUsage::CURSOR, BoUsage::NONE),
    field(
        GrallocUsage::SW_READ_MASK,
        GrallocUsage::SW_READ_RARELY,
        BoUsage::SW_READ_RARELY,
    ),
    field(
        GrallocUsage::SW_READ_MASK,
        GrallocUsage::SW_READ_OFTEN,
        BoUsage::SW_READ_OFTEN,
    ),
    field(
        GrallocUsage::SW_WRITE_MASK,
        GrallocUsage::SW_WRITE_RARELY,
        BoUsage::SW_WRITE_RARELY,
    ),
    field(
        GrallocUsage::SW_WRITE_MASK,
        GrallocUsage::SW_WRITE_OFTEN,
        BoUsage::SW_WRITE_OFTEN,
    ),
    bit(GrallocUsage::HW_TEXTURE, BoUsage::TEXTURE),
    bit(GrallocUsage::HW_RENDER, BoUsage::RENDERING),
    bit(GrallocUsage::HW_2D, BoUsage::RENDERING),
    // composer wants display hardware but can fall back to GL composition
    bit(
        GrallocUsage::HW_COMPOSER,
        BoUsage::SCANOUT.union(BoUsage::TEXTURE),
    ),
    bit(GrallocUsage::HW_FB, BoUsage::NONE),
    // covers both native external displays and usb monitors; too ambiguous to act on
    bit(GrallocUsage::EXTERNAL_DISP, BoUsage::NONE),
    // linear until real hardware protection exists
    bit(GrallocUsage::PROTECTED, BoUsage::LINEAR),
    // encoders read the buffer back on the CPU
    bit(
        GrallocUsage::HW_VIDEO_ENCODER,
        BoUsage::HW_VIDEO_ENCODER.union(BoUsage::SW_READ_OFTEN),
    ),
    bit(GrallocUsage::HW_CAMERA_WRITE, BoUsage::CAMERA_WRITE),
    bit(GrallocUsage::HW_CAMERA_READ, BoUsage::CAMERA_READ),
    bit(GrallocUsage::RENDERSCRIPT, BoUsage::RENDERSCRIPT),
    bit(GrallocUsage::VIDEO_DECODER, BoUsage::HW_VIDEO_DECODER),
    bit(GrallocUsage::FRONT_BUFFER, BoUsage::FRONT_RENDERING),
    bit(GrallocUsage::GPU_DATA_BUFFER, BoUsage::GPU_DATA_BUFFER),
];

/// Translates gralloc usage into driver usage.
///
/// Every rule is tested independently and the matching rules' bits are OR-ed together.
/// Unrecognized bits contribute nothing.
pub fn translate_usage(usage: GrallocUsage) -> BoUsage {
    USAGE_RULES
        .iter()
        .filter(|rule| rule.test.matches(usage))
        .fold(BoUsage::NONE, |acc, rule| acc | rule.adds)
}

/// [`translate_usage`] on raw bitmasks, for callers holding the gralloc `uint64_t`.
pub fn translate_usage_bits(usage: u64) -> u64 {
    translate_usage(GrallocUsage::from_bits_retain(usage)).bits()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single-bit inputs and the exact output each one must produce.
    const SINGLE_BITS: &[(GrallocUsage, BoUsage)] = &[
        (GrallocUsage::CURSOR, BoUsage::NONE),
        (GrallocUsage::HW_TEXTURE, BoUsage::TEXTURE),
        (GrallocUsage::HW_RENDER, BoUsage::RENDERING),
        (GrallocUsage::HW_2D, BoUsage::RENDERING),
        (
            GrallocUsage::HW_COMPOSER,
            BoUsage::SCANOUT.union(BoUsage::TEXTURE),
        ),
        (GrallocUsage::HW_FB, BoUsage::NONE),
        (GrallocUsage::EXTERNAL_DISP, BoUsage::NONE),
        (GrallocUsage::PROTECTED, BoUsage::LINEAR),
        (
            GrallocUsage::HW_VIDEO_ENCODER,
            BoUsage::HW_VIDEO_ENCODER.union(BoUsage::SW_READ_OFTEN),
        ),
        (GrallocUsage::HW_CAMERA_WRITE, BoUsage::CAMERA_WRITE),
        (GrallocUsage::HW_CAMERA_READ, BoUsage::CAMERA_READ),
        (GrallocUsage::RENDERSCRIPT, BoUsage::RENDERSCRIPT),
        (GrallocUsage::VIDEO_DECODER, BoUsage::HW_VIDEO_DECODER),
        (GrallocUsage::FRONT_BUFFER, BoUsage::FRONT_RENDERING),
        (GrallocUsage::GPU_DATA_BUFFER, BoUsage::GPU_DATA_BUFFER),
    ];

    #[test]
    fn zero_is_none() {
        assert_eq!(translate_usage(GrallocUsage::empty()), BoUsage::NONE);
        assert_eq!(translate_usage_bits(0), 0);
    }

    #[test]
    fn single_bits() {
        for &(input, expected) in SINGLE_BITS {
            assert_eq!(translate_usage(input), expected, "{:?}", input);
        }
    }

    #[test]
    fn read_field_is_masked_equality() {
        assert_eq!(
            translate_usage(GrallocUsage::SW_READ_RARELY),
            BoUsage::SW_READ_RARELY
        );
        assert_eq!(
            translate_usage(GrallocUsage::SW_READ_OFTEN),
            BoUsage::SW_READ_OFTEN
        );
        //0x1 is not a defined field value, and 0x3 contains 0x2's bit but is OFTEN, not both
        assert_eq!(translate_usage_bits(0x1), 0);
        assert_eq!(
            translate_usage(GrallocUsage::from_bits_retain(0x3)),
            BoUsage::SW_READ_OFTEN
        );
        //a malformed field with extra bits matches neither
        assert_eq!(translate_usage_bits(0xB), 0);
    }

    #[test]
    fn write_field_is_masked_equality() {
        assert_eq!(
            translate_usage(GrallocUsage::SW_WRITE_RARELY),
            BoUsage::SW_WRITE_RARELY
        );
        assert_eq!(
            translate_usage(GrallocUsage::SW_WRITE_OFTEN),
            BoUsage::SW_WRITE_OFTEN
        );
        assert_eq!(translate_usage_bits(0x10), 0);
        assert_eq!(translate_usage_bits(0xF0), 0);
    }

    #[test]
    fn read_and_write_fields_are_independent() {
        let usage = GrallocUsage::SW_READ_RARELY | GrallocUsage::SW_WRITE_OFTEN;
        assert_eq!(
            translate_usage(usage),
            BoUsage::SW_READ_RARELY | BoUsage::SW_WRITE_OFTEN
        );
        assert_eq!(usage.sw_read(), GrallocUsage::SW_READ_RARELY);
        assert_eq!(usage.sw_write(), GrallocUsage::SW_WRITE_OFTEN);
    }

    #[test]
    fn union_of_disjoint_bits() {
        for &(a, _) in SINGLE_BITS {
            for &(b, _) in SINGLE_BITS {
                assert_eq!(
                    translate_usage(a | b),
                    translate_usage(a) | translate_usage(b),
                    "{:?} | {:?}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn unknown_bits_are_ignored() {
        let unknown = (1u64 << 23) | (1 << 40) | (1 << 63);
        assert_eq!(translate_usage_bits(unknown), 0);
        assert_eq!(
            translate_usage_bits(unknown | GrallocUsage::HW_TEXTURE.bits()),
            BoUsage::TEXTURE.bits()
        );
    }

    #[test]
    fn extension_bits_sit_above_stable_range() {
        assert_eq!(GrallocUsage::VIDEO_DECODER.bits(), 0x40_0000);
        assert_eq!(GrallocUsage::GPU_DATA_BUFFER.bits(), 0x100_0000);
        assert_eq!(GrallocUsage::FRONT_BUFFER.bits(), 0x1_0000_0000);
    }
}
