//! Encoder parameters and level presets.
//!
//! All knobs of the LZMA1 encoder live here. A parameter set is validated
//! once, synchronously, before the encoder allocates anything; every range
//! violation surfaces as [`OzmaError::ConfigOutOfRange`].

use ozma_core::error::{OzmaError, Result};

/// Smallest accepted dictionary size (4 KiB).
pub const DICT_SIZE_MIN: u32 = 1 << 12;
/// Largest accepted dictionary size (1 GiB).
pub const DICT_SIZE_MAX: u32 = 1 << 30;

/// Smallest accepted fast-bytes value.
pub const FB_MIN: u32 = 5;
/// Largest accepted fast-bytes value.
pub const FB_MAX: u32 = 273;

/// Largest accepted match-finder cycle count.
pub const MF_CYCLES_MAX: u32 = 1 << 30;

/// Match-finder topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Single-successor hash chains. Faster, lower match quality.
    HashChain,
    /// Hashed binary search trees (BT4). The default.
    #[default]
    BinTree,
}

/// Parser variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algo {
    /// Greedy single-step parser, no price tables.
    Fast,
    /// Price-based optimal parser. The default.
    #[default]
    Normal,
}

/// The full LZMA1 encoder parameter surface.
///
/// `Default` is the level-5 preset: 16 MiB dictionary, `lc=3 lp=0 pb=2`,
/// `fb=32`, binary-tree matcher, normal (optimal) parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzmaParams {
    /// Literal context bits (0..=8).
    pub lc: u32,
    /// Literal position bits (0..=4).
    pub lp: u32,
    /// Position bits for state context (0..=4).
    pub pb: u32,
    /// Fast bytes: match length at which the parser stops searching (5..=273).
    pub fb: u32,
    /// Sliding window size in bytes (4 KiB ..= 1 GiB).
    pub dict_size: u32,
    /// Binary-tree descent depth per position (1 ..= 2^30).
    pub mf_cycles: u32,
    /// Match-finder topology.
    pub mode: MatchMode,
    /// Parser variant.
    pub algo: Algo,
    /// Emit the distance-0xFFFFFFFF end marker when the stream finishes.
    pub write_end_mark: bool,
}

impl LzmaParams {
    /// Build the preset for a compression level (clamped to 0..=9).
    ///
    /// Levels 0-2 pair the hash-chain finder with the fast parser; levels
    /// 3-9 use binary trees and the optimal parser with growing
    /// dictionaries and fast-bytes cutoffs.
    pub fn from_level(level: u8) -> Self {
        let level = level.min(9) as usize;

        const DICT_SIZES: [u32; 10] = [
            1 << 16, // 0: 64 KiB
            1 << 20, // 1: 1 MiB
            1 << 21, // 2: 2 MiB
            1 << 22, // 3: 4 MiB
            1 << 23, // 4: 8 MiB
            1 << 24, // 5: 16 MiB
            1 << 25, // 6: 32 MiB
            1 << 25, // 7: 32 MiB
            1 << 26, // 8: 64 MiB
            1 << 26, // 9: 64 MiB
        ];
        const FAST_BYTES: [u32; 10] = [32, 32, 32, 32, 32, 32, 32, 64, 64, 273];

        let fb = FAST_BYTES[level];
        let (mode, algo) = if level < 3 {
            (MatchMode::HashChain, Algo::Fast)
        } else {
            (MatchMode::BinTree, Algo::Normal)
        };

        Self {
            lc: 3,
            lp: 0,
            pb: 2,
            fb,
            dict_size: DICT_SIZES[level],
            mf_cycles: 16 + fb / 2,
            mode,
            algo,
            write_end_mark: false,
        }
    }

    /// Check every parameter against its documented range.
    pub fn validate(&self) -> Result<()> {
        if self.lc > 8 {
            return Err(OzmaError::config_out_of_range("lc", self.lc as u64, 0, 8));
        }
        if self.lp > 4 {
            return Err(OzmaError::config_out_of_range("lp", self.lp as u64, 0, 4));
        }
        if self.pb > 4 {
            return Err(OzmaError::config_out_of_range("pb", self.pb as u64, 0, 4));
        }
        if self.fb < FB_MIN || self.fb > FB_MAX {
            return Err(OzmaError::config_out_of_range(
                "fb",
                self.fb as u64,
                FB_MIN as u64,
                FB_MAX as u64,
            ));
        }
        if self.dict_size < DICT_SIZE_MIN || self.dict_size > DICT_SIZE_MAX {
            return Err(OzmaError::config_out_of_range(
                "dict_size",
                self.dict_size as u64,
                DICT_SIZE_MIN as u64,
                DICT_SIZE_MAX as u64,
            ));
        }
        if self.mf_cycles == 0 || self.mf_cycles > MF_CYCLES_MAX {
            return Err(OzmaError::config_out_of_range(
                "mf_cycles",
                self.mf_cycles as u64,
                1,
                MF_CYCLES_MAX as u64,
            ));
        }
        Ok(())
    }

    /// Dictionary size as written into the stream header: the input value
    /// rounded up to the nearest `2^k` or `3·2^k`.
    pub fn header_dict_size(&self) -> u32 {
        for i in 11..=30 {
            if self.dict_size <= (2u32 << i) {
                return 2u32 << i;
            }
            if self.dict_size <= (3u32 << i) {
                return 3u32 << i;
            }
        }
        self.dict_size
    }
}

impl Default for LzmaParams {
    fn default() -> Self {
        Self::from_level(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_level_5() {
        let p = LzmaParams::default();
        assert_eq!(p.dict_size, 1 << 24);
        assert_eq!(p.fb, 32);
        assert_eq!(p.mf_cycles, 32);
        assert_eq!(p.mode, MatchMode::BinTree);
        assert_eq!(p.algo, Algo::Normal);
        assert_eq!((p.lc, p.lp, p.pb), (3, 0, 2));
    }

    #[test]
    fn test_level_clamp() {
        assert_eq!(LzmaParams::from_level(100), LzmaParams::from_level(9));
    }

    #[test]
    fn test_fast_levels_use_hash_chains() {
        for level in 0..3 {
            let p = LzmaParams::from_level(level);
            assert_eq!(p.mode, MatchMode::HashChain);
            assert_eq!(p.algo, Algo::Fast);
        }
    }

    #[test]
    fn test_validate_ranges() {
        let mut p = LzmaParams::default();
        assert!(p.validate().is_ok());

        p.lc = 9;
        assert!(matches!(
            p.validate(),
            Err(OzmaError::ConfigOutOfRange { param: "lc", .. })
        ));

        p = LzmaParams::default();
        p.fb = 4;
        assert!(p.validate().is_err());
        p.fb = 274;
        assert!(p.validate().is_err());

        p = LzmaParams::default();
        p.dict_size = 100;
        assert!(p.validate().is_err());

        p = LzmaParams::default();
        p.mf_cycles = 0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_header_dict_size_normalization() {
        let mut p = LzmaParams::default();
        p.dict_size = 1 << 24;
        assert_eq!(p.header_dict_size(), 1 << 24);

        // 5 MiB rounds up to 3 * 2^21 = 6 MiB
        p.dict_size = 5 << 20;
        assert_eq!(p.header_dict_size(), 3 << 21);

        // just above a power of two rounds to the 3*2^k step
        p.dict_size = (1 << 22) + 1;
        assert_eq!(p.header_dict_size(), 3 << 21);
    }
}
