//! Sliding-window match finder.
//!
//! The finder owns the input window and a flat index keyed on 2-, 3- and
//! 4-byte prefixes (CRC-derived hashes). In binary-tree mode each cyclic
//! slot anchors a binary search tree ordered by the window bytes; in
//! hash-chain mode a single-successor chain is kept instead. `get_matches`
//! reports, for the current position, the shortest-distance match of every
//! achievable length in strictly ascending length order, then advances the
//! cursor; `skip` advances and links without reporting.
//!
//! Positions stored in the index are global stream positions. 0 is the
//! "empty" sentinel; the entry for genuine position 0 is written as 0 and
//! is therefore indistinguishable from empty, which only costs that one
//! candidate. When `pos` approaches `u32::MAX` the whole index is
//! normalized downwards by a power-of-two-aligned subtrahend.

use crate::model::MATCH_LEN_MAX;
use crate::params::{LzmaParams, MatchMode};
use ozma_core::crc::CRC32_TABLE;

/// Positions below the look-ahead window of the optimal parser must stay
/// addressable behind the cursor.
pub const NUM_OPTS: u32 = 1 << 12;

const EMPTY_HASH_VALUE: u32 = 0;
const MAX_VAL_FOR_NORMALIZE: u32 = u32::MAX;
const NORMALIZE_STEP_MIN: u32 = 1 << 10;

const HASH2_SIZE: u32 = 1 << 10;
const HASH3_SIZE: u32 = 1 << 16;
const FIX_HASH3_OFFSET: u32 = HASH2_SIZE;
const FIX_HASH4_OFFSET: u32 = HASH2_SIZE + HASH3_SIZE;

/// One match candidate: `len` bytes at zero-based distance `dist`
/// (wire distance, i.e. `delta - 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Match length in bytes.
    pub len: u32,
    /// Zero-based distance.
    pub dist: u32,
}

/// Sliding-window match finder (BT4 or HC4).
pub struct MatchFinder {
    buf: Vec<u8>,
    /// Index of the current position inside `buf`.
    buf_pos: usize,

    pos: u32,
    pos_limit: u32,
    stream_pos: u32,
    len_limit: u32,

    cyclic_pos: u32,
    cyclic_size: u32,

    match_max_len: u32,
    hash: Vec<u32>,
    son: Vec<u32>,
    hash_mask: u32,
    cut_value: u32,

    block_size: usize,
    keep_size_before: u32,
    keep_size_after: u32,

    dict_size: u32,
    mode: MatchMode,

    at_stream_end: bool,
    need_more_input: bool,
}

impl MatchFinder {
    /// Allocate a finder for the given parameters. All memory is acquired
    /// here; nothing reallocates afterwards.
    pub fn new(params: &LzmaParams) -> Self {
        let cyclic_size = params.dict_size + 1;

        let keep_add_before = NUM_OPTS;
        let keep_add_after = MATCH_LEN_MAX;
        let keep_size_before = params.dict_size + keep_add_before + 1;
        let keep_size_after = MATCH_LEN_MAX + keep_add_after;
        let size_reserv = (params.dict_size >> 1)
            + (keep_add_before + MATCH_LEN_MAX + keep_add_after) / 2
            + (1 << 19);
        let block_size = (keep_size_before + keep_size_after + size_reserv) as usize;

        let hash_mask = (params.dict_size.next_power_of_two() - 1).clamp(0xFFFF, (1 << 24) - 1);
        let hashsum_size = (FIX_HASH4_OFFSET + hash_mask + 1) as usize;
        let sons_size = match params.mode {
            MatchMode::BinTree => cyclic_size as usize * 2,
            MatchMode::HashChain => cyclic_size as usize,
        };

        Self {
            buf: vec![0u8; block_size],
            buf_pos: 0,
            pos: 0,
            pos_limit: 0,
            stream_pos: 0,
            len_limit: 0,
            cyclic_pos: 0,
            cyclic_size,
            match_max_len: MATCH_LEN_MAX,
            hash: vec![EMPTY_HASH_VALUE; hashsum_size],
            son: vec![EMPTY_HASH_VALUE; sons_size],
            hash_mask,
            cut_value: params.mf_cycles,
            block_size,
            keep_size_before,
            keep_size_after,
            dict_size: params.dict_size,
            mode: params.mode,
            at_stream_end: false,
            need_more_input: true,
        }
    }

    /// Bytes between the cursor and the stream fill position.
    #[inline]
    pub fn available_bytes(&self) -> u32 {
        self.stream_pos - self.pos
    }

    /// Whether the caller signalled end of input.
    pub fn at_stream_end(&self) -> bool {
        self.at_stream_end
    }

    /// Whether the window wants more input before encoding resumes.
    pub fn need_more_input(&self) -> bool {
        self.need_more_input
    }

    /// The window buffer. Bytes behind [`Self::cursor`] are history.
    #[inline]
    pub fn window(&self) -> &[u8] {
        &self.buf
    }

    /// Index of the next position to encode inside [`Self::window`].
    #[inline]
    pub fn cursor(&self) -> usize {
        self.buf_pos
    }

    /// Append input to the window, compacting first when the tail margin
    /// ran out. An empty `src` marks end of stream. Returns the number of
    /// bytes consumed.
    pub fn read_block(&mut self, src: &[u8]) -> usize {
        if src.is_empty() {
            self.at_stream_end = true;
            self.set_limits();
            return 0;
        }

        if self.block_size - self.buf_pos <= self.keep_size_after as usize
            && self.buf_pos >= self.keep_size_before as usize
        {
            self.move_block();
        }

        let mut consumed = 0usize;
        loop {
            let dest = self.buf_pos + (self.stream_pos - self.pos) as usize;
            let dest_size = self.block_size - dest;
            if dest_size == 0 {
                self.need_more_input = false;
                break;
            }

            let n = (src.len() - consumed).min(dest_size);
            self.buf[dest..dest + n].copy_from_slice(&src[consumed..consumed + n]);
            consumed += n;
            self.stream_pos += n as u32;

            if consumed == src.len() {
                self.need_more_input = true;
                break;
            }
            if self.stream_pos - self.pos > self.keep_size_after {
                self.need_more_input = false;
                break;
            }
        }
        self.set_limits();
        consumed
    }

    /// Slide the live bytes to the front of the allocation.
    fn move_block(&mut self) {
        let keep = self.keep_size_before as usize;
        let src_start = self.buf_pos - keep;
        let live = (self.stream_pos - self.pos) as usize + keep;
        self.buf.copy_within(src_start..src_start + live, 0);
        self.buf_pos = keep;
    }

    fn set_limits(&mut self) {
        let mut limit = MAX_VAL_FOR_NORMALIZE - self.pos;
        limit = limit.min(self.cyclic_size - self.cyclic_pos);

        let avail = self.stream_pos - self.pos;
        let mut limit2 = avail;
        if limit2 <= self.keep_size_after {
            if limit2 > 0 {
                limit2 -= 1;
            }
        } else {
            limit2 -= self.keep_size_after;
        }
        limit = limit.min(limit2);

        self.len_limit = avail.min(self.match_max_len);
        self.pos_limit = self.pos + limit;
    }

    fn check_limits(&mut self) {
        if self.pos == MAX_VAL_FOR_NORMALIZE {
            self.normalize();
        }
        if !self.at_stream_end && self.stream_pos - self.pos == self.keep_size_after {
            self.need_more_input = true;
        }
        if self.cyclic_pos == self.cyclic_size {
            self.cyclic_pos = 0;
        }
        self.set_limits();
    }

    fn sub_value(&self) -> u32 {
        (self.pos - self.dict_size - 1) & !(NORMALIZE_STEP_MIN - 1)
    }

    /// Reduce every stored position by a power-of-two-aligned subtrahend;
    /// entries at or below it become the empty sentinel.
    fn normalize(&mut self) {
        let sub = self.sub_value();
        for value in self.hash.iter_mut().chain(self.son.iter_mut()) {
            *value = if *value <= sub {
                EMPTY_HASH_VALUE
            } else {
                *value - sub
            };
        }
        self.pos_limit -= sub;
        self.pos -= sub;
        self.stream_pos -= sub;
    }

    #[inline]
    fn move_pos(&mut self) {
        self.cyclic_pos += 1;
        self.buf_pos += 1;
        self.pos += 1;
        if self.pos == self.pos_limit {
            self.check_limits();
        }
    }

    #[inline]
    fn hash_values(&self, cur: usize) -> (usize, usize, usize) {
        let b = &self.buf;
        let t = CRC32_TABLE[b[cur] as usize] ^ b[cur + 1] as u32;
        let h2 = t & (HASH2_SIZE - 1);
        let h3 = (t ^ ((b[cur + 2] as u32) << 8)) & (HASH3_SIZE - 1);
        let h4 =
            (t ^ ((b[cur + 2] as u32) << 8) ^ (CRC32_TABLE[b[cur + 3] as usize] << 5)) & self.hash_mask;
        (
            h2 as usize,
            (FIX_HASH3_OFFSET + h3) as usize,
            (FIX_HASH4_OFFSET + h4) as usize,
        )
    }

    /// Index of the son pair for the slot `delta` steps behind the cursor.
    #[inline]
    fn pair_index(&self, delta: u32) -> usize {
        let slot = if delta > self.cyclic_pos {
            self.cyclic_pos + self.cyclic_size - delta
        } else {
            self.cyclic_pos - delta
        };
        (slot << 1) as usize
    }

    /// Collect the matches at the current position into `out` (ascending
    /// length, shortest distance per length) and advance the cursor.
    pub fn get_matches(&mut self, out: &mut Vec<Match>) {
        out.clear();
        match self.mode {
            MatchMode::BinTree => self.bt4_get_matches(out),
            MatchMode::HashChain => self.hc4_get_matches(out),
        }
    }

    /// Advance `num` positions, linking the index but discarding matches.
    pub fn skip(&mut self, num: u32) {
        match self.mode {
            MatchMode::BinTree => self.bt4_skip(num),
            MatchMode::HashChain => self.hc4_skip(num),
        }
    }

    fn bt4_get_matches(&mut self, out: &mut Vec<Match>) {
        let len_limit = self.len_limit.min(self.available_bytes());
        if len_limit < 4 {
            self.move_pos();
            return;
        }

        let cur = self.buf_pos;
        let pos = self.pos;
        if pos == 0 {
            // Nothing behind the first position; its index entry would be
            // the empty sentinel anyway.
            self.move_pos();
            return;
        }
        let (h2, h3, h4) = self.hash_values(cur);

        let mut delta2 = pos - self.hash[h2];
        let delta3 = pos - self.hash[h3];
        let cur_match = self.hash[h4];
        self.hash[h2] = pos;
        self.hash[h3] = pos;
        self.hash[h4] = pos;

        let mut max_len = 1u32;

        if delta2 < self.cyclic_size && self.buf[cur - delta2 as usize] == self.buf[cur] {
            max_len = 2;
            out.push(Match {
                len: 2,
                dist: delta2 - 1,
            });
        }
        if delta2 != delta3 && delta3 < self.cyclic_size && self.buf[cur - delta3 as usize] == self.buf[cur]
        {
            max_len = 3;
            out.push(Match {
                len: 3,
                dist: delta3 - 1,
            });
            delta2 = delta3;
        }

        if !out.is_empty() {
            while max_len != len_limit
                && self.buf[cur + max_len as usize - delta2 as usize] == self.buf[cur + max_len as usize]
            {
                max_len += 1;
            }
            out.last_mut().unwrap().len = max_len;
            if max_len == len_limit {
                self.skip_matches_spec(len_limit, cur_match);
                self.move_pos();
                return;
            }
        }

        if max_len < 3 {
            max_len = 3;
        }

        self.get_matches_spec(len_limit, cur_match, max_len, out);
        self.move_pos();
    }

    /// BT descent from `cur_match`: report every new longest match and
    /// re-link the current slot as the tree root.
    fn get_matches_spec(&mut self, len_limit: u32, cur_match: u32, max_len: u32, out: &mut Vec<Match>) {
        let mut ptr0 = (self.cyclic_pos << 1) as usize + 1;
        let mut ptr1 = (self.cyclic_pos << 1) as usize;
        let mut len0 = 0u32;
        let mut len1 = 0u32;
        let mut cut = self.cut_value;
        let mut cur_match = cur_match;
        let mut max_len = max_len;
        let cur = self.buf_pos;
        let pos = self.pos;

        loop {
            let delta = pos - cur_match;
            if cut == 0 || delta >= self.cyclic_size {
                self.son[ptr0] = EMPTY_HASH_VALUE;
                self.son[ptr1] = EMPTY_HASH_VALUE;
                return;
            }
            cut -= 1;

            let pair = self.pair_index(delta);
            let pb = cur - delta as usize;
            let mut len = len0.min(len1);

            if self.buf[pb + len as usize] == self.buf[cur + len as usize] {
                len += 1;
                while len != len_limit && self.buf[pb + len as usize] == self.buf[cur + len as usize] {
                    len += 1;
                }
                if max_len < len {
                    max_len = len;
                    out.push(Match {
                        len,
                        dist: delta - 1,
                    });
                    if len == len_limit {
                        self.son[ptr1] = self.son[pair];
                        self.son[ptr0] = self.son[pair + 1];
                        return;
                    }
                }
            }

            if self.buf[pb + len as usize] < self.buf[cur + len as usize] {
                self.son[ptr1] = cur_match;
                ptr1 = pair + 1;
                cur_match = self.son[ptr1];
                len1 = len;
            } else {
                self.son[ptr0] = cur_match;
                ptr0 = pair;
                cur_match = self.son[ptr0];
                len0 = len;
            }
        }
    }

    /// Same descent as [`Self::get_matches_spec`] but lengths are thrown
    /// away.
    fn skip_matches_spec(&mut self, len_limit: u32, cur_match: u32) {
        let mut ptr0 = (self.cyclic_pos << 1) as usize + 1;
        let mut ptr1 = (self.cyclic_pos << 1) as usize;
        let mut len0 = 0u32;
        let mut len1 = 0u32;
        let mut cut = self.cut_value;
        let mut cur_match = cur_match;
        let cur = self.buf_pos;
        let pos = self.pos;

        loop {
            let delta = pos - cur_match;
            if cut == 0 || delta >= self.cyclic_size {
                self.son[ptr0] = EMPTY_HASH_VALUE;
                self.son[ptr1] = EMPTY_HASH_VALUE;
                return;
            }
            cut -= 1;

            let pair = self.pair_index(delta);
            let pb = cur - delta as usize;
            let mut len = len0.min(len1);

            if self.buf[pb + len as usize] == self.buf[cur + len as usize] {
                len += 1;
                while len != len_limit && self.buf[pb + len as usize] == self.buf[cur + len as usize] {
                    len += 1;
                }
                if len == len_limit {
                    self.son[ptr1] = self.son[pair];
                    self.son[ptr0] = self.son[pair + 1];
                    return;
                }
            }

            if self.buf[pb + len as usize] < self.buf[cur + len as usize] {
                self.son[ptr1] = cur_match;
                ptr1 = pair + 1;
                cur_match = self.son[ptr1];
                len1 = len;
            } else {
                self.son[ptr0] = cur_match;
                ptr0 = pair;
                cur_match = self.son[ptr0];
                len0 = len;
            }
        }
    }

    fn bt4_skip(&mut self, num: u32) {
        for _ in 0..num {
            let len_limit = self.len_limit.min(self.available_bytes());
            if len_limit < 4 {
                self.move_pos();
                continue;
            }
            let cur = self.buf_pos;
            let pos = self.pos;
            if pos == 0 {
                self.move_pos();
                continue;
            }
            let (h2, h3, h4) = self.hash_values(cur);
            let cur_match = self.hash[h4];
            self.hash[h2] = pos;
            self.hash[h3] = pos;
            self.hash[h4] = pos;
            self.skip_matches_spec(len_limit, cur_match);
            self.move_pos();
        }
    }

    fn hc4_get_matches(&mut self, out: &mut Vec<Match>) {
        let len_limit = self.len_limit.min(self.available_bytes());
        if len_limit < 4 {
            self.move_pos();
            return;
        }

        let cur = self.buf_pos;
        let pos = self.pos;
        if pos == 0 {
            self.move_pos();
            return;
        }
        let (h2, h3, h4) = self.hash_values(cur);

        let mut delta2 = pos - self.hash[h2];
        let delta3 = pos - self.hash[h3];
        let cur_match = self.hash[h4];
        self.hash[h2] = pos;
        self.hash[h3] = pos;
        self.hash[h4] = pos;

        let mut max_len = 1u32;

        if delta2 < self.cyclic_size && self.buf[cur - delta2 as usize] == self.buf[cur] {
            max_len = 2;
            out.push(Match {
                len: 2,
                dist: delta2 - 1,
            });
        }
        if delta2 != delta3 && delta3 < self.cyclic_size && self.buf[cur - delta3 as usize] == self.buf[cur]
        {
            max_len = 3;
            out.push(Match {
                len: 3,
                dist: delta3 - 1,
            });
            delta2 = delta3;
        }

        if !out.is_empty() {
            while max_len != len_limit
                && self.buf[cur + max_len as usize - delta2 as usize] == self.buf[cur + max_len as usize]
            {
                max_len += 1;
            }
            out.last_mut().unwrap().len = max_len;
            if max_len == len_limit {
                self.son[self.cyclic_pos as usize] = cur_match;
                self.move_pos();
                return;
            }
        }

        if max_len < 3 {
            max_len = 3;
        }

        self.hc_get_matches_spec(len_limit, cur_match, max_len, out);
        self.move_pos();
    }

    /// Walk the single-successor chain, reporting strictly longer matches.
    fn hc_get_matches_spec(&mut self, len_limit: u32, cur_match: u32, max_len: u32, out: &mut Vec<Match>) {
        self.son[self.cyclic_pos as usize] = cur_match;
        let mut cur_match = cur_match;
        let mut max_len = max_len;
        let mut cut = self.cut_value;
        let cur = self.buf_pos;
        let pos = self.pos;

        loop {
            let delta = pos - cur_match;
            if cut == 0 || delta >= self.cyclic_size {
                return;
            }
            cut -= 1;

            let pb = cur - delta as usize;
            let slot = if delta > self.cyclic_pos {
                self.cyclic_pos + self.cyclic_size - delta
            } else {
                self.cyclic_pos - delta
            };
            cur_match = self.son[slot as usize];

            if self.buf[pb + max_len as usize] == self.buf[cur + max_len as usize]
                && self.buf[pb] == self.buf[cur]
            {
                let mut len = 1u32;
                while len != len_limit && self.buf[pb + len as usize] == self.buf[cur + len as usize] {
                    len += 1;
                }
                if max_len < len {
                    max_len = len;
                    out.push(Match {
                        len,
                        dist: delta - 1,
                    });
                    if len == len_limit {
                        return;
                    }
                }
            }
        }
    }

    fn hc4_skip(&mut self, num: u32) {
        for _ in 0..num {
            let len_limit = self.len_limit.min(self.available_bytes());
            if len_limit < 4 {
                self.move_pos();
                continue;
            }
            let cur = self.buf_pos;
            let pos = self.pos;
            if pos == 0 {
                self.move_pos();
                continue;
            }
            let (h2, h3, h4) = self.hash_values(cur);
            let cur_match = self.hash[h4];
            self.hash[h2] = pos;
            self.hash[h3] = pos;
            self.hash[h4] = pos;
            self.son[self.cyclic_pos as usize] = cur_match;
            self.move_pos();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::LzmaParams;

    fn small_params(mode: MatchMode) -> LzmaParams {
        let mut p = LzmaParams::default();
        p.dict_size = 1 << 12;
        p.mode = mode;
        p
    }

    fn finder_with(data: &[u8], mode: MatchMode) -> MatchFinder {
        let mut mf = MatchFinder::new(&small_params(mode));
        assert_eq!(mf.read_block(data), data.len());
        mf.read_block(&[]);
        mf
    }

    #[test]
    fn test_no_matches_in_fresh_window() {
        let mut mf = finder_with(b"abcdefgh", MatchMode::BinTree);
        let mut out = Vec::new();
        mf.get_matches(&mut out);
        assert!(out.is_empty());
        assert_eq!(mf.available_bytes(), 7);
    }

    #[test]
    fn test_finds_repeated_run() {
        // "abcdabcd...": at position 4 there is a distance-4 match
        let data = b"abcdabcdabcdabcd";
        let mut mf = finder_with(data, MatchMode::BinTree);
        let mut out = Vec::new();
        mf.get_matches(&mut out); // pos 0
        mf.skip(3); // pos 1..3
        mf.get_matches(&mut out); // pos 4
        let best = out.last().expect("match at period boundary");
        assert_eq!(best.dist, 3);
        assert_eq!(best.len, 12);
    }

    #[test]
    fn test_matches_sorted_ascending_and_unique() {
        let data = b"xyxy__xyxyxy__xyxyxy";
        let mut mf = finder_with(data, MatchMode::BinTree);
        let mut out = Vec::new();
        for _ in 0..data.len() - 1 {
            mf.get_matches(&mut out);
            for pair in out.windows(2) {
                assert!(pair[0].len < pair[1].len, "lengths not ascending: {out:?}");
            }
        }
    }

    #[test]
    fn test_hash_chain_agrees_on_best_length() {
        let data = b"the quick brown fox the quick brown fox the quick";
        let mut bt = finder_with(data, MatchMode::BinTree);
        let mut hc = finder_with(data, MatchMode::HashChain);
        let mut out_bt = Vec::new();
        let mut out_hc = Vec::new();
        for _ in 0..data.len() - 4 {
            bt.get_matches(&mut out_bt);
            hc.get_matches(&mut out_hc);
            // the chain walker must find the same longest length here
            assert_eq!(
                out_bt.last().map(|m| m.len),
                out_hc.last().map(|m| m.len),
            );
        }
    }

    #[test]
    fn test_skip_advances_cursor_exactly() {
        let data = vec![7u8; 600];
        let mut mf = finder_with(&data, MatchMode::BinTree);
        let before = mf.available_bytes();
        mf.skip(250);
        assert_eq!(mf.available_bytes(), before - 250);
        assert_eq!(mf.pos, 250);
        assert_eq!(mf.cursor(), 250);
    }

    #[test]
    fn test_len_limit_caps_reported_length() {
        let data = vec![0u8; 4096];
        let mut mf = finder_with(&data, MatchMode::BinTree);
        let mut out = Vec::new();
        mf.get_matches(&mut out);
        mf.get_matches(&mut out);
        let best = out.last().unwrap();
        assert!(best.len <= MATCH_LEN_MAX);
        assert_eq!(best.len, mf.match_max_len);
    }

    #[test]
    fn test_chunked_fill_equals_single_fill() {
        let data: Vec<u8> = (0..2000u32).map(|i| (i * 31 % 251) as u8).collect();
        let mut a = MatchFinder::new(&small_params(MatchMode::BinTree));
        assert_eq!(a.read_block(&data), data.len());
        a.read_block(&[]);

        let mut b = MatchFinder::new(&small_params(MatchMode::BinTree));
        for chunk in data.chunks(7) {
            assert_eq!(b.read_block(chunk), chunk.len());
        }
        b.read_block(&[]);

        let mut out_a = Vec::new();
        let mut out_b = Vec::new();
        for _ in 0..data.len() - 4 {
            a.get_matches(&mut out_a);
            b.get_matches(&mut out_b);
            assert_eq!(out_a, out_b);
        }
    }

    #[test]
    fn test_normalize_clears_stale_positions() {
        let mut mf = finder_with(b"abcdefghabcdefgh", MatchMode::BinTree);
        mf.skip(8);

        // Force the cursor into normalization territory. Every field that
        // holds a global position is lifted by the same amount, which is
        // exactly the state a 4 GiB stream would reach.
        let lift = MAX_VAL_FOR_NORMALIZE - 16 - mf.pos;
        mf.pos += lift;
        mf.stream_pos += lift;
        mf.pos_limit += lift;
        for v in mf.hash.iter_mut().chain(mf.son.iter_mut()) {
            if *v != EMPTY_HASH_VALUE {
                *v += lift;
            }
        }
        // Plant one entry old enough to fall below the subtrahend.
        mf.hash[0] = 3;

        let pos_before = mf.pos;
        let sub = mf.sub_value();
        assert!(sub > 0);
        assert_eq!(sub & (NORMALIZE_STEP_MIN - 1), 0);

        mf.normalize();

        assert_eq!(mf.pos, pos_before - sub);
        assert_eq!(mf.stream_pos - mf.pos, 8);
        assert_eq!(mf.hash[0], EMPTY_HASH_VALUE);
        for &v in mf.hash.iter().chain(mf.son.iter()) {
            assert!(
                v == EMPTY_HASH_VALUE || v > mf.pos - mf.cyclic_size.min(mf.pos),
                "stale position {v} survived normalization (pos {})",
                mf.pos
            );
        }
    }

    #[test]
    fn test_compaction_preserves_match_bytes() {
        // Drive the window far enough that move_block must fire, then
        // check matches still resolve against the compacted history.
        let mut p = small_params(MatchMode::BinTree);
        p.dict_size = 1 << 12;
        let mut mf = MatchFinder::new(&p);

        let pattern: Vec<u8> = (0..256u32).map(|i| (i % 256) as u8).collect();
        let mut fed = 0usize;
        let total = mf.block_size * 2 + 1024;
        let mut out = Vec::new();
        while fed < total {
            let n = mf.read_block(&pattern);
            fed += n;
            if n == 0 || !mf.need_more_input() {
                // drain some positions so the window can slide
                for _ in 0..1024 {
                    if mf.available_bytes() == 0 {
                        break;
                    }
                    mf.get_matches(&mut out);
                }
            }
        }
        // period-256 data: the finder keeps seeing distance-255 matches
        mf.get_matches(&mut out);
        assert!(out.iter().any(|m| m.dist == 255), "matches: {out:?}");
    }
}
