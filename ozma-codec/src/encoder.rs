//! LZMA1 streaming encoder.
//!
//! [`LzmaEncoder`] exposes one non-blocking operation: [`LzmaEncoder::encode`]
//! consumes as much input as the sliding window accepts, emits as much
//! encoded output as the destination holds, and reports both counts. The
//! paged queue inside the range coder absorbs whatever the destination
//! could not take, so no symbol emission ever stalls.
//!
//! Symbol selection runs through one of two parsers: the greedy fast parser
//! in this module, or the price-driven optimal parser in [`crate::optimal`].

use crate::match_finder::{Match, MatchFinder};
use crate::model::{
    ALIGN_MASK, ALIGN_TABLE_SIZE, DIST_SLOTS, DIST_TABLE_SIZE_MAX, END_POS_MODEL_INDEX,
    LiteralCoder, LzmaProps, LenPriceEncoder, MATCH_LEN_MAX, MATCH_LEN_MIN, NUM_ALIGN_BITS,
    NUM_FULL_DISTANCES, NUM_LEN_TO_POS_STATES, NUM_PB_STATES_MAX, NUM_POS_SLOT_BITS, NUM_REPS,
    NUM_STATES, PROB_INIT, START_POS_MODEL_INDEX, State, dist_slot, len_to_pos_state,
};
use crate::optimal::Optimal;
use crate::params::{Algo, LzmaParams};
use crate::range_coder::RangeEncoder;
use ozma_core::error::{OzmaError, Result};

/// Size of the LZMA1 container header: property byte, dictionary size,
/// uncompressed size.
pub const HEADER_SIZE: usize = 13;

/// Outcome of one [`LzmaEncoder::encode`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    /// Input bytes consumed from `src`.
    pub consumed: usize,
    /// Output bytes written to `dst`.
    pub produced: usize,
}

impl Progress {
    /// Whether the call moved the stream forward at all.
    pub fn any(&self) -> bool {
        self.consumed > 0 || self.produced > 0
    }
}

/// Longest common prefix of `buf[a..]` and `buf[b..]`, bounded by `limit`.
/// With `start == 0` the first two bytes gate the comparison and a miss
/// returns 0; otherwise extension resumes from `start`.
pub(crate) fn match_len(buf: &[u8], a: usize, b: usize, limit: u32, start: u32) -> u32 {
    let mut len = if start == 0 {
        if buf[a] != buf[b] || buf[a + 1] != buf[b + 1] {
            return 0;
        }
        2
    } else {
        start
    };
    while len < limit && buf[a + len as usize] == buf[b + len as usize] {
        len += 1;
    }
    len
}

/// Distance-cost heuristic of the fast parser: a match is worth replacing
/// only when the alternative distance is at least 128 times smaller.
#[inline]
pub(crate) fn change_pair(small_dist: u32, big_dist: u32) -> bool {
    (big_dist >> 7) > small_dist
}

/// LZMA1 encoder.
pub struct LzmaEncoder {
    pub(crate) params: LzmaParams,
    props: LzmaProps,
    pub(crate) mf: MatchFinder,
    pub(crate) rc: RangeEncoder,

    pub(crate) state: State,
    pub(crate) reps: [u32; NUM_REPS],

    pub(crate) is_match: [[u16; NUM_PB_STATES_MAX]; NUM_STATES],
    pub(crate) is_rep: [u16; NUM_STATES],
    pub(crate) is_rep_g0: [u16; NUM_STATES],
    pub(crate) is_rep_g1: [u16; NUM_STATES],
    pub(crate) is_rep_g2: [u16; NUM_STATES],
    pub(crate) is_rep0_long: [[u16; NUM_PB_STATES_MAX]; NUM_STATES],

    pub(crate) pos_slot_encoder: [[u16; DIST_SLOTS]; NUM_LEN_TO_POS_STATES],
    pub(crate) pos_encoders: [u16; (NUM_FULL_DISTANCES - END_POS_MODEL_INDEX) as usize],
    pub(crate) pos_align_encoder: [u16; ALIGN_TABLE_SIZE],

    pub(crate) literal: LiteralCoder,
    pub(crate) len_enc: LenPriceEncoder,
    pub(crate) rep_len_enc: LenPriceEncoder,

    pub(crate) pos_slot_prices: [[u32; DIST_TABLE_SIZE_MAX]; NUM_LEN_TO_POS_STATES],
    pub(crate) distances_prices: [[u32; NUM_FULL_DISTANCES as usize]; NUM_LEN_TO_POS_STATES],
    pub(crate) align_prices: [u32; ALIGN_TABLE_SIZE],
    pub(crate) align_price_count: u32,
    pub(crate) match_price_count: u32,
    pub(crate) dist_table_size: u32,

    pub(crate) opt: Vec<Optimal>,
    pub(crate) optimum_end_index: u32,
    pub(crate) optimum_current_index: u32,
    pub(crate) longest_match_len: u32,
    pub(crate) num_pairs: usize,
    pub(crate) matches: Vec<Match>,
    pub(crate) num_avail: u32,
    pub(crate) additional_offset: u32,

    pub(crate) pb_mask: u32,
    pub(crate) fast_mode: bool,
    pub(crate) num_fast_bytes: u32,

    header_written: bool,
    uncompressed_size: Option<u64>,
    write_end_mark: bool,
    marker_written: bool,
    cur_pos64: u64,
}

impl LzmaEncoder {
    /// Construct an encoder. Parameters are validated before anything is
    /// allocated. `uncompressed_size` goes into the header verbatim;
    /// `None` writes the all-ones "unknown" marker and turns the explicit
    /// end marker on.
    pub fn new(params: LzmaParams, uncompressed_size: Option<u64>) -> Result<Self> {
        params.validate()?;

        let props = LzmaProps::new(params.lc, params.lp, params.pb);
        let table_size = params.fb + 1 - MATCH_LEN_MIN;

        let mut log = 0u32;
        while (params.dict_size as u64) > (1u64 << log) {
            log += 1;
        }
        let dist_table_size = log * 2;

        let mut enc = Self {
            props,
            mf: MatchFinder::new(&params),
            rc: RangeEncoder::new(),
            state: State::new(),
            reps: [0; NUM_REPS],
            is_match: [[PROB_INIT; NUM_PB_STATES_MAX]; NUM_STATES],
            is_rep: [PROB_INIT; NUM_STATES],
            is_rep_g0: [PROB_INIT; NUM_STATES],
            is_rep_g1: [PROB_INIT; NUM_STATES],
            is_rep_g2: [PROB_INIT; NUM_STATES],
            is_rep0_long: [[PROB_INIT; NUM_PB_STATES_MAX]; NUM_STATES],
            pos_slot_encoder: [[PROB_INIT; DIST_SLOTS]; NUM_LEN_TO_POS_STATES],
            pos_encoders: [PROB_INIT; (NUM_FULL_DISTANCES - END_POS_MODEL_INDEX) as usize],
            pos_align_encoder: [PROB_INIT; ALIGN_TABLE_SIZE],
            literal: LiteralCoder::new(params.lc, params.lp),
            len_enc: LenPriceEncoder::new(table_size),
            rep_len_enc: LenPriceEncoder::new(table_size),
            pos_slot_prices: [[0; DIST_TABLE_SIZE_MAX]; NUM_LEN_TO_POS_STATES],
            distances_prices: [[0; NUM_FULL_DISTANCES as usize]; NUM_LEN_TO_POS_STATES],
            align_prices: [0; ALIGN_TABLE_SIZE],
            align_price_count: 0,
            match_price_count: 0,
            dist_table_size,
            opt: vec![Optimal::default(); crate::match_finder::NUM_OPTS as usize],
            optimum_end_index: 0,
            optimum_current_index: 0,
            longest_match_len: 0,
            num_pairs: 0,
            matches: Vec::with_capacity(MATCH_LEN_MAX as usize + 1),
            num_avail: 0,
            additional_offset: 0,
            pb_mask: props.pb_mask(),
            fast_mode: params.algo == Algo::Fast,
            num_fast_bytes: params.fb,
            header_written: false,
            uncompressed_size,
            write_end_mark: params.write_end_mark || uncompressed_size.is_none(),
            marker_written: false,
            cur_pos64: 0,
            params,
        };

        if !enc.fast_mode {
            enc.fill_distances_prices();
            enc.fill_align_prices();
        }
        enc.len_enc.update_tables(1 << enc.params.pb);
        enc.rep_len_enc.update_tables(1 << enc.params.pb);

        Ok(enc)
    }

    /// The properties that went into the stream header.
    pub fn props(&self) -> LzmaProps {
        self.props
    }

    /// Total uncompressed bytes encoded so far.
    pub fn total_in(&self) -> u64 {
        self.cur_pos64
    }

    /// Whether the stream is complete: end of input seen, range coder
    /// flushed, and every queued byte handed to the caller.
    pub fn is_finished(&self) -> bool {
        self.header_written
            && self.mf.at_stream_end()
            && self.rc.is_flushed()
            && self.rc.pending() == 0
    }

    /// Feed `src` and collect output into `dst`. Never blocks: either some
    /// input is consumed, some output is produced, or the stream is done.
    ///
    /// Passing an empty `src` signals end of input; keep calling with an
    /// empty `src` until [`Self::is_finished`] to collect the tail.
    pub fn encode(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Progress> {
        let mut produced = 0usize;

        if !self.header_written {
            if dst.len() < HEADER_SIZE {
                return Err(OzmaError::output_buffer_too_small(HEADER_SIZE, dst.len()));
            }
            dst[0] = self.props.to_byte();
            dst[1..5].copy_from_slice(&self.params.header_dict_size().to_le_bytes());
            dst[5..13].copy_from_slice(&self.uncompressed_size.unwrap_or(u64::MAX).to_le_bytes());
            produced = HEADER_SIZE;
            self.header_written = true;
        }

        let consumed = self.mf.read_block(src);

        if self.mf.at_stream_end() || !self.mf.need_more_input() {
            self.encode_block();
        }

        produced += self.rc.drain(&mut dst[produced..]);
        Ok(Progress { consumed, produced })
    }

    /// Read the match list at the cursor and advance it; returns the
    /// longest reported length (extended by direct compare when it hit the
    /// fast-bytes cutoff) and the number of pairs.
    pub(crate) fn read_match_distances(&mut self) -> (u32, usize) {
        self.num_avail = self.mf.available_bytes();
        self.mf.get_matches(&mut self.matches);
        let num_pairs = self.matches.len();

        let mut len_res = 0u32;
        if num_pairs > 0 {
            len_res = self.matches[num_pairs - 1].len;
            if len_res == self.num_fast_bytes {
                let num_avail = self.num_avail.min(MATCH_LEN_MAX);
                let buf = self.mf.window();
                let cur = self.mf.cursor() - 1;
                let other = cur - (self.matches[num_pairs - 1].dist as usize + 1);
                while len_res < num_avail
                    && buf[cur + len_res as usize] == buf[other + len_res as usize]
                {
                    len_res += 1;
                }
            }
        }
        self.additional_offset += 1;
        (len_res, num_pairs)
    }

    /// Advance the cursor `num` positions, keeping the index linked.
    pub(crate) fn move_pos_n(&mut self, num: u32) {
        if num != 0 {
            self.additional_offset += num;
            self.mf.skip(num);
        }
    }

    /// Greedy parser: prefer the longest rep when it is close enough to
    /// the main match under the [`change_pair`] heuristic, defer by one
    /// literal when the next position promises a clearly better match.
    /// Returns `(len, back)` with the same conventions as the optimal
    /// parser: `back == u32::MAX` is a literal, `back < 4` a rep index,
    /// anything else `distance + 4`.
    pub(crate) fn get_optimum_fast(&mut self) -> (u32, u32) {
        let (mut main_len, mut num_pairs) = if self.additional_offset == 0 {
            self.read_match_distances()
        } else {
            (self.longest_match_len, self.num_pairs)
        };

        let mut num_avail = self.num_avail;
        if num_avail < 2 {
            return (1, u32::MAX);
        }
        if num_avail > MATCH_LEN_MAX {
            num_avail = MATCH_LEN_MAX;
        }

        let mut rep_len = 0u32;
        let mut rep_index = 0usize;
        let mut immediate = None;
        {
            let buf = self.mf.window();
            let data = self.mf.cursor() - 1;
            for (i, &rep) in self.reps.iter().enumerate() {
                let data2 = data - (rep as usize + 1);
                let len = match_len(buf, data, data2, num_avail, 0);
                if len >= self.num_fast_bytes {
                    immediate = Some((len, i as u32));
                    break;
                }
                if len > rep_len {
                    rep_index = i;
                    rep_len = len;
                }
            }
        }
        if let Some((len, back)) = immediate {
            self.move_pos_n(len - 1);
            return (len, back);
        }

        if main_len >= self.num_fast_bytes {
            let back = self.matches[num_pairs - 1].dist + NUM_REPS as u32;
            self.move_pos_n(main_len - 1);
            return (main_len, back);
        }

        let mut main_dist = 0u32;
        if main_len >= 2 {
            main_dist = self.matches[num_pairs - 1].dist;
            while num_pairs > 1 && main_len == self.matches[num_pairs - 2].len + 1 {
                if !change_pair(self.matches[num_pairs - 2].dist, main_dist) {
                    break;
                }
                num_pairs -= 1;
                main_len = self.matches[num_pairs - 1].len;
                main_dist = self.matches[num_pairs - 1].dist;
            }
            if main_len == 2 && main_dist >= 0x80 {
                main_len = 1;
            }
        }

        if rep_len >= 2
            && (rep_len + 1 >= main_len
                || (rep_len + 2 >= main_len && main_dist >= (1 << 9))
                || (rep_len + 3 >= main_len && main_dist >= (1 << 25)))
        {
            self.move_pos_n(rep_len - 1);
            return (rep_len, rep_index as u32);
        }

        if main_len < 2 || num_avail <= 2 {
            return (1, u32::MAX);
        }

        // Peek one position ahead; a better match there demotes this one
        // to a literal.
        let (next_len, next_pairs) = self.read_match_distances();
        self.longest_match_len = next_len;
        self.num_pairs = next_pairs;
        if next_len >= 2 {
            let new_dist = self.matches[next_pairs - 1].dist;
            if (next_len >= main_len && new_dist < main_dist)
                || (next_len == main_len + 1 && !change_pair(main_dist, new_dist))
                || (next_len > main_len + 1)
                || (next_len + 1 >= main_len && main_len >= 3 && change_pair(new_dist, main_dist))
            {
                return (1, u32::MAX);
            }
        }

        let mut demote = false;
        {
            let buf = self.mf.window();
            let data = self.mf.cursor() - 1;
            for &rep in &self.reps {
                let data2 = data - (rep as usize + 1);
                if buf[data] != buf[data2] || buf[data + 1] != buf[data2 + 1] {
                    continue;
                }
                let limit = main_len - 1;
                let mut len = 2u32;
                while len < limit && buf[data + len as usize] == buf[data2 + len as usize] {
                    len += 1;
                }
                if len >= limit {
                    demote = true;
                    break;
                }
            }
        }
        if demote {
            return (1, u32::MAX);
        }

        let back = main_dist + NUM_REPS as u32;
        self.move_pos_n(main_len - 2);
        (main_len, back)
    }

    /// Encode everything the window currently holds; called only when the
    /// window is full or the stream has ended, so the parse is independent
    /// of how the caller chunked its input.
    fn encode_block(&mut self) {
        let mut curr_pos = self.cur_pos64 as u32;
        let start_pos = curr_pos;

        if self.cur_pos64 == 0 {
            if self.mf.available_bytes() == 0 {
                self.finish_stream();
                return;
            }
            // The very first symbol is always a literal against the
            // zeroed context.
            let _ = self.read_match_distances();
            let state_index = self.state.value();
            self.rc.encode_bit(&mut self.is_match[state_index][0], 0);
            let cur_byte =
                self.mf.window()[self.mf.cursor() - self.additional_offset as usize] as u32;
            self.rc
                .encode_literal(self.literal.subcoder_mut(0, 0), cur_byte);
            self.state.update_literal();
            self.additional_offset -= 1;
            curr_pos = curr_pos.wrapping_add(1);
        }

        if self.mf.available_bytes() != 0 {
            loop {
                let (len, back) = if self.fast_mode {
                    self.get_optimum_fast()
                } else {
                    self.get_optimum(curr_pos)
                };
                self.emit(len, back, curr_pos);

                self.additional_offset -= len;
                curr_pos = curr_pos.wrapping_add(len);

                if self.additional_offset == 0 {
                    if !self.fast_mode {
                        if self.match_price_count >= (1 << 7) {
                            self.fill_distances_prices();
                        }
                        if self.align_price_count >= ALIGN_TABLE_SIZE as u32 {
                            self.fill_align_prices();
                        }
                    }
                    if self.mf.available_bytes() == 0 {
                        break;
                    }
                }
            }
        }

        self.cur_pos64 += curr_pos.wrapping_sub(start_pos) as u64;

        if self.mf.at_stream_end() {
            self.finish_stream();
        }
    }

    /// Emit one parsed symbol: a literal (`back == u32::MAX`), a rep
    /// (`back < 4`, shuffling the MRU list), or a match (`back - 4` is the
    /// zero-based distance).
    fn emit(&mut self, len: u32, back: u32, curr_pos: u32) {
        let pos_state = (curr_pos & self.pb_mask) as usize;
        let state_index = self.state.value();

        if len == 1 && back == u32::MAX {
            self.rc
                .encode_bit(&mut self.is_match[state_index][pos_state], 0);
            let data = self.mf.cursor() - self.additional_offset as usize;
            let (cur_byte, prev_byte, match_byte) = {
                let buf = self.mf.window();
                (
                    buf[data] as u32,
                    buf[data - 1],
                    buf[data - self.reps[0] as usize - 1] as u32,
                )
            };
            let probs = self.literal.subcoder_mut(curr_pos, prev_byte);
            if self.state.is_literal() {
                self.rc.encode_literal(probs, cur_byte);
            } else {
                self.rc.encode_matched_literal(probs, cur_byte, match_byte);
            }
            self.state.update_literal();
            return;
        }

        self.rc
            .encode_bit(&mut self.is_match[state_index][pos_state], 1);

        if back < NUM_REPS as u32 {
            self.rc.encode_bit(&mut self.is_rep[state_index], 1);
            if back == 0 {
                self.rc.encode_bit(&mut self.is_rep_g0[state_index], 0);
                self.rc.encode_bit(
                    &mut self.is_rep0_long[state_index][pos_state],
                    if len == 1 { 0 } else { 1 },
                );
            } else {
                let distance = self.reps[back as usize];
                self.rc.encode_bit(&mut self.is_rep_g0[state_index], 1);
                if back == 1 {
                    self.rc.encode_bit(&mut self.is_rep_g1[state_index], 0);
                } else {
                    self.rc.encode_bit(&mut self.is_rep_g1[state_index], 1);
                    self.rc
                        .encode_bit(&mut self.is_rep_g2[state_index], back - 2);
                    if back == 3 {
                        self.reps[3] = self.reps[2];
                    }
                    self.reps[2] = self.reps[1];
                }
                self.reps[1] = self.reps[0];
                self.reps[0] = distance;
            }
            if len == 1 {
                self.state.update_short_rep();
            } else {
                self.rep_len_enc
                    .encode(&mut self.rc, len, pos_state, !self.fast_mode);
                self.state.update_rep();
            }
        } else {
            self.rc.encode_bit(&mut self.is_rep[state_index], 0);
            self.state.update_match();
            self.len_enc
                .encode(&mut self.rc, len, pos_state, !self.fast_mode);

            let dist = back - NUM_REPS as u32;
            self.encode_distance(dist, len);

            self.reps[3] = self.reps[2];
            self.reps[2] = self.reps[1];
            self.reps[1] = self.reps[0];
            self.reps[0] = dist;
            self.match_price_count += 1;
        }
    }

    fn encode_distance(&mut self, dist: u32, len: u32) {
        let slot = dist_slot(dist);
        self.rc.encode_bit_tree(
            &mut self.pos_slot_encoder[len_to_pos_state(len)],
            NUM_POS_SLOT_BITS,
            slot,
        );

        if slot >= START_POS_MODEL_INDEX {
            let footer_bits = (slot >> 1) - 1;
            let base = (2 | (slot & 1)) << footer_bits;
            let reduced = dist - base;

            if slot < END_POS_MODEL_INDEX {
                self.rc.encode_reverse_bit_tree_span(
                    &mut self.pos_encoders[(base - slot) as usize..],
                    footer_bits,
                    reduced,
                );
            } else {
                self.rc
                    .encode_direct_bits(reduced >> NUM_ALIGN_BITS, footer_bits - NUM_ALIGN_BITS);
                self.rc.encode_reverse_bit_tree(
                    &mut self.pos_align_encoder,
                    NUM_ALIGN_BITS,
                    reduced & ALIGN_MASK,
                );
                self.align_price_count += 1;
            }
        }
    }

    /// Seal the stream: optional end marker, then the range coder flush.
    fn finish_stream(&mut self) {
        if self.write_end_mark && !self.marker_written {
            let pos_state = (self.cur_pos64 as u32 & self.pb_mask) as usize;
            let state_index = self.state.value();
            self.rc
                .encode_bit(&mut self.is_match[state_index][pos_state], 1);
            self.rc.encode_bit(&mut self.is_rep[state_index], 0);
            self.state.update_match();
            self.len_enc
                .encode(&mut self.rc, MATCH_LEN_MIN, pos_state, !self.fast_mode);
            self.encode_distance(u32::MAX, MATCH_LEN_MIN);
            self.marker_written = true;
        }
        self.rc.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::MatchMode;

    fn tiny_params() -> LzmaParams {
        let mut p = LzmaParams::default();
        p.dict_size = 1 << 12;
        p
    }

    #[test]
    fn test_rejects_invalid_params() {
        let mut p = tiny_params();
        p.pb = 5;
        assert!(LzmaEncoder::new(p, None).is_err());
    }

    #[test]
    fn test_header_layout() {
        let mut enc = LzmaEncoder::new(tiny_params(), Some(7)).unwrap();
        let mut out = [0u8; 64];
        let progress = enc.encode(&[], &mut out).unwrap();
        // empty stream: header + five flush bytes
        assert_eq!(progress.produced, HEADER_SIZE + 5);
        assert_eq!(out[0], 0x5D);
        assert_eq!(u32::from_le_bytes(out[1..5].try_into().unwrap()), 1 << 12);
        assert_eq!(u64::from_le_bytes(out[5..13].try_into().unwrap()), 7);
    }

    #[test]
    fn test_unknown_size_header_enables_end_marker() {
        let enc = LzmaEncoder::new(tiny_params(), None).unwrap();
        assert!(enc.write_end_mark);

        let mut enc = LzmaEncoder::new(tiny_params(), None).unwrap();
        let mut out = [0u8; 64];
        enc.encode(&[], &mut out).unwrap();
        assert_eq!(
            u64::from_le_bytes(out[5..13].try_into().unwrap()),
            u64::MAX
        );
    }

    #[test]
    fn test_small_first_buffer_is_retryable() {
        let mut enc = LzmaEncoder::new(tiny_params(), Some(0)).unwrap();
        let mut tiny = [0u8; 4];
        let err = enc.encode(&[], &mut tiny).unwrap_err();
        assert!(matches!(
            err,
            OzmaError::OutputBufferTooSmall {
                needed: HEADER_SIZE,
                available: 4
            }
        ));

        // state preserved: a properly sized retry succeeds
        let mut out = [0u8; 64];
        let progress = enc.encode(&[], &mut out).unwrap();
        assert_eq!(progress.produced, HEADER_SIZE + 5);
        assert!(enc.is_finished());
    }

    #[test]
    fn test_progress_reported_for_buffered_input() {
        let mut enc = LzmaEncoder::new(tiny_params(), None).unwrap();
        let mut out = [0u8; 64];
        let progress = enc.encode(b"hello world", &mut out).unwrap();
        assert_eq!(progress.consumed, 11);
        assert!(progress.any());
        assert!(!enc.is_finished());
    }

    #[test]
    fn test_match_len_gate() {
        let buf = b"abcabcab";
        assert_eq!(match_len(buf, 3, 0, 5, 0), 5);
        assert_eq!(match_len(buf, 3, 1, 5, 0), 0);
        assert_eq!(match_len(buf, 3, 0, 5, 3), 5);
    }

    #[test]
    fn test_change_pair() {
        assert!(change_pair(1, 300));
        assert!(!change_pair(300, 1));
        assert!(!change_pair(4, 512));
        assert!(change_pair(3, 513));
    }

    #[test]
    fn test_fast_mode_runs_hash_chain() {
        let mut p = tiny_params();
        p.mode = MatchMode::HashChain;
        p.algo = Algo::Fast;
        let mut enc = LzmaEncoder::new(p, Some(20)).unwrap();
        let mut out = vec![0u8; 256];
        let data = b"abababababababababab";
        let mut produced = 0;
        let pr = enc.encode(data, &mut out).unwrap();
        produced += pr.produced;
        while !enc.is_finished() {
            let pr = enc.encode(&[], &mut out[produced..]).unwrap();
            produced += pr.produced;
        }
        assert!(produced > HEADER_SIZE + 5);
    }
}
