//! Price-based optimal parser.
//!
//! A forward dynamic-programming search over up to [`NUM_OPTS`] look-ahead
//! positions. Each slot of `opt` records the cheapest known way to have
//! produced that many bytes from the current anchor, with back-pointers
//! for the final reverse walk. Two-step candidates (match-or-rep, then
//! literal, then rep0) are priced explicitly because the MRU distance made
//! current by the first step makes the trailing rep0 nearly free.
//!
//! Ties keep the incumbent: relaxation uses strict `<`.

use crate::encoder::{LzmaEncoder, match_len};
use crate::match_finder::NUM_OPTS;
use crate::model::{
    ALIGN_MASK, ALIGN_TABLE_SIZE, MATCH_LEN_MAX, MATCH_LEN_MIN, NUM_ALIGN_BITS, NUM_FULL_DISTANCES,
    NUM_LEN_TO_POS_STATES, NUM_REPS, START_POS_MODEL_INDEX, State, dist_slot, len_to_pos_state,
};
use crate::price::{self, BIT_PRICE_SHIFT_BITS, INFINITY_PRICE};

/// One slot of the optimal-parse table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Optimal {
    pub price: u32,
    pub state: State,
    pub prev1_is_char: bool,
    pub prev2: bool,
    pub pos_prev2: u32,
    pub back_prev2: u32,
    pub pos_prev: u32,
    pub back_prev: u32,
    pub backs: [u32; NUM_REPS],
}

impl Optimal {
    pub fn make_as_char(&mut self) {
        self.back_prev = u32::MAX;
        self.prev1_is_char = false;
    }

    pub fn make_as_short_rep(&mut self) {
        self.back_prev = 0;
        self.prev1_is_char = false;
    }

    pub fn is_short_rep(&self) -> bool {
        self.back_prev == 0
    }
}

impl Default for Optimal {
    fn default() -> Self {
        Self {
            price: INFINITY_PRICE,
            state: State::new(),
            prev1_is_char: false,
            prev2: false,
            pos_prev2: 0,
            back_prev2: 0,
            pos_prev: 0,
            back_prev: 0,
            backs: [0; NUM_REPS],
        }
    }
}

impl LzmaEncoder {
    /// Price of the selector bits of a length-1 rep0.
    pub(crate) fn rep_len1_price(&self, state: State, pos_state: usize) -> u32 {
        let s = state.value();
        price::bit_price_0(self.is_rep_g0[s]) + price::bit_price_0(self.is_rep0_long[s][pos_state])
    }

    /// Price of the rep-index selector bits (without the length).
    pub(crate) fn pure_rep_price(&self, rep_index: u32, state: State, pos_state: usize) -> u32 {
        let s = state.value();
        if rep_index == 0 {
            price::bit_price_0(self.is_rep_g0[s]) + price::bit_price_1(self.is_rep0_long[s][pos_state])
        } else {
            let mut p = price::bit_price_1(self.is_rep_g0[s]);
            if rep_index == 1 {
                p += price::bit_price_0(self.is_rep_g1[s]);
            } else {
                p += price::bit_price_1(self.is_rep_g1[s])
                    + price::bit_price(self.is_rep_g2[s], rep_index - 2);
            }
            p
        }
    }

    /// Full price of a rep emission of the given length.
    pub(crate) fn rep_price(&self, rep_index: u32, len: u32, state: State, pos_state: usize) -> u32 {
        self.rep_len_enc.prices[pos_state][(len - MATCH_LEN_MIN) as usize]
            + self.pure_rep_price(rep_index, state, pos_state)
    }

    /// Rebuild the pos-slot and full-distance price tables. Runs at
    /// construction and again after every 128 match emissions.
    pub(crate) fn fill_distances_prices(&mut self) {
        let mut temp_prices = [0u32; NUM_FULL_DISTANCES as usize];
        for i in START_POS_MODEL_INDEX..NUM_FULL_DISTANCES {
            let slot = dist_slot(i);
            let footer_bits = (slot >> 1) - 1;
            let base = (2 | (slot & 1)) << footer_bits;
            temp_prices[i as usize] = price::reverse_tree_price_span(
                &self.pos_encoders[(base - slot) as usize..],
                footer_bits,
                i - base,
            );
        }

        for lps in 0..NUM_LEN_TO_POS_STATES {
            for slot in 0..self.dist_table_size {
                self.pos_slot_prices[lps][slot as usize] = price::tree_price(
                    &self.pos_slot_encoder[lps],
                    crate::model::NUM_POS_SLOT_BITS,
                    slot,
                );
            }
            for slot in crate::model::END_POS_MODEL_INDEX..self.dist_table_size {
                self.pos_slot_prices[lps][slot as usize] +=
                    ((slot >> 1) - 1 - NUM_ALIGN_BITS) << BIT_PRICE_SHIFT_BITS;
            }

            for i in 0..START_POS_MODEL_INDEX {
                self.distances_prices[lps][i as usize] = self.pos_slot_prices[lps][i as usize];
            }
            for i in START_POS_MODEL_INDEX..NUM_FULL_DISTANCES {
                self.distances_prices[lps][i as usize] =
                    self.pos_slot_prices[lps][dist_slot(i) as usize] + temp_prices[i as usize];
            }
        }
        self.match_price_count = 0;
    }

    /// Rebuild the align reverse-tree prices; runs every 16 align
    /// emissions.
    pub(crate) fn fill_align_prices(&mut self) {
        for i in 0..ALIGN_TABLE_SIZE as u32 {
            self.align_prices[i as usize] =
                price::reverse_tree_price(&self.pos_align_encoder, NUM_ALIGN_BITS, i);
        }
        self.align_price_count = 0;
    }

    /// Reverse the back-pointer chain of the cheapest parse so the symbol
    /// sequence can be replayed forward, and return its first step.
    fn backward(&mut self, mut cur: u32) -> (u32, u32) {
        self.optimum_end_index = cur;

        let mut pos_mem = self.opt[cur as usize].pos_prev;
        let mut back_mem = self.opt[cur as usize].back_prev;

        loop {
            if self.opt[cur as usize].prev1_is_char {
                self.opt[pos_mem as usize].make_as_char();
                self.opt[pos_mem as usize].pos_prev = pos_mem - 1;
                if self.opt[cur as usize].prev2 {
                    let prev = pos_mem as usize - 1;
                    self.opt[prev].prev1_is_char = false;
                    self.opt[prev].pos_prev = self.opt[cur as usize].pos_prev2;
                    self.opt[prev].back_prev = self.opt[cur as usize].back_prev2;
                }
            }
            let pos_prev = pos_mem;
            let back_cur = back_mem;

            back_mem = self.opt[pos_prev as usize].back_prev;
            pos_mem = self.opt[pos_prev as usize].pos_prev;

            self.opt[pos_prev as usize].back_prev = back_cur;
            self.opt[pos_prev as usize].pos_prev = cur;
            cur = pos_prev;
            if cur == 0 {
                break;
            }
        }

        self.optimum_current_index = self.opt[0].pos_prev;
        (self.opt[0].pos_prev, self.opt[0].back_prev)
    }

    /// Pick the cheapest symbol at the anchor. Returns `(len, back)`:
    /// `back == u32::MAX` is a literal, `back < 4` a rep index, otherwise
    /// `distance + 4`. Subsequent calls replay the rest of the solved path
    /// before a new search starts.
    pub(crate) fn get_optimum(&mut self, mut position: u32) -> (u32, u32) {
        if self.optimum_end_index != self.optimum_current_index {
            let o = self.opt[self.optimum_current_index as usize];
            let len_res = o.pos_prev - self.optimum_current_index;
            self.optimum_current_index = o.pos_prev;
            return (len_res, o.back_prev);
        }
        self.optimum_current_index = 0;
        self.optimum_end_index = 0;

        let (main_len, num_pairs) = if self.additional_offset == 0 {
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

        let data = self.mf.cursor() - 1;
        let mut reps = self.reps;
        let mut rep_lens = [0u32; NUM_REPS];
        let mut rep_max_index = 0usize;
        {
            let buf = self.mf.window();
            for i in 0..NUM_REPS {
                let data2 = data - (reps[i] as usize + 1);
                rep_lens[i] = match_len(buf, data, data2, num_avail, 0);
                if rep_lens[i] > rep_lens[rep_max_index] {
                    rep_max_index = i;
                }
            }
        }

        if rep_lens[rep_max_index] >= self.num_fast_bytes {
            let len_res = rep_lens[rep_max_index];
            self.move_pos_n(len_res - 1);
            return (len_res, rep_max_index as u32);
        }

        if main_len >= self.num_fast_bytes {
            let back = self.matches[num_pairs - 1].dist + NUM_REPS as u32;
            self.move_pos_n(main_len - 1);
            return (main_len, back);
        }

        let (cur_byte, match_byte) = {
            let buf = self.mf.window();
            (buf[data] as u32, buf[data - (reps[0] as usize + 1)] as u32)
        };

        if main_len < 2 && cur_byte != match_byte && rep_lens[rep_max_index] < 2 {
            return (1, u32::MAX);
        }

        self.opt[0].state = self.state;

        let pos_state = (position & self.pb_mask) as usize;
        let state_index = self.state.value();

        self.opt[1].price = price::bit_price_0(self.is_match[state_index][pos_state]) + {
            let buf = self.mf.window();
            let probs = self.literal.subcoder(position, buf[data - 1]);
            if !self.state.is_literal() {
                price::matched_literal_price(probs, cur_byte, match_byte)
            } else {
                price::literal_price(probs, cur_byte)
            }
        };
        self.opt[1].make_as_char();

        let match_price = price::bit_price_1(self.is_match[state_index][pos_state]);
        let rep_match_price = match_price + price::bit_price_1(self.is_rep[state_index]);

        if match_byte == cur_byte {
            let short_rep_price = rep_match_price + self.rep_len1_price(self.state, pos_state);
            if short_rep_price < self.opt[1].price {
                self.opt[1].price = short_rep_price;
                self.opt[1].make_as_short_rep();
            }
        }

        let mut len_end = main_len.max(rep_lens[rep_max_index]);
        if len_end < 2 {
            return (1, self.opt[1].back_prev);
        }

        self.opt[1].pos_prev = 0;
        self.opt[0].backs = reps;

        for len in 2..=len_end {
            self.opt[len as usize].price = INFINITY_PRICE;
        }

        for i in 0..NUM_REPS {
            let rep_len = rep_lens[i];
            if rep_len < 2 {
                continue;
            }
            let price_base = rep_match_price + self.pure_rep_price(i as u32, self.state, pos_state);
            let mut len = rep_len;
            loop {
                let price = price_base + self.rep_len_enc.prices[pos_state][(len - 2) as usize];
                let o = &mut self.opt[len as usize];
                if price < o.price {
                    o.price = price;
                    o.pos_prev = 0;
                    o.back_prev = i as u32;
                    o.prev1_is_char = false;
                }
                len -= 1;
                if len < 2 {
                    break;
                }
            }
        }

        {
            let normal_match_price = match_price + price::bit_price_0(self.is_rep[state_index]);
            let mut len = if rep_lens[0] >= 2 { rep_lens[0] + 1 } else { 2 };
            if len <= main_len {
                let mut offs = 0usize;
                while len > self.matches[offs].len {
                    offs += 1;
                }
                loop {
                    let distance = self.matches[offs].dist;
                    let mut cur_price = normal_match_price
                        + self.len_enc.prices[pos_state][(len - MATCH_LEN_MIN) as usize];
                    let ltps = len_to_pos_state(len);
                    if distance < NUM_FULL_DISTANCES {
                        cur_price += self.distances_prices[ltps][distance as usize];
                    } else {
                        cur_price += self.pos_slot_prices[ltps][dist_slot(distance) as usize]
                            + self.align_prices[(distance & ALIGN_MASK) as usize];
                    }
                    let o = &mut self.opt[len as usize];
                    if cur_price < o.price {
                        o.price = cur_price;
                        o.pos_prev = 0;
                        o.back_prev = distance + NUM_REPS as u32;
                        o.prev1_is_char = false;
                    }
                    if len == self.matches[offs].len {
                        offs += 1;
                        if offs == num_pairs {
                            break;
                        }
                    }
                    len += 1;
                }
            }
        }

        let mut cur = 0u32;
        loop {
            cur += 1;
            if cur == len_end {
                return self.backward(cur);
            }

            let (mut new_len, mut new_num_pairs) = self.read_match_distances();
            if new_len >= self.num_fast_bytes {
                self.num_pairs = new_num_pairs;
                self.longest_match_len = new_len;
                return self.backward(cur);
            }
            position += 1;

            // Reconstruct the state and MRU distances that hold after the
            // cheapest known path to `cur`.
            let cur_opt = self.opt[cur as usize];
            let mut pos_prev = cur_opt.pos_prev;
            let mut state: State;
            if cur_opt.prev1_is_char {
                pos_prev -= 1;
                if cur_opt.prev2 {
                    state = self.opt[cur_opt.pos_prev2 as usize].state;
                    if cur_opt.back_prev2 < NUM_REPS as u32 {
                        state.update_rep();
                    } else {
                        state.update_match();
                    }
                } else {
                    state = self.opt[pos_prev as usize].state;
                }
                state.update_literal();
            } else {
                state = self.opt[pos_prev as usize].state;
            }

            if pos_prev == cur - 1 {
                // one-byte step off the previous slot: reps carry over
                if cur_opt.is_short_rep() {
                    state.update_short_rep();
                } else {
                    state.update_literal();
                }
            } else {
                let back;
                if cur_opt.prev1_is_char && cur_opt.prev2 {
                    pos_prev = cur_opt.pos_prev2;
                    back = cur_opt.back_prev2;
                    state.update_rep();
                } else {
                    back = cur_opt.back_prev;
                    if back < NUM_REPS as u32 {
                        state.update_rep();
                    } else {
                        state.update_match();
                    }
                }
                let prev_backs = self.opt[pos_prev as usize].backs;
                if back < NUM_REPS as u32 {
                    let back = back as usize;
                    reps[0] = prev_backs[back];
                    for i in 1..=back {
                        reps[i] = prev_backs[i - 1];
                    }
                    for i in back + 1..NUM_REPS {
                        reps[i] = prev_backs[i];
                    }
                } else {
                    reps[0] = back - NUM_REPS as u32;
                    for i in 1..NUM_REPS {
                        reps[i] = prev_backs[i - 1];
                    }
                }
            }

            self.opt[cur as usize].state = state;
            self.opt[cur as usize].backs = reps;

            let cur_price = self.opt[cur as usize].price;
            let mut next_is_char = false;

            let data = self.mf.cursor() - 1;
            let (cur_byte, match_byte, prev_byte) = {
                let buf = self.mf.window();
                (
                    buf[data] as u32,
                    buf[data - (reps[0] as usize + 1)] as u32,
                    buf[data - 1],
                )
            };
            let pos_state = (position & self.pb_mask) as usize;

            let cur_and_1_price = cur_price
                + price::bit_price_0(self.is_match[state.value()][pos_state])
                + {
                    let probs = self.literal.subcoder(position, prev_byte);
                    if !state.is_literal() {
                        price::matched_literal_price(probs, cur_byte, match_byte)
                    } else {
                        price::literal_price(probs, cur_byte)
                    }
                };

            {
                let next_opt = &mut self.opt[cur as usize + 1];
                if cur_and_1_price < next_opt.price {
                    next_opt.price = cur_and_1_price;
                    next_opt.pos_prev = cur;
                    next_opt.make_as_char();
                    next_is_char = true;
                }
            }

            let match_price =
                cur_price + price::bit_price_1(self.is_match[state.value()][pos_state]);
            let rep_match_price = match_price + price::bit_price_1(self.is_rep[state.value()]);

            if match_byte == cur_byte
                && !(self.opt[cur as usize + 1].pos_prev < cur
                    && self.opt[cur as usize + 1].back_prev == 0)
            {
                let short_rep_price = rep_match_price + self.rep_len1_price(state, pos_state);
                let next_opt = &mut self.opt[cur as usize + 1];
                if short_rep_price <= next_opt.price {
                    next_opt.price = short_rep_price;
                    next_opt.pos_prev = cur;
                    next_opt.make_as_short_rep();
                    next_is_char = true;
                }
            }

            let num_avail_full = self.num_avail.min(NUM_OPTS - 1 - cur);
            if num_avail_full < 2 {
                continue;
            }
            let num_avail = num_avail_full.min(self.num_fast_bytes);

            // literal, then rep0 against the unchanged reps[0]
            if !next_is_char && match_byte != cur_byte {
                let limit = (self.num_fast_bytes + 1).min(num_avail_full);
                let len_test2 = {
                    let buf = self.mf.window();
                    let data2 = data - (reps[0] as usize + 1);
                    let mut t = 1u32;
                    while t < limit && buf[data + t as usize] == buf[data2 + t as usize] {
                        t += 1;
                    }
                    t - 1
                };
                if len_test2 >= 2 {
                    let mut state2 = state;
                    state2.update_literal();
                    let pos_state_next = ((position + 1) & self.pb_mask) as usize;
                    let next_rep_match_price = cur_and_1_price
                        + price::bit_price_1(self.is_match[state2.value()][pos_state_next])
                        + price::bit_price_1(self.is_rep[state2.value()]);
                    let offset = cur + 1 + len_test2;
                    while len_end < offset {
                        len_end += 1;
                        self.opt[len_end as usize].price = INFINITY_PRICE;
                    }
                    let cur_and_len_price = next_rep_match_price
                        + self.rep_price(0, len_test2, state2, pos_state_next);
                    let o = &mut self.opt[offset as usize];
                    if cur_and_len_price < o.price {
                        o.price = cur_and_len_price;
                        o.pos_prev = cur + 1;
                        o.back_prev = 0;
                        o.prev1_is_char = true;
                        o.prev2 = false;
                    }
                }
            }

            let mut start_len = 2u32;

            for rep_index in 0..NUM_REPS {
                let data2 = data - (reps[rep_index] as usize + 1);
                let len_test = {
                    let buf = self.mf.window();
                    match_len(buf, data, data2, num_avail, 0)
                };
                if len_test < 2 {
                    continue;
                }

                while len_end < cur + len_test {
                    len_end += 1;
                    self.opt[len_end as usize].price = INFINITY_PRICE;
                }

                let price_base =
                    rep_match_price + self.pure_rep_price(rep_index as u32, state, pos_state);
                let mut lt = len_test;
                loop {
                    let cur_and_len_price =
                        price_base + self.rep_len_enc.prices[pos_state][(lt - 2) as usize];
                    let o = &mut self.opt[(cur + lt) as usize];
                    if cur_and_len_price < o.price {
                        o.price = cur_and_len_price;
                        o.pos_prev = cur;
                        o.back_prev = rep_index as u32;
                        o.prev1_is_char = false;
                    }
                    lt -= 1;
                    if lt < 2 {
                        break;
                    }
                }

                if rep_index == 0 {
                    start_len = len_test + 1;
                }

                // rep, literal, rep0
                let limit = (len_test + 1 + self.num_fast_bytes).min(num_avail_full);
                let len_test2 = {
                    let buf = self.mf.window();
                    let mut t = len_test + 1;
                    while t < limit && buf[data + t as usize] == buf[data2 + t as usize] {
                        t += 1;
                    }
                    t - (len_test + 1)
                };
                if len_test2 >= 2 {
                    let mut state2 = state;
                    state2.update_rep();
                    let pos_state_next = ((position + len_test) & self.pb_mask) as usize;
                    let cur_and_len_char_price = price_base
                        + self.rep_len_enc.prices[pos_state][(len_test - 2) as usize]
                        + price::bit_price_0(self.is_match[state2.value()][pos_state_next])
                        + {
                            let buf = self.mf.window();
                            let probs = self
                                .literal
                                .subcoder(position + len_test, buf[data + len_test as usize - 1]);
                            price::matched_literal_price(
                                probs,
                                buf[data + len_test as usize] as u32,
                                buf[data2 + len_test as usize] as u32,
                            )
                        };
                    state2.update_literal();
                    let pos_state_next = ((position + len_test + 1) & self.pb_mask) as usize;
                    let next_rep_match_price = cur_and_len_char_price
                        + price::bit_price_1(self.is_match[state2.value()][pos_state_next])
                        + price::bit_price_1(self.is_rep[state2.value()]);
                    let offset = cur + len_test + 1 + len_test2;
                    while len_end < offset {
                        len_end += 1;
                        self.opt[len_end as usize].price = INFINITY_PRICE;
                    }
                    let cur_and_len_price = next_rep_match_price
                        + self.rep_price(0, len_test2, state2, pos_state_next);
                    let o = &mut self.opt[offset as usize];
                    if cur_and_len_price < o.price {
                        o.price = cur_and_len_price;
                        o.pos_prev = cur + len_test + 1;
                        o.back_prev = 0;
                        o.prev1_is_char = true;
                        o.prev2 = true;
                        o.pos_prev2 = cur;
                        o.back_prev2 = rep_index as u32;
                    }
                }
            }

            if new_len > num_avail {
                new_len = num_avail;
                let mut idx = 0usize;
                while new_len > self.matches[idx].len {
                    idx += 1;
                }
                self.matches[idx].len = new_len;
                self.matches.truncate(idx + 1);
                new_num_pairs = idx + 1;
            }

            if new_len >= start_len {
                let normal_match_price =
                    match_price + price::bit_price_0(self.is_rep[state.value()]);
                while len_end < cur + new_len {
                    len_end += 1;
                    self.opt[len_end as usize].price = INFINITY_PRICE;
                }

                let mut offs = 0usize;
                while start_len > self.matches[offs].len {
                    offs += 1;
                }
                let mut cur_back = self.matches[offs].dist;

                let mut len_test = start_len;
                loop {
                    let mut cur_and_len_price = normal_match_price
                        + self.len_enc.prices[pos_state][(len_test - MATCH_LEN_MIN) as usize];
                    let ltps = len_to_pos_state(len_test);
                    if cur_back < NUM_FULL_DISTANCES {
                        cur_and_len_price += self.distances_prices[ltps][cur_back as usize];
                    } else {
                        cur_and_len_price += self.pos_slot_prices[ltps]
                            [dist_slot(cur_back) as usize]
                            + self.align_prices[(cur_back & ALIGN_MASK) as usize];
                    }

                    {
                        let o = &mut self.opt[(cur + len_test) as usize];
                        if cur_and_len_price < o.price {
                            o.price = cur_and_len_price;
                            o.pos_prev = cur;
                            o.back_prev = cur_back + NUM_REPS as u32;
                            o.prev1_is_char = false;
                        }
                    }

                    if len_test == self.matches[offs].len {
                        // match, literal, rep0
                        let data2 = data - (cur_back as usize + 1);
                        let limit = (len_test + 1 + self.num_fast_bytes).min(num_avail_full);
                        let len_test2 = {
                            let buf = self.mf.window();
                            let mut t = len_test + 1;
                            while t < limit && buf[data + t as usize] == buf[data2 + t as usize] {
                                t += 1;
                            }
                            t - (len_test + 1)
                        };
                        if len_test2 >= 2 {
                            let mut state2 = state;
                            state2.update_match();
                            let mut pos_state_next =
                                ((position + len_test) & self.pb_mask) as usize;
                            let cur_and_len_char_price = cur_and_len_price
                                + price::bit_price_0(self.is_match[state2.value()][pos_state_next])
                                + {
                                    let buf = self.mf.window();
                                    let probs = self.literal.subcoder(
                                        position + len_test,
                                        buf[data + len_test as usize - 1],
                                    );
                                    price::matched_literal_price(
                                        probs,
                                        buf[data + len_test as usize] as u32,
                                        buf[data2 + len_test as usize] as u32,
                                    )
                                };
                            state2.update_literal();
                            pos_state_next = (pos_state_next + 1) & self.pb_mask as usize;
                            let next_rep_match_price = cur_and_len_char_price
                                + price::bit_price_1(self.is_match[state2.value()][pos_state_next])
                                + price::bit_price_1(self.is_rep[state2.value()]);
                            let offset = cur + len_test + 1 + len_test2;
                            while len_end < offset {
                                len_end += 1;
                                self.opt[len_end as usize].price = INFINITY_PRICE;
                            }
                            let step_price = next_rep_match_price
                                + self.rep_price(0, len_test2, state2, pos_state_next);
                            let o = &mut self.opt[offset as usize];
                            if step_price < o.price {
                                o.price = step_price;
                                o.pos_prev = cur + len_test + 1;
                                o.back_prev = 0;
                                o.prev1_is_char = true;
                                o.prev2 = true;
                                o.pos_prev2 = cur;
                                o.back_prev2 = cur_back + NUM_REPS as u32;
                            }
                        }
                        offs += 1;
                        if offs == new_num_pairs {
                            break;
                        }
                        cur_back = self.matches[offs].dist;
                    }
                    len_test += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::LzmaParams;

    fn small_encoder() -> LzmaEncoder {
        let mut p = LzmaParams::default();
        p.dict_size = 1 << 12;
        LzmaEncoder::new(p, None).unwrap()
    }

    #[test]
    fn test_fresh_align_prices_cost_four_bits() {
        let enc = small_encoder();
        for &price in &enc.align_prices {
            // four centred bits, 16 units each
            assert!((4 * 14..=4 * 18).contains(&price), "got {price}");
        }
    }

    #[test]
    fn test_distance_prices_grow_with_distance() {
        let enc = small_encoder();
        for lps in 0..NUM_LEN_TO_POS_STATES {
            let p = &enc.distances_prices[lps];
            assert!(p[1] <= p[30]);
            assert!(p[4] <= p[100]);
        }
    }

    #[test]
    fn test_pure_rep_price_orders_rep_indices() {
        // with centred probabilities, deeper selector paths cost more
        let enc = small_encoder();
        let state = State::new();
        let p0 = enc.pure_rep_price(0, state, 0);
        let p1 = enc.pure_rep_price(1, state, 0);
        let p2 = enc.pure_rep_price(2, state, 0);
        let p3 = enc.pure_rep_price(3, state, 0);
        assert!(p0 <= p1);
        assert!(p1 < p2);
        // rep2 and rep3 differ only in the value of the last centred bit
        assert!(p2.abs_diff(p3) <= 1);
    }

    #[test]
    fn test_optimal_defaults_unreachable() {
        let o = Optimal::default();
        assert_eq!(o.price, INFINITY_PRICE);
        assert!(!o.is_short_rep() || o.back_prev == 0);
    }
}
