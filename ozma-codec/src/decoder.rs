//! LZMA1 decoder.
//!
//! A straightforward sequential decoder for the classic container. It
//! exists to close the loop on the encoder: every stream the encoder can
//! produce, with or without the end marker, decodes here. The heavy
//! engineering lives on the encoder side.

use crate::model::{
    DistanceModel, END_POS_MODEL_INDEX, LEN_HIGH_BITS, LEN_HIGH_SYMBOLS, LEN_LOW_BITS,
    LEN_LOW_SYMBOLS, LEN_MID_BITS, LEN_MID_SYMBOLS, LiteralCoder, LzmaProps, MATCH_LEN_MIN,
    NUM_ALIGN_BITS, NUM_PB_STATES_MAX, NUM_POS_SLOT_BITS, NUM_REPS, NUM_STATES, PROB_INIT,
    START_POS_MODEL_INDEX, State, len_to_pos_state,
};
use crate::range_coder::RangeDecoder;
use ozma_core::error::{OzmaError, Result};
use std::io::Read;

/// Length decoder: the choice pair and three bit trees, mirroring the
/// encoder's length coder.
#[derive(Debug, Clone)]
struct LenDecoder {
    choice: u16,
    choice2: u16,
    low: [[u16; LEN_LOW_SYMBOLS]; NUM_PB_STATES_MAX],
    mid: [[u16; LEN_MID_SYMBOLS]; NUM_PB_STATES_MAX],
    high: [u16; LEN_HIGH_SYMBOLS],
}

impl LenDecoder {
    fn new() -> Self {
        Self {
            choice: PROB_INIT,
            choice2: PROB_INIT,
            low: [[PROB_INIT; LEN_LOW_SYMBOLS]; NUM_PB_STATES_MAX],
            mid: [[PROB_INIT; LEN_MID_SYMBOLS]; NUM_PB_STATES_MAX],
            high: [PROB_INIT; LEN_HIGH_SYMBOLS],
        }
    }

    fn decode<R: Read>(&mut self, rc: &mut RangeDecoder<R>, pos_state: usize) -> Result<u32> {
        if rc.decode_bit(&mut self.choice)? == 0 {
            let len = rc.decode_bit_tree(&mut self.low[pos_state], LEN_LOW_BITS)?;
            Ok(len + MATCH_LEN_MIN)
        } else if rc.decode_bit(&mut self.choice2)? == 0 {
            let len = rc.decode_bit_tree(&mut self.mid[pos_state], LEN_MID_BITS)?;
            Ok(len + MATCH_LEN_MIN + LEN_LOW_SYMBOLS as u32)
        } else {
            let len = rc.decode_bit_tree(&mut self.high, LEN_HIGH_BITS)?;
            Ok(len + MATCH_LEN_MIN + (LEN_LOW_SYMBOLS + LEN_MID_SYMBOLS) as u32)
        }
    }
}

/// LZMA1 decoder over any byte source.
pub struct LzmaDecoder<R: Read> {
    rc: RangeDecoder<R>,
    props: LzmaProps,

    is_match: [[u16; NUM_PB_STATES_MAX]; NUM_STATES],
    is_rep: [u16; NUM_STATES],
    is_rep_g0: [u16; NUM_STATES],
    is_rep_g1: [u16; NUM_STATES],
    is_rep_g2: [u16; NUM_STATES],
    is_rep0_long: [[u16; NUM_PB_STATES_MAX]; NUM_STATES],

    literal: LiteralCoder,
    match_len: LenDecoder,
    rep_len: LenDecoder,
    distance: DistanceModel,

    dict: Vec<u8>,
    dict_pos: usize,
    dict_size: usize,

    state: State,
    reps: [u32; NUM_REPS],

    unpacked_size: Option<u64>,
    bytes_decoded: u64,
}

impl<R: Read> LzmaDecoder<R> {
    /// Create a decoder with explicit properties (no header parsing).
    pub fn new(
        reader: R,
        props: LzmaProps,
        dict_size: u32,
        unpacked_size: Option<u64>,
    ) -> Result<Self> {
        let dict_size = dict_size.max(4096) as usize;
        Ok(Self {
            rc: RangeDecoder::new(reader)?,
            props,
            is_match: [[PROB_INIT; NUM_PB_STATES_MAX]; NUM_STATES],
            is_rep: [PROB_INIT; NUM_STATES],
            is_rep_g0: [PROB_INIT; NUM_STATES],
            is_rep_g1: [PROB_INIT; NUM_STATES],
            is_rep_g2: [PROB_INIT; NUM_STATES],
            is_rep0_long: [[PROB_INIT; NUM_PB_STATES_MAX]; NUM_STATES],
            literal: LiteralCoder::new(props.lc, props.lp),
            match_len: LenDecoder::new(),
            rep_len: LenDecoder::new(),
            distance: DistanceModel::new(),
            dict: vec![0u8; dict_size],
            dict_pos: 0,
            dict_size,
            state: State::new(),
            reps: [0; NUM_REPS],
            unpacked_size,
            bytes_decoded: 0,
        })
    }

    /// Create a decoder by parsing the 13-byte container header.
    pub fn from_header(mut reader: R) -> Result<Self> {
        let mut header = [0u8; 13];
        reader.read_exact(&mut header)?;

        let props = LzmaProps::from_byte(header[0])
            .ok_or_else(|| OzmaError::invalid_header("bad property byte"))?;
        let dict_size = u32::from_le_bytes(header[1..5].try_into().unwrap());
        let unpacked = u64::from_le_bytes(header[5..13].try_into().unwrap());
        let unpacked_size = if unpacked == u64::MAX {
            None
        } else {
            Some(unpacked)
        };

        Self::new(reader, props, dict_size, unpacked_size)
    }

    fn byte_back(&self, dist: usize) -> u8 {
        let pos = if self.dict_pos > dist {
            self.dict_pos - dist - 1
        } else {
            self.dict_size - (dist - self.dict_pos) - 1
        };
        self.dict[pos]
    }

    fn put_byte(&mut self, byte: u8, output: &mut Vec<u8>) {
        self.dict[self.dict_pos] = byte;
        self.dict_pos = (self.dict_pos + 1) % self.dict_size;
        output.push(byte);
        self.bytes_decoded += 1;
    }

    fn decode_literal(&mut self, prev_byte: u8, match_byte: u8) -> Result<u8> {
        let probs = self
            .literal
            .subcoder_mut(self.bytes_decoded as u32, prev_byte);

        let mut symbol = 1usize;
        if self.state.is_literal() {
            while symbol < 0x100 {
                let bit = self.rc.decode_bit(&mut probs[symbol])?;
                symbol = (symbol << 1) | bit as usize;
            }
        } else {
            let mut match_byte = match_byte as usize;
            while symbol < 0x100 {
                let match_bit = (match_byte >> 7) & 1;
                match_byte = (match_byte << 1) & 0xFF;
                let index = ((1 + match_bit) << 8) + symbol;
                let bit = self.rc.decode_bit(&mut probs[index])?;
                symbol = (symbol << 1) | bit as usize;
                if match_bit != bit as usize {
                    while symbol < 0x100 {
                        let bit = self.rc.decode_bit(&mut probs[symbol])?;
                        symbol = (symbol << 1) | bit as usize;
                    }
                    break;
                }
            }
        }
        Ok((symbol - 0x100) as u8)
    }

    fn decode_distance(&mut self, len: u32) -> Result<u32> {
        let len_state = len_to_pos_state(len);
        let slot = self
            .rc
            .decode_bit_tree(&mut self.distance.slot[len_state], NUM_POS_SLOT_BITS)?;

        if slot < START_POS_MODEL_INDEX {
            return Ok(slot);
        }

        let footer_bits = (slot >> 1) - 1;
        let base = (2 | (slot & 1)) << footer_bits;

        if slot < END_POS_MODEL_INDEX {
            let footer = self.rc.decode_reverse_bit_tree_span(
                &mut self.distance.special[(base - slot) as usize..],
                footer_bits,
            )?;
            Ok(base + footer)
        } else {
            let direct = self.rc.decode_direct_bits(footer_bits - NUM_ALIGN_BITS)?;
            let align = self
                .rc
                .decode_reverse_bit_tree(&mut self.distance.align, NUM_ALIGN_BITS)?;
            Ok(base
                .wrapping_add(direct << NUM_ALIGN_BITS)
                .wrapping_add(align))
        }
    }

    /// Decode the whole stream.
    pub fn decompress(mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let pos_mask = self.props.pb_mask();

        loop {
            if let Some(size) = self.unpacked_size {
                if self.bytes_decoded >= size {
                    break;
                }
            }

            let pos_state = (self.bytes_decoded as u32 & pos_mask) as usize;
            let state_index = self.state.value();

            if self
                .rc
                .decode_bit(&mut self.is_match[state_index][pos_state])?
                == 0
            {
                let prev_byte = if self.bytes_decoded == 0 {
                    0
                } else {
                    self.byte_back(0)
                };
                let match_byte = if !self.state.is_literal() {
                    self.byte_back(self.reps[0] as usize)
                } else {
                    0
                };
                let byte = self.decode_literal(prev_byte, match_byte)?;
                self.put_byte(byte, &mut output);
                self.state.update_literal();
                continue;
            }

            let len;
            if self.rc.decode_bit(&mut self.is_rep[state_index])? == 0 {
                // plain match: new distance, MRU shifts down
                len = self.match_len.decode(&mut self.rc, pos_state)?;
                let dist = self.decode_distance(len)?;

                self.reps[3] = self.reps[2];
                self.reps[2] = self.reps[1];
                self.reps[1] = self.reps[0];
                self.reps[0] = dist;

                if dist == u32::MAX {
                    // end marker
                    if self.unpacked_size.is_some() {
                        return Err(OzmaError::corrupted(
                            self.bytes_decoded,
                            "end marker inside sized stream",
                        ));
                    }
                    break;
                }
                self.state.update_match();
            } else if self.rc.decode_bit(&mut self.is_rep_g0[state_index])? == 0 {
                if self
                    .rc
                    .decode_bit(&mut self.is_rep0_long[state_index][pos_state])?
                    == 0
                {
                    // length-1 rep0
                    if self.reps[0] as u64 >= self.bytes_decoded
                        || self.reps[0] as usize >= self.dict_size
                    {
                        return Err(OzmaError::corrupted(
                            self.bytes_decoded,
                            "short rep before any history",
                        ));
                    }
                    let byte = self.byte_back(self.reps[0] as usize);
                    self.put_byte(byte, &mut output);
                    self.state.update_short_rep();
                    continue;
                }
                len = self.rep_len.decode(&mut self.rc, pos_state)?;
                self.state.update_rep();
            } else {
                let dist = if self.rc.decode_bit(&mut self.is_rep_g1[state_index])? == 0 {
                    self.reps[1]
                } else if self.rc.decode_bit(&mut self.is_rep_g2[state_index])? == 0 {
                    let d = self.reps[2];
                    self.reps[2] = self.reps[1];
                    d
                } else {
                    let d = self.reps[3];
                    self.reps[3] = self.reps[2];
                    self.reps[2] = self.reps[1];
                    d
                };
                self.reps[1] = self.reps[0];
                self.reps[0] = dist;

                len = self.rep_len.decode(&mut self.rc, pos_state)?;
                self.state.update_rep();
            }

            let dist = self.reps[0];
            if dist as u64 >= self.bytes_decoded || dist as usize >= self.dict_size {
                return Err(OzmaError::corrupted(self.bytes_decoded, "distance too far"));
            }

            let mut remaining = len;
            if let Some(size) = self.unpacked_size {
                let left = size - self.bytes_decoded;
                if (remaining as u64) > left {
                    return Err(OzmaError::corrupted(
                        self.bytes_decoded,
                        "match runs past declared size",
                    ));
                }
            }
            while remaining > 0 {
                let byte = self.byte_back(dist as usize);
                self.put_byte(byte, &mut output);
                remaining -= 1;
            }
        }

        Ok(output)
    }
}

/// Decompress a full LZMA1 container (13-byte header plus payload).
pub fn decompress<R: Read>(reader: R) -> Result<Vec<u8>> {
    LzmaDecoder::from_header(reader)?.decompress()
}

/// Decompress from a byte slice.
pub fn decompress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    decompress(std::io::Cursor::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_header_parsing_rejects_bad_props() {
        // 0xFF cannot decompose into valid (lc, lp, pb)
        let mut data = vec![0xFFu8];
        data.extend_from_slice(&(1u32 << 16).to_le_bytes());
        data.extend_from_slice(&0u64.to_le_bytes());
        data.extend_from_slice(&[0; 5]);
        assert!(matches!(
            LzmaDecoder::from_header(Cursor::new(data)),
            Err(OzmaError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_truncated_header_is_io_error() {
        let data = [0x5Du8, 0, 0];
        assert!(matches!(
            LzmaDecoder::from_header(Cursor::new(&data[..])),
            Err(OzmaError::Io(_))
        ));
    }

    #[test]
    fn test_empty_sized_stream() {
        // header advertising zero bytes followed by a flushed range coder
        let mut data = vec![0x5Du8];
        data.extend_from_slice(&(1u32 << 16).to_le_bytes());
        data.extend_from_slice(&0u64.to_le_bytes());
        data.extend_from_slice(&[0, 0, 0, 0, 0]);
        let out = decompress_bytes(&data).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_nonzero_start_byte_rejected() {
        let mut data = vec![0x5Du8];
        data.extend_from_slice(&(1u32 << 16).to_le_bytes());
        data.extend_from_slice(&1u64.to_le_bytes());
        data.extend_from_slice(&[1, 0, 0, 0, 0]);
        assert!(decompress_bytes(&data).is_err());
    }
}
