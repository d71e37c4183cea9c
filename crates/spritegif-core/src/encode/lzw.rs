//! Variable-width LZW compression as used by GIF image data.
//!
//! Codes are packed least-significant-bit first and framed as data sub-blocks
//! of at most 255 bytes, preceded by the minimum code size byte and followed by
//! a zero-length terminator block.
//!
//! The string table is an open-addressed hash keyed on `(prefix code, next
//! index)`. Code widths grow from `min_code_size + 1` up to 12 bits; once all
//! 4096 codes are assigned the table is cleared and a Clear code is emitted.

use std::io::{self, Write};

use super::EncodeError;

/// Widest code GIF allows.
pub const MAX_CODE_BITS: u8 = 12;
const MAX_CODES: u16 = 1 << MAX_CODE_BITS;

// 80% occupancy prime
const HASH_SIZE: usize = 5003;
const HASH_SHIFT: u32 = 4;

const MAX_SUB_BLOCK: usize = 255;

/// Reusable LZW compressor for one color depth.
#[derive(Debug, Clone)]
pub struct LzwEncoder {
    color_depth: u8,
    min_code_size: u8,
    hash_keys: Vec<i32>,
    hash_codes: Vec<u16>,
}

impl LzwEncoder {
    /// Create an encoder for indices of `color_depth` bits (1-8).
    ///
    /// The minimum code size written to the stream is `max(2, color_depth)`.
    pub fn new(color_depth: u8) -> Result<Self, EncodeError> {
        if !(1..=8).contains(&color_depth) {
            return Err(EncodeError::InvalidColorDepth(color_depth));
        }
        Ok(Self {
            color_depth,
            min_code_size: color_depth.max(2),
            hash_keys: vec![-1; HASH_SIZE],
            hash_codes: vec![0; HASH_SIZE],
        })
    }

    pub fn color_depth(&self) -> u8 {
        self.color_depth
    }

    pub fn min_code_size(&self) -> u8 {
        self.min_code_size
    }

    /// Compress `indices` into `sink` as a complete GIF image data section.
    ///
    /// Indices are validated before anything is written.
    pub fn encode<W: Write>(&mut self, indices: &[u8], sink: &mut W) -> Result<(), EncodeError> {
        if self.color_depth < 8 {
            let limit = 1u16 << self.color_depth;
            if let Some(&index) = indices.iter().find(|&&i| i as u16 >= limit) {
                return Err(EncodeError::IndexOutOfRange {
                    index,
                    color_depth: self.color_depth,
                });
            }
        }

        self.compress(indices, sink)?;
        Ok(())
    }

    fn compress<W: Write>(&mut self, indices: &[u8], sink: &mut W) -> io::Result<()> {
        self.clear_table();
        sink.write_all(&[self.min_code_size])?;

        let mut out = BlockWriter::new(sink);
        let mut codes = CodeState::new(self.min_code_size);
        codes.output(&mut out, codes.clear_code)?;

        let mut rest = indices.iter();
        let mut ent = match rest.next() {
            Some(&first) => first as u16,
            None => {
                codes.output(&mut out, codes.end_code)?;
                return out.finish();
            }
        };

        for &c in rest {
            let key = ((c as i32) << MAX_CODE_BITS) + ent as i32;
            let slot = match self.lookup(key, c, ent) {
                Lookup::Found(code) => {
                    ent = code;
                    continue;
                }
                Lookup::Vacant(slot) => slot,
            };

            codes.output(&mut out, ent)?;
            ent = c as u16;

            if codes.free_ent < MAX_CODES {
                self.hash_codes[slot] = codes.free_ent;
                self.hash_keys[slot] = key;
                codes.free_ent += 1;
            } else {
                self.clear_table();
                codes.free_ent = codes.clear_code + 2;
                codes.clear_flag = true;
                codes.output(&mut out, codes.clear_code)?;
            }
        }

        codes.output(&mut out, ent)?;
        codes.output(&mut out, codes.end_code)?;
        out.finish()
    }

    fn clear_table(&mut self) {
        self.hash_keys.fill(-1);
    }

    /// Probe for `key`, using secondary hashing on collision.
    fn lookup(&self, key: i32, c: u8, ent: u16) -> Lookup {
        let mut i = ((c as usize) << HASH_SHIFT) ^ ent as usize;
        if self.hash_keys[i] == key {
            return Lookup::Found(self.hash_codes[i]);
        }
        if self.hash_keys[i] >= 0 {
            let disp = if i == 0 { 1 } else { HASH_SIZE - i };
            loop {
                i = if i >= disp { i - disp } else { i + HASH_SIZE - disp };
                if self.hash_keys[i] == key {
                    return Lookup::Found(self.hash_codes[i]);
                }
                if self.hash_keys[i] < 0 {
                    break;
                }
            }
        }
        Lookup::Vacant(i)
    }
}

enum Lookup {
    Found(u16),
    Vacant(usize),
}

/// Code width bookkeeping for one compression run.
struct CodeState {
    init_bits: u8,
    n_bits: u8,
    max_code: u16,
    free_ent: u16,
    clear_flag: bool,
    clear_code: u16,
    end_code: u16,
}

impl CodeState {
    fn new(min_code_size: u8) -> Self {
        let init_bits = min_code_size + 1;
        let clear_code = 1u16 << min_code_size;
        Self {
            init_bits,
            n_bits: init_bits,
            max_code: max_code_for(init_bits),
            free_ent: clear_code + 2,
            clear_flag: false,
            clear_code,
            end_code: clear_code + 1,
        }
    }

    /// Emit a code at the current width, then widen or reset the width if the
    /// table has outgrown it.
    fn output<W: Write>(&mut self, out: &mut BlockWriter<'_, W>, code: u16) -> io::Result<()> {
        out.push(code, self.n_bits)?;

        if self.free_ent > self.max_code || self.clear_flag {
            if self.clear_flag {
                self.n_bits = self.init_bits;
                self.max_code = max_code_for(self.n_bits);
                self.clear_flag = false;
            } else {
                self.n_bits += 1;
                self.max_code = if self.n_bits == MAX_CODE_BITS {
                    MAX_CODES
                } else {
                    max_code_for(self.n_bits)
                };
            }
        }
        Ok(())
    }
}

fn max_code_for(bits: u8) -> u16 {
    (1u16 << bits) - 1
}

/// LSB-first bit packer that frames its output as GIF data sub-blocks.
struct BlockWriter<'w, W: Write> {
    sink: &'w mut W,
    accum: u32,
    bits: u32,
    block: [u8; MAX_SUB_BLOCK],
    block_len: usize,
}

impl<'w, W: Write> BlockWriter<'w, W> {
    fn new(sink: &'w mut W) -> Self {
        Self {
            sink,
            accum: 0,
            bits: 0,
            block: [0; MAX_SUB_BLOCK],
            block_len: 0,
        }
    }

    fn push(&mut self, code: u16, width: u8) -> io::Result<()> {
        self.accum |= (code as u32) << self.bits;
        self.bits += width as u32;
        while self.bits >= 8 {
            self.push_byte(self.accum as u8)?;
            self.accum >>= 8;
            self.bits -= 8;
        }
        Ok(())
    }

    fn push_byte(&mut self, byte: u8) -> io::Result<()> {
        self.block[self.block_len] = byte;
        self.block_len += 1;
        if self.block_len == MAX_SUB_BLOCK {
            self.flush_block()?;
        }
        Ok(())
    }

    fn flush_block(&mut self) -> io::Result<()> {
        if self.block_len > 0 {
            self.sink.write_all(&[self.block_len as u8])?;
            self.sink.write_all(&self.block[..self.block_len])?;
            self.block_len = 0;
        }
        Ok(())
    }

    /// Flush leftover bits and write the block terminator.
    fn finish(mut self) -> io::Result<()> {
        if self.bits > 0 {
            self.push_byte(self.accum as u8)?;
            self.accum = 0;
            self.bits = 0;
        }
        self.flush_block()?;
        self.sink.write_all(&[0])
    }
}


// =============================================================================
// Property-Based Tests
// =============================================================================
