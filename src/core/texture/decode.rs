// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Texel decode dispatch
//!
//! Expands N64 TMEM texels into the destination pixel layouts a Glide-style
//! texture unit samples directly. The dispatch table is keyed by
//! `(BitDepth, PixelFormat)` and holds an entry for every combination;
//! combinations the RDP cannot sample resolve to `load_none`, which writes
//! nothing and still reports a format.
//!
//! # Source layout
//!
//! The source is TMEM content as big-endian bytes. Rows start every
//! `line` 64-bit words and hold `wid_64` 64-bit words of texels. Odd rows have
//! the two 32-bit halves of every 64-bit word swapped (the interleave done by
//! LoadBlock), which the decoders undo by XOR-ing the byte offset with 4.
//!
//! # Destination layout
//!
//! Row-major, `real_width` texels per row, little-endian multi-byte texels.
//!
//! | Depth | RGBA       | YUV  | CI          | IA          | I       |
//! |-------|------------|------|-------------|-------------|---------|
//! | 4b    | select     | none | CI          | IA44        | I44     |
//! | 8b    | CI         | none | CI          | IA44        | A8      |
//! | 16b   | ARGB1555   | none | none        | AI88        | none    |
//! | 32b   | ARGB8888   | none | none        | none        | none    |

use serde::{Deserialize, Serialize};

use super::TexelSize;

/// Texel bit depth (tile `siz` field)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitDepth {
    Bits4,
    Bits8,
    Bits16,
    Bits32,
}

impl BitDepth {
    pub const ALL: [BitDepth; 4] = [
        BitDepth::Bits4,
        BitDepth::Bits8,
        BitDepth::Bits16,
        BitDepth::Bits32,
    ];

    /// Table row index
    pub fn index(self) -> usize {
        self as usize
    }

    /// Texels held by one 64-bit TMEM word
    pub fn texels_per_word(self) -> usize {
        match self {
            BitDepth::Bits4 => 16,
            BitDepth::Bits8 => 8,
            BitDepth::Bits16 => 4,
            BitDepth::Bits32 => 2,
        }
    }
}

impl From<u8> for BitDepth {
    /// Convert the 2-bit `siz` field
    fn from(value: u8) -> Self {
        match value & 3 {
            0 => BitDepth::Bits4,
            1 => BitDepth::Bits8,
            2 => BitDepth::Bits16,
            _ => BitDepth::Bits32,
        }
    }
}

/// Texel pixel format (tile `fmt` field)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    Rgba,
    Yuv,
    ColorIndex,
    IntensityAlpha,
    Intensity,
}

impl PixelFormat {
    pub const ALL: [PixelFormat; 5] = [
        PixelFormat::Rgba,
        PixelFormat::Yuv,
        PixelFormat::ColorIndex,
        PixelFormat::IntensityAlpha,
        PixelFormat::Intensity,
    ];

    /// Table column index
    pub fn index(self) -> usize {
        self as usize
    }
}

impl From<u8> for PixelFormat {
    /// Convert the 3-bit `fmt` field (5-7 alias to I, as on hardware)
    fn from(value: u8) -> Self {
        match value & 7 {
            0 => PixelFormat::Rgba,
            1 => PixelFormat::Yuv,
            2 => PixelFormat::ColorIndex,
            3 => PixelFormat::IntensityAlpha,
            _ => PixelFormat::Intensity,
        }
    }
}

/// Destination pixel format reported to the texture unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureFormat {
    /// 1-bit alpha, 5-bit R/G/B
    Argb1555,
    /// 4 bits per channel
    Argb4444,
    /// Alpha in the high nibble, intensity in the low nibble
    AlphaIntensity44,
    /// Alpha in the high byte, intensity in the low byte
    AlphaIntensity88,
    /// 8-bit value sampled as both intensity and alpha
    Alpha8,
    /// 8 bits per channel, stored B, G, R, A
    Argb8888,
}

impl TextureFormat {
    /// Destination texel size
    pub fn texel_size(self) -> TexelSize {
        match self {
            TextureFormat::AlphaIntensity44 | TextureFormat::Alpha8 => TexelSize::Bits8,
            TextureFormat::Argb1555 | TextureFormat::Argb4444 | TextureFormat::AlphaIntensity88 => {
                TexelSize::Bits16
            }
            TextureFormat::Argb8888 => TexelSize::Bits32,
        }
    }
}

/// Texture lookup table used by color-indexed formats
///
/// Entries are native 16-bit TLUT values: RGBA5551 or IA88 (intensity high).
#[derive(Debug, Clone, Copy, Default)]
pub enum Palette<'a> {
    /// TLUT disabled
    #[default]
    None,
    /// RGBA5551 entries
    Rgba16(&'a [u16]),
    /// IA88 entries
    Ia16(&'a [u16]),
}

/// Parameters shared by every decoder
#[derive(Debug, Clone, Copy)]
pub struct DecodeParams<'a> {
    /// Row width in 64-bit TMEM words
    pub wid_64: usize,

    /// Rows to decode
    pub height: usize,

    /// Source row stride in 64-bit TMEM words (0 means `wid_64`)
    pub line: usize,

    /// Destination row stride in texels
    pub real_width: usize,

    /// Palette bank of the tile (4-bit CI selects one of 16 banks)
    pub palette_bank: u8,

    /// Active TLUT
    pub palette: Palette<'a>,
}

/// Decoder signature: `(dst, src, params) -> format written`
pub type DecodeFn = fn(&mut [u8], &[u8], &DecodeParams) -> TextureFormat;

/// One dispatch table entry
#[derive(Clone, Copy)]
pub struct Decoder {
    /// Short name for logging
    pub name: &'static str,

    /// Decode routine
    pub load: DecodeFn,

    /// False for the combinations that resolve to `load_none`
    pub supported: bool,
}

impl std::fmt::Debug for Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("name", &self.name)
            .field("supported", &self.supported)
            .finish()
    }
}

/// `[depth][format]` decoder table
#[derive(Debug, Clone)]
pub struct DecodeTable {
    entries: [[Decoder; 5]; 4],
}

impl Default for DecodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeTable {
    /// Build the table from the exhaustive `(depth, format)` mapping
    pub fn new() -> Self {
        let none = Decoder {
            name: "none",
            load: load_none,
            supported: false,
        };
        let mut entries = [[none; 5]; 4];
        for depth in BitDepth::ALL {
            for format in PixelFormat::ALL {
                entries[depth.index()][format.index()] = decoder_for(depth, format);
            }
        }
        Self { entries }
    }

    /// Look up the decoder for a tile
    pub fn lookup(&self, depth: BitDepth, format: PixelFormat) -> &Decoder {
        &self.entries[depth.index()][format.index()]
    }

    /// Decode a tile with the matching decoder
    pub fn decode(
        &self,
        depth: BitDepth,
        format: PixelFormat,
        dst: &mut [u8],
        src: &[u8],
        params: &DecodeParams,
    ) -> TextureFormat {
        let decoder = self.lookup(depth, format);
        if !decoder.supported {
            log::warn!("No decoder for {:?} {:?}, texture left blank", depth, format);
        }
        log::trace!(
            "Decoding {:?} {:?} with {}: {}x{} words, real_width {}",
            depth,
            format,
            decoder.name,
            params.wid_64,
            params.height,
            params.real_width
        );
        (decoder.load)(dst, src, params)
    }
}

/// Exhaustive mapping; no wildcard so a new variant must be placed explicitly
fn decoder_for(depth: BitDepth, format: PixelFormat) -> Decoder {
    let entry = |name, load: DecodeFn| Decoder {
        name,
        load,
        supported: true,
    };
    let none = Decoder {
        name: "none",
        load: load_none,
        supported: false,
    };

    match (depth, format) {
        (BitDepth::Bits4, PixelFormat::Rgba) => entry("4b select", load_4b_select),
        (BitDepth::Bits4, PixelFormat::Yuv) => none,
        (BitDepth::Bits4, PixelFormat::ColorIndex) => entry("4b CI", load_4b_ci),
        (BitDepth::Bits4, PixelFormat::IntensityAlpha) => entry("4b IA", load_4b_ia),
        (BitDepth::Bits4, PixelFormat::Intensity) => entry("4b I", load_4b_i),
        (BitDepth::Bits8, PixelFormat::Rgba) => entry("8b CI", load_8b_ci),
        (BitDepth::Bits8, PixelFormat::Yuv) => none,
        (BitDepth::Bits8, PixelFormat::ColorIndex) => entry("8b CI", load_8b_ci),
        (BitDepth::Bits8, PixelFormat::IntensityAlpha) => entry("8b IA", load_8b_ia),
        (BitDepth::Bits8, PixelFormat::Intensity) => entry("8b I", load_8b_i),
        (BitDepth::Bits16, PixelFormat::Rgba) => entry("16b RGBA", load_16b_rgba),
        (BitDepth::Bits16, PixelFormat::Yuv) => none,
        (BitDepth::Bits16, PixelFormat::ColorIndex) => none,
        (BitDepth::Bits16, PixelFormat::IntensityAlpha) => entry("16b IA", load_16b_ia),
        (BitDepth::Bits16, PixelFormat::Intensity) => none,
        (BitDepth::Bits32, PixelFormat::Rgba) => entry("32b RGBA", load_32b_rgba),
        (BitDepth::Bits32, PixelFormat::Yuv) => none,
        (BitDepth::Bits32, PixelFormat::ColorIndex) => none,
        (BitDepth::Bits32, PixelFormat::IntensityAlpha) => none,
        (BitDepth::Bits32, PixelFormat::Intensity) => none,
    }
}

/// Unsupported combination: writes nothing
pub fn load_none(_dst: &mut [u8], _src: &[u8], _params: &DecodeParams) -> TextureFormat {
    TextureFormat::Argb1555
}

/// Read byte `offset` of row `row`, undoing the odd-row word swap
#[inline(always)]
fn tmem_byte(src: &[u8], params: &DecodeParams, row: usize, offset: usize) -> u8 {
    let stride = if params.line == 0 {
        params.wid_64
    } else {
        params.line
    };
    let offset = if row & 1 != 0 { offset ^ 4 } else { offset };
    src.get(row * stride * 8 + offset).copied().unwrap_or(0)
}

/// Walk every destination texel of the decoded region
///
/// `write` receives `(dst_texel_bytes, row, texel_index_in_row)`.
#[inline(always)]
fn for_each_texel<F>(dst: &mut [u8], params: &DecodeParams, depth: BitDepth, out: TexelSize, mut write: F)
where
    F: FnMut(&mut [u8], usize, usize),
{
    let bpt = out.bytes();
    let texels = (params.wid_64 * depth.texels_per_word()).min(params.real_width);
    let line_full = params.real_width * bpt;

    for row in 0..params.height {
        for x in 0..texels {
            let at = row * line_full + x * bpt;
            match dst.get_mut(at..at + bpt) {
                Some(texel) => write(texel, row, x),
                None => return,
            }
        }
    }
}

#[inline(always)]
fn nibble(src: &[u8], params: &DecodeParams, row: usize, x: usize) -> u8 {
    let byte = tmem_byte(src, params, row, x >> 1);
    if x & 1 == 0 {
        byte >> 4
    } else {
        byte & 0x0F
    }
}

#[inline(always)]
fn read_u16(src: &[u8], params: &DecodeParams, row: usize, x: usize) -> u16 {
    let hi = tmem_byte(src, params, row, x * 2);
    let lo = tmem_byte(src, params, row, x * 2 + 1);
    u16::from_be_bytes([hi, lo])
}

/// RGBA5551 to ARGB1555 (alpha moves from bit 0 to bit 15)
#[inline(always)]
pub fn rgba5551_to_argb1555(c: u16) -> u16 {
    (c >> 1) | ((c & 1) << 15)
}

/// IA88 (intensity high) to AI88 (alpha high)
#[inline(always)]
pub fn ia88_to_ai88(c: u16) -> u16 {
    c.rotate_left(8)
}

/// Resolve a palette index to a destination texel and its format
#[inline(always)]
fn palette_entry(palette: &Palette, index: usize) -> (u16, TextureFormat) {
    match palette {
        Palette::Rgba16(entries) => (
            rgba5551_to_argb1555(entries.get(index).copied().unwrap_or(0)),
            TextureFormat::Argb1555,
        ),
        Palette::Ia16(entries) => (
            ia88_to_ai88(entries.get(index).copied().unwrap_or(0)),
            TextureFormat::AlphaIntensity88,
        ),
        Palette::None => (0, TextureFormat::Argb1555),
    }
}

fn palette_format(palette: &Palette) -> TextureFormat {
    match palette {
        Palette::Ia16(_) => TextureFormat::AlphaIntensity88,
        Palette::Rgba16(_) | Palette::None => TextureFormat::Argb1555,
    }
}

/// 4-bit RGBA tiles are palette lookups when a TLUT is active, intensity otherwise
pub fn load_4b_select(dst: &mut [u8], src: &[u8], params: &DecodeParams) -> TextureFormat {
    match params.palette {
        Palette::None => load_4b_i(dst, src, params),
        _ => load_4b_ci(dst, src, params),
    }
}

/// 4-bit color index
pub fn load_4b_ci(dst: &mut [u8], src: &[u8], params: &DecodeParams) -> TextureFormat {
    let bank = ((params.palette_bank & 0x0F) as usize) << 4;
    for_each_texel(dst, params, BitDepth::Bits4, TexelSize::Bits16, |texel, row, x| {
        let index = bank | nibble(src, params, row, x) as usize;
        let (value, _) = palette_entry(&params.palette, index);
        texel.copy_from_slice(&value.to_le_bytes());
    });
    palette_format(&params.palette)
}

/// 4-bit intensity/alpha: 3-bit intensity, 1-bit alpha
pub fn load_4b_ia(dst: &mut [u8], src: &[u8], params: &DecodeParams) -> TextureFormat {
    for_each_texel(dst, params, BitDepth::Bits4, TexelSize::Bits8, |texel, row, x| {
        let n = nibble(src, params, row, x);
        let i3 = n >> 1;
        let i = (i3 << 1) | (i3 >> 2);
        let a = if n & 1 != 0 { 0x0F } else { 0x00 };
        texel[0] = (a << 4) | i;
    });
    TextureFormat::AlphaIntensity44
}

/// 4-bit intensity, replicated into alpha
pub fn load_4b_i(dst: &mut [u8], src: &[u8], params: &DecodeParams) -> TextureFormat {
    for_each_texel(dst, params, BitDepth::Bits4, TexelSize::Bits8, |texel, row, x| {
        let n = nibble(src, params, row, x);
        texel[0] = (n << 4) | n;
    });
    TextureFormat::AlphaIntensity44
}

/// 8-bit color index
pub fn load_8b_ci(dst: &mut [u8], src: &[u8], params: &DecodeParams) -> TextureFormat {
    for_each_texel(dst, params, BitDepth::Bits8, TexelSize::Bits16, |texel, row, x| {
        let index = tmem_byte(src, params, row, x) as usize;
        let (value, _) = palette_entry(&params.palette, index);
        texel.copy_from_slice(&value.to_le_bytes());
    });
    palette_format(&params.palette)
}

/// 8-bit intensity/alpha: intensity high nibble, alpha low nibble
pub fn load_8b_ia(dst: &mut [u8], src: &[u8], params: &DecodeParams) -> TextureFormat {
    for_each_texel(dst, params, BitDepth::Bits8, TexelSize::Bits8, |texel, row, x| {
        texel[0] = tmem_byte(src, params, row, x).rotate_left(4);
    });
    TextureFormat::AlphaIntensity44
}

/// 8-bit intensity
pub fn load_8b_i(dst: &mut [u8], src: &[u8], params: &DecodeParams) -> TextureFormat {
    for_each_texel(dst, params, BitDepth::Bits8, TexelSize::Bits8, |texel, row, x| {
        texel[0] = tmem_byte(src, params, row, x);
    });
    TextureFormat::Alpha8
}

/// 16-bit RGBA5551
pub fn load_16b_rgba(dst: &mut [u8], src: &[u8], params: &DecodeParams) -> TextureFormat {
    for_each_texel(dst, params, BitDepth::Bits16, TexelSize::Bits16, |texel, row, x| {
        let value = rgba5551_to_argb1555(read_u16(src, params, row, x));
        texel.copy_from_slice(&value.to_le_bytes());
    });
    TextureFormat::Argb1555
}

/// 16-bit intensity/alpha
pub fn load_16b_ia(dst: &mut [u8], src: &[u8], params: &DecodeParams) -> TextureFormat {
    for_each_texel(dst, params, BitDepth::Bits16, TexelSize::Bits16, |texel, row, x| {
        let value = ia88_to_ai88(read_u16(src, params, row, x));
        texel.copy_from_slice(&value.to_le_bytes());
    });
    TextureFormat::AlphaIntensity88
}

/// 32-bit RGBA8888
pub fn load_32b_rgba(dst: &mut [u8], src: &[u8], params: &DecodeParams) -> TextureFormat {
    for_each_texel(dst, params, BitDepth::Bits32, TexelSize::Bits32, |texel, row, x| {
        let r = tmem_byte(src, params, row, x * 4);
        let g = tmem_byte(src, params, row, x * 4 + 1);
        let b = tmem_byte(src, params, row, x * 4 + 2);
        let a = tmem_byte(src, params, row, x * 4 + 3);
        texel.copy_from_slice(&[b, g, r, a]);
    });
    TextureFormat::Argb8888
}
