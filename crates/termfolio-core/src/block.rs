#![forbid(unsafe_code)]

//! 8-bit block codec for the binary backdrop.
//!
//! A [`Block`] is one source character re-encoded as eight bit symbols,
//! most significant bit first, followed by a two-cell separator. Blocks are
//! the atomic unit of row content: they are appended and evicted whole.

/// Bit symbols per block.
pub const BITS_PER_BLOCK: usize = 8;

/// Blank cells after every block.
pub const SEPARATOR_WIDTH: usize = 2;

/// Rendered width of one block in terminal cells.
pub const BLOCK_WIDTH: usize = BITS_PER_BLOCK + SEPARATOR_WIDTH;

/// Byte used for characters that do not fit in eight bits.
const SUBSTITUTE: u8 = b'?';

/// Where a block's source character came from.
///
/// The two classes are styled differently when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitSource {
    /// Part of a projected command name.
    Command,
    /// Filler noise.
    Random,
}

/// A single binary digit symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bit {
    Zero,
    One,
}

impl Bit {
    #[inline]
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Zero => '0',
            Self::One => '1',
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_set(self) -> bool {
        matches!(self, Self::One)
    }
}

/// One encoded character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    byte: u8,
    source: BitSource,
}

impl Block {
    /// Encode a character. Code points above 255 encode as `?`.
    #[must_use]
    pub fn encode(ch: char, source: BitSource) -> Self {
        let byte = u8::try_from(u32::from(ch)).unwrap_or(SUBSTITUTE);
        Self { byte, source }
    }

    #[must_use]
    pub const fn from_byte(byte: u8, source: BitSource) -> Self {
        Self { byte, source }
    }

    #[inline]
    #[must_use]
    pub const fn byte(&self) -> u8 {
        self.byte
    }

    #[inline]
    #[must_use]
    pub const fn source(&self) -> BitSource {
        self.source
    }

    /// The eight bit symbols, most significant first.
    #[must_use]
    pub fn bits(&self) -> [Bit; BITS_PER_BLOCK] {
        let mut out = [Bit::Zero; BITS_PER_BLOCK];
        for (i, slot) in out.iter_mut().enumerate() {
            if self.byte & (0x80 >> i) != 0 {
                *slot = Bit::One;
            }
        }
        out
    }

    /// Character this block encodes.
    #[must_use]
    pub fn decode(&self) -> char {
        char::from(self.byte)
    }

    /// Write the block's symbols and separator into `out`.
    pub fn render_into(&self, out: &mut String) {
        for bit in self.bits() {
            out.push(bit.symbol());
        }
        out.extend(std::iter::repeat_n(' ', SEPARATOR_WIDTH));
    }
}

/// Reassemble a byte from eight symbols. Returns `None` for anything that
/// is not exactly eight `0`/`1` characters.
#[must_use]
pub fn decode_symbols(symbols: &str) -> Option<u8> {
    let mut byte = 0u8;
    let mut count = 0usize;
    for ch in symbols.chars() {
        let bit = match ch {
            '0' => 0,
            '1' => 1,
            _ => return None,
        };
        if count == BITS_PER_BLOCK {
            return None;
        }
        byte = (byte << 1) | bit;
        count += 1;
    }
    (count == BITS_PER_BLOCK).then_some(byte)
}

/// Render a sequence of blocks as literal row text.
#[must_use]
pub fn render_row<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> String {
    let mut out = String::new();
    for block in blocks {
        block.render_into(&mut out);
    }
    out
}
