//! Built-in 5x7 bitmap font covering digits, `.`, `_`, `-`, the capitals used
//! by the status line (`F`, `P`, `S`, `W`), and lowercase letters. Other
//! capitals fold onto their lowercase glyph.

pub const GLYPH_COLUMNS: usize = 5;
pub const GLYPH_ROWS: usize = 7;

/// One character; bit 4 of each row is the leftmost column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    rows: [u8; GLYPH_ROWS],
}

impl Glyph {
    const fn new(rows: [u8; GLYPH_ROWS]) -> Self {
        Self { rows }
    }

    /// Looks up the glyph drawn for `ch`, or `None` for invisible characters.
    pub fn for_char(ch: char) -> Option<&'static Glyph> {
        glyph_index(ch).map(|index| &FONT[index])
    }

    pub fn is_set(&self, row: usize, col: usize) -> bool {
        row < GLYPH_ROWS && col < GLYPH_COLUMNS && self.rows[row] & (1 << (4 - col)) != 0
    }

    /// Number of lit pixels.
    pub fn lit_pixels(&self) -> usize {
        self.rows
            .iter()
            .map(|row| (row & 0x1F).count_ones() as usize)
            .sum()
    }

    /// Lit `(row, col)` positions in row-major order.
    pub fn lit(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..GLYPH_ROWS)
            .flat_map(|row| (0..GLYPH_COLUMNS).map(move |col| (row, col)))
            .filter(|&(row, col)| self.is_set(row, col))
    }
}

fn glyph_index(ch: char) -> Option<usize> {
    let index = match ch {
        '0'..='9' => ch as usize - '0' as usize,
        '.' => 10,
        'F' => 11,
        'P' => 12,
        'S' => 13,
        'W' => 14,
        '_' => 15,
        '-' => 16,
        'a'..='z' => 17 + (ch as usize - 'a' as usize),
        'A'..='Z' => 17 + (ch as usize - 'A' as usize),
        _ => return None,
    };
    Some(index)
}

pub const GLYPH_COUNT: usize = 43;

static FONT: [Glyph; GLYPH_COUNT] = [
    Glyph::new([0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E]), // 0
    Glyph::new([0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E]), // 1
    Glyph::new([0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F]), // 2
    Glyph::new([0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E]), // 3
    Glyph::new([0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02]), // 4
    Glyph::new([0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E]), // 5
    Glyph::new([0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E]), // 6
    Glyph::new([0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08]), // 7
    Glyph::new([0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E]), // 8
    Glyph::new([0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C]), // 9
    Glyph::new([0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C]), // .
    Glyph::new([0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10]), // F
    Glyph::new([0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10]), // P
    Glyph::new([0x0E, 0x11, 0x10, 0x0E, 0x01, 0x11, 0x0E]), // S
    Glyph::new([0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A]), // W
    Glyph::new([0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F]), // _
    Glyph::new([0x00, 0x00, 0x00, 0x0E, 0x00, 0x00, 0x00]), // -
    Glyph::new([0x00, 0x00, 0x0E, 0x01, 0x0F, 0x11, 0x0F]), // a
    Glyph::new([0x10, 0x10, 0x1E, 0x11, 0x11, 0x11, 0x1E]), // b
    Glyph::new([0x00, 0x00, 0x0E, 0x10, 0x10, 0x10, 0x0E]), // c
    Glyph::new([0x01, 0x01, 0x0F, 0x11, 0x11, 0x11, 0x0F]), // d
    Glyph::new([0x00, 0x00, 0x0E, 0x11, 0x1F, 0x10, 0x0E]), // e
    Glyph::new([0x06, 0x09, 0x08, 0x1C, 0x08, 0x08, 0x08]), // f
    Glyph::new([0x00, 0x0F, 0x11, 0x11, 0x0F, 0x01, 0x0E]), // g
    Glyph::new([0x10, 0x10, 0x1E, 0x11, 0x11, 0x11, 0x11]), // h
    Glyph::new([0x04, 0x00, 0x0C, 0x04, 0x04, 0x04, 0x0E]), // i
    Glyph::new([0x02, 0x00, 0x06, 0x02, 0x02, 0x12, 0x0C]), // j
    Glyph::new([0x10, 0x10, 0x12, 0x14, 0x18, 0x14, 0x12]), // k
    Glyph::new([0x0C, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E]), // l
    Glyph::new([0x00, 0x00, 0x1A, 0x15, 0x15, 0x15, 0x15]), // m
    Glyph::new([0x00, 0x00, 0x1E, 0x11, 0x11, 0x11, 0x11]), // n
    Glyph::new([0x00, 0x00, 0x0E, 0x11, 0x11, 0x11, 0x0E]), // o
    Glyph::new([0x00, 0x00, 0x1E, 0x11, 0x1E, 0x10, 0x10]), // p
    Glyph::new([0x00, 0x00, 0x0F, 0x11, 0x0F, 0x01, 0x01]), // q
    Glyph::new([0x00, 0x00, 0x16, 0x19, 0x10, 0x10, 0x10]), // r
    Glyph::new([0x00, 0x00, 0x0E, 0x10, 0x0E, 0x01, 0x1E]), // s
    Glyph::new([0x08, 0x08, 0x1C, 0x08, 0x08, 0x09, 0x06]), // t
    Glyph::new([0x00, 0x00, 0x11, 0x11, 0x11, 0x11, 0x0F]), // u
    Glyph::new([0x00, 0x00, 0x11, 0x11, 0x11, 0x0A, 0x04]), // v
    Glyph::new([0x00, 0x00, 0x11, 0x11, 0x15, 0x15, 0x0A]), // w
    Glyph::new([0x00, 0x00, 0x11, 0x0A, 0x04, 0x0A, 0x11]), // x
    Glyph::new([0x00, 0x00, 0x11, 0x11, 0x0F, 0x01, 0x0E]), // y
    Glyph::new([0x00, 0x00, 0x1F, 0x02, 0x04, 0x08, 0x1F]), // z
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_has_expected_bits() {
        let zero = Glyph::for_char('0').unwrap();
        // 3 + 2 + 3 + 3 + 3 + 2 + 3
        assert_eq!(zero.lit_pixels(), 19);
        assert!(zero.is_set(0, 1));
        assert!(!zero.is_set(0, 0));
        assert_eq!(zero.lit().count(), 19);
    }

    #[test]
    fn status_capitals_have_dedicated_glyphs() {
        assert_ne!(Glyph::for_char('F'), Glyph::for_char('f'));
        assert_ne!(Glyph::for_char('S'), Glyph::for_char('s'));
    }

    #[test]
    fn other_capitals_fold_to_lowercase() {
        for (upper, lower) in ('A'..='Z').zip('a'..='z') {
            if matches!(upper, 'F' | 'P' | 'S' | 'W') {
                continue;
            }
            assert_eq!(Glyph::for_char(upper), Glyph::for_char(lower), "{upper}");
        }
    }

    #[test]
    fn unsupported_characters_are_invisible() {
        for ch in [' ', '/', '!', 'é', '\u{1F600}'] {
            assert!(Glyph::for_char(ch).is_none(), "{ch:?}");
        }
    }

    #[test]
    fn every_symbol_maps_to_a_distinct_glyph_slot() {
        let symbols = ('0'..='9')
            .chain(['.', 'F', 'P', 'S', 'W', '_', '-'])
            .chain('a'..='z');
        let indices: Vec<_> = symbols.filter_map(glyph_index).collect();
        assert_eq!(indices, (0..GLYPH_COUNT).collect::<Vec<_>>());
    }
}
