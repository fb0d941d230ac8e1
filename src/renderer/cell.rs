/// A single terminal character cell.
///
/// Frames are drawn as truecolor half-blocks: one cell covers two vertically
/// stacked pixels, the upper one in the foreground color and the lower one in
/// the background color.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CellData {
    pub char: char,
    pub fg: (u8, u8, u8),
    pub bg: (u8, u8, u8),
}

impl Default for CellData {
    fn default() -> Self {
        Self {
            char: ' ',
            fg: (0, 0, 0),
            bg: (0, 0, 0),
        }
    }
}
