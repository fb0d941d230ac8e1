use super::cell::CellData;
use rayon::prelude::*;

/// Converts a packed RGB pixel buffer into half-block cells.
///
/// The pixel grid is `width x height` with `height` twice the terminal row
/// count; cell (cx, cy) takes pixel row `2*cy` as foreground and `2*cy + 1`
/// as background of a `▀` glyph.
pub struct FrameProcessor {
    pub width: usize,
    pub height: usize,
}

impl FrameProcessor {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn cell_count(&self) -> usize {
        self.width * (self.height / 2)
    }

    pub fn process_frame(&self, pixel_data: &[u8]) -> Vec<CellData> {
        let mut cells = vec![CellData::default(); self.cell_count()];
        self.process_frame_into(pixel_data, &mut cells);
        cells
    }

    pub fn process_frame_into(&self, pixel_data: &[u8], cells: &mut [CellData]) {
        let w = self.width;
        let term_height = self.height / 2;

        if cells.len() != w * term_height {
            return;
        }

        // One rayon task per terminal row; rows are independent.
        cells
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(cy, row)| {
                let top = cy * 2;
                let bottom = cy * 2 + 1;

                let pixel = |x: usize, y: usize| -> (u8, u8, u8) {
                    let offset = (y * w + x) * 3;
                    if offset + 2 < pixel_data.len() {
                        (
                            pixel_data[offset],
                            pixel_data[offset + 1],
                            pixel_data[offset + 2],
                        )
                    } else {
                        (0, 0, 0)
                    }
                };

                for (cx, cell) in row.iter_mut().enumerate() {
                    *cell = CellData {
                        char: '▀',
                        fg: pixel(cx, top),
                        bg: pixel(cx, bottom),
                    };
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_block_pairs_rows() {
        let proc = FrameProcessor::new(2, 4);
        let mut frame = vec![0u8; 2 * 4 * 3];
        // row 0 red, row 1 green, row 2 blue, row 3 yellow
        for x in 0..2 {
            frame[(x) * 3] = 255;
            frame[(2 + x) * 3 + 1] = 255;
            frame[(4 + x) * 3 + 2] = 255;
            frame[(6 + x) * 3] = 255;
            frame[(6 + x) * 3 + 1] = 255;
        }

        let cells = proc.process_frame(&frame);
        assert_eq!(cells.len(), 2 * 2);
        assert_eq!(cells[0].char, '▀');
        assert_eq!(cells[0].fg, (255, 0, 0));
        assert_eq!(cells[0].bg, (0, 255, 0));
        assert_eq!(cells[2].fg, (0, 0, 255));
        assert_eq!(cells[2].bg, (255, 255, 0));
    }

    #[test]
    fn test_short_buffer_pads_black() {
        let proc = FrameProcessor::new(2, 2);
        let cells = proc.process_frame(&[255u8; 3]);
        assert_eq!(cells.len(), 2);
        // first pixel read, everything past the buffer is black
        assert_eq!(cells[0].fg, (255, 255, 255));
        assert_eq!(cells[1].bg, (0, 0, 0));
    }

    #[test]
    fn test_mismatched_cell_buffer_is_left_alone() {
        let proc = FrameProcessor::new(4, 4);
        let mut cells = vec![CellData::default(); 3];
        proc.process_frame_into(&[128u8; 4 * 4 * 3], &mut cells);
        assert!(cells.iter().all(|c| c.char == ' '));
    }
}
