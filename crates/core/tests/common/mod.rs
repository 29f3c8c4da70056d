//! Synthetic page rasters shared by the integration tests.

pub struct Page {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Page {
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![255; (width * height) as usize],
        }
    }

    /// Paint rows `[y, y + thickness)` of columns `[x0, x1)` black.
    pub fn rule(&mut self, x0: u32, x1: u32, y: u32, thickness: u32) -> &mut Self {
        for row in y..y + thickness {
            for x in x0..x1 {
                self.data[(row * self.width + x) as usize] = 0;
            }
        }
        self
    }
}
