//! Endlessly scrolling background layers.
//!
//! Each layer is a texture drawn at `scale`, tiled twice side by side. The
//! offset moves left at the layer's speed and wraps by one tile width, so the
//! pair of tiles always covers the screen.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxLayer {
    /// Left edge of the first tile, always in `(-tile_width, 0]`.
    pub offset: f32,
    /// Leftward speed, pixels/s.
    pub speed: f32,
    /// Width of one tile on screen (texture width times scale).
    pub tile_width: f32,
}

impl ParallaxLayer {
    pub fn new(speed: f32, texture_width: f32, scale: f32) -> Self {
        Self {
            offset: 0.0,
            speed,
            tile_width: texture_width * scale,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.tile_width <= 0.0 {
            return;
        }
        self.offset -= self.speed * dt;
        if self.offset <= -self.tile_width {
            self.offset = self.offset.rem_euclid(self.tile_width);
            if self.offset > 0.0 {
                self.offset -= self.tile_width;
            }
        }
    }

    /// X positions of the two tiles.
    pub fn tile_positions(&self) -> [f32; 2] {
        [self.offset, self.offset + self.tile_width]
    }
}
