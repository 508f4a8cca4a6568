//! CPU-side sprite mesh built from the world each frame.
//!
//! Quads are emitted back to front: the three parallax layers (two tiles
//! each), then obstacles, then the player. Consecutive quads that share a
//! texture collapse into a single draw call, so a full frame is five
//! `draw_indexed` calls no matter how many obstacles are alive.

use dash_core::Rect;
use dash_render::SpriteVertex;
use glam::Vec2;

use crate::assets::{SheetSizes, TextureId};
use crate::world::{World, LAYER_TEXTURES};

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// A contiguous run of indices that share the same texture binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub texture: TextureId,
    pub index_start: u32,
    pub index_count: u32,
}

pub struct QuadSpec {
    pub texture: TextureId,
    /// Region of the texture in pixels.
    pub source: Rect,
    pub texture_size: Vec2,
    /// Screen-space destination, y down.
    pub dest: Rect,
    pub color: [f32; 4],
}

#[derive(Debug, Default)]
pub struct SpriteBatch {
    pub vertices: Vec<SpriteVertex>,
    pub indices: Vec<u32>,
    pub draw_calls: Vec<DrawCall>,
}

impl SpriteBatch {
    pub fn with_capacity(quads: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(quads * 4),
            indices: Vec::with_capacity(quads * 6),
            draw_calls: Vec::with_capacity(8),
        }
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn push_quad(&mut self, spec: QuadSpec) {
        let tex_w = spec.texture_size.x.max(1.0);
        let tex_h = spec.texture_size.y.max(1.0);
        let u0 = spec.source.x / tex_w;
        let v0 = spec.source.y / tex_h;
        let u1 = spec.source.right() / tex_w;
        let v1 = spec.source.bottom() / tex_h;

        let left = spec.dest.x;
        let top = spec.dest.y;
        let right = spec.dest.right();
        let bottom = spec.dest.bottom();
        let base_index = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&[
            SpriteVertex {
                position: [left, top],
                tex_coords: [u0, v0],
                color: spec.color,
            },
            SpriteVertex {
                position: [right, top],
                tex_coords: [u1, v0],
                color: spec.color,
            },
            SpriteVertex {
                position: [right, bottom],
                tex_coords: [u1, v1],
                color: spec.color,
            },
            SpriteVertex {
                position: [left, bottom],
                tex_coords: [u0, v1],
                color: spec.color,
            },
        ]);

        let draw_start = self.indices.len() as u32;
        self.indices.extend_from_slice(&[
            base_index,
            base_index + 1,
            base_index + 2,
            base_index,
            base_index + 2,
            base_index + 3,
        ]);

        push_draw_call(&mut self.draw_calls, spec.texture, draw_start, 6);
    }
}

/// Append a draw call, merging with the previous one when the texture matches
/// and the indices are contiguous.
pub fn push_draw_call(
    draw_calls: &mut Vec<DrawCall>,
    texture: TextureId,
    index_start: u32,
    index_count: u32,
) {
    if let Some(last) = draw_calls.last_mut() {
        let contiguous = last.index_start + last.index_count == index_start;
        if last.texture == texture && contiguous {
            last.index_count += index_count;
            return;
        }
    }
    draw_calls.push(DrawCall {
        texture,
        index_start,
        index_count,
    });
}

/// Build the frame's mesh. `sizes` are the real dimensions of the bound
/// textures, used to turn pixel source rects into UVs.
pub fn build_world_mesh(world: &World, sizes: &SheetSizes, layer_scale: f32) -> SpriteBatch {
    let mut batch = SpriteBatch::with_capacity(LAYER_TEXTURES.len() * 2 + world.obstacles.len() + 1);

    for (layer, &texture) in world.layers.iter().zip(LAYER_TEXTURES.iter()) {
        let texture_size = sizes.get(texture);
        let source = Rect::from_position(Vec2::ZERO, texture_size);
        let height = texture_size.y * layer_scale;
        for x in layer.tile_positions() {
            batch.push_quad(QuadSpec {
                texture,
                source,
                texture_size,
                dest: Rect::new(x, 0.0, layer.tile_width, height),
                color: WHITE,
            });
        }
    }

    if !world.outcome().draws_sprites() {
        return batch;
    }

    let obstacle_size = sizes.get(TextureId::Obstacle);
    for obstacle in &world.obstacles {
        batch.push_quad(QuadSpec {
            texture: TextureId::Obstacle,
            source: obstacle.anim.source_rect,
            texture_size: obstacle_size,
            dest: obstacle.anim.bounds(),
            color: WHITE,
        });
    }

    batch.push_quad(QuadSpec {
        texture: TextureId::Player,
        source: world.player.anim.source_rect,
        texture_size: sizes.get(TextureId::Player),
        dest: world.player.anim.bounds(),
        color: WHITE,
    });

    batch
}
