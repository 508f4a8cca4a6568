use glam::{Mat4, Vec2};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Orthographic camera over a fixed pixel viewport with y growing downward,
/// so world coordinates match screen pixels with the origin at the top-left.
pub struct Camera2D {
    /// World point shown at the center of the viewport.
    pub position: Vec2,
    pub viewport: (u32, u32),
}

impl Camera2D {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            position: Vec2::ZERO,
            viewport: (viewport_width, viewport_height),
        }
    }

    /// Camera whose top-left corner sits at world origin.
    pub fn screen_space(viewport_width: u32, viewport_height: u32) -> Self {
        let mut camera = Self::new(viewport_width, viewport_height);
        camera.position = Vec2::new(viewport_width as f32, viewport_height as f32) * 0.5;
        camera
    }

    pub fn view_proj(&self) -> Mat4 {
        let half_w = self.viewport.0 as f32 * 0.5;
        let half_h = self.viewport.1 as f32 * 0.5;

        // Bottom and top are swapped relative to a y-up camera.
        Mat4::orthographic_rh(
            self.position.x - half_w,
            self.position.x + half_w,
            self.position.y + half_h,
            self.position.y - half_h,
            -1.0,
            1.0,
        )
    }

    pub fn build_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_proj().to_cols_array_2d(),
        }
    }
}
