//! Screen-space camera over a fixed virtual resolution.
//!
//! The game simulates in 800x600 virtual pixels with the origin at the
//! top-left and y growing downward, matching the integer rect math in the
//! gameplay code. The projection stretches the virtual canvas to whatever the
//! window surface currently is, so gameplay never sees the real window size.

use glam::Mat4;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

pub struct ScreenCamera {
    pub virtual_width: u32,
    pub virtual_height: u32,
}

impl ScreenCamera {
    pub fn new(virtual_width: u32, virtual_height: u32) -> Self {
        Self {
            virtual_width,
            virtual_height,
        }
    }

    pub fn build_uniform(&self) -> CameraUniform {
        // bottom = virtual_height and top = 0 flips the axis so +y is down.
        let proj = Mat4::orthographic_rh(
            0.0,
            self.virtual_width as f32,
            self.virtual_height as f32,
            0.0,
            -1.0,
            1.0,
        );

        CameraUniform {
            view_proj: proj.to_cols_array_2d(),
        }
    }
}
