use bytemuck::{Pod, Zeroable};

use crate::runtime::TimeSample;
use crate::types::SurfaceSize;

/// Uniform block consumed by the line-field fragment shader. Every member is
/// a vec4 or scalar f32 so the layout has no implicit padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LineUniforms {
    /// `xy` = backing resolution in pixels.
    pub u_resolution: [f32; 4],
    /// `rgb` = line colour, `a` = 1.
    pub u_color: [f32; 4],
    /// `xy` = smoothed pointer in [0, 1]².
    pub u_pointer: [f32; 4],
    pub u_time: f32,
    pub u_amplitude: f32,
    pub u_distance: f32,
    pub u_line_count: f32,
}

impl LineUniforms {
    pub fn new(size: SurfaceSize, color: [f32; 3]) -> Self {
        Self {
            u_resolution: [size.width as f32, size.height as f32, 0.0, 0.0],
            u_color: [color[0], color[1], color[2], 1.0],
            u_pointer: [0.5, 0.5, 0.0, 0.0],
            u_time: 0.0,
            u_amplitude: 0.0,
            u_distance: 0.0,
            u_line_count: 0.0,
        }
    }

    pub fn set_resolution(&mut self, size: SurfaceSize) {
        self.u_resolution[0] = size.width as f32;
        self.u_resolution[1] = size.height as f32;
    }

    pub fn set_color(&mut self, color: [f32; 3]) {
        self.u_color = [color[0], color[1], color[2], 1.0];
    }

    pub fn update_frame(
        &mut self,
        sample: TimeSample,
        pointer: [f32; 2],
        amplitude: f32,
        distance: f32,
        line_count: u32,
    ) {
        self.u_time = sample.seconds;
        self.u_pointer[0] = pointer[0];
        self.u_pointer[1] = pointer[1];
        self.u_amplitude = amplitude;
        self.u_distance = distance;
        self.u_line_count = line_count as f32;
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
