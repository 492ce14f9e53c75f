use bytemuck::{Pod, Zeroable};

/// Per-draw sprite parameters uploaded to the GPU.
/// Stride = 16 bytes (uniform buffers want 16-byte alignment).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteUniform {
    /// 1.0 = reflect horizontally about the frame's own centre line.
    pub mirror: f32,
    pub _pad: [f32; 3],
}

impl SpriteUniform {
    pub fn new(mirrored: bool) -> Self {
        Self {
            mirror: if mirrored { 1.0 } else { 0.0 },
            _pad: [0.0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_one_vec4() {
        assert_eq!(std::mem::size_of::<SpriteUniform>(), 16);
        assert_eq!(bytemuck::bytes_of(&SpriteUniform::new(true))[..4], 1.0f32.to_ne_bytes());
        assert_eq!(SpriteUniform::new(false).mirror, 0.0);
    }
}
