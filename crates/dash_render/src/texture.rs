pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub size: (u32, u32),
    pub label: String,
}

impl Texture {
    /// Decode an encoded image (PNG) and upload it as an sRGB RGBA texture.
    /// Images larger than the device's 2D texture limit are rejected.
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
    ) -> Result<Self, String> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| format!("Failed to decode image '{label}': {e}"))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        let max_side = device.limits().max_texture_dimension_2d;
        if !fits_limit(width, height, max_side) {
            return Err(format!(
                "Image '{label}' is {width}x{height}, device limit is {max_side}"
            ));
        }
        Ok(Self::from_rgba8(
            device,
            queue,
            image.as_raw(),
            width,
            height,
            label,
        ))
    }

    /// Solid-color texture, used in place of assets that fail to load.
    /// Each side is clamped to `1..=max_texture_dimension_2d`.
    pub fn solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color: [u8; 4],
        width: u32,
        height: u32,
        label: &str,
    ) -> Result<Self, String> {
        let max_side = device.limits().max_texture_dimension_2d.max(1);
        let width = width.clamp(1, max_side);
        let height = height.clamp(1, max_side);
        let pixels = solid_pixels(color, width, height)?;
        Ok(Self::from_rgba8(device, queue, &pixels, width, height, label))
    }

    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        // Pixel art: nearest filtering, clamp so sheet frames never bleed.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            size: (width, height),
            label: label.to_string(),
        }
    }

    /// Free the GPU allocation now rather than when the last handle drops.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

pub fn fits_limit(width: u32, height: u32, max_side: u32) -> bool {
    width > 0 && height > 0 && width <= max_side && height <= max_side
}

/// RGBA bytes for a `width` x `height` image of one color. The byte count is
/// checked before anything is allocated.
pub fn solid_pixels(color: [u8; 4], width: u32, height: u32) -> Result<Vec<u8>, String> {
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(color.len()))
        .ok_or_else(|| format!("Texture of {width}x{height} is too large"))?;
    Ok(color.iter().copied().cycle().take(len).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_pixels_repeat_color() {
        let pixels = solid_pixels([1, 2, 3, 4], 2, 3).unwrap();
        assert_eq!(pixels.len(), 2 * 3 * 4);
        assert_eq!(&pixels[..8], &[1, 2, 3, 4, 1, 2, 3, 4]);
        assert_eq!(&pixels[20..], &[1, 2, 3, 4]);
    }

    #[test]
    fn solid_pixels_rejects_overflowing_size() {
        assert!(solid_pixels([0; 4], u32::MAX, u32::MAX).is_err());
    }

    #[test]
    fn fits_limit_checks_each_side() {
        assert!(fits_limit(8192, 8192, 8192));
        assert!(fits_limit(1, 1, 2048));
        assert!(!fits_limit(70_000, 70_000, 8192));
        assert!(!fits_limit(4096, 8193, 8192));
        assert!(!fits_limit(0, 16, 8192));
    }
}
