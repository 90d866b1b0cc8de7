use std::borrow::Cow;
use std::path::Path;
use std::rc::Rc;

use image::DynamicImage;
use log::debug;

use crate::engine::error::{ Error, Result };
use crate::engine::gpu::{ Filter, Gpu, PixelFormat, TextureId, TextureUpload, Wrap };

const CHECKER_SIZE: u32 = 4;

#[rustfmt::skip]
static CHECKER: [u8; 16] = [
    255,   0, 255,   0,
      0, 255,   0, 255,
    255,   0, 255,   0,
      0, 255,   0, 255,
];

/// Decoded pixels kept on the CPU until they are uploaded.
///
/// A borrowed raster points at static data and is never freed; an owned one
/// is released with the image.
#[derive(Debug, Clone)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub raster: Cow<'static, [u8]>,
    pub row_align: u8,
}

impl Image {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|e| Error::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let (width, height) = (decoded.width(), decoded.height());
        let (channels, raster) = match decoded {
            DynamicImage::ImageLuma8(buf) => (1, buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => (2, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (3, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (4, buf.into_raw()),
            other => (4, other.to_rgba8().into_raw()),
        };
        if raster.is_empty() {
            return Err(Error::Decode { path: path.to_path_buf(), reason: "no pixel data".to_string() });
        }

        debug!("decoded {:?}: {}x{} with {} channels", path, width, height, channels);
        Self::from_raw(width, height, channels, Cow::Owned(raster), 1)
    }

    pub fn from_raw(
        width: u32,
        height: u32,
        channels: u8,
        raster: Cow<'static, [u8]>,
        row_align: u8
    ) -> Result<Self> {
        if !matches!(row_align, 1 | 2 | 4 | 8) {
            return Err(Error::InvalidArgument(format!("row alignment {row_align} is not 1, 2, 4 or 8")));
        }
        let image = Self { width, height, channels, raster, row_align };
        // The last row needs no padding.
        let needed = match height as usize {
            0 => 0,
            rows => (rows - 1) * image.stride() + width as usize * image.format().components(),
        };
        if image.raster.len() < needed {
            return Err(
                Error::InvalidArgument(
                    format!("raster holds {} bytes, {}x{} needs {}", image.raster.len(), width, height, needed)
                )
            );
        }
        Ok(image)
    }

    /// Black and white placeholder over static memory.
    pub fn checker() -> Self {
        Self {
            width: CHECKER_SIZE,
            height: CHECKER_SIZE,
            channels: 1,
            raster: Cow::Borrowed(&CHECKER),
            row_align: 1,
        }
    }

    pub fn format(&self) -> PixelFormat {
        PixelFormat::from_channels(self.channels)
    }

    /// Bytes per row including alignment padding.
    pub fn stride(&self) -> usize {
        let row = self.width as usize * self.format().components();
        let align = self.row_align.max(1) as usize;
        row.div_ceil(align) * align
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextureOptions {
    pub filter: Filter,
    pub wrap: Wrap,
}

pub struct Texture {
    gpu: Rc<dyn Gpu>,
    id: TextureId,
    width: u32,
    height: u32,
}

impl Texture {
    pub fn new(gpu: &Rc<dyn Gpu>, image: &Image) -> Result<Self> {
        Self::with_options(gpu, image, TextureOptions::default())
    }

    pub fn with_options(gpu: &Rc<dyn Gpu>, image: &Image, options: TextureOptions) -> Result<Self> {
        if image.raster.is_empty() {
            return Err(Error::InvalidArgument("image has no pixel data".to_string()));
        }

        let id = gpu.create_texture().map_err(Error::resource("texture"))?;
        gpu.active_texture(0);
        gpu.bind_texture(Some(id));
        gpu.tex_image_2d(&TextureUpload {
            format: image.format(),
            width: image.width,
            height: image.height,
            row_align: image.row_align,
            pixels: &image.raster,
        });
        gpu.tex_parameters(options.filter, options.wrap);
        gpu.bind_texture(None);

        debug!("texture {:?}: {}x{} {:?}", id, image.width, image.height, image.format());
        Ok(Self { gpu: Rc::clone(gpu), id, width: image.width, height: image.height })
    }

    pub fn dimensions(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn bind(&self, unit: u32) {
        self.gpu.active_texture(unit);
        self.gpu.bind_texture(Some(self.id));
    }

    pub fn unbind(&self) {
        self.gpu.bind_texture(None);
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.gpu.delete_texture(self.id);
    }
}
