use image::RgbaImage;
use kurbo::Shape;

use crate::codec::mul_div255;
use crate::foundation::core::Rgb;
use crate::foundation::error::{SpecterError, SpecterResult};

/// Vector drawing target backed by a reusable `vello_cpu` context.
///
/// Draw calls accumulate until [`Surface::render_over`] rasterizes them over an opaque background.
pub struct Surface {
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    width: u16,
    height: u16,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> SpecterResult<Self> {
        let w: u16 = width
            .try_into()
            .map_err(|_| SpecterError::validation("surface width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| SpecterError::validation("surface height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Err(SpecterError::validation("surface width/height must be non-zero"));
        }
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            width: w,
            height: h,
        })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// Drop pending draw commands.
    pub fn reset(&mut self) {
        self.ctx.reset();
    }

    pub fn context(&mut self) -> &mut vello_cpu::RenderContext {
        &mut self.ctx
    }

    pub fn fill_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgb) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint(color));
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(x0, y0, x1, y1));
    }

    pub fn fill_rounded_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, radius: f64, color: Rgb) {
        let rr = kurbo::RoundedRect::new(x0, y0, x1, y1, radius);
        let mut p = vello_cpu::kurbo::BezPath::new();
        for el in rr.path_elements(0.1) {
            p.push(el);
        }
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint(color));
        self.ctx.fill_path(&p);
    }

    /// Rasterize pending commands over `background` and return an opaque RGBA image.
    ///
    /// Pending commands are cleared afterwards.
    pub fn render_over(&mut self, background: Rgb) -> RgbaImage {
        self.pixmap.data_as_u8_slice_mut().fill(0);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        self.ctx.reset();

        let bg = [
            u16::from(background.r),
            u16::from(background.g),
            u16::from(background.b),
        ];
        let src = self.pixmap.data_as_u8_slice();
        let mut out = Vec::with_capacity(src.len());
        for px in src.chunks_exact(4) {
            let inv = 255u16 - u16::from(px[3]);
            for c in 0..3 {
                out.push(px[c].saturating_add(mul_div255(bg[c], inv)));
            }
            out.push(255);
        }
        RgbaImage::from_raw(self.width(), self.height(), out)
            .unwrap_or_else(|| RgbaImage::new(self.width(), self.height()))
    }
}

pub(crate) fn paint(color: Rgb) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(color.r, color.g, color.b, 255)
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
