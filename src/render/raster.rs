//! Deterministic CPU rasterizer.
//!
//! Produces the flattened export surface from a background source and the
//! visible layers in z order. The same snapshot always renders the same
//! bytes: layer content rasterizes through `vello_cpu` into a scratch
//! surface, shadows are synthesized from that content, and everything is
//! premul-over accumulated onto the output in strict stacking order. Asset
//! resolution happening out of order can never reorder drawing.

use std::sync::Arc;

use kurbo::Affine;

use crate::assets::store::{AssetStore, PreparedImage};
use crate::foundation::error::{AdmixError, AdmixResult};
use crate::model::campaign::Campaign;
use crate::model::layer::{Layer, LayerContent, TextStyle};
use crate::render::color::parse_css_color;
use crate::render::composite::{over_in_place, over_in_place_offset};
use crate::render::config::{RenderConfig, ShadowSpec};
use crate::render::shadow::shadow_for_content;
use crate::render::text::{
    FontLibrary, TextBrushRgba8, TextLayoutEngine, align_dx, line_center_y, parse_font_weight,
};

/// Flattened frame in premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Placement of the background inside the square output: uniformly scaled to
/// the square while preserving aspect, the shorter axis centered. Returns
/// `(x, y, w, h)` in output pixels.
pub fn background_placement(src_w: u32, src_h: u32, out: f64) -> (f64, f64, f64, f64) {
    let aspect = f64::from(src_w) / f64::from(src_h);
    if aspect > 1.0 {
        let bh = out / aspect;
        (0.0, (out - bh) / 2.0, out, bh)
    } else {
        let bw = out * aspect;
        ((out - bw) / 2.0, 0.0, bw, out)
    }
}

/// CPU rasterizer for campaign snapshots.
///
/// Holds the render context, scratch surface and text engine across exports
/// so repeated renders stay allocation-light.
pub struct Rasterizer {
    config: RenderConfig,
    fonts: FontLibrary,
    text_engine: TextLayoutEngine,
    ctx: Option<vello_cpu::RenderContext>,
    scratch: Option<vello_cpu::Pixmap>,
}

impl Rasterizer {
    pub fn new(config: RenderConfig, fonts: FontLibrary) -> Self {
        Self {
            config,
            fonts,
            text_engine: TextLayoutEngine::new(),
            ctx: None,
            scratch: None,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    /// Render a campaign snapshot to a flattened premultiplied frame.
    ///
    /// Any background, layer-image or font source that fails to resolve
    /// aborts the whole render; there is no partial output.
    #[tracing::instrument(skip_all, fields(campaign = %campaign.id, layers = campaign.layers.len()))]
    pub fn render(
        &mut self,
        campaign: &Campaign,
        assets: &mut AssetStore,
    ) -> AdmixResult<FrameRgba> {
        let edge = self.config.output.size;
        let edge_u16 = self.config.output.as_u16();
        let mut out = vec![0u8; (edge as usize) * (edge as usize) * 4];

        let mut pixmap = self.take_scratch(edge_u16);

        let result = (|| -> AdmixResult<()> {
            let bg = assets.resolve(&campaign.background)?;
            clear_pixmap(&mut pixmap);
            self.draw_background(&bg, &mut pixmap)?;
            over_in_place(&mut out, pixmap.data_as_u8_slice(), 1.0)?;

            let mut layers: Vec<&Layer> = campaign.layers.iter().filter(|l| l.visible).collect();
            layers.sort_by_key(|l| l.z_index);

            for layer in layers {
                layer.validate()?;
                clear_pixmap(&mut pixmap);
                let shadow = self.draw_layer(layer, assets, &mut pixmap)?;

                let opacity = layer.opacity.clamp(0.0, 1.0) as f32;
                if let Some(spec) = shadow {
                    let shadow_buf =
                        shadow_for_content(pixmap.data_as_u8_slice(), edge, edge, &spec)?;
                    over_in_place_offset(
                        &mut out,
                        &shadow_buf,
                        edge,
                        edge,
                        spec.offset.x.round() as i32,
                        spec.offset.y.round() as i32,
                        opacity,
                    )?;
                }
                over_in_place(&mut out, pixmap.data_as_u8_slice(), opacity)?;
            }
            Ok(())
        })();

        self.scratch = Some(pixmap);
        result?;

        tracing::debug!(edge, "rendered campaign frame");
        Ok(FrameRgba {
            width: edge,
            height: edge,
            data: out,
        })
    }

    fn take_scratch(&mut self, edge: u16) -> vello_cpu::Pixmap {
        match self.scratch.take() {
            Some(pm) if pm.width() == edge && pm.height() == edge => pm,
            _ => vello_cpu::Pixmap::new(edge, edge),
        }
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> AdmixResult<R>,
    ) -> AdmixResult<R> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn draw_background(
        &mut self,
        bg: &PreparedImage,
        dst: &mut vello_cpu::Pixmap,
    ) -> AdmixResult<()> {
        let out = self.config.output_px();
        let (bx, by, bw, bh) = background_placement(bg.width, bg.height, out);
        let transform = Affine::translate((bx, by))
            * Affine::scale_non_uniform(bw / f64::from(bg.width), bh / f64::from(bg.height));
        let paint = image_paint(bg)?;
        let (w, h) = (f64::from(bg.width), f64::from(bg.height));

        self.with_ctx_mut(dst.width(), dst.height(), |_, ctx| {
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
            ctx.flush();
            ctx.render_to_pixmap(dst);
            Ok(())
        })
    }

    /// Rasterize one layer, centered on its anchor, into `dst`. Returns the
    /// shadow spec to synthesize for it, if any.
    fn draw_layer(
        &mut self,
        layer: &Layer,
        assets: &mut AssetStore,
        dst: &mut vello_cpu::Pixmap,
    ) -> AdmixResult<Option<ShadowSpec>> {
        let anchor_x = self.config.percent_to_px(layer.x);
        let anchor_y = self.config.percent_to_px(layer.y);
        let local = Affine::translate((anchor_x, anchor_y))
            * Affine::rotate(layer.rotation.to_radians())
            * Affine::scale(layer.scale);

        match &layer.content {
            LayerContent::Image { src } | LayerContent::Sticker { src } => {
                let img = assets.resolve(src)?;
                self.draw_image_content(&img, local, dst)?;
                Ok(self
                    .config
                    .image_shadow_enabled
                    .then(|| self.config.image_shadow_px()))
            }
            LayerContent::Text { text, style } => {
                self.draw_text_content(text, style, local, dst)?;
                Ok(style.shadow.then(|| self.config.text_shadow_px()))
            }
        }
    }

    fn draw_image_content(
        &mut self,
        img: &PreparedImage,
        local: Affine,
        dst: &mut vello_cpu::Pixmap,
    ) -> AdmixResult<()> {
        let dw = self.config.image_width_px();
        let dh = dw / img.aspect();
        let k = dw / f64::from(img.width);
        let transform = local * Affine::translate((-dw / 2.0, -dh / 2.0)) * Affine::scale(k);
        let paint = image_paint(img)?;
        let (w, h) = (f64::from(img.width), f64::from(img.height));

        self.with_ctx_mut(dst.width(), dst.height(), |_, ctx| {
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
            ctx.flush();
            ctx.render_to_pixmap(dst);
            Ok(())
        })
    }

    fn draw_text_content(
        &mut self,
        text: &str,
        style: &TextStyle,
        local: Affine,
        dst: &mut vello_cpu::Pixmap,
    ) -> AdmixResult<()> {
        let [r, g, b, a] = parse_css_color(&style.color)?;
        let brush = TextBrushRgba8 { r, g, b, a };
        let weight = parse_font_weight(&style.font_weight)?;
        let font_bytes = self.fonts.resolve(&style.font_family, weight)?;

        let scaled_size = style.font_size * self.config.text_scale();
        if !(scaled_size.is_finite() && scaled_size > 0.0) {
            return Err(AdmixError::validation("text fontSize must be > 0"));
        }
        let line_height = scaled_size * self.config.line_height_factor;

        let lines: Vec<&str> = text.split('\n').collect();
        let line_count = lines.len();

        // Shape every line up front so a bad style aborts before any glyph
        // lands on the surface.
        let mut shaped = Vec::with_capacity(line_count);
        for line in &lines {
            shaped.push(self.text_engine.layout_line(
                line,
                &font_bytes,
                scaled_size as f32,
                brush,
            )?);
        }

        let align = style.text_align;
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes.as_ref().clone()),
            0,
        );

        self.with_ctx_mut(dst.width(), dst.height(), |_, ctx| {
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            for (i, layout) in shaped.iter().enumerate() {
                let Some(first_line) = layout.lines().next() else {
                    continue;
                };
                let metrics = first_line.metrics().clone();
                let ascent = f64::from(metrics.ascent);
                let descent = f64::from(metrics.descent);
                let baseline = f64::from(metrics.baseline);

                // Anchor each line's em middle on its slot center, the
                // canvas "middle" baseline rule.
                let center_y = line_center_y(i, line_count, line_height);
                let target_baseline = center_y + (ascent - descent) / 2.0;
                let dx = align_dx(align, f64::from(layout.width()));
                let line_transform =
                    local * Affine::translate((dx, target_baseline - baseline));
                ctx.set_transform(affine_to_cpu(line_transform));

                for item in first_line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let run_brush = run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        run_brush.r,
                        run_brush.g,
                        run_brush.b,
                        run_brush.a,
                    ));
                    let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
            ctx.flush();
            ctx.render_to_pixmap(dst);
            Ok(())
        })
    }
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn image_paint(img: &PreparedImage) -> AdmixResult<vello_cpu::Image> {
    let w: u16 = img
        .width
        .try_into()
        .map_err(|_| AdmixError::raster("image width exceeds u16"))?;
    let h: u16 = img
        .height
        .try_into()
        .map_err(|_| AdmixError::raster("image height exceeds u16"))?;

    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (img.width as usize) * (img.height as usize),
    );
    for px in img.rgba8_premul.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}
