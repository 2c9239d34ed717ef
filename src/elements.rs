//! Element implementations that replay a laid-out report onto `genpdf` pages.
//!
//! [`PageCanvas`] draws one page of [`DrawOp`]s per render call and reports `has_more`
//! until every page has been emitted, which makes `genpdf` start a fresh page in
//! between. Positions are converted from PDF points to millimetres at the last moment.
//!
//! `genpdf` strokes every line 1pt wide and has no fill primitive, so solid bands are
//! drawn as a single-pixel image stretched over the band.

use std::path::Path;

use image::GenericImageView;

use genpdf::elements::Image;
use genpdf::error::{Context as _, Error, ErrorKind};
use genpdf::style::{Color, Style};
use genpdf::{render, Element, Mm, Position, RenderResult, Scale, Size};

use crate::layout::{DrawOp, TextOp, TextStyle};
use crate::model::{HorizontalAlignment, Rgb};

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
const POINTS_PER_INCH: f64 = 72.0;

fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Converts PDF points into `genpdf` millimetres.
pub fn mm_from_points(points: f32) -> Mm {
    mm_from_f64(f64::from(points) * MM_PER_INCH / POINTS_PER_INCH)
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

fn estimated_image_size(image: &image::DynamicImage, dpi: f64) -> Size {
    let (px_width, px_height) = image.dimensions();
    let width_mm = MM_PER_INCH * (px_width as f64) / dpi;
    let height_mm = MM_PER_INCH * (px_height as f64) / dpi;
    Size::new(mm_from_f64(width_mm), mm_from_f64(height_mm))
}

/// Loads an image from the given path using the [`image`] crate with descriptive errors.
pub fn decode_image_from_path(path: impl AsRef<Path>) -> Result<image::DynamicImage, Error> {
    let path = path.as_ref();
    let reader = image::io::Reader::open(path)
        .with_context(|| format!("Failed to open image file {}", path.display()))?;
    reader
        .with_guessed_format()
        .context("Unable to determine image format")?
        .decode()
        .with_context(|| format!("Failed to decode image file {}", path.display()))
}

/// Loads the logo at `path`, returning `None` when no file exists there.
///
/// The image is flattened to RGB because `genpdf` cannot embed an alpha channel.
pub fn load_logo(path: impl AsRef<Path>) -> Result<Option<image::DynamicImage>, Error> {
    let path = path.as_ref();
    if !path.is_file() {
        return Ok(None);
    }
    let decoded = decode_image_from_path(path)?;
    Ok(Some(image::DynamicImage::ImageRgb8(decoded.to_rgb8())))
}

/// Renders a laid-out report, one page of draw operations per render call.
pub struct PageCanvas {
    pages: Vec<Vec<DrawOp>>,
    next_page: usize,
    logo: Option<image::DynamicImage>,
}

impl PageCanvas {
    /// Creates a canvas for the given pages. `logo` is drawn for every [`DrawOp::Logo`].
    pub fn new(pages: Vec<Vec<DrawOp>>, logo: Option<image::DynamicImage>) -> Self {
        Self {
            pages,
            next_page: 0,
            logo,
        }
    }

    fn draw(
        &self,
        op: &DrawOp,
        context: &genpdf::Context,
        area: &render::Area<'_>,
        style: Style,
    ) -> Result<(), Error> {
        match op {
            DrawOp::Logo { x, y, width } => self.draw_logo(*x, *y, *width, context, area, style),
            DrawOp::Text(text) => draw_text(text, context, area, style),
            DrawOp::Rule {
                from_x,
                to_x,
                y,
                color: rgb,
            } => {
                draw_rule(area, *from_x, *to_x, *y, *rgb);
                Ok(())
            }
            DrawOp::Band {
                x,
                y,
                width,
                height,
                color: rgb,
            } => fill_band(*x, *y, *width, *height, *rgb, context, area, style),
        }
    }

    fn draw_logo(
        &self,
        x: f32,
        y: f32,
        width: f32,
        context: &genpdf::Context,
        area: &render::Area<'_>,
        style: Style,
    ) -> Result<(), Error> {
        let logo = self.logo.as_ref().ok_or_else(|| {
            Error::new(
                "Layout requested a logo but no logo image was loaded",
                ErrorKind::InvalidData,
            )
        })?;

        let natural = mm_to_f64(estimated_image_size(logo, DEFAULT_IMAGE_DPI).width);
        let mut image = Image::from_dynamic_image(logo.clone())?;
        if natural > f64::EPSILON {
            let scale = mm_to_f64(mm_from_points(width)) / natural;
            image.set_scale(Scale::new(scale, scale));
        }

        let mut logo_area = area.clone();
        logo_area.add_offset(Position::new(mm_from_points(x), mm_from_points(y)));
        let result = image.render(context, logo_area, style)?;
        if result.has_more {
            return Err(Error::new(
                "Logo does not fit into the page header",
                ErrorKind::PageSizeExceeded,
            ));
        }
        Ok(())
    }
}

fn text_style(base: Style, text: &TextStyle) -> Style {
    let mut style = base;
    style.set_font_size(text.size);
    style.set_color(color(text.color));
    if text.bold {
        style.set_bold();
    }
    style
}

fn draw_text(
    text: &TextOp,
    context: &genpdf::Context,
    area: &render::Area<'_>,
    base: Style,
) -> Result<(), Error> {
    let style = text_style(base, &text.style);
    let text_width = style.str_width(&context.font_cache, &text.text);
    let box_width = mm_from_points(text.width);

    let x_offset = match text.alignment {
        HorizontalAlignment::Left => Mm::default(),
        HorizontalAlignment::Center => (box_width - text_width) / 2.0,
        HorizontalAlignment::Right => box_width - text_width,
    };
    let position = Position::new(mm_from_points(text.x) + x_offset, mm_from_points(text.y));

    if area.print_str(&context.font_cache, position, style, &text.text)? {
        Ok(())
    } else {
        Err(Error::new(
            format!("Text '{}' does not fit on the page", text.text),
            ErrorKind::PageSizeExceeded,
        ))
    }
}

fn draw_rule(area: &render::Area<'_>, from_x: f32, to_x: f32, y: f32, rgb: Rgb) {
    area.draw_line(
        vec![
            Position::new(mm_from_points(from_x), mm_from_points(y)),
            Position::new(mm_from_points(to_x), mm_from_points(y)),
        ],
        Style::new().with_color(color(rgb)),
    );
}

/// Solid pixel of `rgb`, the source image of every filled band.
pub fn fill_pixel(rgb: Rgb) -> image::DynamicImage {
    image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        1,
        1,
        image::Rgb([rgb.0, rgb.1, rgb.2]),
    ))
}

#[allow(clippy::too_many_arguments)]
fn fill_band(
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    rgb: Rgb,
    context: &genpdf::Context,
    area: &render::Area<'_>,
    style: Style,
) -> Result<(), Error> {
    let pixel = fill_pixel(rgb);
    let natural = mm_to_f64(estimated_image_size(&pixel, DEFAULT_IMAGE_DPI).width);
    let mut band = Image::from_dynamic_image(pixel)?;
    band.set_dpi(DEFAULT_IMAGE_DPI);
    band.set_scale(Scale::new(
        mm_to_f64(mm_from_points(width)) / natural,
        mm_to_f64(mm_from_points(height)) / natural,
    ));

    let mut band_area = area.clone();
    band_area.add_offset(Position::new(mm_from_points(x), mm_from_points(y)));
    band.render(context, band_area, style)?;
    Ok(())
}

impl Element for PageCanvas {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        let Some(ops) = self.pages.get(self.next_page) else {
            return Ok(result);
        };

        for op in ops {
            self.draw(op, context, &area, style)?;
        }
        self.next_page += 1;

        result.size = area.size();
        result.has_more = self.next_page < self.pages.len();
        Ok(result)
    }
}
