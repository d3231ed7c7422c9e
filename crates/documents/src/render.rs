//! PDF output via `printpdf`.

use std::io::BufWriter;

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color as PdfColor, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rect, Rgb,
};
use thiserror::Error;

use crate::layout::{Align, Color, Document, DrawOp, Font, text_width};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("pdf font error: {0}")]
    Font(String),

    #[error("pdf write error: {0}")]
    Write(String),
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, font: Font) -> &IndirectFontRef {
        match font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
        }
    }
}

fn pdf_color(color: Color) -> PdfColor {
    PdfColor::Rgb(Rgb::new(
        f32::from(color.r) / 255.0,
        f32::from(color.g) / 255.0,
        f32::from(color.b) / 255.0,
        None,
    ))
}

/// Render a laid-out document into PDF bytes.
pub fn render_pdf(doc: &Document) -> Result<Vec<u8>, RenderError> {
    let width = Mm(doc.size.width);
    let height = Mm(doc.size.height);
    let (pdf, first_page, first_layer) = PdfDocument::new(doc.title.as_str(), width, height, "Layer 1");

    let fonts = Fonts {
        regular: pdf
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Font(e.to_string()))?,
        bold: pdf
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Font(e.to_string()))?,
    };

    for (index, page) in doc.pages.iter().enumerate() {
        let layer = if index == 0 {
            pdf.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_idx, layer_idx) = pdf.add_page(width, height, format!("Layer {}", index + 1));
            pdf.get_page(page_idx).get_layer(layer_idx)
        };
        for op in &page.ops {
            draw(&layer, &fonts, doc.size.height, op);
        }
    }

    let mut writer = BufWriter::new(Vec::<u8>::new());
    pdf.save(&mut writer).map_err(|e| RenderError::Write(e.to_string()))?;
    let bytes = writer.into_inner().map_err(|e| RenderError::Write(e.to_string()))?;

    tracing::debug!(pages = doc.pages.len(), bytes = bytes.len(), "rendered pdf");
    Ok(bytes)
}

/// Layout coordinates grow downwards; PDF coordinates grow upwards.
fn draw(layer: &PdfLayerReference, fonts: &Fonts, page_height: f32, op: &DrawOp) {
    match op {
        DrawOp::Text {
            text,
            x,
            y,
            size,
            font,
            color,
            align,
        } => {
            let width = text_width(text, *font, *size);
            let left = match align {
                Align::Left => *x,
                Align::Center => *x - width / 2.0,
                Align::Right => *x - width,
            };
            layer.set_fill_color(pdf_color(*color));
            layer.use_text(text.as_str(), *size, Mm(left), Mm(page_height - *y), fonts.get(*font));
        }
        DrawOp::FillRect {
            x,
            y,
            width,
            height,
            color,
        } => {
            layer.set_fill_color(pdf_color(*color));
            let rect = Rect::new(
                Mm(*x),
                Mm(page_height - (*y + *height)),
                Mm(*x + *width),
                Mm(page_height - *y),
            )
            .with_mode(PaintMode::Fill);
            layer.add_rect(rect);
        }
        DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            thickness,
            color,
        } => {
            layer.set_outline_color(pdf_color(*color));
            layer.set_outline_thickness(*thickness / 25.4 * 72.0);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(*x1), Mm(page_height - *y1)), false),
                    (Point::new(Mm(*x2), Mm(page_height - *y2)), false),
                ],
                is_closed: false,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageSize;

    #[test]
    fn renders_every_page() {
        let mut doc = Document::new("Test", PageSize::A4);
        doc.current().ops.push(DrawOp::Text {
            text: "Hello".into(),
            x: 25.0,
            y: 25.0,
            size: 12.0,
            font: Font::Bold,
            color: Color::BLACK,
            align: Align::Left,
        });
        doc.add_page();
        doc.current().ops.push(DrawOp::FillRect {
            x: 25.0,
            y: 25.0,
            width: 50.0,
            height: 10.0,
            color: Color::rgb(41, 128, 185),
        });

        let bytes = render_pdf(&doc).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }
}
