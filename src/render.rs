//! PDF 渲染层
//!
//! 把排版计划序列化为 PDF 字节流。对任何合法的计划都必须产出文档：
//! 图片解码失败或二维码生成失败只丢弃对应的块，文本内容照常渲染。

use printpdf::image_crate::{self, DynamicImage, GenericImageView, GrayImage};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use qrcode::{Color, QrCode};
use tracing::{debug, warn};

use crate::compose::{Block, DocumentPlan, TextStyle};
use crate::error::{AppError, AppResult, RenderError};

// ========== 版面常量（固定设计值，不随内容变化） ==========

/// A4 纵向
const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_LEFT_MM: f64 = 10.0;
const MARGIN_TOP_MM: f64 = 15.0;
const MARGIN_BOTTOM_MM: f64 = 15.0;
/// 图片按此 DPI 换算物理尺寸
const IMAGE_DPI: f64 = 300.0;
/// 磅转毫米
const PT_TO_MM: f64 = 0.352_778;
/// 内置字体没有精确的字形宽度表，按平均半个字宽估算
const AVG_GLYPH_WIDTH_EM: f64 = 0.5;

/// 每种样式的字号、行距、换行预算
struct StyleMetrics {
    font_size_pt: f64,
    leading_mm: f64,
    wrap_chars: usize,
    bold: bool,
    centered: bool,
}

impl StyleMetrics {
    fn for_style(style: TextStyle) -> Self {
        match style {
            TextStyle::Title => Self {
                font_size_pt: 24.0,
                leading_mm: 15.0,
                wrap_chars: 45,
                bold: true,
                centered: true,
            },
            TextStyle::PriceLine => Self {
                font_size_pt: 16.0,
                leading_mm: 10.0,
                wrap_chars: 70,
                bold: false,
                centered: false,
            },
            TextStyle::SectionHeading => Self {
                font_size_pt: 14.0,
                leading_mm: 12.0,
                wrap_chars: 80,
                bold: true,
                centered: false,
            },
            TextStyle::Body => Self {
                font_size_pt: 11.0,
                leading_mm: 8.0,
                wrap_chars: 95,
                bold: false,
                centered: false,
            },
        }
    }
}

/// 当前页面的书写游标
struct PageCursor {
    layer: PdfLayerReference,
    y_mm: f64,
}

/// 将排版计划渲染为 PDF 字节流
pub fn render(plan: &DocumentPlan) -> AppResult<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        "Product Overview",
        Mm(PAGE_WIDTH_MM as f32),
        Mm(PAGE_HEIGHT_MM as f32),
        "Layer 1",
    );

    let font_regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(|e| {
        AppError::Render(RenderError::FontLoadFailed {
            message: e.to_string(),
        })
    })?;
    let font_bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(|e| {
        AppError::Render(RenderError::FontLoadFailed {
            message: e.to_string(),
        })
    })?;

    for (page_index, page) in plan.pages.iter().enumerate() {
        let layer = if page_index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (p, l) = doc.add_page(Mm(PAGE_WIDTH_MM as f32), Mm(PAGE_HEIGHT_MM as f32), "Layer 1");
            doc.get_page(p).get_layer(l)
        };
        let mut cursor = PageCursor {
            layer,
            y_mm: PAGE_HEIGHT_MM - MARGIN_TOP_MM,
        };

        for block in &page.blocks {
            match block {
                Block::Text { content, style } => {
                    draw_text(&doc, &mut cursor, content, *style, &font_regular, &font_bold);
                }
                Block::Image {
                    bytes,
                    max_width_mm,
                    top_mm,
                } => draw_image(&cursor.layer, bytes, *max_width_mm, *top_mm),
                Block::QrCode {
                    data,
                    x_mm,
                    top_mm,
                    width_mm,
                } => draw_qr(&cursor.layer, data, *x_mm, *top_mm, *width_mm),
            }
        }
    }

    let bytes = doc.save_to_bytes().map_err(|e| {
        AppError::Render(RenderError::PdfWriteFailed {
            message: e.to_string(),
        })
    })?;
    debug!("PDF 渲染完成，共 {} 字节", bytes.len());
    Ok(bytes)
}

/// 写入一个文本块，超出下边距时自然溢出到新页面
fn draw_text(
    doc: &PdfDocumentReference,
    cursor: &mut PageCursor,
    content: &str,
    style: TextStyle,
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    let metrics = StyleMetrics::for_style(style);
    let font = if metrics.bold { bold } else { regular };

    for line in wrap_text(content, metrics.wrap_chars) {
        if cursor.y_mm - metrics.leading_mm < MARGIN_BOTTOM_MM {
            let (p, l) = doc.add_page(Mm(PAGE_WIDTH_MM as f32), Mm(PAGE_HEIGHT_MM as f32), "Layer 1");
            cursor.layer = doc.get_page(p).get_layer(l);
            cursor.y_mm = PAGE_HEIGHT_MM - MARGIN_TOP_MM;
        }
        cursor.y_mm -= metrics.leading_mm;

        let x_mm = if metrics.centered {
            centered_x(&line, metrics.font_size_pt)
        } else {
            MARGIN_LEFT_MM
        };
        cursor
            .layer
            .use_text(line, metrics.font_size_pt as f32, Mm(x_mm as f32), Mm(cursor.y_mm as f32), font);
    }
}

/// 按字符预算折行，超长单词独占一行
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(current);
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// 估算居中起笔位置，估不准时退回左边距
fn centered_x(text: &str, font_size_pt: f64) -> f64 {
    let width_mm = text.chars().count() as f64 * font_size_pt * AVG_GLYPH_WIDTH_EM * PT_TO_MM;
    let x = (PAGE_WIDTH_MM - width_mm) / 2.0;
    x.max(MARGIN_LEFT_MM)
}

/// 解码并放置商品图片，解码失败时丢弃该块
fn draw_image(layer: &PdfLayerReference, bytes: &[u8], max_width_mm: f64, top_mm: f64) {
    let decoded = match image_crate::load_from_memory(bytes) {
        Ok(img) => DynamicImage::ImageRgb8(img.to_rgb8()),
        Err(e) => {
            warn!("图片解码失败，跳过图片块: {}", e);
            return;
        }
    };
    place_image(layer, decoded, MARGIN_LEFT_MM, top_mm, max_width_mm);
}

/// 生成并放置二维码，生成失败时丢弃该块
fn draw_qr(layer: &PdfLayerReference, data: &str, x_mm: f64, top_mm: f64, width_mm: f64) {
    let Some(bitmap) = qr_bitmap(data) else {
        return;
    };
    place_image(layer, bitmap, x_mm, top_mm, width_mm);
}

/// 把二维码模块矩阵画成灰度位图：每模块 4 像素，外围 4 模块静区
fn qr_bitmap(data: &str) -> Option<DynamicImage> {
    const MODULE_PX: usize = 4;
    const QUIET_MODULES: usize = 4;

    let code = match QrCode::new(data.as_bytes()) {
        Ok(c) => c,
        Err(e) => {
            warn!("生成二维码失败: {}", e);
            return None;
        }
    };

    let width = code.width();
    let colors = code.to_colors();
    let total_px = (width + QUIET_MODULES * 2) * MODULE_PX;
    let mut pixels = vec![255u8; total_px * total_px];

    for (index, color) in colors.iter().enumerate() {
        if *color == Color::Dark {
            let module_x = (index % width + QUIET_MODULES) * MODULE_PX;
            let module_y = (index / width + QUIET_MODULES) * MODULE_PX;
            for dy in 0..MODULE_PX {
                for dx in 0..MODULE_PX {
                    pixels[(module_y + dy) * total_px + module_x + dx] = 0;
                }
            }
        }
    }

    let gray = GrayImage::from_raw(total_px as u32, total_px as u32, pixels)?;
    Some(DynamicImage::ImageLuma8(gray))
}

/// 将位图缩放到目标宽度并放到页面上，坐标以页面顶部偏移给出
fn place_image(
    layer: &PdfLayerReference,
    image: DynamicImage,
    x_mm: f64,
    top_mm: f64,
    target_width_mm: f64,
) {
    let (px_w, px_h) = image.dimensions();
    if px_w == 0 || px_h == 0 {
        warn!("位图尺寸为零，跳过");
        return;
    }
    let natural_w_mm = px_w as f64 * 25.4 / IMAGE_DPI;
    let natural_h_mm = px_h as f64 * 25.4 / IMAGE_DPI;
    let scale = target_width_mm / natural_w_mm;
    // PDF 坐标原点在左下角，按顶部偏移换算
    let y_mm = PAGE_HEIGHT_MM - top_mm - natural_h_mm * scale;

    let pdf_image = Image::from_dynamic_image(&image);
    pdf_image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x_mm as f32)),
            translate_y: Some(Mm(y_mm as f32)),
            scale_x: Some(scale as f32),
            scale_y: Some(scale as f32),
            dpi: Some(IMAGE_DPI as f32),
            ..Default::default()
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::PlanPage;

    fn text_page() -> PlanPage {
        PlanPage {
            blocks: vec![
                Block::Text {
                    content: "Florence Armchair".to_string(),
                    style: TextStyle::Title,
                },
                Block::Text {
                    content: "Price: 24,999".to_string(),
                    style: TextStyle::PriceLine,
                },
                Block::Text {
                    content: "Highlights".to_string(),
                    style: TextStyle::SectionHeading,
                },
                Block::Text {
                    content: "Highlights not found.".to_string(),
                    style: TextStyle::Body,
                },
            ],
        }
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let plan = DocumentPlan {
            pages: vec![text_page()],
        };
        let bytes = render(&plan).expect("渲染不应失败");
        assert!(!bytes.is_empty());
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_drops_corrupt_image_but_keeps_text() {
        let mut page = text_page();
        page.blocks.push(Block::Image {
            bytes: vec![0x00, 0x01, 0x02, 0x03],
            max_width_mm: 180.0,
            top_mm: 20.0,
        });
        let plan = DocumentPlan { pages: vec![page] };
        let bytes = render(&plan).expect("损坏的图片不应导致渲染失败");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_with_qr_block() {
        let mut page = text_page();
        page.blocks.push(Block::QrCode {
            data: "https://shop.example.com/products/chair".to_string(),
            x_mm: 160.0,
            top_mm: 250.0,
            width_mm: 30.0,
        });
        let plan = DocumentPlan { pages: vec![page] };
        let bytes = render(&plan).expect("渲染不应失败");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_overflows_to_continuation_page() {
        let mut page = text_page();
        for i in 0..200 {
            page.blocks.push(Block::Text {
                content: format!("Body line {}", i),
                style: TextStyle::Body,
            });
        }
        let plan = DocumentPlan { pages: vec![page] };
        let bytes = render(&plan).expect("溢出不应导致渲染失败");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_wrap_text_splits_at_limit() {
        let lines = wrap_text("one two three four five", 9);
        assert_eq!(lines, vec!["one two", "three", "four five"]);
    }

    #[test]
    fn test_wrap_text_empty_input() {
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }

    #[test]
    fn test_centered_x_never_left_of_margin() {
        let long = "x".repeat(300);
        assert_eq!(centered_x(&long, 24.0), MARGIN_LEFT_MM);
        assert!(centered_x("short", 24.0) > MARGIN_LEFT_MM);
    }

    #[test]
    fn test_qr_bitmap_square_with_quiet_zone() {
        let bitmap = qr_bitmap("https://shop.example.com").expect("二维码生成不应失败");
        let (w, h) = bitmap.dimensions();
        assert_eq!(w, h);
        // 至少包含静区的 8 个模块
        assert!(w > 8 * 4);
    }
}
