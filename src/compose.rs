//! 文档排版层
//!
//! 将商品记录转换为与渲染后端无关的分页文档描述。
//! 纯函数，无 I/O，相同输入永远产出结构相同的排版计划。

use crate::models::ProductRecord;

/// 商品图片的最大宽度（毫米）
const IMAGE_MAX_WIDTH_MM: f64 = 180.0;
/// 商品图片距页面顶部的偏移（毫米）
const IMAGE_TOP_MM: f64 = 20.0;
/// 二维码的固定角落位置与尺寸（毫米）
const QR_X_MM: f64 = 160.0;
const QR_TOP_MM: f64 = 250.0;
const QR_WIDTH_MM: f64 = 30.0;

/// 文本块的样式标签，具体字号和行距由渲染器决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    /// 大号居中标题
    Title,
    /// 价格行
    PriceLine,
    /// 小节标题
    SectionHeading,
    /// 正文
    Body,
}

/// 页面级排版指令
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// 文本块
    Text { content: String, style: TextStyle },
    /// 图片放置：按最大宽度缩放，锚定在页面顶部附近
    Image {
        bytes: Vec<u8>,
        max_width_mm: f64,
        top_mm: f64,
    },
    /// 末尾的二维码块，编码来源 URL，放在固定角落
    QrCode {
        data: String,
        x_mm: f64,
        top_mm: f64,
        width_mm: f64,
    },
}

/// 单个逻辑页面
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanPage {
    pub blocks: Vec<Block>,
}

/// 排版计划：构建一次之后不再变更
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPlan {
    pub pages: Vec<PlanPage>,
}

/// 将商品记录排版为文档计划
///
/// 布局固定不可配置：第一页依次为标题、价格行、卖点小节、规格小节；
/// 仅当带图时存在第二页；二维码按配置追加到最后一页。
/// 内容超出页面的情况由渲染器自然溢出到后续页面处理
pub fn compose(record: &ProductRecord, include_qr: bool) -> DocumentPlan {
    let mut first = PlanPage::default();

    first.blocks.push(Block::Text {
        content: record.title.clone(),
        style: TextStyle::Title,
    });
    first.blocks.push(Block::Text {
        content: format!("Price: {}", record.price),
        style: TextStyle::PriceLine,
    });

    first.blocks.push(Block::Text {
        content: "Highlights".to_string(),
        style: TextStyle::SectionHeading,
    });
    for line in &record.highlights {
        first.blocks.push(Block::Text {
            content: line.clone(),
            style: TextStyle::Body,
        });
    }

    first.blocks.push(Block::Text {
        content: "Specifications".to_string(),
        style: TextStyle::SectionHeading,
    });
    for (label, value) in &record.specifications {
        first.blocks.push(Block::Text {
            content: format!("{}: {}", label, value),
            style: TextStyle::Body,
        });
    }

    let mut pages = vec![first];

    // 仅当带图时才有第二页
    if let Some(bytes) = &record.image_bytes {
        pages.push(PlanPage {
            blocks: vec![Block::Image {
                bytes: bytes.clone(),
                max_width_mm: IMAGE_MAX_WIDTH_MM,
                top_mm: IMAGE_TOP_MM,
            }],
        });
    }

    // 末尾元素：来源 URL 的二维码，追加到最后一页
    if include_qr && !record.source_url.is_empty() {
        if let Some(last) = pages.last_mut() {
            last.blocks.push(Block::QrCode {
                data: record.source_url.clone(),
                x_mm: QR_X_MM,
                top_mm: QR_TOP_MM,
                width_mm: QR_WIDTH_MM,
            });
        }
    }

    DocumentPlan { pages }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ProductRecord {
        ProductRecord {
            title: "Florence Armchair".to_string(),
            price: "24,999".to_string(),
            highlights: vec!["Solid wood frame".to_string(), "Easy assembly".to_string()],
            specifications: vec![("Material".to_string(), "Teak".to_string())],
            dimensions: String::new(),
            image_bytes: None,
            source_url: "https://shop.example.com/products/chair".to_string(),
        }
    }

    #[test]
    fn test_compose_is_deterministic() {
        let record = sample_record();
        assert_eq!(compose(&record, true), compose(&record, true));
    }

    #[test]
    fn test_single_page_without_image() {
        let plan = compose(&sample_record(), false);
        assert_eq!(plan.pages.len(), 1);
    }

    #[test]
    fn test_image_gets_own_page() {
        let mut record = sample_record();
        record.image_bytes = Some(vec![0xFF, 0xD8, 0xFF]);
        let plan = compose(&record, false);
        assert_eq!(plan.pages.len(), 2);
        assert!(matches!(plan.pages[1].blocks[0], Block::Image { .. }));
    }

    #[test]
    fn test_qr_appended_to_last_page() {
        let mut record = sample_record();
        record.image_bytes = Some(vec![0xFF, 0xD8, 0xFF]);
        let plan = compose(&record, true);
        let last_block = plan.pages[1].blocks.last().unwrap();
        match last_block {
            Block::QrCode { data, .. } => assert_eq!(data, &record.source_url),
            other => panic!("期望二维码块，实际是 {:?}", other),
        }
    }

    #[test]
    fn test_qr_disabled_by_flag() {
        let plan = compose(&sample_record(), false);
        let has_qr = plan.pages[0]
            .blocks
            .iter()
            .any(|b| matches!(b, Block::QrCode { .. }));
        assert!(!has_qr);
    }

    #[test]
    fn test_qr_skipped_without_source_url() {
        let mut record = sample_record();
        record.source_url = String::new();
        let plan = compose(&record, true);
        let has_qr = plan.pages[0]
            .blocks
            .iter()
            .any(|b| matches!(b, Block::QrCode { .. }));
        assert!(!has_qr);
    }

    #[test]
    fn test_sentinel_highlight_renders_as_body_text() {
        let mut record = sample_record();
        record.highlights = vec!["Highlights not found.".to_string()];
        let plan = compose(&record, false);
        let found = plan.pages[0].blocks.iter().any(|b| {
            matches!(b, Block::Text { content, style: TextStyle::Body } if content == "Highlights not found.")
        });
        assert!(found);
    }

    #[test]
    fn test_spec_pairs_formatted_as_label_value() {
        let plan = compose(&sample_record(), false);
        let found = plan.pages[0].blocks.iter().any(|b| {
            matches!(b, Block::Text { content, style: TextStyle::Body } if content == "Material: Teak")
        });
        assert!(found);
    }
}
