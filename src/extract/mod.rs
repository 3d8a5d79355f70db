//! 字段提取层
//!
//! 将一份松散的 HTML 文档提取为规范化的商品记录。
//! 只有标题是必需字段，其余字段提取不到时按规则降级，
//! 单个元素缺失只影响对应字段，绝不使整条记录作废。

pub mod rules;

use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::fetch;
use crate::models::{ProductRecord, SourceDocument};
use self::rules::SelectorRule;

/// 提取商品记录
///
/// 字段解析是纯同步的；商品图片地址解析出来后再异步下载，
/// 下载失败软降级为无图
pub async fn extract(doc: &SourceDocument) -> AppResult<ProductRecord> {
    let (mut record, image_url) = parse_fields(doc)?;

    if let Some(asset) = image_url {
        if let Some(resolved) = fetch::resolve_asset_url(doc.base_url.as_deref(), &asset) {
            record.image_bytes = fetch::fetch_binary(&resolved).await;
        }
    }

    debug!(
        "提取完成: 标题「{}」, 价格 {}, {} 条卖点, {} 条规格",
        record.title,
        record.price,
        record.highlights.len(),
        record.specifications.len()
    );
    Ok(record)
}

/// 同步解析全部字段，返回记录和待下载的图片地址
///
/// Html 解析树只在本函数内存活
fn parse_fields(doc: &SourceDocument) -> AppResult<(ProductRecord, Option<String>)> {
    let html = Html::parse_document(&doc.html);

    let title = extract_title(&html)?;
    let price = extract_price(&html);
    let highlights = extract_highlights(&html);
    let specifications = extract_specifications(&html);
    let dimensions = extract_dimensions(&html);
    let image_url = extract_image_url(&html);

    let record = ProductRecord {
        title,
        price,
        highlights,
        specifications,
        dimensions,
        image_bytes: None,
        source_url: doc.base_url.clone().unwrap_or_default(),
    };
    Ok((record, image_url))
}

/// 按规则顺序找出第一个文本非空的元素，返回修剪后的文本
fn first_match_text(html: &Html, rule: &SelectorRule) -> Option<String> {
    for selector_str in rule.selectors {
        // 选择器解析失败视为未命中，不中断提取
        let Some(selector) = parse_selector(selector_str) else {
            continue;
        };
        for element in html.select(&selector) {
            let text = element_text(&element);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// 标题：第一个一级标题的文本，缺失则整个提取失败
fn extract_title(html: &Html) -> AppResult<String> {
    first_match_text(html, &rules::TITLE).ok_or_else(|| {
        warn!("页面中找不到一级标题，无法产出有意义的文档");
        AppError::field_missing(rules::TITLE.field)
    })
}

/// 价格：剥离货币符号之前的内容（含符号），修剪空白；缺失用哨兵值
fn extract_price(html: &Html) -> String {
    match first_match_text(html, &rules::PRICE) {
        Some(raw) => clean_price(&raw),
        None => {
            debug!("未找到价格区域，使用哨兵值");
            rules::PRICE_FALLBACK.to_string()
        }
    }
}

/// 剥离最后一个货币符号及其之前的全部内容
fn clean_price(raw: &str) -> String {
    match raw.rfind(rules::PRICE_CURRENCY_GLYPH) {
        Some(idx) => raw[idx + rules::PRICE_CURRENCY_GLYPH.len_utf8()..]
            .trim()
            .to_string(),
        None => raw.trim().to_string(),
    }
}

/// 卖点：收集命中容器内的所有文本节点，逐条修剪、丢弃空行；
/// 容器缺失时整体降级为哨兵文案
fn extract_highlights(html: &Html) -> Vec<String> {
    for selector_str in rules::HIGHLIGHTS.selectors {
        let Some(selector) = parse_selector(selector_str) else {
            continue;
        };
        for element in html.select(&selector) {
            let lines: Vec<String> = element
                .text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            if !lines.is_empty() {
                return lines;
            }
        }
    }
    debug!("未找到卖点区域，使用哨兵文案");
    vec![rules::HIGHLIGHTS_FALLBACK.to_string()]
}

/// 规格：按行规则提取 (标签, 值) 对，保持文档顺序，允许重复标签；
/// 缺少标签或值的行直接跳过。第一个产出至少一对的规则生效
fn extract_specifications(html: &Html) -> Vec<(String, String)> {
    for rule in rules::SPEC_ROWS {
        let (Some(row_sel), Some(label_sel), Some(value_sel)) = (
            parse_selector(rule.row),
            parse_selector(rule.label),
            parse_selector(rule.value),
        ) else {
            continue;
        };

        let mut pairs = Vec::new();
        for row in html.select(&row_sel) {
            let label = row.select(&label_sel).next().map(|e| element_text(&e));
            let value = row.select(&value_sel).next().map(|e| element_text(&e));
            match (label, value) {
                (Some(label), Some(value)) if !label.is_empty() && !value.is_empty() => {
                    pairs.push((label, value));
                }
                _ => {} // 行不完整，跳过
            }
        }
        if !pairs.is_empty() {
            return pairs;
        }
    }
    Vec::new()
}

/// 尺寸：定位包含标记文本的文本节点，取文档顺序上的下一个元素的文本
fn extract_dimensions(html: &Html) -> String {
    let mut marker_seen = false;
    for node in html.root_element().descendants() {
        match node.value() {
            Node::Text(text) if !marker_seen && text.contains(rules::DIMENSIONS_MARKER) => {
                marker_seen = true;
            }
            Node::Element(_) if marker_seen => {
                if let Some(element) = ElementRef::wrap(node) {
                    return element_text(&element);
                }
            }
            _ => {}
        }
    }
    String::new()
}

/// 商品图片地址：读取命中元素的资源属性
fn extract_image_url(html: &Html) -> Option<String> {
    for selector_str in rules::IMAGE.selectors {
        let Some(selector) = parse_selector(selector_str) else {
            continue;
        };
        for element in html.select(&selector) {
            if let Some(src) = element.value().attr(rules::IMAGE_URL_ATTR) {
                let src = src.trim();
                if !src.is_empty() {
                    return Some(src.to_string());
                }
            }
        }
    }
    None
}

/// 元素的全部文本节点拼接后修剪
fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(s) => Some(s),
        Err(_) => {
            warn!("选择器解析失败，视为未命中: {}", selector);
            None
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> SourceDocument {
        SourceDocument::new(html, Some("https://shop.example.com/products/chair".to_string()))
    }

    fn parse(html: &str) -> ProductRecord {
        parse_fields(&doc(html)).expect("提取应该成功").0
    }

    #[test]
    fn test_title_from_first_h1() {
        let record = parse("<html><body><h1>  Florence Armchair </h1><h1>Other</h1></body></html>");
        assert_eq!(record.title, "Florence Armchair");
    }

    #[test]
    fn test_missing_title_is_fatal() {
        let err = parse_fields(&doc("<html><body><p>no heading</p></body></html>")).unwrap_err();
        match err {
            AppError::Extraction(crate::error::ExtractionError::FieldMissing { field }) => {
                assert_eq!(field, "title");
            }
            other => panic!("期望 ExtractionError，实际是 {:?}", other),
        }
    }

    #[test]
    fn test_price_strips_currency_glyph() {
        let record = parse("<h1>T</h1><div class=\"price\">MRP ₹24,999</div>");
        assert_eq!(record.price, "24,999");
    }

    #[test]
    fn test_price_without_glyph_is_trimmed() {
        let record = parse("<h1>T</h1><span class=\"final-price\">  1,299.00  </span>");
        assert_eq!(record.price, "1,299.00");
    }

    #[test]
    fn test_price_rule_priority() {
        // 两种价格区域同时存在时，div.price 优先
        let record = parse(
            "<h1>T</h1><div class=\"price\">₹100</div><span class=\"final-price\">₹200</span>",
        );
        assert_eq!(record.price, "100");
    }

    #[test]
    fn test_price_missing_uses_sentinel() {
        let record = parse("<h1>T</h1>");
        assert_eq!(record.price, "unknown");
    }

    #[test]
    fn test_highlights_collects_trimmed_lines() {
        let record = parse(
            "<h1>T</h1><div id=\"h2-highlight\"><ul>\
             <li> Solid wood frame </li><li>Easy assembly</li></ul></div>",
        );
        assert_eq!(record.highlights, vec!["Solid wood frame", "Easy assembly"]);
    }

    #[test]
    fn test_highlights_fallback_rule() {
        // 第一个规则落空时尝试第二个容器变体
        let record = parse(
            "<h1>T</h1><div class=\"product-features\"><li>Removable cover</li></div>",
        );
        assert_eq!(record.highlights, vec!["Removable cover"]);
    }

    #[test]
    fn test_highlights_missing_uses_sentinel() {
        let record = parse("<h1>T</h1>");
        assert_eq!(record.highlights, vec!["Highlights not found."]);
    }

    #[test]
    fn test_specifications_spec_row_variant() {
        let record = parse(
            "<h1>T</h1><div class=\"spec-section\">\
             <div class=\"spec-row\"><span class=\"spec-label\">Material</span><span class=\"spec-value\">Teak</span></div>\
             <div class=\"spec-row\"><span class=\"spec-label\">Color</span><span class=\"spec-value\">Walnut</span></div>\
             </div>",
        );
        assert_eq!(
            record.specifications,
            vec![
                ("Material".to_string(), "Teak".to_string()),
                ("Color".to_string(), "Walnut".to_string()),
            ]
        );
    }

    #[test]
    fn test_specifications_table_variant() {
        let record = parse(
            "<h1>T</h1><table class=\"specs-table\">\
             <tr><th>Material</th><td>Sheesham</td></tr>\
             <tr><th>Warranty</th><td>3 years</td></tr>\
             </table>",
        );
        assert_eq!(
            record.specifications,
            vec![
                ("Material".to_string(), "Sheesham".to_string()),
                ("Warranty".to_string(), "3 years".to_string()),
            ]
        );
    }

    #[test]
    fn test_specifications_skips_incomplete_rows() {
        let record = parse(
            "<h1>T</h1><div class=\"spec-section\">\
             <div class=\"spec-row\"><span class=\"spec-label\">Orphan label</span></div>\
             <div class=\"spec-row\"><span class=\"spec-label\">Material</span><span class=\"spec-value\">Oak</span></div>\
             </div>",
        );
        assert_eq!(
            record.specifications,
            vec![("Material".to_string(), "Oak".to_string())]
        );
    }

    #[test]
    fn test_specifications_allows_duplicate_labels() {
        let record = parse(
            "<h1>T</h1><table class=\"specs-table\">\
             <tr><th>Material</th><td>Teak</td></tr>\
             <tr><th>Material</th><td>Rattan</td></tr>\
             </table>",
        );
        assert_eq!(record.specifications.len(), 2);
        assert_eq!(record.specifications[0].0, record.specifications[1].0);
    }

    #[test]
    fn test_specifications_missing_is_empty() {
        let record = parse("<h1>T</h1>");
        assert!(record.specifications.is_empty());
    }

    #[test]
    fn test_dimensions_takes_next_element() {
        let record = parse(
            "<h1>T</h1><p><span>Dimensions</span><span>80 x 76 x 94 cm</span></p>",
        );
        assert_eq!(record.dimensions, "80 x 76 x 94 cm");
    }

    #[test]
    fn test_dimensions_marker_is_case_sensitive() {
        let record = parse("<h1>T</h1><p><span>dimensions</span><span>80 cm</span></p>");
        assert_eq!(record.dimensions, "");
    }

    #[test]
    fn test_dimensions_missing_is_empty() {
        let record = parse("<h1>T</h1>");
        assert_eq!(record.dimensions, "");
    }

    #[test]
    fn test_image_url_rule_priority() {
        let html = Html::parse_document(
            "<h1>T</h1><img class=\"product-hero-image\" src=\"/hero.jpg\">\
             <img class=\"product-image\" src=\"/main.jpg\">",
        );
        assert_eq!(extract_image_url(&html).as_deref(), Some("/main.jpg"));
    }

    #[test]
    fn test_image_missing_is_none() {
        let html = Html::parse_document("<h1>T</h1>");
        assert_eq!(extract_image_url(&html), None);
    }

    #[test]
    fn test_source_url_carried_into_record() {
        let record = parse("<h1>T</h1>");
        assert_eq!(record.source_url, "https://shop.example.com/products/chair");
    }

    #[tokio::test]
    async fn test_extract_without_image_needs_no_network() {
        let record = extract(&doc("<h1>Florence Armchair</h1>"))
            .await
            .expect("提取应该成功");
        assert_eq!(record.title, "Florence Armchair");
        assert!(record.image_bytes.is_none());
    }
}
