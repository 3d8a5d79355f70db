//! 字段提取规则
//!
//! 页面结构不可靠且随时可能改版，所有选择器都以声明式规则集中在这里，
//! 调整选择器不需要改动任何提取逻辑。每个字段按优先级依次尝试规则，
//! 第一个命中非空内容的规则生效，全部落空时使用该字段声明的兜底值。

/// 单字段选择器规则：按顺序尝试的 CSS 选择器列表
pub struct SelectorRule {
    pub field: &'static str,
    pub selectors: &'static [&'static str],
}

/// 标题：取第一个一级标题的文本，必需字段，没有兜底值
pub const TITLE: SelectorRule = SelectorRule {
    field: "title",
    selectors: &["h1"],
};

/// 价格区域
pub const PRICE: SelectorRule = SelectorRule {
    field: "price",
    selectors: &["div.price", "span.final-price"],
};

/// 卖点区域
pub const HIGHLIGHTS: SelectorRule = SelectorRule {
    field: "highlights",
    selectors: &["#h2-highlight", "div.product-features"],
};

/// 商品主图
pub const IMAGE: SelectorRule = SelectorRule {
    field: "image",
    selectors: &["img.product-image", "img.product-hero-image"],
};

/// 规格行规则：行选择器 + 行内的标签/值子选择器
pub struct SpecRowRule {
    pub row: &'static str,
    pub label: &'static str,
    pub value: &'static str,
}

/// 规格表的两种页面变体，按优先级排列
pub const SPEC_ROWS: &[SpecRowRule] = &[
    SpecRowRule {
        row: ".spec-section .spec-row",
        label: ".spec-label",
        value: ".spec-value",
    },
    SpecRowRule {
        row: ".specs-table tr",
        label: "th",
        value: "td",
    },
];

/// 价格文本中识别的货币符号，符号之前的内容（含符号本身）会被剥离
pub const PRICE_CURRENCY_GLYPH: char = '₹';

/// 尺寸信息的定位文本（区分大小写），取其后结构上相邻元素的文本
pub const DIMENSIONS_MARKER: &str = "Dimensions";

/// 图片元素上的资源地址属性
pub const IMAGE_URL_ATTR: &str = "src";

/// 价格缺失时的哨兵值
pub const PRICE_FALLBACK: &str = "unknown";

/// 卖点缺失时的哨兵文案
pub const HIGHLIGHTS_FALLBACK: &str = "Highlights not found.";
