use serde::Serialize;

/// 抓取到的原始页面文档
///
/// 由抓取层创建，提取层消费后即丢弃；`base_url` 用于解析相对资源链接
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub html: String,
    pub base_url: Option<String>,
}

impl SourceDocument {
    pub fn new(html: impl Into<String>, base_url: Option<String>) -> Self {
        Self {
            html: html.into(),
            base_url,
        }
    }
}

/// 规范化后的商品记录
///
/// 不变量：成功产出的记录中 `title` 一定非空；
/// 其余字段在提取失败时全部降级为哨兵值或空值
#[derive(Debug, Clone, Serialize)]
pub struct ProductRecord {
    pub title: String,
    pub price: String,
    pub highlights: Vec<String>,
    /// 规格为有序的 (标签, 值) 对，允许重复标签
    pub specifications: Vec<(String, String)>,
    pub dimensions: String,
    #[serde(skip_serializing)]
    pub image_bytes: Option<Vec<u8>>,
    pub source_url: String,
}

impl ProductRecord {
    /// 是否带有商品图片
    pub fn has_image(&self) -> bool {
        self.image_bytes.is_some()
    }
}
