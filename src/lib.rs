//! # Product PDF
//!
//! 一个抓取单个电商商品页面并生成可下载 PDF 的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 数据严格单向流动的四段流水线，每段消费一个不可变值、产出一个新值：
//!
//! ### ① 抓取层（Fetch）
//! - `fetch/` - 取回页面原始标记，两种可配置策略
//! - `static_http` - 单次 HTTP GET，适用于静态页面
//! - `rendered` - 无头浏览器渲染后捕获，会话保证清理
//!
//! ### ② 提取层（Extract）
//! - `extract/` - 按声明式规则把 HTML 提取为规范化商品记录
//! - `rules` - 每个字段的选择器规则与兜底值，改选择器不动逻辑
//!
//! ### ③ 排版层（Compose）
//! - `compose` - 纯函数，把商品记录排版为分页的文档计划
//!
//! ### ④ 渲染层（Render）
//! - `render` - 把文档计划序列化为 PDF 字节流，永不因内容失败
//!
//! ## 模块结构

pub mod app;
pub mod compose;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod render;
pub mod utils;

// 重新导出常用类型
pub use app::{run_pipeline, App};
pub use compose::{compose, Block, DocumentPlan, PlanPage, TextStyle};
pub use config::{Config, FetchStrategy};
pub use error::{AppError, AppResult, ExtractionError, FetchError, RenderError};
pub use extract::extract;
pub use fetch::{fetch_document, validate_url};
pub use models::{ProductRecord, SourceDocument};
pub use render::render;
