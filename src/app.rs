use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use regex::Regex;
use tracing::{debug, info};

use crate::compose;
use crate::config::Config;
use crate::error::{AppError, AppResult, FileError};
use crate::extract;
use crate::fetch;
use crate::models::ProductRecord;
use crate::render;
use crate::utils::logging::truncate_text;

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);
        Ok(Self { config })
    }

    /// 运行应用主逻辑：取得 URL，执行流水线，落盘 PDF
    pub async fn run(&self) -> Result<()> {
        let url = match std::env::args().nth(1) {
            Some(arg) => arg,
            None => prompt_for_url()?,
        };
        if url.is_empty() {
            anyhow::bail!("未输入 URL，程序结束");
        }

        let (record, pdf_bytes) = run_pipeline(&url, &self.config).await?;
        let output_path = save_pdf(&self.config.output_dir, &record, &pdf_bytes)?;

        print_final_summary(&record, &output_path);
        Ok(())
    }
}

/// 执行完整流水线: 抓取 → 提取 → 排版 → 渲染
///
/// 各阶段严格顺序执行，每一阶段消费上一阶段产出的不可变值
pub async fn run_pipeline(url: &str, config: &Config) -> AppResult<(ProductRecord, Vec<u8>)> {
    let doc = fetch::fetch_document(url, config).await?;

    info!("🔍 正在提取商品字段...");
    let record = extract::extract(&doc).await?;
    info!("✓ 提取完成: {}", truncate_text(&record.title, 60));
    if config.verbose_logging {
        debug!(
            "商品记录: {}",
            serde_json::to_string_pretty(&record).unwrap_or_default()
        );
    }

    info!("📐 正在排版文档...");
    let plan = compose::compose(&record, config.include_qr);
    debug!("排版完成，共 {} 页", plan.pages.len());

    info!("📄 正在渲染 PDF...");
    let pdf_bytes = render::render(&plan)?;

    Ok((record, pdf_bytes))
}

/// 交互式读取商品页面 URL
fn prompt_for_url() -> Result<String> {
    print!("请输入商品页面 URL: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// 将 PDF 写入输出目录，文件名取自净化后的商品标题
fn save_pdf(output_dir: &str, record: &ProductRecord, bytes: &[u8]) -> AppResult<String> {
    fs::create_dir_all(output_dir).map_err(|e| {
        AppError::File(FileError::CreateDirFailed {
            path: output_dir.to_string(),
            source: Box::new(e),
        })
    })?;

    let path = Path::new(output_dir)
        .join(output_filename(&record.title))
        .to_string_lossy()
        .into_owned();
    fs::write(&path, bytes).map_err(|e| AppError::file_write_failed(&path, e))?;
    Ok(path)
}

/// 根据标题生成输出文件名，标题净化后为空则使用带时间戳的默认名
fn output_filename(title: &str) -> String {
    let sanitized = sanitize_filename(title);
    if sanitized.is_empty() {
        format!("product_{}.pdf", chrono::Local::now().format("%Y%m%d_%H%M%S"))
    } else {
        format!("{}.pdf", sanitized)
    }
}

/// 替换文件系统不允许的字符，避免标题直接作为路径时出问题
fn sanitize_filename(title: &str) -> String {
    let illegal = Regex::new(r#"[\\/:*?"<>|\x00-\x1f]"#).unwrap();
    let replaced = illegal.replace_all(title.trim(), "_");
    let cleaned = replaced.trim().trim_matches('.').to_string();
    if cleaned.chars().all(|c| c == '_' || c.is_whitespace()) {
        String::new()
    } else {
        cleaned
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 商品页面 PDF 生成");
    info!("📊 抓取策略: {:?}", config.fetch_strategy);
    info!("📁 输出目录: {}", config.output_dir);
    info!("{}", "=".repeat(60));
}

fn print_final_summary(record: &ProductRecord, output_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 处理完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 商品: {}", truncate_text(&record.title, 60));
    info!("💰 价格: {}", record.price);
    info!("🖼️ 图片: {}", if record.has_image() { "有" } else { "无" });
    info!("{}", "=".repeat(60));
    info!("\nPDF 已保存至: {}", output_path);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_replaces_separators() {
        assert_eq!(
            sanitize_filename("Florence/Armchair: Walnut"),
            "Florence_Armchair_ Walnut"
        );
    }

    #[test]
    fn test_sanitize_filename_keeps_plain_title() {
        assert_eq!(sanitize_filename("Florence Armchair"), "Florence Armchair");
    }

    #[test]
    fn test_sanitize_filename_all_symbols_is_empty() {
        assert_eq!(sanitize_filename("///***"), "");
        assert_eq!(sanitize_filename("   "), "");
    }

    #[test]
    fn test_output_filename_falls_back_to_default() {
        let name = output_filename("///");
        assert!(name.starts_with("product_"));
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn test_output_filename_uses_title() {
        assert_eq!(output_filename("Florence Armchair"), "Florence Armchair.pdf");
    }
}
