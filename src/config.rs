/// 页面抓取策略
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchStrategy {
    /// 直接发起一次 HTTP GET，适用于静态页面
    Static,
    /// 启动无头浏览器渲染后再捕获，适用于依赖客户端脚本的页面
    Rendered,
}

impl std::str::FromStr for FetchStrategy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "static" => Ok(FetchStrategy::Static),
            "rendered" => Ok(FetchStrategy::Rendered),
            _ => Err(()),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 页面抓取策略
    pub fetch_strategy: FetchStrategy,
    /// 渲染策略的固定等待时间（毫秒），等待客户端脚本执行完成
    pub settle_ms: u64,
    /// 浏览器可执行文件路径（不设置则由浏览器库自行查找）
    pub chrome_executable: Option<String>,
    /// 是否在文档末尾附加来源 URL 的二维码
    pub include_qr: bool,
    /// PDF 输出目录
    pub output_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch_strategy: FetchStrategy::Static,
            settle_ms: 3000,
            chrome_executable: None,
            include_qr: true,
            output_dir: "output_pdf".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            fetch_strategy: std::env::var("FETCH_STRATEGY").ok().and_then(|v| v.parse().ok()).unwrap_or(default.fetch_strategy),
            settle_ms: std::env::var("RENDER_SETTLE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.settle_ms),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok(),
            include_qr: std::env::var("INCLUDE_QR").ok().and_then(|v| v.parse().ok()).unwrap_or(default.include_qr),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_strategy_from_str() {
        assert_eq!("static".parse::<FetchStrategy>(), Ok(FetchStrategy::Static));
        assert_eq!("Rendered".parse::<FetchStrategy>(), Ok(FetchStrategy::Rendered));
        assert!("other".parse::<FetchStrategy>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.fetch_strategy, FetchStrategy::Static);
        assert_eq!(config.settle_ms, 3000);
        assert!(config.include_qr);
    }
}
