use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// URL 格式非法（在发起任何网络请求之前检测）
    InvalidUrl { url: String },
    /// 页面抓取错误
    Fetch(FetchError),
    /// 字段提取错误
    Extraction(ExtractionError),
    /// PDF 渲染错误
    Render(RenderError),
    /// 文件操作错误
    File(FileError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidUrl { url } => write!(f, "非法的 URL: {}", url),
            AppError::Fetch(e) => write!(f, "抓取错误: {}", e),
            AppError::Extraction(e) => write!(f, "提取错误: {}", e),
            AppError::Render(e) => write!(f, "渲染错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::InvalidUrl { .. } => None,
            AppError::Fetch(e) => Some(e),
            AppError::Extraction(e) => Some(e),
            AppError::Render(e) => Some(e),
            AppError::File(e) => Some(e),
        }
    }
}

/// 页面抓取错误
#[derive(Debug)]
pub enum FetchError {
    /// 网络请求失败
    RequestFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 服务器返回非 2xx 状态码
    BadStatus { url: String, status: u16 },
    /// 浏览器配置失败
    BrowserConfigFailed { message: String },
    /// 启动无头浏览器失败
    BrowserLaunchFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 创建页面失败
    PageCreationFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 捕获渲染后的页面内容失败
    CaptureFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::RequestFailed { url, source } => {
                write!(f, "请求 {} 失败: {}", url, source)
            }
            FetchError::BadStatus { url, status } => {
                write!(f, "请求 {} 返回状态码 {}", url, status)
            }
            FetchError::BrowserConfigFailed { message } => {
                write!(f, "配置无头浏览器失败: {}", message)
            }
            FetchError::BrowserLaunchFailed { source } => {
                write!(f, "启动无头浏览器失败: {}", source)
            }
            FetchError::PageCreationFailed { url, source } => {
                write!(f, "创建页面并导航到 {} 失败: {}", url, source)
            }
            FetchError::CaptureFailed { source } => {
                write!(f, "捕获页面内容失败: {}", source)
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::RequestFailed { source, .. }
            | FetchError::BrowserLaunchFailed { source }
            | FetchError::PageCreationFailed { source, .. }
            | FetchError::CaptureFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 字段提取错误
///
/// 只有标题缺失才是致命错误，其余字段全部降级为哨兵值
#[derive(Debug)]
pub enum ExtractionError {
    /// 必需字段缺失
    FieldMissing { field: String },
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionError::FieldMissing { field } => {
                write!(f, "无法提取必需字段: {}", field)
            }
        }
    }
}

impl std::error::Error for ExtractionError {}

/// PDF 渲染错误
///
/// 渲染器对任何合法的 DocumentPlan 都不应失败，这里只覆盖
/// 字体注册和最终序列化两个理论上的失败点
#[derive(Debug)]
pub enum RenderError {
    /// 注册内置字体失败
    FontLoadFailed { message: String },
    /// PDF 字节流序列化失败
    PdfWriteFailed { message: String },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::FontLoadFailed { message } => {
                write!(f, "注册内置字体失败: {}", message)
            }
            RenderError::PdfWriteFailed { message } => {
                write!(f, "序列化 PDF 失败: {}", message)
            }
        }
    }
}

impl std::error::Error for RenderError {}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 写入文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 创建目录失败
    CreateDirFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 ({}): {}", path, source)
            }
            FileError::CreateDirFailed { path, source } => {
                write!(f, "创建目录失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::WriteFailed { source, .. } | FileError::CreateDirFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

// ========== 便捷构造函数 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl AppError {
    /// 创建非法 URL 错误
    pub fn invalid_url(url: impl Into<String>) -> Self {
        AppError::InvalidUrl { url: url.into() }
    }

    /// 创建网络请求失败错误
    pub fn request_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Fetch(FetchError::RequestFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建状态码错误
    pub fn bad_status(url: impl Into<String>, status: u16) -> Self {
        AppError::Fetch(FetchError::BadStatus {
            url: url.into(),
            status,
        })
    }

    /// 创建必需字段缺失错误
    pub fn field_missing(field: impl Into<String>) -> Self {
        AppError::Extraction(ExtractionError::FieldMissing {
            field: field.into(),
        })
    }

    /// 创建文件写入失败错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
