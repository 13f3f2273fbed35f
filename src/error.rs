use std::path::PathBuf;
use thiserror::Error;

/// 致命错误
///
/// 出现这些错误时整条流水线中止，由 `main` 转换为非零退出码
#[derive(Error, Debug)]
pub enum PressError {
    #[error("无法确定书籍根目录: {0}")]
    RootDir(#[source] std::io::Error),
    #[error("读取配置文件失败 {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("配置文件格式错误 {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("无效的选择器 \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("章节标识重复: {0}")]
    DuplicateChapter(String),
    #[error("无法创建输出目录 {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("写入输出文件失败 {path:?}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 单个章节的可恢复问题
///
/// 出现时只跳过该章节并记录警告，不影响其余章节
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChapterIssue {
    #[error("文件不存在: {0:?}")]
    MissingSource(PathBuf),
    #[error("读取文件 {path:?} 时出错: {reason}")]
    Unreadable { path: PathBuf, reason: String },
    #[error("清理后内容为空: {0:?}")]
    EmptyFragment(PathBuf),
}

pub type Result<T> = std::result::Result<T, PressError>;
