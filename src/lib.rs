pub mod assembler;
pub mod components;
pub mod config;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod renderer;
pub mod styles;
pub mod tokens;
pub mod vocabulary;

pub use assembler::{AssembledDocument, ChapterAssembler, ChapterSpec, SourceLayout};
pub use config::BookConfig;
pub use error::{ChapterIssue, PressError, Result};
pub use extractor::ContentExtractor;
pub use pipeline::{BuildReport, Pipeline};
pub use tokens::{render_tokens_as_css, DesignTokens};

/// 核心入口
///
/// 以当前目录为书籍根目录运行完整流水线。缺失章节只产生警告，
/// 只有配置错误或输出无法写入时返回错误。
pub async fn run() -> Result<BuildReport> {
    let root = std::env::current_dir().map_err(PressError::RootDir)?;
    let config = BookConfig::load(&root)?;

    log::info!("🚀 开始生成现代化书籍...");
    log::info!("📖 处理章节内容...");

    let report = Pipeline::new(&config).generate_async().await?;

    log::info!(
        "✅ 现代化书籍生成完成！收录 {} 个章节，跳过 {} 个",
        report.included.len(),
        report.skipped.len()
    );
    for skipped in &report.skipped {
        log::warn!("未收录: {} - {}", skipped.spec.source, skipped.issue);
    }
    log::info!("📋 使用说明: {:?}", report.usage_note_path);

    Ok(report)
}
