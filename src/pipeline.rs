//! 生成流水线
//!
//! 组装章节 → 渲染 CSS 与文档 → 原子写入 HTML 和使用说明

use crate::assembler::{AssembledDocument, ChapterAssembler, SkippedChapter};
use crate::config::BookConfig;
use crate::error::Result;
use crate::extractor::ContentExtractor;
use crate::renderer::{render, write_atomic, DocumentParts};
use crate::styles::{component_css, print_css, typography_css};
use crate::tokens::render_tokens_as_css;
use crate::vocabulary::collect_word_cards;
use chrono::{DateTime, Local};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// 一次生成的结果摘要
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub output_path: PathBuf,
    pub usage_note_path: PathBuf,
    /// 已收录章节的标识，按打印顺序
    pub included: Vec<String>,
    pub skipped: Vec<SkippedChapter>,
    pub word_cards: usize,
    /// HTML 内容的 SHA256
    pub digest: String,
}

/// 生成流水线
pub struct Pipeline<'a> {
    config: &'a BookConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a BookConfig) -> Self {
        Self { config }
    }

    fn assembler(&self) -> Result<ChapterAssembler> {
        let extractor = ContentExtractor::new(self.config.unwanted_selectors.as_slice())?;
        Ok(ChapterAssembler::new(self.config.layout(), extractor)
            .with_asset_paths(self.config.asset_paths)
            .with_style_sources(self.config.style_sources.clone()))
    }

    /// 把组装结果渲染为完整 HTML
    pub fn build_html(&self, doc: &AssembledDocument) -> String {
        let token_css = render_tokens_as_css(&self.config.tokens);
        let print_css = print_css(&self.config.page);

        let mut component = component_css().to_string();
        if !doc.harvested_styles.is_empty() {
            component.push_str("\n/* 章节样式 */\n");
            for css in &doc.harvested_styles {
                component.push_str(css.trim());
                component.push('\n');
            }
        }

        render(&DocumentParts {
            title: &self.config.title,
            lang: &self.config.lang,
            token_css: &token_css,
            typography_css: typography_css(),
            print_css: &print_css,
            component_css: &component,
            fragments: doc.fragments(),
        })
    }

    /// 顺序读取章节并生成
    pub fn generate(&self) -> Result<BuildReport> {
        let specs = self.config.chapter_specs()?;
        let doc = self.assembler()?.assemble(&specs);
        self.finish(doc)
    }

    /// 按配置选择并发或顺序读取后生成，两种方式输出一致
    pub async fn generate_async(&self) -> Result<BuildReport> {
        let specs = self.config.chapter_specs()?;
        let assembler = self.assembler()?;
        let doc = if self.config.concurrent_reads {
            assembler.assemble_concurrent(&specs).await
        } else {
            assembler.assemble(&specs)
        };
        self.finish(doc)
    }

    fn finish(&self, doc: AssembledDocument) -> Result<BuildReport> {
        log::info!("🎨 生成设计系统...");
        let html = self.build_html(&doc);

        let output_path = self.config.output_path();
        write_atomic(&output_path, &html)?;
        log::info!("📄 输出文件: {:?}", output_path);

        let mut hasher = Sha256::new();
        hasher.update(html.as_bytes());
        let digest = format!("{:x}", hasher.finalize());

        let report = BuildReport {
            usage_note_path: self.config.usage_note_path(),
            output_path,
            included: doc.chapters.iter().map(|c| c.spec.id.clone()).collect(),
            skipped: doc.skipped,
            word_cards: collect_word_cards(&html).len(),
            digest,
        };

        let note = usage_note(self.config, &report, Local::now());
        write_atomic(&report.usage_note_path, &note)?;

        Ok(report)
    }
}

/// 生成使用说明（Markdown）
///
/// 末尾带生成时间，因此每次生成内容都可能不同
pub fn usage_note(
    config: &BookConfig,
    report: &BuildReport,
    generated_at: DateTime<Local>,
) -> String {
    let mut md = String::new();
    let (width, height) = config.page.format.dimensions_mm();

    md.push_str(&format!("# {}\n\n", config.title));
    md.push_str("## 🚀 特性\n\n");
    md.push_str("- **设计系统**: 基于 Design Tokens 的 CSS 自定义属性\n");
    md.push_str("- **双重排版**: 屏幕预览与打印样式分别优化\n");
    md.push_str(&format!(
        "- **专业打印**: {}mm × {}mm 开本，左右页镜像边距，页眉与页码\n\n",
        width, height
    ));

    md.push_str("## 🎨 设计系统\n\n");
    let listed = config
        .tokens
        .categories
        .iter()
        .filter(|c| c.prefix == "color" || c.prefix == "font");
    for category in listed {
        let label = category.label.as_deref().unwrap_or(&category.prefix);
        md.push_str(&format!("### {}\n\n", label));
        for token in &category.entries {
            md.push_str(&format!(
                "- `--{}-{}`: {}\n",
                category.prefix, token.name, token.value
            ));
        }
        md.push('\n');
    }

    md.push_str("## 📚 章节\n\n");
    md.push_str("| 顺序 | 章节 | 状态 |\n|---|---|---|\n");
    for (index, id) in report.included.iter().enumerate() {
        md.push_str(&format!("| {} | {} | 已收录 |\n", index + 1, id));
    }
    for skipped in &report.skipped {
        md.push_str(&format!("| - | {} | 已跳过：{} |\n", skipped.spec.id, skipped.issue));
    }
    md.push('\n');
    md.push_str(&format!(
        "共收录 {} 个单词卡，点击单词卡可听到英语发音。\n\n",
        report.word_cards
    ));

    md.push_str("## 📖 使用方法\n\n");
    md.push_str("1. **浏览器预览**: 直接打开 HTML 文件\n");
    md.push_str("2. **打印 PDF**: Ctrl+P (或 Cmd+P) → 保存为 PDF，勾选“打印背景图形”\n");
    md.push_str("3. **自定义**: 修改 `book-press.json` 中的设计令牌或页面设置后重新生成\n\n");

    md.push_str(&format!("- 输出文件: `{}`\n", report.output_path.display()));
    md.push_str(&format!("- SHA256: `{}`\n\n", report.digest));
    md.push_str("---\n\n");
    md.push_str(&format!("*生成时间: {}*\n", generated_at.format("%Y-%m-%d %H:%M:%S")));
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::ChapterSpec;
    use crate::error::ChapterIssue;
    use chrono::TimeZone;

    fn report() -> BuildReport {
        BuildReport {
            output_path: PathBuf::from("output/modern/book.html"),
            usage_note_path: PathBuf::from("output/modern/README.md"),
            included: vec!["book_cover".to_string(), "chapter01".to_string()],
            skipped: vec![SkippedChapter {
                spec: ChapterSpec::new("chapter02", "chapter02.html"),
                issue: ChapterIssue::MissingSource(PathBuf::from("chapters/chapter02.html")),
            }],
            word_cards: 12,
            digest: "abc123".to_string(),
        }
    }

    #[test]
    fn test_usage_note_content() {
        let config = BookConfig::default();
        let at = Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let note = usage_note(&config, &report(), at);

        assert!(note.starts_with("# 柯南侦探英语冒险"));
        assert!(note.contains("185mm × 260mm"));
        assert!(note.contains("- `--color-accent`: #3182ce"));
        assert!(note.contains("| 2 | chapter01 | 已收录 |"));
        assert!(note.contains("| - | chapter02 | 已跳过：文件不存在"));
        assert!(note.contains("共收录 12 个单词卡"));
        assert!(note.contains("SHA256: `abc123`"));
        assert!(note.contains("*生成时间: 2024-05-01 09:30:00*"));
        // 不列出字号和间距
        assert!(!note.contains("--space-"));
    }

    #[test]
    fn test_build_html_appends_harvested_styles() {
        let config = BookConfig::default();
        let pipeline = Pipeline::new(&config);
        let doc = AssembledDocument {
            harvested_styles: vec!["  .cover { color: gold; }  ".to_string()],
            ..AssembledDocument::default()
        };

        let html = pipeline.build_html(&doc);
        let harvested = html.find(".cover { color: gold; }").unwrap();
        assert!(html.find(".word-card").unwrap() < harvested);
        assert!(harvested < html.find("</style>").unwrap());
        assert!(html.contains("<div class=\"book-container\">\n</div>"));
    }
}
