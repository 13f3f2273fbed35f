use crate::error::{ChapterIssue, PressError, Result};
use crate::extractor::{rebase_asset_paths, AssetPathPolicy, ContentExtractor};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

/// 章节描述
///
/// 序列中的插入顺序就是打印顺序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterSpec {
    /// 章节标识，写入 `data-chapter`
    pub id: String,
    /// 源文件名
    pub source: String,
    /// 末尾章节不追加分页符
    pub terminal: bool,
}

impl ChapterSpec {
    pub fn new(id: &str, source: &str) -> Self {
        Self {
            id: id.to_string(),
            source: source.to_string(),
            terminal: false,
        }
    }

    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    /// 由文件名列表生成章节序列
    ///
    /// 标识取文件名去掉扩展名的部分，最后一项标记为末尾章节；标识重复属于配置错误
    pub fn sequence<S: AsRef<str>>(files: &[S]) -> Result<Vec<ChapterSpec>> {
        let mut seen = HashSet::new();
        let mut specs = Vec::with_capacity(files.len());

        for (index, file) in files.iter().enumerate() {
            let file = file.as_ref();
            let id = Path::new(file)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(file)
                .to_string();

            if !seen.insert(id.clone()) {
                return Err(PressError::DuplicateChapter(id));
            }

            specs.push(ChapterSpec {
                id,
                source: file.to_string(),
                terminal: index + 1 == files.len(),
            });
        }

        Ok(specs)
    }
}

/// 源文件布局
///
/// 封面、目录、封底位于书籍根目录，其余章节位于 chapters 目录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    pub root: PathBuf,
    pub chapters_dir: PathBuf,
    pub top_level: Vec<String>,
}

impl SourceLayout {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            chapters_dir: root.join("chapters"),
            top_level: default_top_level_files(),
        }
    }

    /// 源文件名到实际路径的路由
    pub fn resolve(&self, source: &str) -> PathBuf {
        if self.top_level.iter().any(|name| name == source) {
            self.root.join(source)
        } else {
            self.chapters_dir.join(source)
        }
    }
}

pub fn default_top_level_files() -> Vec<String> {
    ["book_cover.html", "book_back_cover.html", "index.html"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// 组装后的单个章节
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledChapter {
    pub spec: ChapterSpec,
    /// 已包裹容器和分页符的 HTML
    pub markup: String,
}

/// 被跳过的章节及原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedChapter {
    pub spec: ChapterSpec,
    pub issue: ChapterIssue,
}

/// 一次组装的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledDocument {
    /// 按输入顺序排列的非空章节
    pub chapters: Vec<AssembledChapter>,
    pub skipped: Vec<SkippedChapter>,
    /// 从样式来源文件收集到的 `<style>` 内容
    pub harvested_styles: Vec<String>,
}

impl AssembledDocument {
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// 按顺序排列的章节片段
    pub fn fragments(&self) -> Vec<&str> {
        self.chapters.iter().map(|c| c.markup.as_str()).collect()
    }
}

/// 将清理后的内容包裹进章节容器
pub fn wrap_chapter(spec: &ChapterSpec, content: &str) -> String {
    let id = html_escape::encode_double_quoted_attribute(&spec.id);
    let page_break = if spec.terminal {
        ""
    } else {
        "<div class=\"page-break\"></div>\n"
    };
    format!("<div class=\"chapter\" data-chapter=\"{id}\">\n{content}\n{page_break}</div>\n")
}

fn io_issue(path: PathBuf, err: io::Error) -> ChapterIssue {
    if err.kind() == io::ErrorKind::NotFound {
        ChapterIssue::MissingSource(path)
    } else {
        ChapterIssue::Unreadable {
            path,
            reason: err.to_string(),
        }
    }
}

/// 按 UTF-8 解码，去掉 BOM；无法解码的字节会被替换
fn decode_source(bytes: &[u8], path: &Path) -> String {
    let (content, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
    if had_errors {
        log::warn!("警告：文件 {:?} 不是有效的 UTF-8，可能存在乱码", path);
    }
    content.into_owned()
}

/// 章节组装器
///
/// 按配置顺序读取章节、提取内容、包裹容器，结果顺序与输入一致
pub struct ChapterAssembler {
    layout: SourceLayout,
    extractor: ContentExtractor,
    asset_paths: AssetPathPolicy,
    style_sources: Vec<String>,
}

impl ChapterAssembler {
    pub fn new(layout: SourceLayout, extractor: ContentExtractor) -> Self {
        Self {
            layout,
            extractor,
            asset_paths: AssetPathPolicy::Keep,
            style_sources: Vec::new(),
        }
    }

    pub fn with_asset_paths(mut self, policy: AssetPathPolicy) -> Self {
        self.asset_paths = policy;
        self
    }

    /// 指定需要收集 `<style>` 的源文件
    pub fn with_style_sources(mut self, sources: Vec<String>) -> Self {
        self.style_sources = sources;
        self
    }

    pub fn layout(&self) -> &SourceLayout {
        &self.layout
    }

    /// 顺序组装
    ///
    /// 缺失或不可读的文件只会被跳过，不会中止整个流程
    pub fn assemble(&self, chapters: &[ChapterSpec]) -> AssembledDocument {
        let mut doc = AssembledDocument::default();

        for spec in chapters {
            let path = self.layout.resolve(&spec.source);
            log::info!("处理: {}", spec.source);

            let loaded = std::fs::read(&path)
                .map(|bytes| decode_source(&bytes, &path))
                .map_err(|e| io_issue(path.clone(), e));

            self.accept(&mut doc, spec, path, loaded);
        }

        doc
    }

    /// 并发读取、按原顺序组装
    ///
    /// 所有读取同时发出，但结果按输入顺序逐个等待，输出与 `assemble` 完全一致
    pub async fn assemble_concurrent(&self, chapters: &[ChapterSpec]) -> AssembledDocument {
        let reads: Vec<_> = chapters
            .iter()
            .map(|spec| {
                let path = self.layout.resolve(&spec.source);
                let handle = tokio::spawn({
                    let path = path.clone();
                    async move { tokio::fs::read(path).await }
                });
                (path, handle)
            })
            .collect();

        let mut doc = AssembledDocument::default();

        for (spec, (path, handle)) in chapters.iter().zip(reads) {
            log::info!("处理: {}", spec.source);

            let loaded = match handle.await {
                Ok(Ok(bytes)) => Ok(decode_source(&bytes, &path)),
                Ok(Err(e)) => Err(io_issue(path.clone(), e)),
                Err(e) => Err(ChapterIssue::Unreadable {
                    path: path.clone(),
                    reason: format!("读取任务失败: {}", e),
                }),
            };

            self.accept(&mut doc, spec, path, loaded);
        }

        doc
    }

    fn accept(
        &self,
        doc: &mut AssembledDocument,
        spec: &ChapterSpec,
        path: PathBuf,
        loaded: std::result::Result<String, ChapterIssue>,
    ) {
        let raw = match loaded {
            Ok(raw) => raw,
            Err(issue) => return Self::skip(doc, spec, issue),
        };

        if self.style_sources.iter().any(|s| s == &spec.source) {
            doc.harvested_styles.extend(self.extractor.extract_styles(&raw));
        }

        let content = self.extractor.extract(Some(&raw));
        if content.is_empty() {
            return Self::skip(doc, spec, ChapterIssue::EmptyFragment(path));
        }

        let content = rebase_asset_paths(&content, self.asset_paths);
        doc.chapters.push(AssembledChapter {
            markup: wrap_chapter(spec, &content),
            spec: spec.clone(),
        });
    }

    fn skip(doc: &mut AssembledDocument, spec: &ChapterSpec, issue: ChapterIssue) {
        log::warn!("跳过文件: {} ({})", spec.source, issue);
        doc.skipped.push(SkippedChapter {
            spec: spec.clone(),
            issue,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::DEFAULT_UNWANTED_SELECTORS;
    use std::fs;
    use tempfile::TempDir;

    fn create_book(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("chapters")).unwrap();
        let layout = SourceLayout::new(dir.path());
        for (name, body) in files {
            fs::write(layout.resolve(name), body).unwrap();
        }
        dir
    }

    fn assembler(root: &Path) -> ChapterAssembler {
        let extractor = ContentExtractor::new(DEFAULT_UNWANTED_SELECTORS).unwrap();
        ChapterAssembler::new(SourceLayout::new(root), extractor)
    }

    fn page(text: &str) -> String {
        format!("<html><body><p>{}</p><script>x()</script></body></html>", text)
    }

    #[test]
    fn test_sequence_ids_and_terminal() {
        let specs =
            ChapterSpec::sequence(&["book_cover.html", "chapter01.html", "book_back_cover.html"])
                .unwrap();
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0].id, "book_cover");
        assert_eq!(specs[1].source, "chapter01.html");
        assert!(!specs[0].terminal);
        assert!(!specs[1].terminal);
        assert!(specs[2].terminal);
    }

    #[test]
    fn test_sequence_rejects_duplicates() {
        let result = ChapterSpec::sequence(&["chapter01.html", "chapter01.html"]);
        assert!(matches!(result, Err(PressError::DuplicateChapter(id)) if id == "chapter01"));
    }

    #[test]
    fn test_source_routing() {
        let layout = SourceLayout::new(Path::new("/book"));
        assert_eq!(layout.resolve("book_cover.html"), PathBuf::from("/book/book_cover.html"));
        assert_eq!(layout.resolve("index.html"), PathBuf::from("/book/index.html"));
        assert_eq!(
            layout.resolve("book_back_cover.html"),
            PathBuf::from("/book/book_back_cover.html")
        );
        assert_eq!(
            layout.resolve("chapter03.html"),
            PathBuf::from("/book/chapters/chapter03.html")
        );
        assert_eq!(layout.resolve("appendix.html"), PathBuf::from("/book/chapters/appendix.html"));
    }

    #[test]
    fn test_wrap_chapter() {
        let spec = ChapterSpec::new("chapter01", "chapter01.html");
        let wrapped = wrap_chapter(&spec, "<p>内容</p>");
        assert_eq!(
            wrapped,
            "<div class=\"chapter\" data-chapter=\"chapter01\">\n<p>内容</p>\n<div class=\"page-break\"></div>\n</div>\n"
        );

        let last = wrap_chapter(&spec.clone().terminal(), "<p>内容</p>");
        assert!(!last.contains("page-break"));
    }

    #[test]
    fn test_wrap_chapter_escapes_id() {
        let spec = ChapterSpec::new("a\"b", "x.html").terminal();
        let wrapped = wrap_chapter(&spec, "<p>x</p>");
        assert!(wrapped.contains("data-chapter=\"a&quot;b\""));
    }

    #[test]
    fn test_assemble_all_present() {
        let dir = create_book(&[
            ("book_cover.html", page("封面").as_str()),
            ("chapter01.html", page("第一章").as_str()),
            ("chapter02.html", page("第二章").as_str()),
        ]);
        let specs = ChapterSpec::sequence(&["book_cover.html", "chapter01.html", "chapter02.html"])
            .unwrap();

        let doc = assembler(dir.path()).assemble(&specs);
        assert_eq!(doc.len(), specs.len());
        assert!(doc.skipped.is_empty());

        let ids: Vec<_> = doc.chapters.iter().map(|c| c.spec.id.as_str()).collect();
        assert_eq!(ids, vec!["book_cover", "chapter01", "chapter02"]);
        assert!(doc.fragments().iter().all(|f| !f.contains("<script")));
    }

    #[test]
    fn test_assemble_skips_missing() {
        let dir = create_book(&[
            ("chapter01.html", page("第一章").as_str()),
            ("chapter03.html", page("第三章").as_str()),
        ]);
        let specs = ChapterSpec::sequence(&[
            "chapter01.html",
            "chapter02.html",
            "chapter03.html",
            "appendix.html",
        ])
        .unwrap();

        let doc = assembler(dir.path()).assemble(&specs);
        assert_eq!(doc.len(), specs.len() - 2);
        assert_eq!(doc.chapters[0].spec.id, "chapter01");
        assert_eq!(doc.chapters[1].spec.id, "chapter03");

        assert_eq!(doc.skipped.len(), 2);
        assert!(matches!(doc.skipped[0].issue, ChapterIssue::MissingSource(_)));
        assert_eq!(doc.skipped[1].spec.id, "appendix");

        // chapter03 不是末尾章节（appendix 才是），所以仍带分页符
        assert!(doc.chapters[1].markup.contains("page-break"));
    }

    #[test]
    fn test_assemble_skips_empty_fragment() {
        let dir = create_book(&[
            ("chapter01.html", "<html><body><script>only()</script></body></html>"),
            ("chapter02.html", page("第二章").as_str()),
        ]);
        let specs = ChapterSpec::sequence(&["chapter01.html", "chapter02.html"]).unwrap();

        let doc = assembler(dir.path()).assemble(&specs);
        assert_eq!(doc.len(), 1);
        assert!(matches!(doc.skipped[0].issue, ChapterIssue::EmptyFragment(_)));
        assert!(!doc.chapters[0].markup.contains("page-break"));
    }

    #[test]
    fn test_assemble_directory_is_unreadable() {
        let dir = create_book(&[("chapter02.html", page("第二章").as_str())]);
        // 同名目录无法作为文件读取
        fs::create_dir_all(dir.path().join("chapters").join("chapter01.html")).unwrap();
        let specs = ChapterSpec::sequence(&["chapter01.html", "chapter02.html"]).unwrap();

        let doc = assembler(dir.path()).assemble(&specs);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.skipped.len(), 1);
        assert_eq!(doc.skipped[0].spec.id, "chapter01");
    }

    #[test]
    fn test_assemble_strips_bom_and_harvests_styles() {
        let cover = "\u{feff}<html><head><style>.cover { color: gold; }</style></head><body><h1>封面</h1></body></html>";
        let dir = create_book(&[("book_cover.html", cover)]);
        let specs = ChapterSpec::sequence(&["book_cover.html"]).unwrap();

        let doc = assembler(dir.path())
            .with_style_sources(vec!["book_cover.html".to_string()])
            .assemble(&specs);
        assert_eq!(doc.harvested_styles, vec![".cover { color: gold; }".to_string()]);
        assert!(!doc.chapters[0].markup.contains('\u{feff}'));
    }

    #[test]
    fn test_assemble_replaces_invalid_utf8() {
        let dir = create_book(&[]);
        fs::write(
            dir.path().join("chapters").join("chapter01.html"),
            b"<body><p>a\xffb</p></body>",
        )
        .unwrap();
        let specs = ChapterSpec::sequence(&["chapter01.html"]).unwrap();

        let doc = assembler(dir.path()).assemble(&specs);
        assert!(doc.skipped.is_empty());
        assert_eq!(doc.len(), 1);
        assert!(doc.chapters[0].markup.contains("<p>a\u{FFFD}b</p>"));
    }

    #[test]
    fn test_assemble_rebases_asset_paths() {
        let dir = create_book(&[(
            "chapter01.html",
            r#"<body><img src="../images/box.png"></body>"#,
        )]);
        let specs = ChapterSpec::sequence(&["chapter01.html"]).unwrap();

        let doc = assembler(dir.path())
            .with_asset_paths(AssetPathPolicy::StripRelativePrefix)
            .assemble(&specs);
        assert!(doc.chapters[0].markup.contains(r#"src="images/box.png""#));
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential() {
        let dir = create_book(&[
            ("book_cover.html", page("封面").as_str()),
            ("index.html", page("目录").as_str()),
            ("chapter01.html", page("第一章").as_str()),
            ("chapter03.html", page("第三章").as_str()),
            ("book_back_cover.html", page("封底").as_str()),
        ]);
        let specs = ChapterSpec::sequence(&[
            "book_cover.html",
            "index.html",
            "chapter01.html",
            "chapter02.html",
            "chapter03.html",
            "book_back_cover.html",
        ])
        .unwrap();

        let asm = assembler(dir.path());
        let sequential = asm.assemble(&specs);
        let concurrent = asm.assemble_concurrent(&specs).await;

        assert_eq!(sequential, concurrent);
        assert_eq!(concurrent.len(), 5);
        assert_eq!(concurrent.skipped[0].spec.id, "chapter02");
    }
}
