use crate::assembler::{default_top_level_files, ChapterSpec, SourceLayout};
use crate::error::{PressError, Result};
use crate::extractor::{AssetPathPolicy, DEFAULT_UNWANTED_SELECTORS};
use crate::styles::PageSetup;
use crate::tokens::DesignTokens;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 书籍根目录下的可选配置文件
pub const CONFIG_FILE_NAME: &str = "book-press.json";

/// 书籍生成配置
///
/// 启动时构造一次，之后只读，显式传给各个组件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// 书籍根目录，由加载方设置，不从配置文件读取
    #[serde(skip)]
    pub root: PathBuf,
    /// 章节目录（相对根目录）
    pub chapters_dir: PathBuf,
    /// 输出目录（相对根目录）
    pub output_dir: PathBuf,
    pub output_file: String,
    /// 使用说明文件名
    pub usage_note_file: String,
    pub title: String,
    pub lang: String,
    /// 按打印顺序排列的源文件
    pub chapters: Vec<String>,
    /// 位于根目录而非章节目录的文件
    pub top_level_files: Vec<String>,
    pub unwanted_selectors: Vec<String>,
    pub page: PageSetup,
    pub tokens: DesignTokens,
    pub asset_paths: AssetPathPolicy,
    /// 需要收集 `<style>` 的源文件
    pub style_sources: Vec<String>,
    /// 是否并发读取章节
    pub concurrent_reads: bool,
}

impl Default for BookConfig {
    fn default() -> Self {
        let mut chapters = vec!["book_cover.html".to_string(), "index.html".to_string()];
        chapters.extend((1..=11).map(|n| format!("chapter{:02}.html", n)));
        chapters.push("appendix.html".to_string());
        chapters.push("book_back_cover.html".to_string());

        Self {
            root: PathBuf::from("."),
            chapters_dir: PathBuf::from("chapters"),
            output_dir: PathBuf::from("output").join("modern"),
            output_file: "柯南侦探英语冒险-现代版.html".to_string(),
            usage_note_file: "README.md".to_string(),
            title: "柯南侦探英语冒险：杨乐北的单词探案记 - 现代版".to_string(),
            lang: "zh-CN".to_string(),
            chapters,
            top_level_files: default_top_level_files(),
            unwanted_selectors: DEFAULT_UNWANTED_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            page: PageSetup::default(),
            tokens: DesignTokens::default(),
            asset_paths: AssetPathPolicy::Keep,
            style_sources: Vec::new(),
            concurrent_reads: false,
        }
    }
}

impl BookConfig {
    /// 加载配置
    ///
    /// 根目录下存在 `book-press.json` 时读取它，缺省字段使用默认值；否则完全使用默认值
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);

        let mut config = if path.exists() {
            let text = fs::read_to_string(&path).map_err(|source| PressError::ConfigIo {
                path: path.clone(),
                source,
            })?;
            let config: BookConfig = serde_json::from_str(&text)
                .map_err(|source| PressError::ConfigParse { path: path.clone(), source })?;
            log::info!("已加载配置文件: {:?}", path);
            config
        } else {
            BookConfig::default()
        };

        config.root = root.to_path_buf();
        Ok(config)
    }

    /// 源文件布局
    pub fn layout(&self) -> SourceLayout {
        SourceLayout {
            root: self.root.clone(),
            chapters_dir: self.root.join(&self.chapters_dir),
            top_level: self.top_level_files.clone(),
        }
    }

    /// 章节序列，标识重复时返回错误
    pub fn chapter_specs(&self) -> Result<Vec<ChapterSpec>> {
        ChapterSpec::sequence(self.chapters.as_slice())
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.output_dir)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir().join(&self.output_file)
    }

    pub fn usage_note_path(&self) -> PathBuf {
        self.output_dir().join(&self.usage_note_file)
    }
}
