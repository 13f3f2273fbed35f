use crate::error::{PressError, Result};
use regex::{Captures, Regex};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// 默认需要移除的元素：脚本、预览专用界面、固定定位的浮层和发音提示框
pub const DEFAULT_UNWANTED_SELECTORS: &[&str] = &[
    "script",
    "noscript",
    ".no-print",
    "#pronunciation-guide",
    ".preview-note",
    r#"[style*="position: fixed"]"#,
];

/// DOM 能力接口
///
/// 把“解析片段、按选择器删除、取 body 内容”三件事从具体的 HTML 库中抽离出来
pub trait DomBackend {
    type Document;
    type Selector;

    /// 编译选择器，失败时返回原因
    fn compile(&self, selector: &str) -> std::result::Result<Self::Selector, String>;

    /// 解析 HTML，永不失败；格式错误的输入会被尽力修复
    fn parse_fragment(&self, html: &str) -> Self::Document;

    /// 删除所有匹配的元素，返回删除的数量
    fn remove_matching(&self, doc: &mut Self::Document, selectors: &[Self::Selector]) -> usize;

    /// body 的内部 HTML，没有 body 时返回 None
    fn body_markup(&self, doc: &Self::Document) -> Option<String>;

    /// 文档中所有 `<style>` 的文本
    fn style_blocks(&self, doc: &Self::Document) -> Vec<String>;
}

/// 基于 scraper (html5ever) 的默认实现
#[derive(Debug, Clone, Copy, Default)]
pub struct ScraperDom;

impl DomBackend for ScraperDom {
    type Document = Html;
    type Selector = Selector;

    fn compile(&self, selector: &str) -> std::result::Result<Selector, String> {
        Selector::parse(selector).map_err(|e| format!("{:?}", e))
    }

    fn parse_fragment(&self, html: &str) -> Html {
        Html::parse_document(html)
    }

    fn remove_matching(&self, doc: &mut Html, selectors: &[Selector]) -> usize {
        // 先收集节点 ID 再统一摘除，避免边遍历边修改
        let view: &Html = doc;
        let ids: Vec<_> = selectors
            .iter()
            .flat_map(move |selector| view.select(selector).map(|el| el.id()))
            .collect();

        let mut removed = 0;
        for id in ids {
            if let Some(mut node) = doc.tree.get_mut(id) {
                node.detach();
                removed += 1;
            }
        }
        removed
    }

    fn body_markup(&self, doc: &Html) -> Option<String> {
        doc.root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "body")
            .map(|body| body.inner_html())
    }

    fn style_blocks(&self, doc: &Html) -> Vec<String> {
        doc.root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "style")
            .map(|el| el.text().collect::<String>())
            .filter(|css| !css.trim().is_empty())
            .collect()
    }
}

/// 内容提取器
///
/// 清理单个章节的原始 HTML，只保留可打印的 body 内容
pub struct ContentExtractor<B: DomBackend = ScraperDom> {
    backend: B,
    unwanted: Vec<B::Selector>,
}

impl ContentExtractor<ScraperDom> {
    /// 使用 scraper 后端和给定的选择器创建提取器
    pub fn new<S: AsRef<str>>(selectors: &[S]) -> Result<Self> {
        Self::with_backend(ScraperDom, selectors)
    }
}

impl<B: DomBackend> ContentExtractor<B> {
    /// 使用自定义后端创建提取器
    ///
    /// 选择器在这里一次性编译，无效的选择器属于配置错误
    pub fn with_backend<S: AsRef<str>>(backend: B, selectors: &[S]) -> Result<Self> {
        let unwanted = selectors
            .iter()
            .map(|s| {
                let s = s.as_ref();
                backend.compile(s).map_err(|reason| PressError::InvalidSelector {
                    selector: s.to_string(),
                    reason,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { backend, unwanted })
    }

    /// 提取清理后的 body 内容
    ///
    /// # 参数
    /// - `raw`: 原始 HTML，`None` 表示源文件不可用
    ///
    /// # 返回
    /// 清理后的内容；输入为空、没有 body 或清理后只剩空白时返回空字符串
    pub fn extract(&self, raw: Option<&str>) -> String {
        let raw = match raw {
            Some(html) if !html.trim().is_empty() => html,
            _ => return String::new(),
        };

        let mut doc = self.backend.parse_fragment(raw);
        self.backend.remove_matching(&mut doc, &self.unwanted);

        self.backend
            .body_markup(&doc)
            .map(|markup| markup.trim().to_string())
            .unwrap_or_default()
    }

    /// 收集原始 HTML 中的 `<style>` 内容
    pub fn extract_styles(&self, raw: &str) -> Vec<String> {
        let doc = self.backend.parse_fragment(raw);
        self.backend.style_blocks(&doc)
    }
}

/// 图片路径处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetPathPolicy {
    /// 保持原样
    #[default]
    Keep,
    /// 去掉相对路径开头的一层 `./` 或 `../`
    StripRelativePrefix,
}

/// `<img>` 标签内独立的 `src` 属性，不匹配 `data-src` 和正文中的文字
static IMG_SRC_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(<img\b[^>]*?\s)src="([^"]*)""#).expect("src 属性正则有效")
});

/// 按策略改写图片 `src` 属性中的相对路径，远程地址和 data URI 不变
pub fn rebase_asset_paths(html: &str, policy: AssetPathPolicy) -> String {
    if policy == AssetPathPolicy::Keep {
        return html.to_string();
    }

    IMG_SRC_ATTR
        .replace_all(html, |caps: &Captures| {
            let path = &caps[2];
            if path.starts_with("http") || path.starts_with("data:") {
                return caps[0].to_string();
            }
            let stripped = path
                .strip_prefix("./")
                .or_else(|| path.strip_prefix("../"))
                .unwrap_or(path);
            format!(r#"{}src="{}""#, &caps[1], stripped)
        })
        .into_owned()
}
