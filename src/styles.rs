//! 排版、打印与自定义组件样式
//!
//! 这里的 CSS 只引用 `tokens` 生成的自定义属性，不包含具体色值

use serde::{Deserialize, Serialize};

/// 开本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageFormat {
    /// 16 开（185mm × 260mm）
    #[serde(rename = "16K")]
    Sixteenmo,
    A4,
    A5,
}

impl PageFormat {
    /// 页面宽高（mm）
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::Sixteenmo => (185, 260),
            Self::A4 => (210, 297),
            Self::A5 => (148, 210),
        }
    }
}

/// 页边距（mm），`inner` 为装订侧
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margins {
    pub top: u32,
    pub outer: u32,
    pub bottom: u32,
    pub inner: u32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 20,
            outer: 15,
            bottom: 25,
            inner: 25,
        }
    }
}

/// 页面设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    pub format: PageFormat,
    pub margins: Margins,
    /// 页眉文字，为 `None` 时不输出页眉
    pub running_header: Option<String>,
    /// 是否在页脚输出页码
    pub page_numbers: bool,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            format: PageFormat::Sixteenmo,
            margins: Margins::default(),
            running_header: Some("柯南侦探英语冒险".to_string()),
            page_numbers: true,
        }
    }
}

/// CSS 字符串字面量，转义引号和反斜杠
fn css_string(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// 排版系统 CSS
pub fn typography_css() -> &'static str {
    r#"/* 基础重置 */
* {
    box-sizing: border-box;
    margin: 0;
    padding: 0;
}

html {
    font-size: var(--text-base);
    line-height: 1.6;
    font-family: var(--font-sans);
    color: var(--color-primary);
    background: var(--color-background);
}

/* 标题层次 */
h1, h2, h3, h4, h5, h6 {
    font-family: var(--font-serif);
    font-weight: 600;
    line-height: 1.2;
    margin-bottom: var(--space-4);
    page-break-after: avoid;
}

h1 { font-size: var(--text-4xl); margin-bottom: var(--space-8); }
h2 { font-size: var(--text-3xl); margin-bottom: var(--space-6); }
h3 { font-size: var(--text-2xl); margin-bottom: var(--space-5); }
h4 { font-size: var(--text-xl); margin-bottom: var(--space-4); }
h5 { font-size: var(--text-lg); margin-bottom: var(--space-3); }
h6 { font-size: var(--text-base); margin-bottom: var(--space-2); }

/* 段落系统 */
p {
    margin-bottom: var(--space-4);
    text-align: justify;
    hyphens: auto;
    orphans: 2;
    widows: 2;
}

.paragraph-indent { text-indent: 2em; }

.lead {
    font-size: var(--text-lg);
    color: var(--color-secondary);
    margin-bottom: var(--space-6);
}

ul, ol {
    margin: var(--space-4) 0;
    padding-left: var(--space-6);
}

li {
    margin-bottom: var(--space-2);
    line-height: 1.5;
}

/* 图片系统 */
img {
    max-width: 100%;
    height: auto;
    page-break-inside: avoid;
}

figure {
    margin: var(--space-8) 0;
    text-align: center;
    page-break-inside: avoid;
}

figcaption {
    font-size: var(--text-sm);
    color: var(--color-secondary);
    margin-top: var(--space-2);
    font-style: italic;
}

/* 表格系统 */
table {
    width: 100%;
    border-collapse: collapse;
    margin: var(--space-6) 0;
    page-break-inside: avoid;
}

th, td {
    padding: var(--space-3);
    border: 1px solid var(--color-secondary);
    text-align: left;
}

th {
    background: var(--color-surface);
    font-weight: 600;
}

/* 代码系统 */
code {
    font-family: var(--font-mono);
    font-size: 0.9em;
    background: var(--color-surface);
    padding: var(--space-1) var(--space-2);
    border-radius: 4px;
}

pre {
    font-family: var(--font-mono);
    background: var(--color-surface);
    padding: var(--space-4);
    border-radius: 8px;
    overflow-x: auto;
    margin: var(--space-6) 0;
    page-break-inside: avoid;
}

pre code {
    background: none;
    padding: 0;
}
"#
}

/// 打印专用 CSS
///
/// 左右页的内外边距互换，封面页不带页眉页脚
pub fn print_css(setup: &PageSetup) -> String {
    let (width, height) = setup.format.dimensions_mm();
    let m = setup.margins;

    let header = match &setup.running_header {
        Some(text) => format!(
            "\n        @top-left {{\n            content: {};\n            font-size: 9pt;\n            color: #666;\n        }}\n",
            css_string(text)
        ),
        None => String::new(),
    };
    let footer = if setup.page_numbers {
        "\n        @bottom-right {\n            content: counter(page);\n            font-size: 10pt;\n        }\n"
    } else {
        ""
    };

    format!(
        r#"@media print {{
    @page {{
        size: {width}mm {height}mm;
        margin: {top}mm {outer}mm {bottom}mm {inner}mm;
{header}{footer}    }}

    @page :left {{
        margin: {top}mm {inner}mm {bottom}mm {outer}mm;
    }}

    @page :right {{
        margin: {top}mm {outer}mm {bottom}mm {inner}mm;
    }}

    @page cover {{
        margin: 0;
        @top-left {{ content: none; }}
        @bottom-right {{ content: none; }}
    }}

    * {{
        -webkit-print-color-adjust: exact !important;
        color-adjust: exact !important;
        print-color-adjust: exact !important;
    }}

    .page-break {{ page-break-after: always; break-after: page; }}
    .page-break-before {{ page-break-before: always; }}
    .no-break {{ page-break-inside: avoid; }}

    .no-print, nav, .sidebar, .chapter-nav, .project-nav {{
        display: none !important;
    }}

    .chapter {{
        background: white;
        padding: 0;
        margin: 0;
        page-break-before: always;
    }}

    .chapter:first-child {{
        page-break-before: auto;
    }}
}}
"#,
        top = m.top,
        outer = m.outer,
        bottom = m.bottom,
        inner = m.inner,
    )
}

/// 单词卡、故事卡等书内组件样式，以及屏幕预览样式
pub fn component_css() -> &'static str {
    r#".word-card {
    background: var(--color-surface);
    border: 1px solid #e2e8f0;
    border-radius: 8px;
    padding: var(--space-4);
    margin: var(--space-3) 0;
    page-break-inside: avoid;
    box-shadow: 0 1px 3px rgba(0, 0, 0, 0.1);
}

.story-card {
    background: linear-gradient(135deg, #f7fafc 0%, #edf2f7 100%);
    border-left: 4px solid var(--color-accent);
    padding: var(--space-6);
    margin: var(--space-8) 0;
    border-radius: 0 8px 8px 0;
    page-break-inside: avoid;
}

.chapter-intro {
    background: var(--color-surface);
    padding: var(--space-10);
    margin: var(--space-12) 0;
    border-radius: 12px;
    text-align: center;
    page-break-inside: avoid;
    border: 2px solid #e2e8f0;
}

.vocabulary-grid {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(250px, 1fr));
    gap: var(--space-4);
    margin: var(--space-8) 0;
}

.grammar-highlight {
    border: 2px solid var(--color-accent);
    border-radius: 8px;
    padding: var(--space-6);
    margin: var(--space-6) 0;
    background: rgba(49, 130, 206, 0.05);
    page-break-inside: avoid;
}

/* 组件 */
.heading {
    font-family: var(--font-serif);
    font-weight: 600;
    line-height: 1.2;
    margin-bottom: var(--space-4);
}

.heading-1 { font-size: var(--text-4xl); margin-bottom: var(--space-8); }
.heading-2 { font-size: var(--text-3xl); margin-bottom: var(--space-6); }
.heading-3 { font-size: var(--text-2xl); margin-bottom: var(--space-5); }
.heading-4 { font-size: var(--text-xl); margin-bottom: var(--space-4); }
.heading-5 { font-size: var(--text-lg); margin-bottom: var(--space-3); }
.heading-6 { font-size: var(--text-base); margin-bottom: var(--space-2); }

.paragraph {
    margin-bottom: var(--space-4);
    text-align: justify;
    line-height: 1.6;
}

.paragraph.indent { text-indent: 2em; }

.figure { margin: var(--space-6) 0; }

.image {
    max-width: 100%;
    height: auto;
    display: block;
}

.figure.text-center .image { margin: 0 auto; }

.caption {
    font-size: var(--text-sm);
    color: var(--color-secondary);
    margin-top: var(--space-1);
    text-align: center;
    font-style: italic;
}

.code-block {
    margin: var(--space-6) 0;
    background: var(--color-surface);
    border-radius: 4pt;
    overflow: hidden;
}

.code-title {
    background: var(--color-secondary);
    color: var(--color-background);
    padding: var(--space-2) var(--space-4);
    font-size: var(--text-sm);
    font-weight: 500;
}

.code {
    font-family: var(--font-mono);
    font-size: var(--text-sm);
    padding: var(--space-4);
    margin: 0;
    background: none;
    border: none;
    overflow-x: auto;
}

.table-container { margin: var(--space-6) 0; }

.table-title {
    font-weight: 600;
    margin-bottom: var(--space-2);
    color: var(--color-primary);
}

.table {
    width: 100%;
    border-collapse: collapse;
    border: 1pt solid var(--color-secondary);
}

.table th,
.table td {
    padding: var(--space-2);
    border: 0.5pt solid var(--color-secondary);
    text-align: left;
}

.table th {
    background: var(--color-surface);
    font-weight: 600;
    color: var(--color-primary);
}

.text-center { text-align: center; }
.text-justify { text-align: justify; }
.full-width { width: 100%; }
.page-break-avoid { page-break-inside: avoid; break-inside: avoid; }

@media screen {
    body {
        max-width: 800px;
        margin: 0 auto;
        padding: var(--space-8);
        background: #f8f9fa;
    }

    .chapter {
        background: white;
        padding: var(--space-8);
        margin-bottom: var(--space-8);
        border-radius: 12px;
        box-shadow: 0 4px 6px rgba(0, 0, 0, 0.07);
    }

    .page-break {
        border-top: 2px dashed #cbd5e0;
        margin: var(--space-8) 0;
        padding-top: var(--space-4);
        text-align: center;
        color: #718096;
        font-size: var(--text-sm);
    }

    .page-break::after {
        content: "· 页面分隔 ·";
    }
}
"#
}
