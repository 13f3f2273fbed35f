//! 书籍组件
//!
//! 组件种类是封闭的枚举，渲染靠穷尽匹配完成，新增种类时编译器会指出所有遗漏

use html_escape::{encode_double_quoted_attribute, encode_text};

/// 可渲染的书籍组件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    Heading {
        level: u8,
        text: String,
        center: bool,
        /// 在标题前强制分页
        page_break: bool,
    },
    Paragraph {
        text: String,
        indent: bool,
        justify: bool,
    },
    Image {
        src: String,
        alt: String,
        caption: Option<String>,
        center: bool,
        full_width: bool,
    },
    CodeBlock {
        code: String,
        language: String,
        title: Option<String>,
    },
    /// 第一行为表头
    Table {
        rows: Vec<Vec<String>>,
        title: Option<String>,
    },
}

fn class_list(classes: &[(&str, bool)]) -> String {
    classes
        .iter()
        .filter(|(_, on)| *on)
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(" ")
}

impl Component {
    pub fn heading(level: u8, text: &str) -> Self {
        Self::Heading {
            level,
            text: text.to_string(),
            center: false,
            page_break: false,
        }
    }

    pub fn paragraph(text: &str) -> Self {
        Self::Paragraph {
            text: text.to_string(),
            indent: false,
            justify: false,
        }
    }

    pub fn render(&self) -> String {
        match self {
            Self::Heading {
                level,
                text,
                center,
                page_break,
            } => {
                let level = (*level).clamp(1, 6);
                let level_class = format!("heading-{level}");
                let classes = class_list(&[
                    ("heading", true),
                    (level_class.as_str(), true),
                    ("text-center", *center),
                    ("page-break-before", *page_break),
                    ("page-break-avoid", true),
                ]);
                format!("<h{level} class=\"{classes}\">{}</h{level}>", encode_text(text))
            }
            Self::Paragraph {
                text,
                indent,
                justify,
            } => {
                let classes = class_list(&[
                    ("paragraph", true),
                    ("indent", *indent),
                    ("text-justify", *justify),
                    ("page-break-avoid", true),
                ]);
                format!("<p class=\"{classes}\">{}</p>", encode_text(text))
            }
            Self::Image {
                src,
                alt,
                caption,
                center,
                full_width,
            } => {
                let classes = class_list(&[
                    ("figure", true),
                    ("full-width", *full_width),
                    ("text-center", *center),
                    ("page-break-avoid", true),
                ]);
                let caption = caption
                    .as_deref()
                    .map(|c| {
                        format!("<figcaption class=\"caption\">{}</figcaption>", encode_text(c))
                    })
                    .unwrap_or_default();
                format!(
                    "<figure class=\"{classes}\"><img src=\"{}\" alt=\"{}\" class=\"image\" loading=\"lazy\">{caption}</figure>",
                    encode_double_quoted_attribute(src),
                    encode_double_quoted_attribute(alt),
                )
            }
            Self::CodeBlock {
                code,
                language,
                title,
            } => {
                let title = title
                    .as_deref()
                    .map(|t| format!("<div class=\"code-title\">{}</div>", encode_text(t)))
                    .unwrap_or_default();
                format!(
                    "<div class=\"code-block page-break-avoid\">{title}<pre class=\"code\"><code class=\"language-{}\">{}</code></pre></div>",
                    encode_double_quoted_attribute(language),
                    encode_text(code),
                )
            }
            Self::Table { rows, title } => {
                let title = title
                    .as_deref()
                    .map(|t| format!("<div class=\"table-title\">{}</div>", encode_text(t)))
                    .unwrap_or_default();

                let mut iter = rows.iter();
                let head: String = iter
                    .next()
                    .map(|header| {
                        header
                            .iter()
                            .map(|cell| format!("<th>{}</th>", encode_text(cell)))
                            .collect()
                    })
                    .unwrap_or_default();
                let body: String = iter
                    .map(|row| {
                        let cells: String = row
                            .iter()
                            .map(|cell| format!("<td>{}</td>", encode_text(cell)))
                            .collect();
                        format!("<tr>{cells}</tr>")
                    })
                    .collect();

                format!(
                    "<div class=\"table-container page-break-avoid\">{title}<table class=\"table\"><thead><tr>{head}</tr></thead><tbody>{body}</tbody></table></div>"
                )
            }
        }
    }
}

/// 依次渲染多个组件
pub fn render_all(components: &[Component]) -> String {
    components.iter().map(Component::render).collect::<Vec<_>>().join("\n")
}
