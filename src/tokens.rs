use serde::{Deserialize, Serialize};

/// 单个设计令牌
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub name: String,
    pub value: String,
}

/// 令牌分类
///
/// `prefix` 即 CSS 变量的命名空间，如 `color` 生成 `--color-primary`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCategory {
    pub prefix: String,
    /// 分类注释，写入 CSS 时作为 `/* ... */`
    #[serde(default)]
    pub label: Option<String>,
    pub entries: Vec<Token>,
}

impl TokenCategory {
    pub fn new(prefix: &str, label: &str, entries: &[(&str, &str)]) -> Self {
        Self {
            prefix: prefix.to_string(),
            label: Some(label.to_string()),
            entries: entries
                .iter()
                .map(|(name, value)| Token {
                    name: name.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        }
    }
}

/// 设计令牌表
///
/// 分类和分类内条目都按声明顺序保存，渲染结果因此逐字节稳定。
/// 构造后只读，渲染器只引用不修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignTokens {
    pub categories: Vec<TokenCategory>,
    /// 打印媒体下覆盖的令牌（通常是换算成 pt 的字号）
    #[serde(default)]
    pub print_overrides: Vec<TokenCategory>,
}

impl DesignTokens {
    /// 查找某个令牌的值
    pub fn value(&self, prefix: &str, name: &str) -> Option<&str> {
        self.categories
            .iter()
            .filter(|c| c.prefix == prefix)
            .flat_map(|c| c.entries.iter())
            .find(|t| t.name == name)
            .map(|t| t.value.as_str())
    }

    /// 令牌总数（不含打印覆盖）
    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DesignTokens {
    fn default() -> Self {
        Self {
            categories: vec![
                TokenCategory::new(
                    "color",
                    "色彩系统",
                    &[
                        ("primary", "#1a1a1a"),
                        ("secondary", "#4a5568"),
                        ("accent", "#3182ce"),
                        ("success", "#38a169"),
                        ("warning", "#d69e2e"),
                        ("error", "#e53e3e"),
                        ("background", "#ffffff"),
                        ("surface", "#f7fafc"),
                    ],
                ),
                TokenCategory::new(
                    "font",
                    "字体系统",
                    &[
                        (
                            "sans",
                            r#""Inter", "SF Pro Display", "PingFang SC", -apple-system, sans-serif"#,
                        ),
                        ("serif", r#""Merriweather", "Noto Serif SC", "Georgia", serif"#),
                        ("mono", r#""JetBrains Mono", "SF Mono", monospace"#),
                    ],
                ),
                TokenCategory::new(
                    "text",
                    "字号系统",
                    &[
                        ("xs", "0.75rem"),
                        ("sm", "0.875rem"),
                        ("base", "1rem"),
                        ("lg", "1.125rem"),
                        ("xl", "1.25rem"),
                        ("2xl", "1.5rem"),
                        ("3xl", "1.875rem"),
                        ("4xl", "2.25rem"),
                    ],
                ),
                TokenCategory::new(
                    "space",
                    "间距系统",
                    &[
                        ("px", "1px"),
                        ("0", "0"),
                        ("1", "0.25rem"),
                        ("2", "0.5rem"),
                        ("3", "0.75rem"),
                        ("4", "1rem"),
                        ("5", "1.25rem"),
                        ("6", "1.5rem"),
                        ("8", "2rem"),
                        ("10", "2.5rem"),
                        ("12", "3rem"),
                        ("16", "4rem"),
                        ("20", "5rem"),
                        ("24", "6rem"),
                    ],
                ),
            ],
            print_overrides: vec![TokenCategory::new(
                "text",
                "打印字号",
                &[
                    ("xs", "10pt"),
                    ("sm", "11pt"),
                    ("base", "12pt"),
                    ("lg", "14pt"),
                    ("xl", "16pt"),
                    ("2xl", "20pt"),
                    ("3xl", "24pt"),
                    ("4xl", "28pt"),
                ],
            )],
        }
    }
}

fn write_declarations(css: &mut String, categories: &[TokenCategory], indent: &str) {
    for (i, category) in categories.iter().enumerate() {
        if i > 0 {
            css.push('\n');
        }
        if let Some(label) = &category.label {
            css.push_str(&format!("{indent}/* {label} */\n"));
        }
        for token in &category.entries {
            css.push_str(&format!(
                "{indent}--{}-{}: {};\n",
                category.prefix, token.name, token.value
            ));
        }
    }
}

/// 将设计令牌渲染为 CSS 自定义属性块
///
/// 纯函数：相同输入总是得到逐字节相同的输出
pub fn render_tokens_as_css(tokens: &DesignTokens) -> String {
    let mut css = String::from(":root {\n");
    write_declarations(&mut css, &tokens.categories, "    ");
    css.push_str("}\n");

    if !tokens.print_overrides.is_empty() {
        css.push_str("\n@media print {\n    :root {\n");
        write_declarations(&mut css, &tokens.print_overrides, "        ");
        css.push_str("    }\n}\n");
    }

    css
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_is_deterministic() {
        let tokens = DesignTokens::default();
        let first = render_tokens_as_css(&tokens);
        let second = render_tokens_as_css(&tokens.clone());
        assert_eq!(first, second);
    }

    #[test]
    fn test_declaration_per_leaf() {
        let tokens = DesignTokens::default();
        let css = render_tokens_as_css(&tokens);

        assert!(css.contains("--color-primary: #1a1a1a;"));
        assert!(css.contains("--space-px: 1px;"));
        assert!(css.contains("--text-2xl: 1.5rem;"));

        let root_block = css.split("@media print").next().unwrap();
        assert_eq!(root_block.matches("--").count(), tokens.len());
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let tokens = DesignTokens {
            categories: vec![
                TokenCategory::new("space", "间距", &[("z", "9px"), ("a", "1px")]),
                TokenCategory::new("color", "颜色", &[("b", "#000")]),
            ],
            print_overrides: vec![],
        };
        let css = render_tokens_as_css(&tokens);

        let z = css.find("--space-z").unwrap();
        let a = css.find("--space-a").unwrap();
        let b = css.find("--color-b").unwrap();
        assert!(z < a && a < b);
        assert!(!css.contains("@media print"));
    }

    #[test]
    fn test_print_overrides() {
        let css = render_tokens_as_css(&DesignTokens::default());
        let print_block = css.split("@media print").nth(1).unwrap();
        assert!(print_block.contains("--text-base: 12pt;"));
        assert!(!print_block.contains("--color-"));
    }

    #[test]
    fn test_value_lookup() {
        let tokens = DesignTokens::default();
        assert_eq!(tokens.value("color", "accent"), Some("#3182ce"));
        assert_eq!(tokens.value("color", "missing"), None);
        assert_eq!(tokens.value("nothing", "accent"), None);
    }

    #[test]
    fn test_tokens_from_json() {
        let json = r##"{
            "categories": [
                { "prefix": "color", "entries": [ { "name": "ink", "value": "#222" } ] }
            ]
        }"##;
        let tokens: DesignTokens = serde_json::from_str(json).unwrap();
        let css = render_tokens_as_css(&tokens);
        assert_eq!(css, ":root {\n    --color-ink: #222;\n}\n");
    }
}
