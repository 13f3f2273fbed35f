use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// 单词卡条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    /// `.english` 节点中的原文
    pub english: String,
    /// 朗读用文本
    pub spoken: String,
    /// 所在章节标识
    pub chapter: Option<String>,
}

static PARENTHESES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("圆括号正则有效"));
static BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("方括号正则有效"));
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[.,!?;:'"]"#).expect("标点正则有效"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("空白正则有效"));

/// 清理朗读文本
///
/// 移除圆括号、方括号中的内容和标点符号，合并空白
pub fn clean_for_pronunciation(text: &str) -> String {
    let text = PARENTHESES.replace_all(text, "");
    let text = BRACKETS.replace_all(&text, "");
    let text = PUNCTUATION.replace_all(&text, "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// 收集文档中的单词卡
///
/// 只统计带有 `.english` 文本节点的单词卡，这也是发音层能够识别的结构
pub fn collect_word_cards(html: &str) -> Vec<WordEntry> {
    let (Ok(card_selector), Ok(english_selector)) =
        (Selector::parse(".word-card"), Selector::parse(".english"))
    else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    document
        .select(&card_selector)
        .filter_map(|card| {
            let english = card
                .select(&english_selector)
                .next()?
                .text()
                .collect::<String>()
                .trim()
                .to_string();
            if english.is_empty() {
                return None;
            }

            let chapter = card
                .ancestors()
                .filter_map(scraper::ElementRef::wrap)
                .find_map(|el| el.value().attr("data-chapter"))
                .map(|id| id.to_string());

            Some(WordEntry {
                spoken: clean_for_pronunciation(&english),
                english,
                chapter,
            })
        })
        .collect()
}
