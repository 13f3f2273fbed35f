use crate::error::{PressError, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// 组成最终文档的各部分
///
/// CSS 按层叠顺序排列：令牌 → 排版 → 打印 → 自定义组件，后面的可以覆盖前面的
#[derive(Debug, Clone, Default)]
pub struct DocumentParts<'a> {
    pub title: &'a str,
    pub lang: &'a str,
    pub token_css: &'a str,
    pub typography_css: &'a str,
    pub print_css: &'a str,
    pub component_css: &'a str,
    pub fragments: Vec<&'a str>,
}

fn indent_block(out: &mut String, label: &str, css: &str) {
    out.push_str("        /* ");
    out.push_str(label);
    out.push_str(" */\n");
    for line in css.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str("        ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push('\n');
}

/// 渲染完整的 HTML 文档
///
/// 纯函数，输出中不包含时间戳，相同输入得到逐字节相同的结果
pub fn render(parts: &DocumentParts) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n");
    html.push_str(&format!(
        "<html lang=\"{}\">\n",
        html_escape::encode_double_quoted_attribute(parts.lang)
    ));
    html.push_str("<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str("    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str(&format!(
        "    <title>{}</title>\n",
        html_escape::encode_text(parts.title)
    ));
    html.push_str("    <style>\n");
    indent_block(&mut html, "设计系统", parts.token_css);
    indent_block(&mut html, "排版系统", parts.typography_css);
    indent_block(&mut html, "打印样式", parts.print_css);
    indent_block(&mut html, "自定义组件样式", parts.component_css);
    html.push_str("    </style>\n");
    html.push_str("</head>\n");
    html.push_str("<body>\n");
    html.push_str("<div class=\"book-container\">\n");
    for fragment in &parts.fragments {
        html.push_str(fragment);
    }
    html.push_str("</div>\n");
    html.push_str("</body>\n");
    html.push_str("</html>\n");
    html
}

/// 原子写入文件
///
/// 先写入同目录下的临时文件，刷新并同步到磁盘后再重命名到目标路径。
/// 任一步失败时临时文件随 `NamedTempFile` 一起删除，目标文件保持原状。
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|source| PressError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let write_err = |source| PressError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}
