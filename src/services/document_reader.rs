//! 简历文档读取 - 业务能力层
//!
//! 只负责把文件变成"段落文本列表"，字段提取交给 field_extractor

use std::fs::File;
use std::io::Read;
use std::path::Path;

use regex::{Captures, Regex};
use tracing::debug;

use crate::error::{AppResult, DocumentError};

/// 文档读取能力
pub trait DocumentReader: Send + Sync {
    /// 按文档顺序返回段落文本
    fn paragraphs(&self, path: &Path) -> AppResult<Vec<String>>;
}

/// 基于文件扩展名的读取器
///
/// - `.docx`：解析 `word/document.xml` 中的 `<w:p>` 段落
/// - 其他：按行切分的纯文本
#[derive(Debug, Default, Clone)]
pub struct FileDocumentReader;

impl FileDocumentReader {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentReader for FileDocumentReader {
    fn paragraphs(&self, path: &Path) -> AppResult<Vec<String>> {
        let is_docx = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));

        let paragraphs = if is_docx {
            read_docx(path)?
        } else {
            std::fs::read_to_string(path)?
                .lines()
                .map(str::to_string)
                .collect()
        };

        debug!("读取文档 {}: {} 个段落", path.display(), paragraphs.len());
        Ok(paragraphs)
    }
}

fn read_docx(path: &Path) -> AppResult<Vec<String>> {
    let archive_err = |source| DocumentError::Archive {
        path: path.display().to_string(),
        source,
    };

    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(archive_err)?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(archive_err)?
        .read_to_string(&mut xml)?;

    docx_paragraphs(&xml)
}

/// 从 document.xml 中按顺序取出段落文本
pub fn docx_paragraphs(xml: &str) -> AppResult<Vec<String>> {
    let paragraph_re = Regex::new(r"(?s)<w:p[ >].*?</w:p>").map_err(DocumentError::from)?;
    let run_re =
        Regex::new(r"(?s)<w:t(?: [^>]*)?>(.*?)</w:t>|<w:tab/>").map_err(DocumentError::from)?;
    let entity_re = Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|lt|gt|quot|apos|amp);")
        .map_err(DocumentError::from)?;

    let paragraphs = paragraph_re
        .find_iter(xml)
        .map(|paragraph| {
            run_re
                .captures_iter(paragraph.as_str())
                .map(|caps| match caps.get(1) {
                    Some(text) => unescape_xml(&entity_re, text.as_str()),
                    None => "\t".to_string(),
                })
                .collect::<String>()
        })
        .collect();

    Ok(paragraphs)
}

/// 单次替换命名实体和数字字符引用（`&#8217;`、`&#x2013;`），无效码点原样保留
fn unescape_xml(entity_re: &Regex, text: &str) -> String {
    entity_re
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                _ => {
                    let code = match entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => entity[1..].parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document><w:body>
<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t>Jane </w:t></w:r><w:r><w:t xml:space="preserve">Doe</w:t></w:r></w:p>
<w:p><w:r><w:t>jane@x.com</w:t></w:r></w:p>
<w:p/>
<w:p><w:r><w:t>R&amp;D</w:t><w:tab/><w:t>Lead</w:t></w:r></w:p>
</w:body></w:document>"#;

    #[test]
    fn test_docx_paragraphs_in_order() {
        let paragraphs = docx_paragraphs(DOCUMENT_XML).unwrap();
        assert_eq!(paragraphs, vec!["Jane Doe", "jane@x.com", "R&D\tLead"]);
    }

    #[test]
    fn test_character_references_are_decoded() {
        let xml = r#"<w:p><w:r><w:t>Jane&#8217;s CV &#x2013; 2024 &amp;lt;draft&amp;gt; &#xD800;</w:t></w:r></w:p>"#;
        let paragraphs = docx_paragraphs(xml).unwrap();
        assert_eq!(paragraphs, vec!["Jane\u{2019}s CV \u{2013} 2024 &lt;draft&gt; &#xD800;"]);
    }

    #[test]
    fn test_reads_docx_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.docx");

        let file = File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(DOCUMENT_XML.as_bytes()).unwrap();
        writer.finish().unwrap();

        let paragraphs = FileDocumentReader::new().paragraphs(&path).unwrap();
        assert_eq!(paragraphs[0], "Jane Doe");
    }

    #[test]
    fn test_plain_text_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        std::fs::write(&path, "Jane Doe\njane@x.com\n").unwrap();

        let paragraphs = FileDocumentReader::new().paragraphs(&path).unwrap();
        assert_eq!(paragraphs, vec!["Jane Doe", "jane@x.com"]);
    }

    #[test]
    fn test_corrupt_docx_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"not a zip").unwrap();

        assert!(FileDocumentReader::new().paragraphs(&path).is_err());
    }
}
