//! 简历字段提取 - 业务能力层
//!
//! 纯函数：段落顺序文本 → ResumeProfile，每个字段先到先得

use crate::models::{ResumeProfile, ResumeSection};

/// 从段落列表中提取简历字段
///
/// 规则（按文档顺序）：
/// - 第一个非空段落作为姓名
/// - 第一个同时包含 `@` 和 `.` 的词作为邮箱
/// - 第一个数字个数在 10~15 之间的段落，取其数字作为电话
/// - 包含 `linkedin.com` / `http(s)://` 的第一个段落作为 LinkedIn / 网站
/// - `Address:` 开头的第一个段落作为地址
/// - 遇到 education / experience|work / skills 标题后，后续段落累积到对应分段
pub fn extract_profile<S: AsRef<str>>(paragraphs: &[S]) -> ResumeProfile {
    let mut profile = ResumeProfile::default();
    let mut current_section: Option<ResumeSection> = None;
    let mut section_lines: Vec<&str> = Vec::new();

    for paragraph in paragraphs {
        let text = paragraph.as_ref().trim();
        if text.is_empty() {
            continue;
        }

        // 简历通常以姓名开头
        if profile.name.is_empty() {
            profile.name = text.to_string();
            continue;
        }

        if profile.email.is_empty() {
            if let Some(email) = find_email(text) {
                profile.email = email.to_string();
            }
        }

        if profile.phone.is_empty() {
            let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
            if (10..=15).contains(&digits.len()) {
                profile.phone = digits;
            }
        }

        let lower = text.to_lowercase();

        if profile.linkedin.is_empty() && lower.contains("linkedin.com") {
            profile.linkedin = text.to_string();
        }

        if profile.website.is_empty() && (lower.contains("http://") || lower.contains("https://")) {
            profile.website = text.to_string();
        }

        if profile.address.is_empty() {
            if let Some(address) = strip_label(text, &lower, "address") {
                profile.address = address.to_string();
            }
        }

        if let Some(section) = detect_header(&lower) {
            current_section = Some(section);
            section_lines.clear();
        } else if let Some(section) = current_section {
            section_lines.push(text);
            *profile.section_mut(section) = section_lines.join("\n");
        }
    }

    profile
}

fn find_email(text: &str) -> Option<&str> {
    if !(text.contains('@') && text.contains('.')) {
        return None;
    }
    text.split_whitespace()
        .find(|word| word.contains('@') && word.contains('.'))
}

/// `Label: value` 形式，返回 value
fn strip_label<'a>(text: &'a str, lower: &str, label: &str) -> Option<&'a str> {
    if !lower.starts_with(label) {
        return None;
    }
    let rest = text.get(label.len()..)?.trim_start();
    let value = rest.strip_prefix(':')?.trim();
    (!value.is_empty()).then_some(value)
}

/// 匹配分段标题：任一单词以关键词开头即可（`educational`、`experiences`）
fn detect_header(lower: &str) -> Option<ResumeSection> {
    let has_word = |keyword: &str| {
        lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word.starts_with(keyword))
    };

    if has_word("education") {
        Some(ResumeSection::Education)
    } else if has_word("experience") || has_word("work") {
        Some(ResumeSection::Experience)
    } else if has_word("skills") {
        Some(ResumeSection::Skills)
    } else {
        None
    }
}
