use serde::{Deserialize, Serialize};

/// 从简历中提取出的标准化字段
///
/// 所有字段找不到时为空字符串
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub linkedin: String,
    pub website: String,
    pub education: String,
    pub experience: String,
    pub skills: String,
}

/// 简历中的分段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeSection {
    Education,
    Experience,
    Skills,
}

impl ResumeProfile {
    /// 取分段字段的可变引用
    pub fn section_mut(&mut self, section: ResumeSection) -> &mut String {
        match section {
            ResumeSection::Education => &mut self.education,
            ResumeSection::Experience => &mut self.experience,
            ResumeSection::Skills => &mut self.skills,
        }
    }

    /// 生成表单填写列表
    ///
    /// 顺序固定为 Name, Email, Phone, Company, Position, LinkedIn, Website,
    /// Education, Experience, Skills
    pub fn form_fields<'a>(
        &'a self,
        company: &'a str,
        title: &'a str,
    ) -> [(&'static str, &'a str); 10] {
        [
            ("Name", self.name.as_str()),
            ("Email", self.email.as_str()),
            ("Phone", self.phone.as_str()),
            ("Company", company),
            ("Position", title),
            ("LinkedIn", self.linkedin.as_str()),
            ("Website", self.website.as_str()),
            ("Education", self.education.as_str()),
            ("Experience", self.experience.as_str()),
            ("Skills", self.skills.as_str()),
        ]
    }
}
