use serde::{Deserialize, Serialize};
use std::fmt;

/// 职位表中的原始记录
///
/// 所有字段都可能缺失，处理前必须经过 [`JobRecord::validate`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub job_link: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub resume_id: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub user_id: Option<String>,
}

/// 校验通过、可以投递的职位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: String,
    pub job_link: String,
    pub resume_id: String,
    pub company: String,
    pub title: String,
    pub user_id: String,
}

impl JobRecord {
    /// 必填字段，任一缺失（或为空串）则跳过该职位
    pub const REQUIRED_FIELDS: [&'static str; 5] =
        ["job_link", "resume_id", "company", "title", "user_id"];

    /// 返回缺失的必填字段列表
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let values = [
            &self.job_link,
            &self.resume_id,
            &self.company,
            &self.title,
            &self.user_id,
        ];
        Self::REQUIRED_FIELDS
            .iter()
            .zip(values)
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(name, _)| *name)
            .collect()
    }

    /// 校验记录
    ///
    /// 缺少 id 的记录使用 `fallback_id` 作为标识
    pub fn validate(self, fallback_id: impl Into<String>) -> Result<Job, Vec<&'static str>> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(missing);
        }

        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| fallback_id.into());

        Ok(Job {
            id,
            job_link: self.job_link.unwrap_or_default().trim().to_string(),
            resume_id: self.resume_id.unwrap_or_default(),
            company: self.company.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            user_id: self.user_id.unwrap_or_default(),
        })
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {} (#{})", self.title, self.company, self.id)
    }
}

/// 校验结果：可投递的职位 + 被跳过的记录（标识, 缺失字段）
#[derive(Debug, Default)]
pub struct JobPartition {
    pub eligible: Vec<Job>,
    pub skipped: Vec<(String, Vec<&'static str>)>,
}

/// 把原始记录划分为可投递和跳过两部分
pub fn partition_jobs(records: Vec<JobRecord>) -> JobPartition {
    let mut partition = JobPartition::default();
    for (index, record) in records.into_iter().enumerate() {
        let label = record
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("row-{}", index + 1));
        match record.validate(label.clone()) {
            Ok(job) => partition.eligible.push(job),
            Err(missing) => partition.skipped.push((label, missing)),
        }
    }
    partition
}

// id 在数据库中可能是字符串（uuid）也可能是整数
fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer identifier")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            deserializer.deserialize_any(IdVisitor)
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> JobRecord {
        JobRecord {
            id: Some("42".to_string()),
            job_link: Some("https://www.linkedin.com/jobs/view/1".to_string()),
            resume_id: Some("r1".to_string()),
            company: Some("Acme".to_string()),
            title: Some("Engineer".to_string()),
            user_id: Some("u1".to_string()),
        }
    }

    #[test]
    fn test_complete_record_is_eligible() {
        let job = full_record().validate("fallback").unwrap();
        assert_eq!(job.id, "42");
        assert_eq!(job.company, "Acme");
    }

    #[test]
    fn test_each_missing_field_is_reported() {
        for field in JobRecord::REQUIRED_FIELDS {
            let mut record = full_record();
            match field {
                "job_link" => record.job_link = None,
                "resume_id" => record.resume_id = Some(String::new()),
                "company" => record.company = None,
                "title" => record.title = Some("  ".to_string()),
                "user_id" => record.user_id = None,
                _ => unreachable!(),
            }
            assert_eq!(record.validate("x").unwrap_err(), vec![field]);
        }
    }

    #[test]
    fn test_partition_excludes_invalid_records() {
        let mut broken = full_record();
        broken.id = Some("7".to_string());
        broken.title = None;

        let partition = partition_jobs(vec![full_record(), broken]);
        assert_eq!(partition.eligible.len(), 1);
        assert_eq!(partition.skipped, vec![("7".to_string(), vec!["title"])]);
    }

    #[test]
    fn test_blank_id_falls_back_to_row_label() {
        let mut blank = full_record();
        blank.id = Some("  ".to_string());
        let mut broken = full_record();
        broken.id = Some(String::new());
        broken.company = None;

        let partition = partition_jobs(vec![blank, broken]);
        assert_eq!(partition.eligible[0].id, "row-1");
        assert_eq!(partition.skipped, vec![("row-2".to_string(), vec!["company"])]);
    }

    #[test]
    fn test_numeric_ids_deserialize() {
        let record: JobRecord = serde_json::from_str(
            r#"{"id": 12, "job_link": "https://x.test", "resume_id": 3, "company": "A",
                "title": "B", "user_id": null}"#,
        )
        .unwrap();
        assert_eq!(record.id.as_deref(), Some("12"));
        assert_eq!(record.resume_id.as_deref(), Some("3"));
        assert_eq!(record.user_id, None);
        assert_eq!(record.missing_fields(), vec!["user_id"]);
    }
}
