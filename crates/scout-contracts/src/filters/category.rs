use std::fmt;

use serde::{Deserialize, Serialize};

use super::FilterError;

/// The closed set of facets the people-search API understands.
///
/// `ALL` is the display order used for the "available" list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Job Titles")]
    JobTitles,
    #[serde(rename = "Companies")]
    Companies,
    #[serde(rename = "Locations")]
    Locations,
    #[serde(rename = "Seniority Level")]
    SeniorityLevel,
    #[serde(rename = "Postal Code")]
    PostalCode,
    #[serde(rename = "Years")]
    Years,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::JobTitles,
        Category::Companies,
        Category::Locations,
        Category::SeniorityLevel,
        Category::PostalCode,
        Category::Years,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::JobTitles => "Job Titles",
            Category::Companies => "Companies",
            Category::Locations => "Locations",
            Category::SeniorityLevel => "Seniority Level",
            Category::PostalCode => "Postal Code",
            Category::Years => "Years",
        }
    }

    /// Resolves a display name, its snake_case form, or one of the flat keys
    /// the job generator emits (`job_role`, `job_location`, ...).
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw
            .trim()
            .to_ascii_lowercase()
            .replace(['_', '-'], " ")
            .split_whitespace()
            .collect::<Vec<&str>>()
            .join(" ");
        let category = match normalized.as_str() {
            "job titles" | "job title" | "job role" | "job roles" | "titles" | "title" => {
                Category::JobTitles
            }
            "companies" | "company" => Category::Companies,
            "locations" | "location" | "job location" => Category::Locations,
            "seniority level" | "seniority" | "experience level" => Category::SeniorityLevel,
            "postal code" | "postal codes" | "zip" | "zip code" => Category::PostalCode,
            "years" | "years of experience" => Category::Years,
            _ => return None,
        };
        Some(category)
    }

    pub fn resolve(raw: &str) -> Result<Self, FilterError> {
        Self::parse(raw).ok_or_else(|| FilterError::UnknownCategory(raw.trim().to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Category;
    use crate::filters::FilterError;

    #[test]
    fn parse_accepts_display_names_and_generator_keys() {
        assert_eq!(Category::parse("Job Titles"), Some(Category::JobTitles));
        assert_eq!(Category::parse("job_titles"), Some(Category::JobTitles));
        assert_eq!(Category::parse("job_role"), Some(Category::JobTitles));
        assert_eq!(Category::parse("  seniority-level "), Some(Category::SeniorityLevel));
        assert_eq!(Category::parse("job_location"), Some(Category::Locations));
        assert_eq!(
            Category::parse("years_of_experience"),
            Some(Category::Years)
        );
        assert_eq!(Category::parse("POSTAL CODE"), Some(Category::PostalCode));
    }

    #[test]
    fn parse_rejects_unknown_keys() {
        assert_eq!(Category::parse("skills_tags"), None);
        assert_eq!(Category::parse("annual_salary_range"), None);
        assert_eq!(Category::parse(""), None);
    }

    #[test]
    fn resolve_reports_the_unknown_name() {
        assert_eq!(Category::resolve("zip"), Ok(Category::PostalCode));
        assert_eq!(
            Category::resolve(" salary "),
            Err(FilterError::UnknownCategory("salary".to_string()))
        );
    }

    #[test]
    fn wire_names_match_display_names() -> anyhow::Result<()> {
        for category in Category::ALL {
            let encoded = serde_json::to_string(&category)?;
            assert_eq!(encoded, format!("\"{}\"", category.as_str()));
            let decoded: Category = serde_json::from_str(&encoded)?;
            assert_eq!(decoded, category);
        }
        Ok(())
    }
}
