use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Categories without an explicit order sort after everything else
pub const DEFAULT_CATEGORY_ORDER: u32 = 999;

/// One catalogued security tool, as stored in `tools.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub maturity: Maturity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    /// `owner/repo` on GitHub
    #[serde(default)]
    pub github_repo: Option<String>,
    /// Absent until the updater has enriched the record
    #[serde(default)]
    pub stars: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installation: Option<Installation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_cases: Option<Vec<String>>,
    /// Framework name -> control ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_mapping: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similar_tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<String>,
}

impl Tool {
    /// The GitHub reference, if one is set and non-blank
    pub fn github_repo(&self) -> Option<&str> {
        self.github_repo
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    pub fn repo_ref(&self) -> Option<RepoRef> {
        self.github_repo().and_then(RepoRef::parse)
    }

    /// Milliseconds since the epoch; `None` when absent or unparseable
    pub fn added_at_millis(&self) -> Option<i64> {
        self.added_at.as_deref().and_then(parse_timestamp_millis)
    }
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates
pub fn parse_timestamp_millis(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.timestamp_millis());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Lifecycle state of a tool
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Maturity {
    Stable,
    #[default]
    Active,
    Experimental,
    Archived,
}

impl Maturity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Maturity::Stable => "stable",
            Maturity::Active => "active",
            Maturity::Experimental => "experimental",
            Maturity::Archived => "archived",
        }
    }

    pub fn all() -> [Maturity; 4] {
        [
            Maturity::Stable,
            Maturity::Active,
            Maturity::Experimental,
            Maturity::Archived,
        ]
    }
}

impl std::fmt::Display for Maturity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Maturity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Maturity::all()
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown maturity '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    #[serde(rename = "type")]
    pub pricing_type: PricingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingType {
    Free,
    Paid,
    Freemium,
    OpenSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installation {
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_managers: Option<Vec<String>>,
}

/// Display category, as stored in `categories.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl Category {
    pub fn sort_key(&self) -> u32 {
        self.order.unwrap_or(DEFAULT_CATEGORY_ORDER)
    }
}

/// Top-level shape of `categories.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoriesFile {
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// A GitHub `owner/repo` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Exactly two non-empty `/`-separated parts, otherwise `None`
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.trim().split('/');
        let owner = parts.next()?.trim();
        let name = parts.next()?.trim();

        if parts.next().is_some() || owner.is_empty() || name.is_empty() {
            return None;
        }

        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_deserializes_from_dataset_json() {
        let json = r#"{
            "id": "nmap",
            "name": "Nmap",
            "summary": "Network mapper",
            "categories": ["network", "recon"],
            "tags": ["scanner"],
            "platforms": ["linux", "windows"],
            "license": "GPL-2.0",
            "maturity": "stable",
            "github_repo": "nmap/nmap",
            "stars": null,
            "pricing": { "type": "open_source" },
            "compliance_mapping": { "NIST": ["CA-8", "RA-5"] },
            "added_at": "2024-01-15"
        }"#;

        let tool: Tool = serde_json::from_str(json).unwrap();
        assert_eq!(tool.maturity, Maturity::Stable);
        assert_eq!(tool.stars, None);
        assert_eq!(tool.repo_ref().unwrap().to_string(), "nmap/nmap");
        assert_eq!(
            tool.pricing.as_ref().map(|p| p.pricing_type),
            Some(PricingType::OpenSource)
        );
        assert!(tool.added_at_millis().is_some());
    }

    #[test]
    fn test_repo_ref_requires_two_parts() {
        assert_eq!(
            RepoRef::parse("sqlmapproject/sqlmap"),
            Some(RepoRef {
                owner: "sqlmapproject".into(),
                name: "sqlmap".into()
            })
        );
        assert_eq!(RepoRef::parse("sqlmap"), None);
        assert_eq!(RepoRef::parse("/sqlmap"), None);
        assert_eq!(RepoRef::parse("owner/"), None);
        assert_eq!(RepoRef::parse("a/b/c"), None);
    }

    #[test]
    fn test_blank_github_repo_counts_as_absent() {
        let mut tool: Tool = serde_json::from_str(r#"{"id":"x","name":"X"}"#).unwrap();
        tool.github_repo = Some("   ".into());
        assert_eq!(tool.github_repo(), None);
    }

    #[test]
    fn test_timestamp_parsing() {
        assert_eq!(parse_timestamp_millis("1970-01-02"), Some(86_400_000));
        assert_eq!(
            parse_timestamp_millis("1970-01-01T00:00:01.000Z"),
            Some(1_000)
        );
        assert_eq!(parse_timestamp_millis("last tuesday"), None);
    }

    #[test]
    fn test_category_order_defaults_low_priority() {
        let cat: Category = serde_json::from_str(r#"{"id":"web","name":"Web"}"#).unwrap();
        assert_eq!(cat.sort_key(), DEFAULT_CATEGORY_ORDER);
    }

    #[test]
    fn test_maturity_from_str() {
        assert_eq!("Archived".parse::<Maturity>(), Ok(Maturity::Archived));
        assert!("beta".parse::<Maturity>().is_err());
    }
}
