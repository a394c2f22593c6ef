use std::collections::BTreeSet;
use std::str::FromStr;

use crate::models::Maturity;

/// Facet selection. Each set is ANY-of; an empty set does not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub categories: BTreeSet<String>,
    pub platforms: BTreeSet<String>,
    pub licenses: BTreeSet<String>,
    pub maturity: BTreeSet<Maturity>,
}

impl FilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platforms.insert(platform.into());
        self
    }

    pub fn license(mut self, license: impl Into<String>) -> Self {
        self.licenses.insert(license.into());
        self
    }

    pub fn maturity(mut self, maturity: Maturity) -> Self {
        self.maturity.insert(maturity);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.platforms.is_empty()
            && self.licenses.is_empty()
            && self.maturity.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Stars,
    Name,
    AddedAt,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Stars => "stars",
            SortField::Name => "name",
            SortField::AddedAt => "added_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Single-key sort; defaults to most starred first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortOption {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOption {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

/// `<field>-<direction>`, e.g. `stars-desc` or `added_at-asc`
impl std::fmt::Display for SortOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.field.as_str(), self.direction.as_str())
    }
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = s
            .trim()
            .rsplit_once('-')
            .ok_or_else(|| format!("expected <field>-<direction>, got '{}'", s))?;

        let field = match field {
            "stars" => SortField::Stars,
            "name" => SortField::Name,
            "added_at" => SortField::AddedAt,
            other => return Err(format!("unknown sort field '{}'", other)),
        };

        let direction = match direction {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            other => return Err(format!("unknown sort direction '{}'", other)),
        };

        Ok(Self { field, direction })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_mean_no_restriction() {
        assert!(FilterOptions::default().is_empty());
        assert_eq!(
            SortOption::default(),
            SortOption::new(SortField::Stars, SortDirection::Desc)
        );
    }

    #[test]
    fn test_sort_option_tokens() {
        let sort: SortOption = "added_at-asc".parse().unwrap();
        assert_eq!(sort, SortOption::new(SortField::AddedAt, SortDirection::Asc));
        assert_eq!(sort.to_string(), "added_at-asc");

        assert!("stars".parse::<SortOption>().is_err());
        assert!("forks-desc".parse::<SortOption>().is_err());
        assert!("name-sideways".parse::<SortOption>().is_err());
    }
}
