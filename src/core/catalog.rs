use crate::domain::model::Scheme;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MandatoryFilter {
    #[default]
    All,
    Mandatory,
    Voluntary,
}

impl FromStr for MandatoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(MandatoryFilter::All),
            "true" | "mandatory" => Ok(MandatoryFilter::Mandatory),
            "false" | "voluntary" => Ok(MandatoryFilter::Voluntary),
            other => Err(format!("expected all|true|false, got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemeFilter {
    pub query: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub mandatory: MandatoryFilter,
}

impl SchemeFilter {
    pub fn matches(&self, scheme: &Scheme) -> bool {
        self.matches_query(scheme)
            && self.matches_category(scheme)
            && self.matches_tags(scheme)
            && self.matches_mandatory(scheme)
    }

    fn matches_query(&self, scheme: &Scheme) -> bool {
        let needle = match self.query.as_deref().map(str::to_lowercase) {
            Some(q) if !q.is_empty() => q,
            _ => return true,
        };
        let contains = |s: &str| s.to_lowercase().contains(&needle);

        contains(scheme.title.as_str())
            || contains(scheme.code.as_str())
            || scheme.description.as_deref().is_some_and(contains)
            || contains(scheme.category_or_empty())
            || scheme.issuing_authority.as_deref().is_some_and(contains)
            || scheme.tags.iter().any(|t| contains(t.as_str()))
    }

    fn matches_category(&self, scheme: &Scheme) -> bool {
        self.categories.is_empty()
            || self
                .categories
                .iter()
                .any(|c| Some(c.as_str()) == scheme.category.as_deref())
    }

    fn matches_tags(&self, scheme: &Scheme) -> bool {
        self.tags.is_empty() || scheme.tags.iter().any(|t| self.tags.contains(t))
    }

    fn matches_mandatory(&self, scheme: &Scheme) -> bool {
        match self.mandatory {
            MandatoryFilter::All => true,
            MandatoryFilter::Mandatory => scheme.mandatory,
            MandatoryFilter::Voluntary => !scheme.mandatory,
        }
    }

    pub fn apply<'a>(&self, schemes: &'a [Scheme]) -> Vec<&'a Scheme> {
        schemes.iter().filter(|s| self.matches(s)).collect()
    }
}

/// Groups by category, keeping the order in which categories first appear.
pub fn group_by_category<'a>(schemes: &[&'a Scheme]) -> Vec<(String, Vec<&'a Scheme>)> {
    let mut groups: Vec<(String, Vec<&'a Scheme>)> = Vec::new();
    for &scheme in schemes {
        let key = scheme.category.as_deref().unwrap_or(UNCATEGORIZED);
        match groups.iter_mut().find(|(k, _)| k.as_str() == key) {
            Some((_, items)) => items.push(scheme),
            None => groups.push((key.to_string(), vec![scheme])),
        }
    }
    groups
}

pub fn all_categories(schemes: &[Scheme]) -> Vec<String> {
    schemes
        .iter()
        .filter_map(|s| s.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn all_tags(schemes: &[Scheme]) -> Vec<String> {
    schemes
        .iter()
        .flat_map(|s| s.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn scheme(code: &str, category: &str, tags: &[&str], mandatory: bool) -> Scheme {
        let now = Utc::now();
        Scheme {
            id: code.to_lowercase(),
            code: code.to_string(),
            title: format!("{} standard", code),
            category: Some(category.to_string()),
            issuing_authority: Some("Authority".to_string()),
            mandatory,
            description: None,
            eligibility: None,
            process: None,
            benefits: None,
            deadlines: None,
            features: vec![],
            tags: tags.iter().map(|t| t.to_string()).collect(),
            references: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    fn catalog() -> Vec<Scheme> {
        vec![
            scheme("GRI", "Disclosure (Global)", &["global", "disclosure"], false),
            scheme("BRSR", "Regulatory Frameworks (India)", &["india", "disclosure"], true),
            scheme("ISO-14001", "Management Systems (ISO)", &["iso"], false),
            scheme("IFRS-S1S2", "Disclosure (Global)", &["investor"], false),
        ]
    }

    #[test]
    fn test_query_matches_code_case_insensitively() {
        let schemes = catalog();
        let filter = SchemeFilter {
            query: Some("brsr".to_string()),
            ..Default::default()
        };
        let hits = filter.apply(&schemes);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "BRSR");
    }

    #[test]
    fn test_query_matches_tags_and_authority() {
        let schemes = catalog();
        let by_tag = SchemeFilter {
            query: Some("INVEST".to_string()),
            ..Default::default()
        };
        assert_eq!(by_tag.apply(&schemes).len(), 1);

        let by_authority = SchemeFilter {
            query: Some("authority".to_string()),
            ..Default::default()
        };
        assert_eq!(by_authority.apply(&schemes).len(), 4);
    }

    #[test]
    fn test_filters_combine() {
        let schemes = catalog();
        let filter = SchemeFilter {
            query: None,
            categories: vec!["Disclosure (Global)".to_string()],
            tags: vec!["disclosure".to_string()],
            mandatory: MandatoryFilter::Voluntary,
        };
        let hits = filter.apply(&schemes);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "GRI");
    }

    #[test]
    fn test_mandatory_filter_parse() {
        assert_eq!("true".parse::<MandatoryFilter>().unwrap(), MandatoryFilter::Mandatory);
        assert_eq!("Voluntary".parse::<MandatoryFilter>().unwrap(), MandatoryFilter::Voluntary);
        assert!("maybe".parse::<MandatoryFilter>().is_err());
    }

    #[test]
    fn test_grouping_and_facets() {
        let schemes = catalog();
        let refs: Vec<&Scheme> = schemes.iter().collect();
        let groups = group_by_category(&refs);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].0, "Disclosure (Global)");
        assert_eq!(groups[0].1.len(), 2);

        assert_eq!(
            all_categories(&schemes),
            vec![
                "Disclosure (Global)",
                "Management Systems (ISO)",
                "Regulatory Frameworks (India)"
            ]
        );
        assert_eq!(all_tags(&schemes)[0], "disclosure");
    }
}
