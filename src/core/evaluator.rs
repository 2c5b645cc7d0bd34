//! Rule-based scheme suggestions for a single company.
//!
//! Every rule is a tag or category heuristic and adds a fixed number of
//! points. Rules are independent; each fires at most once per scheme.

use crate::domain::model::{Company, Scheme, Suggestion};
use crate::domain::scoring::ScoringWeights;
use std::cmp::Ordering;
use std::collections::HashSet;

pub const REASON_EU_EXPORT: &str = "Exports → EU applicability";
pub const REASON_CBAM: &str = "Trade & carbon mechanism likely relevant (CBAM family)";
pub const REASON_GOA_CRZ: &str = "Goa / CRZ presence → coastal & state regulations apply";
pub const REASON_EPR: &str = "Producer/Importer/Brand Owner → EPR obligations";
pub const REASON_ISO: &str = "Manufacturing → ISO management systems beneficial";
pub const REASON_PRODUCT: &str = "Manufacturing → product compliance likely needed";
pub const REASON_DISCLOSURE: &str = "Buyer requirements → disclosure frameworks relevant";
pub const REASON_FALLBACK: &str = "Potentially relevant";

struct CompanyProfile {
    tags: HashSet<String>,
    is_goa: bool,
    is_exporter: bool,
}

impl CompanyProfile {
    fn of(company: &Company) -> Self {
        let tags: HashSet<String> = company.tags.iter().map(|t| t.to_lowercase()).collect();
        let is_goa = ["goa", "in-ga", "crz"].iter().any(|t| tags.contains(*t));
        Self {
            tags,
            is_goa,
            is_exporter: company.export,
        }
    }

    fn has_any(&self, candidates: &[&str]) -> bool {
        candidates.iter().any(|t| self.tags.contains(*t))
    }
}

fn has_tag(scheme: &Scheme, tag: &str) -> bool {
    scheme.tags.iter().any(|t| t.to_lowercase() == tag)
}

fn category_has(category: &str, needle: &str) -> bool {
    category.contains(needle)
}

/// Scores every scheme against `company` with the default weights.
pub fn evaluate(company: &Company, schemes: &[Scheme]) -> Vec<Suggestion> {
    evaluate_with(company, schemes, &ScoringWeights::default())
}

pub fn evaluate_with(company: &Company, schemes: &[Scheme], weights: &ScoringWeights) -> Vec<Suggestion> {
    let profile = CompanyProfile::of(company);

    let mut out: Vec<Suggestion> = schemes
        .iter()
        .filter_map(|scheme| score_scheme(&profile, scheme, weights))
        .collect();

    out.sort_by(compare_suggestions);
    out
}

fn score_scheme(profile: &CompanyProfile, scheme: &Scheme, weights: &ScoringWeights) -> Option<Suggestion> {
    let category = scheme.category_or_empty().to_lowercase();
    let mut score: u32 = 0;
    let mut mandatory = false;
    let mut reasons: Vec<&str> = Vec::new();

    let is_eu = has_tag(scheme, "eu") || category_has(&category, "(eu)");
    let is_india = has_tag(scheme, "india") || category_has(&category, "(india)");
    let is_goa_tagged = has_tag(scheme, "goa")
        || category_has(&category, "goa")
        || category_has(&category, "coastal/crz");

    if profile.is_exporter && is_eu {
        score = score.saturating_add(weights.eu_export);
        reasons.push(REASON_EU_EXPORT);
        if has_tag(scheme, "cbam") || category_has(&category, "trade & carbon") {
            score = score.saturating_add(weights.cbam);
            reasons.push(REASON_CBAM);
        }
    }

    if is_india && profile.is_goa && is_goa_tagged {
        score = score.saturating_add(weights.goa_crz);
        reasons.push(REASON_GOA_CRZ);
        mandatory = true;
    }

    if is_india
        && profile.has_any(&["producer", "brandowner", "importer"])
        && (has_tag(scheme, "epr") || category_has(&category, "epr"))
    {
        score = score.saturating_add(weights.epr);
        reasons.push(REASON_EPR);
        mandatory = true;
    }

    if profile.has_any(&["manufacturing"]) {
        if category_has(&category, "management systems (iso)") {
            score = score.saturating_add(weights.iso);
            reasons.push(REASON_ISO);
        }
        if category_has(&category, "product compliance") || has_tag(scheme, "bis") || has_tag(scheme, "ce") {
            score = score.saturating_add(weights.product_compliance);
            reasons.push(REASON_PRODUCT);
        }
    }

    if profile.has_any(&["cdp", "gri", "ifrs"])
        && (category_has(&category, "disclosure") || has_tag(scheme, "disclosure"))
    {
        score = score.saturating_add(weights.disclosure);
        reasons.push(REASON_DISCLOSURE);
    }

    if scheme.mandatory {
        score = score.saturating_add(weights.scheme_mandatory);
    }

    if score == 0 {
        return None;
    }

    let reason = if reasons.is_empty() {
        REASON_FALLBACK.to_string()
    } else {
        reasons.join("; ")
    };

    Some(Suggestion {
        scheme: scheme.clone(),
        reason,
        mandatory: scheme.mandatory || mandatory,
        score: score.min(weights.max_score),
    })
}

/// Mandatory first, then higher score, then title.
fn compare_suggestions(a: &Suggestion, b: &Suggestion) -> Ordering {
    b.mandatory
        .cmp(&a.mandatory)
        .then_with(|| b.score.cmp(&a.score))
        .then_with(|| a.scheme.title.cmp(&b.scheme.title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn company(tags: &[&str], export: bool) -> Company {
        Company {
            id: "c1".to_string(),
            name: "Test MSME".to_string(),
            industry: None,
            employees: None,
            revenue_band: None,
            export,
            export_regions: vec![],
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    fn scheme(code: &str, category: Option<&str>, tags: &[&str], mandatory: bool) -> Scheme {
        let now = Utc::now();
        Scheme {
            id: format!("id-{}", code),
            code: code.to_string(),
            title: format!("{} title", code),
            category: category.map(str::to_string),
            issuing_authority: None,
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

    #[test]
    fn test_exporter_with_cbam_scheme_scores_65() {
        let c = company(&[], true);
        let s = scheme("EU-CBAM", Some("Trade & Carbon (EU)"), &["eu", "cbam"], false);

        let out = evaluate(&c, &[s]);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].score, 65);
        assert!(out[0].reason.contains("EU applicability"));
        assert!(out[0].reason.contains("CBAM family"));
        assert!(!out[0].mandatory);
    }

    #[test]
    fn test_goa_rule_needs_india_jurisdiction() {
        let c = company(&["goa"], false);
        let bare = scheme("GOA-CRZ", Some("Coastal/CRZ (Goa)"), &["goa", "crz"], false);
        assert!(evaluate(&c, &[bare]).is_empty());

        let indian = scheme("GOA-CRZ", Some("Coastal/CRZ (Goa)"), &["goa", "crz", "india"], false);
        let out = evaluate(&c, &[indian]);
        assert_eq!(out[0].score, 45);
        assert!(out[0].mandatory);
        assert_eq!(out[0].reason, REASON_GOA_CRZ);
    }

    #[test]
    fn test_in_ga_and_crz_tags_count_as_goa() {
        let s = scheme("GOA-SPCB", Some("Goa Environmental (India)"), &[], false);
        for tag in ["IN-GA", "crz"] {
            let out = evaluate(&company(&[tag], false), std::slice::from_ref(&s));
            assert_eq!(out[0].score, 45, "tag {}", tag);
        }
    }

    #[test]
    fn test_mandatory_scheme_without_rules_uses_fallback_reason() {
        let out = evaluate(&company(&[], false), &[scheme("X", Some("Other"), &[], true)]);
        assert_eq!(out[0].score, 10);
        assert!(out[0].mandatory);
        assert_eq!(out[0].reason, REASON_FALLBACK);
    }

    #[test]
    fn test_unrelated_scheme_is_excluded() {
        let out = evaluate(&company(&[], false), &[scheme("X", Some("Unrelated"), &[], false)]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_manufacturing_iso() {
        let out = evaluate(
            &company(&["Manufacturing"], false),
            &[scheme("ISO-14001", Some("Management Systems (ISO)"), &[], false)],
        );
        assert_eq!(out[0].score, 20);
        assert_eq!(out[0].reason, REASON_ISO);
    }

    #[test]
    fn test_manufacturing_rules_stack() {
        let s = scheme(
            "HYBRID",
            Some("Management Systems (ISO) / Product Compliance"),
            &["bis"],
            false,
        );
        let out = evaluate(&company(&["manufacturing"], false), &[s]);
        assert_eq!(out[0].score, 40);
        assert_eq!(out[0].reason, format!("{}; {}", REASON_ISO, REASON_PRODUCT));
    }

    #[test]
    fn test_epr_requires_india_and_producer_marker() {
        let s = scheme("PWM-EPR", Some("EPR & Waste (India)"), &["plastic"], false);

        assert!(evaluate(&company(&["manufacturing"], false), std::slice::from_ref(&s)).is_empty());

        let out = evaluate(&company(&["BrandOwner"], false), &[s]);
        assert_eq!(out[0].score, 40);
        assert!(out[0].mandatory);
        assert_eq!(out[0].reason, REASON_EPR);
    }

    #[test]
    fn test_disclosure_for_buyer_driven_company() {
        let s = scheme("GRI", Some("Disclosure (Global)"), &["global"], false);
        let out = evaluate(&company(&["cdp"], false), &[s]);
        assert_eq!(out[0].score, 25);
        assert_eq!(out[0].reason, REASON_DISCLOSURE);
    }

    #[test]
    fn test_missing_category_and_tags_never_match() {
        let s = scheme("BARE", None, &[], false);
        let c = company(&["goa", "producer", "manufacturing", "cdp"], true);
        assert!(evaluate(&c, &[s]).is_empty());
    }

    #[test]
    fn test_score_is_clamped() {
        let s = scheme(
            "EVERYTHING",
            Some("Trade & Carbon (EU) Goa EPR Disclosure (India)"),
            &["eu", "india"],
            true,
        );
        let c = company(&["goa", "producer", "cdp"], true);
        let out = evaluate(&c, &[s]);
        // 40 + 25 + 45 + 40 + 25 + 10
        assert_eq!(out[0].score, 100);
        assert!(out[0].mandatory);
    }

    #[test]
    fn test_custom_weights() {
        let weights = ScoringWeights {
            scheme_mandatory: 5,
            max_score: 50,
            ..ScoringWeights::default()
        };
        let c = company(&[], true);
        let schemes = [
            scheme("M", Some("Other"), &[], true),
            scheme("EU-CBAM", Some("Trade & Carbon (EU)"), &["eu", "cbam"], false),
        ];
        let out = evaluate_with(&c, &schemes, &weights);
        assert_eq!(out[0].score, 5);
        assert_eq!(out[1].score, 50);
    }

    #[test]
    fn test_sort_order() {
        let c = company(&["manufacturing"], false);
        let mut b = scheme("B", Some("Management Systems (ISO)"), &[], false);
        b.title = "Beta".to_string();
        let mut a = scheme("A", Some("Management Systems (ISO)"), &[], false);
        a.title = "Alpha".to_string();
        let mut m = scheme("M", Some("Other"), &[], true);
        m.title = "Zeta".to_string();
        let mut p = scheme(
            "P",
            Some("Management Systems (ISO) / Product Compliance"),
            &["ce"],
            false,
        );
        p.title = "Omega".to_string();

        let out = evaluate(&c, &[b, a, m, p]);
        let titles: Vec<&str> = out.iter().map(|s| s.scheme.title.as_str()).collect();
        assert_eq!(titles, vec!["Zeta", "Omega", "Alpha", "Beta"]);
    }

    #[test]
    fn test_huge_weights_saturate_then_clamp() {
        let weights = ScoringWeights {
            eu_export: u32::MAX - 5,
            cbam: 100,
            ..ScoringWeights::default()
        };
        let c = company(&[], true);
        let schemes = [scheme("EU-CBAM", Some("Trade & Carbon (EU)"), &["eu", "cbam"], true)];
        let out = evaluate_with(&c, &schemes, &weights);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].score, 100);
    }
}
