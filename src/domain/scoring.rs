use serde::{Deserialize, Serialize};

/// Points awarded by each suggestion rule. The defaults are the portal's
/// established values; overriding them changes every ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub eu_export: u32,
    pub cbam: u32,
    pub goa_crz: u32,
    pub epr: u32,
    pub iso: u32,
    pub product_compliance: u32,
    pub disclosure: u32,
    pub scheme_mandatory: u32,
    pub max_score: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            eu_export: 40,
            cbam: 25,
            goa_crz: 45,
            epr: 40,
            iso: 20,
            product_compliance: 20,
            disclosure: 25,
            scheme_mandatory: 10,
            max_score: 100,
        }
    }
}

impl ScoringWeights {
    /// Rule weights by config key, `max_score` excluded.
    pub fn named_weights(&self) -> [(&'static str, u32); 8] {
        [
            ("eu_export", self.eu_export),
            ("cbam", self.cbam),
            ("goa_crz", self.goa_crz),
            ("epr", self.epr),
            ("iso", self.iso),
            ("product_compliance", self.product_compliance),
            ("disclosure", self.disclosure),
            ("scheme_mandatory", self.scheme_mandatory),
        ]
    }
}
