//! Graph data for the scheme mindmap.
//!
//! Category hubs sit on a ring around the canvas centre and schemes orbit
//! their hub. Positions are seeded from the category name so they are stable
//! between runs; a force-directed renderer can use them as starting points.

use crate::core::catalog::{group_by_category, UNCATEGORIZED};
use crate::domain::model::{Relation, RelationType, Scheme};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

pub const CANVAS_WIDTH: f64 = 1000.0;
pub const CANVAS_HEIGHT: f64 = 560.0;
pub const RING_RADIUS: f64 = 220.0;
pub const NODE_ORBIT: f64 = 70.0;
pub const SHARED_TAG_EDGES_PER_NODE: usize = 2;

const FALLBACK_COLOR: &str = "#8b9bff";

pub fn category_color(category: &str) -> &'static str {
    match category {
        "Regulatory Frameworks (India)" => "#ffb020",
        "EPR & Waste (India)" => "#7dd87d",
        "Product Compliance (India)" => "#e879f9",
        "Goa Environmental" => "#5eead4",
        "Coastal/CRZ (Goa)" => "#fb7185",
        "Trade & Carbon (EU)" => "#60a5fa",
        "Due Diligence (EU)" => "#f59e0b",
        "EEE Compliance (EU)" => "#a78bfa",
        "Disclosure (Global)" => "#34d399",
        "Management Systems (ISO)" => "#f472b6",
        "Carbon Accounting (Global)" => "#38bdf8",
        "Carbon Targets (Global)" => "#22d3ee",
        "Enablement/Certification (India)" => "#fbbf24",
        _ => FALLBACK_COLOR,
    }
}

/// FNV-1a seed feeding a mulberry32 stream.
struct SeededRand {
    state: u32,
}

impl SeededRand {
    fn new(seed: &str) -> Self {
        let mut h: u32 = 2_166_136_261;
        for unit in seed.encode_utf16() {
            h ^= u32::from(unit);
            h = h.wrapping_mul(16_777_619);
        }
        Self { state: h }
    }

    fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let h = self.state;
        let mut t = (h ^ (h >> 15)).wrapping_mul(1 | h);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t));
        f64::from(t ^ (t >> 14)) / 4_294_967_296.0
    }

    fn range(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_f64()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryHub {
    pub category: String,
    pub color: &'static str,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemeNode {
    pub id: String,
    pub code: String,
    pub title: String,
    pub category: String,
    pub mandatory: bool,
    pub color: &'static str,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    SharedTag,
    Relation(RelationType),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MindmapEdge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MindmapGraph {
    pub width: f64,
    pub height: f64,
    pub hubs: Vec<CategoryHub>,
    pub nodes: Vec<SchemeNode>,
    pub edges: Vec<MindmapEdge>,
}

pub fn build(schemes: &[Scheme], relations: &[Relation]) -> MindmapGraph {
    let (cx, cy) = (CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0);
    let refs: Vec<&Scheme> = schemes.iter().collect();
    let groups = group_by_category(&refs);

    let mut categories: Vec<&str> = groups.iter().map(|(c, _)| c.as_str()).collect();
    categories.sort_unstable();

    let n = categories.len() as f64;
    let hubs: Vec<CategoryHub> = categories
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let angle = (i as f64 / n) * PI * 2.0 - PI / 2.0;
            CategoryHub {
                category: category.to_string(),
                color: category_color(category),
                x: cx + angle.cos() * RING_RADIUS,
                y: cy + angle.sin() * RING_RADIUS,
                angle,
            }
        })
        .collect();
    let hub_by_category: HashMap<&str, &CategoryHub> =
        hubs.iter().map(|h| (h.category.as_str(), h)).collect();

    let mut nodes = Vec::with_capacity(schemes.len());
    for (category, list) in &groups {
        let Some(hub) = hub_by_category.get(category.as_str()) else {
            continue;
        };
        let mut rand = SeededRand::new(category);
        let len = list.len() as f64;
        for (idx, scheme) in list.iter().enumerate() {
            let theta = (idx as f64 / len) * PI * 2.0 + rand.range(0.0, 0.8);
            let r = NODE_ORBIT + rand.range(-16.0, 16.0);
            nodes.push(SchemeNode {
                id: scheme.id.clone(),
                code: scheme.code.clone(),
                title: scheme.title.clone(),
                category: category.clone(),
                mandatory: scheme.mandatory,
                color: hub.color,
                x: hub.x + theta.cos() * r,
                y: hub.y + theta.sin() * r,
            });
        }
    }

    let mut edges = shared_tag_edges(schemes, &groups);
    edges.extend(relation_edges(schemes, relations));

    MindmapGraph {
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
        hubs,
        nodes,
        edges,
    }
}

/// Links schemes across categories when they share a tag, capped per source node.
fn shared_tag_edges(schemes: &[Scheme], groups: &[(String, Vec<&Scheme>)]) -> Vec<MindmapEdge> {
    let tag_sets: HashMap<&str, HashSet<String>> = schemes
        .iter()
        .map(|s| (s.id.as_str(), s.tags.iter().map(|t| t.to_lowercase()).collect()))
        .collect();
    let category_of = |s: &Scheme| s.category.clone().unwrap_or_else(|| UNCATEGORIZED.to_string());

    let mut edges = Vec::new();
    for (_, list) in groups {
        for &scheme in list {
            let own = &tag_sets[scheme.id.as_str()];
            if own.is_empty() {
                continue;
            }
            let own_category = category_of(scheme);
            let mut added = 0;
            for other in schemes {
                if added >= SHARED_TAG_EDGES_PER_NODE {
                    break;
                }
                if other.id == scheme.id || category_of(other) == own_category {
                    continue;
                }
                let theirs = &tag_sets[other.id.as_str()];
                if !theirs.is_empty() && !own.is_disjoint(theirs) {
                    edges.push(MindmapEdge {
                        from: scheme.id.clone(),
                        to: other.id.clone(),
                        kind: EdgeKind::SharedTag,
                        note: None,
                    });
                    added += 1;
                }
            }
        }
    }
    edges
}

fn relation_edges(schemes: &[Scheme], relations: &[Relation]) -> Vec<MindmapEdge> {
    let known: HashSet<&str> = schemes.iter().map(|s| s.id.as_str()).collect();
    relations
        .iter()
        .filter(|r| {
            let resolvable = known.contains(r.from_id.as_str()) && known.contains(r.to_id.as_str());
            if !resolvable {
                tracing::debug!("Dropping relation {} with unknown endpoint", r.id);
            }
            resolvable
        })
        .map(|r| MindmapEdge {
            from: r.from_id.clone(),
            to: r.to_id.clone(),
            kind: EdgeKind::Relation(r.relation_type),
            note: r.note.clone(),
        })
        .collect()
}
