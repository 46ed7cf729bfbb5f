use crate::miner::{normalize_line, TemplateMiner};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateStat {
    pub template: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternSummary {
    pub id: usize,
    pub template: String,
    pub representative: String,
    pub size: usize,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total_lines: usize,
    pub unique_templates: usize,
    pub pattern_groups: usize,
    pub compression_ratio: f64,
    pub templates: Vec<TemplateStat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<PatternSummary>>,
}

/// How many input lines produced each template, most frequent first and
/// alphabetical among equals. Repeated lines count every time; blank lines
/// and lines missing from `results` are skipped.
pub fn template_stats<S: AsRef<str>>(lines: &[S], results: &HashMap<String, String>) -> Vec<TemplateStat> {
    let mut counts: AHashMap<&str, usize> = AHashMap::new();
    for line in lines {
        let Some(key) = normalize_line(line.as_ref()) else { continue };
        if let Some(template) = results.get(key) {
            *counts.entry(template.as_str()).or_insert(0) += 1;
        }
    }
    let mut stats: Vec<TemplateStat> = counts
        .into_iter()
        .map(|(template, count)| TemplateStat { template: template.to_string(), count })
        .collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.template.cmp(&b.template)));
    stats
}

impl Summary {
    /// `examples` > 0 adds that many member lines per pattern.
    pub fn build(miner: &TemplateMiner, templates: Vec<TemplateStat>, examples: usize) -> Self {
        let total_lines: usize = templates.iter().map(|s| s.count).sum();
        let unique_templates = templates.len();
        let compression_ratio = if total_lines == 0 { 0.0 } else { unique_templates as f64 / total_lines as f64 };
        let patterns = (examples > 0).then(|| {
            miner
                .patterns()
                .iter()
                .map(|p| PatternSummary {
                    id: p.id,
                    template: p.template.trim().to_string(),
                    representative: p
                        .representative()
                        .and_then(|id| miner.event(id))
                        .map(|e| e.content.clone())
                        .unwrap_or_default(),
                    size: p.len(),
                    examples: miner.pattern_events(p).take(examples).map(|e| e.raw.clone()).collect(),
                })
                .collect()
        });
        Self {
            total_lines,
            unique_templates,
            pattern_groups: miner.patterns().len(),
            compression_ratio,
            templates,
            patterns,
        }
    }
}
