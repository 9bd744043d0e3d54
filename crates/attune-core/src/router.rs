//! Attention router: decay, keyword activation, co-activation, pin floor, tiers
//!
//! Phase order is fixed. Decay runs first so that a document activated this
//! turn leaves the turn at exactly 1.0.

use crate::config::{RuleConfig, Thresholds};
use crate::ordered::OrderedMap;
use crate::types::{clamp_score, AttentionState, TierPartition};
use chrono::Utc;
use petgraph::graph::{Graph, NodeIndex};
use regex::Regex;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

#[derive(Debug)]
pub struct Router {
    config: RuleConfig,
    matchers: Vec<(String, Vec<Regex>)>,
    co_activation: CoActivationGraph,
}

impl Router {
    pub fn new(config: RuleConfig) -> Self {
        let matchers = build_matchers(&config.keywords);
        let co_activation = CoActivationGraph::build(&config.co_activation);

        Self {
            config,
            matchers,
            co_activation,
        }
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Run one turn over `state` and return the keyword-matched documents
    pub fn update_attention(&self, state: &mut AttentionState, prompt: &str) -> Vec<String> {
        state.normalize();
        for doc in self.config.documents() {
            state.scores.get_or_insert_with(doc, || 0.0);
        }

        // Phase 1: Decay
        apply_decay(&mut state.scores, &self.config);

        // Phase 2: Keyword match
        let matched = self.match_keywords(prompt);

        // Phase 3: Activation
        apply_activation(&mut state.scores, &matched);

        // Phase 4: Co-activation (direct neighbors only)
        self.apply_co_activation(&mut state.scores, &matched);

        // Phase 5: Pinned floor
        apply_pin_floor(&mut state.scores, &self.config);

        state.turn_count += 1;
        state.last_update = Some(Utc::now());

        tracing::debug!(turn = state.turn_count, matched = ?matched, "attention updated");
        matched
    }

    /// Documents with at least one keyword occurring as a whole word in
    /// `prompt`, in config order
    pub fn match_keywords(&self, prompt: &str) -> Vec<String> {
        let prompt_lower = prompt.to_lowercase();
        self.matchers
            .iter()
            .filter(|(_, patterns)| patterns.iter().any(|re| re.is_match(&prompt_lower)))
            .map(|(doc, _)| doc.clone())
            .collect()
    }

    fn apply_co_activation(&self, scores: &mut OrderedMap<f64>, matched: &[String]) {
        let boost = self.config.coactivation_boost;
        for doc in matched {
            for neighbor in self.co_activation.neighbors(doc) {
                let score = scores.get_or_insert_with(neighbor, || 0.0);
                *score = clamp_score((*score + boost).min(1.0));
            }
        }
    }

    /// Phase 6: tier partition of the current scores
    pub fn partition(&self, state: &AttentionState) -> TierPartition {
        partition_scores(&state.scores, &self.config.thresholds)
    }
}

/// Multiply every score by its decay rate
pub fn apply_decay(scores: &mut OrderedMap<f64>, config: &RuleConfig) {
    let rates: Vec<f64> = scores.keys().map(|doc| config.decay_rate(doc)).collect();
    for (score, rate) in scores.values_mut().zip(rates) {
        *score = clamp_score(*score * rate);
    }
}

/// Matched documents go to exactly 1.0, whatever they decayed to
pub fn apply_activation(scores: &mut OrderedMap<f64>, matched: &[String]) {
    for doc in matched {
        scores.insert(doc.as_str(), 1.0);
    }
}

/// Raise pinned documents to the pinned floor; never lowers a score
pub fn apply_pin_floor(scores: &mut OrderedMap<f64>, config: &RuleConfig) {
    let floor = config.pinned_floor();
    for doc in &config.pinned {
        let score = scores.get_or_insert_with(doc, || 0.0);
        *score = score.max(floor);
    }
}

/// Walk documents by descending score (stable on ties). A document that
/// qualifies for HOT after the HOT slots are full is tried against WARM.
pub fn partition_scores(scores: &OrderedMap<f64>, thresholds: &Thresholds) -> TierPartition {
    let mut ranked: Vec<(&str, f64)> = scores.iter().map(|(doc, &score)| (doc, score)).collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let mut partition = TierPartition::default();
    for (doc, score) in ranked {
        if score >= thresholds.hot && partition.hot.len() < thresholds.max_hot_files {
            partition.hot.push(doc.to_string());
        } else if score >= thresholds.warm && partition.warm.len() < thresholds.max_warm_files {
            partition.warm.push(doc.to_string());
        } else {
            partition.cold.push(doc.to_string());
        }
    }
    partition
}

fn build_matchers(keywords: &OrderedMap<Vec<String>>) -> Vec<(String, Vec<Regex>)> {
    keywords
        .iter()
        .map(|(doc, words)| {
            let patterns = words
                .iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .filter_map(|w| {
                    let pattern = format!(r"\b{}\b", regex::escape(&w));
                    match Regex::new(&pattern) {
                        Ok(re) => Some(re),
                        Err(e) => {
                            tracing::warn!(doc, keyword = %w, error = %e, "skipping keyword");
                            None
                        }
                    }
                })
                .collect();
            (doc.to_string(), patterns)
        })
        .collect()
}

/// Directed co-activation relation. Lookups return a document's adjacency
/// list in config order, duplicates included.
#[derive(Debug)]
struct CoActivationGraph {
    graph: Graph<String, ()>,
    node_indices: HashMap<String, NodeIndex>,
}

impl CoActivationGraph {
    fn build(co_activation: &OrderedMap<Vec<String>>) -> Self {
        let mut graph = Graph::new();
        let mut node_indices = HashMap::new();

        let mut seen = HashSet::new();
        for (from, to_list) in co_activation.iter() {
            for node in std::iter::once(from).chain(to_list.iter().map(String::as_str)) {
                if seen.insert(node) {
                    let idx = graph.add_node(node.to_string());
                    node_indices.insert(node.to_string(), idx);
                }
            }
        }

        for (from, to_list) in co_activation.iter() {
            let from_idx = node_indices[from];
            for to in to_list {
                graph.add_edge(from_idx, node_indices[to.as_str()], ());
            }
        }

        Self {
            graph,
            node_indices,
        }
    }

    fn neighbors(&self, doc: &str) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(doc) else {
            return Vec::new();
        };
        // petgraph yields the most recently added edge first
        let mut related: Vec<&str> = self
            .graph
            .neighbors(idx)
            .filter_map(|n| self.graph.node_weight(n).map(String::as_str))
            .collect();
        related.reverse();
        related
    }
}
