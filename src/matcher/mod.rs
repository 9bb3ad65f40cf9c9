//! Structural similarity between two schemas.
//!
//! Each schema becomes an [`AttributeGraph`]. Every non-object attribute of
//! the first schema is matched against every non-object attribute of the
//! second, independently under an edit distance over raw names and a
//! semantic distance over preprocessed names. The report averages the best
//! distance per attribute. It is only used to rank suggestions.

mod graph;
mod lexical;
mod ontology;
mod preprocess;

pub use graph::{Attribute, AttributeGraph};
pub use lexical::{edit_distance, jaro, jaro_winkler};
pub use ontology::{Lexicon, Ontology};
pub use preprocess::preprocess;

use serde::Serialize;
use serde_json::Value;

/// Mean best-match distances; `0.0` is identical, `1.0` is unrelated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityReport {
    pub edit_average: f64,
    pub lexical_average: f64,
}

impl SimilarityReport {
    const WORST: SimilarityReport = SimilarityReport {
        edit_average: 1.0,
        lexical_average: 1.0,
    };
}

/// The best partner of one attribute under each distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafMatch {
    pub name: String,
    pub edit_distance: f64,
    pub edit_partner: Option<String>,
    pub lexical_distance: f64,
    pub lexical_partner: Option<String>,
}

pub struct Matcher {
    ontology: Box<dyn Ontology>,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_ontology(Lexicon)
    }
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ontology(ontology: impl Ontology + 'static) -> Self {
        Self {
            ontology: Box::new(ontology),
        }
    }

    pub fn compare(&self, a: &Value, b: &Value) -> SimilarityReport {
        let matches = self.best_matches(a, b);
        if matches.is_empty() {
            return SimilarityReport::WORST;
        }
        let n = matches.len() as f64;
        SimilarityReport {
            edit_average: matches.iter().map(|m| m.edit_distance).sum::<f64>() / n,
            lexical_average: matches.iter().map(|m| m.lexical_distance).sum::<f64>() / n,
        }
    }

    /// For every non-object attribute of `a`, its closest attribute in `b`.
    pub fn best_matches(&self, a: &Value, b: &Value) -> Vec<LeafMatch> {
        let graph_a = AttributeGraph::from_schema(a);
        let graph_b = AttributeGraph::from_schema(b);

        graph_a
            .leaves()
            .map(|(ia, attr_a)| {
                let mut best = LeafMatch {
                    name: attr_a.raw_name.clone(),
                    edit_distance: 1.0,
                    edit_partner: None,
                    lexical_distance: 1.0,
                    lexical_partner: None,
                };
                for (ib, attr_b) in graph_b.leaves() {
                    let edit = edit_distance(&attr_a.raw_name, &attr_b.raw_name);
                    if best.edit_partner.is_none() || edit < best.edit_distance {
                        best.edit_distance = edit;
                        best.edit_partner = Some(attr_b.raw_name.clone());
                    }
                    let lexical = self.semantic_distance(&graph_a, ia, &graph_b, ib);
                    if best.lexical_partner.is_none() || lexical < best.lexical_distance {
                        best.lexical_distance = lexical;
                        best.lexical_partner = Some(attr_b.raw_name.clone());
                    }
                }
                best
            })
            .collect()
    }

    /// `1 - best Wu-Palmer similarity`, or `1.0` without a sense.
    fn word_distance(&self, a: &str, b: &str) -> f64 {
        self.ontology
            .similarity(a, b)
            .map(|s| 1.0 - s)
            .unwrap_or(1.0)
    }

    /// Single-word names of one side are widened to two words by prefixing
    /// the nearest named ancestor, or the word itself at the top level.
    fn phrase<'g>(graph: &'g AttributeGraph, index: usize, word: &'g str) -> [&'g str; 2] {
        let ancestor = graph
            .named_ancestor(index)
            .and_then(|a| a.name.split_whitespace().last())
            .unwrap_or(word);
        [ancestor, word]
    }

    fn semantic_distance(&self, ga: &AttributeGraph, ia: usize, gb: &AttributeGraph, ib: usize) -> f64 {
        let words_a: Vec<&str> = ga.attributes[ia].name.split_whitespace().collect();
        let words_b: Vec<&str> = gb.attributes[ib].name.split_whitespace().collect();

        let pair = |a: [&str; 2], b: [&str; 2]| {
            (self.word_distance(a[0], b[0]) + self.word_distance(a[1], b[1])) / 2.0
        };

        match (words_a.as_slice(), words_b.as_slice()) {
            (&[a], &[b]) => self.word_distance(a, b),
            (&[a], &[b0, b1]) => pair(Self::phrase(ga, ia, a), [b0, b1]),
            (&[a0, a1], &[b]) => pair([a0, a1], Self::phrase(gb, ib, b)),
            (&[a0, a1], &[b0, b1]) => pair([a0, a1], [b0, b1]),
            _ => 1.0,
        }
    }
}

/// Compares two schemas with the built-in [`Lexicon`].
pub fn compare(a: &Value, b: &Value) -> SimilarityReport {
    Matcher::new().compare(a, b)
}

/// Per-attribute best matches with the built-in [`Lexicon`].
pub fn best_matches(a: &Value, b: &Value) -> Vec<LeafMatch> {
    Matcher::new().best_matches(a, b)
}
