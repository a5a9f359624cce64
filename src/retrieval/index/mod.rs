
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::retrieval::tokenizer::tokenize;

/// Weight of one term within one document
#[derive(Debug, Clone, Copy, PartialEq)]
struct Posting {
    document: usize,
    weight: f64,
}

/// Sparse TF-IDF vector space over a fixed document set
///
/// Term frequencies are raw counts, idf is smoothed as `ln((1 + n) / (1 + df)) + 1`,
/// and every document vector is L2-normalised. Scores are therefore cosine similarities.
#[derive(Debug, Clone, Default)]
pub struct TfIdfIndex {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    postings: Vec<Vec<Posting>>,
    document_count: usize,
}

impl TfIdfIndex {
    /// Build the index from the complete document set
    #[inline]
    pub fn build<S: AsRef<str>>(documents: &[S]) -> Self {
        let tokenized = documents
            .iter()
            .map(|d| tokenize(d.as_ref()))
            .collect::<Vec<_>>();

        // Sorted so term ids do not depend on hash order
        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &tokenized {
            for term in tokens.iter().map(String::as_str).unique() {
                *document_frequency.entry(term).or_default() += 1;
            }
        }

        let n = documents.len() as f64;
        let mut vocabulary = HashMap::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (id, (term, df)) in document_frequency.into_iter().enumerate() {
            vocabulary.insert(term.to_owned(), id);
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
        }

        let mut postings = vec![Vec::new(); idf.len()];
        for (document, tokens) in tokenized.iter().enumerate() {
            for (term, weight) in weigh(tokens, &vocabulary, &idf) {
                postings[term].push(Posting { document, weight });
            }
        }

        debug!(
            "Built TF-IDF index over {} documents with {} terms",
            documents.len(),
            idf.len()
        );

        Self {
            vocabulary,
            idf,
            postings,
            document_count: documents.len(),
        }
    }

    /// Number of indexed documents
    #[inline]
    pub fn len(&self) -> usize {
        self.document_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.document_count == 0
    }

    /// Number of distinct terms
    #[inline]
    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    /// Inverse document frequency of a term, if the term is known
    #[inline]
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&id| self.idf[id])
    }

    /// Project text into the index space as a normalised sparse vector of `(term id, weight)`
    ///
    /// Terms outside the vocabulary are ignored.
    #[inline]
    pub fn vectorize(&self, text: &str) -> Vec<(usize, f64)> {
        weigh(&tokenize(text), &self.vocabulary, &self.idf)
    }

    /// Cosine similarity between the query and every document, in document order
    #[inline]
    pub fn scores(&self, query: &str) -> Vec<f64> {
        let mut scores = vec![0.0; self.document_count];

        for (term, query_weight) in self.vectorize(query) {
            for posting in &self.postings[term] {
                let score = &mut scores[posting.document];
                *score = query_weight.mul_add(posting.weight, *score);
            }
        }

        for score in &mut scores {
            *score = score.clamp(0.0, 1.0);
        }

        scores
    }
}

fn weigh(tokens: &[String], vocabulary: &HashMap<String, usize>, idf: &[f64]) -> Vec<(usize, f64)> {
    let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
    for token in tokens {
        if let Some(&id) = vocabulary.get(token.as_str()) {
            *counts.entry(id).or_insert(0.0) += 1.0;
        }
    }

    let mut vector = counts
        .into_iter()
        .map(|(id, tf)| (id, tf * idf[id]))
        .collect::<Vec<_>>();

    let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, weight) in &mut vector {
            *weight /= norm;
        }
    }

    vector
}
