//! Bond reconstruction from the flat token stream of a contribution statement.
//!
//! The stream has no record boundaries. Every start date is an anchor: the
//! end date is looked up just after it, the employer name just before it.
//! The scan is single-pass; a date directly preceded by another date is the
//! end of the previous window and never starts a new bond.

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::classify::{is_date, is_header_marker, is_rejected_name, normalize, Classifier};
use crate::types::{Bond, BondCandidate, BondEnd};
use cnis_core::HeuristicConfig;

/// Walks a token sequence and assembles bond candidates.
#[derive(Debug, Clone)]
pub struct BondReconstructor {
    config: HeuristicConfig,
    classifier: Classifier,
}

impl Default for BondReconstructor {
    fn default() -> Self {
        Self::new(HeuristicConfig::default())
    }
}

impl BondReconstructor {
    pub fn new(config: HeuristicConfig) -> Self {
        let classifier = Classifier::new(&config);
        Self { config, classifier }
    }

    /// Reconstruct all bond candidates, in stream order.
    pub fn reconstruct<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<BondCandidate> {
        let tokens: Vec<&str> = tokens.iter().map(|t| t.as_ref()).collect();
        let mut candidates = Vec::new();

        for i in 0..tokens.len() {
            if !is_date(tokens[i]) {
                continue;
            }
            if i > 0 && is_date(tokens[i - 1]) {
                continue;
            }
            if self.follows_header(&tokens, i) {
                debug!("Skipping header date {} at {}", tokens[i], i);
                continue;
            }

            let end_date = self.end_date(&tokens, i);

            let company_name = match self.find_name(&tokens, i) {
                Some(name) => name,
                None => {
                    debug!("No employer name found for date {} at {}", tokens[i], i);
                    continue;
                }
            };

            if is_rejected_name(&company_name) {
                debug!("Rejected header text as name: {}", company_name);
                continue;
            }
            if company_name.chars().count() < self.config.min_name_len {
                debug!("Rejected short name: {}", company_name);
                continue;
            }

            candidates.push(BondCandidate {
                company_name,
                start_date: tokens[i].to_string(),
                end_date,
            });
        }

        info!(
            "Reconstructed {} bond(s) from {} tokens",
            candidates.len(),
            tokens.len()
        );
        candidates
    }

    /// Whether any of the few tokens before `i` is an identification label.
    fn follows_header(&self, tokens: &[&str], i: usize) -> bool {
        (1..=self.config.header_lookback)
            .take_while(|k| *k <= i)
            .any(|k| is_header_marker(&normalize(tokens[i - k])))
    }

    /// End date right after the start, or after one intervening column.
    fn end_date(&self, tokens: &[&str], i: usize) -> BondEnd {
        [i + 1, i + 2]
            .into_iter()
            .find_map(|j| match tokens.get(j) {
                Some(t) if is_date(t) => Some(BondEnd::Closed(t.to_string())),
                _ => None,
            })
            .unwrap_or(BondEnd::Ongoing)
    }

    /// Nearest plausible name before `i`, optionally joined with the fragment
    /// preceding it. Never crosses an earlier date.
    fn find_name(&self, tokens: &[&str], i: usize) -> Option<String> {
        let floor = i.saturating_sub(self.config.name_lookback);
        for j in (floor..i).rev() {
            let candidate = tokens[j];
            if !self.classifier.should_ignore(candidate) {
                if j > 0 {
                    let prev = tokens[j - 1];
                    if !self.classifier.should_ignore(prev) && !prev.contains(':') {
                        return Some(format!("{} {}", prev, candidate));
                    }
                }
                return Some(candidate.to_string());
            }
            if is_date(candidate) {
                return None;
            }
        }
        None
    }
}

/// Reconstruct bonds and attach durations as of `today`.
pub fn extract_bonds_at<S: AsRef<str>>(
    tokens: &[S],
    config: &HeuristicConfig,
    today: NaiveDate,
) -> Vec<Bond> {
    BondReconstructor::new(config.clone())
        .reconstruct(tokens)
        .into_iter()
        .map(|candidate| Bond::from_candidate(candidate, today))
        .collect()
}

/// Reconstruct bonds; ongoing ones are measured against the local date.
pub fn extract_bonds<S: AsRef<str>>(tokens: &[S], config: &HeuristicConfig) -> Vec<Bond> {
    extract_bonds_at(tokens, config, Local::now().date_naive())
}
