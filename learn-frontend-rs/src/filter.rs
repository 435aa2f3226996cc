//! Which questions are visible, given the search term and the selected facets.

use std::fmt;

use regex::{Match, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::catalog::{Category, Domain, Level, QuestionRecord};
use crate::progress::{ProgressState, ProgressTracker};

/// One facet selection: the "All" sentinel or a single value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[serde(rename_all = "camelCase")]
pub enum Facet<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Facet<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Facet::All => true,
            Facet::Only(selected) => selected == value,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Facet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Facet::All => f.write_str("All"),
            Facet::Only(value) => value.fmt(f),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Already debounced.
    pub search_term: String,
    pub category: Facet<Category>,
    pub level: Facet<Level>,
    pub domain: Facet<Domain>,
    pub unread_only: bool,
    pub starred_only: bool,
}

impl FilterCriteria {
    pub fn matches(&self, record: &QuestionRecord, progress: &ProgressState) -> bool {
        match SearchPattern::new(&self.search_term) {
            Ok(pattern) => self.matches_pattern(record, progress, &pattern),
            Err(e) => {
                log::warn!("Search term {:?} cannot be matched: {e}", self.search_term);
                false
            }
        }
    }

    fn matches_pattern(
        &self,
        record: &QuestionRecord,
        progress: &ProgressState,
        pattern: &SearchPattern,
    ) -> bool {
        (pattern.is_match(&record.question) || pattern.is_match(&record.answer))
            && self.category.matches(&record.category)
            && self.level.matches(&record.level)
            && self.domain.matches(&record.domain)
            && (!self.unread_only || !progress.is_read(&record.id))
            && (!self.starred_only || progress.is_starred(&record.id))
    }
}

/// A compiled search term. The term is literal text, never a pattern, so `c++` or `a.b` match
/// only themselves. Filtering and highlighting both go through this, so a question that is
/// shown always has something to highlight.
#[derive(Clone, Debug, Default)]
pub struct SearchPattern(Option<Regex>);

impl SearchPattern {
    pub fn new(term: &str) -> Result<Self, regex::Error> {
        if term.is_empty() {
            return Ok(Self(None));
        }
        let regex = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()?;
        Ok(Self(Some(regex)))
    }

    /// An empty term matches everything.
    pub fn is_match(&self, text: &str) -> bool {
        self.0.as_ref().is_none_or(|regex| regex.is_match(text))
    }

    /// Non-overlapping matches, left to right. An empty term finds nothing.
    pub fn find_iter<'t>(&self, text: &'t str) -> impl Iterator<Item = Match<'t>> {
        self.0.iter().flat_map(move |regex| regex.find_iter(text))
    }
}

/// The visible subset, in catalog order.
pub fn compute_visible<'a>(
    catalog: impl IntoIterator<Item = &'a QuestionRecord>,
    progress: &ProgressState,
    criteria: &FilterCriteria,
) -> Vec<&'a QuestionRecord> {
    let pattern = match SearchPattern::new(&criteria.search_term) {
        Ok(pattern) => pattern,
        Err(e) => {
            log::warn!("Search term {:?} cannot be matched: {e}", criteria.search_term);
            return Vec::new();
        }
    };
    catalog
        .into_iter()
        .filter(|record| criteria.matches_pattern(record, progress, &pattern))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
pub struct FacetOption<T> {
    pub value: Facet<T>,
    pub count: usize,
}

/// Badge counts for the facet buttons. Each count looks at that one facet only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
pub struct FacetCounts {
    pub categories: Vec<FacetOption<Category>>,
    pub levels: Vec<FacetOption<Level>>,
    pub domains: Vec<FacetOption<Domain>>,
}

fn options<T: Clone + PartialEq>(
    candidates: Vec<T>,
    records: &[&QuestionRecord],
    field: impl Fn(&QuestionRecord) -> &T,
) -> Vec<FacetOption<T>> {
    let mut options = vec![FacetOption {
        value: Facet::All,
        count: records.len(),
    }];
    options.extend(candidates.into_iter().map(|candidate| {
        let count = records.iter().filter(|&&r| field(r) == &candidate).count();
        FacetOption {
            value: Facet::Only(candidate),
            count,
        }
    }));
    options
}

/// `partition` is the unfiltered record list of the active tab. Categories are listed
/// alphabetically, ignoring case.
pub fn facet_counts<'a>(partition: impl IntoIterator<Item = &'a QuestionRecord>) -> FacetCounts {
    let records: Vec<&QuestionRecord> = partition.into_iter().collect();

    let mut categories: Vec<Category> = Vec::new();
    for record in &records {
        if !categories.contains(&record.category) {
            categories.push(record.category.clone());
        }
    }
    categories.sort_by_cached_key(|category| (category.as_str().to_lowercase(), category.clone()));

    let mut domains: Vec<Domain> = Domain::CONVENTIONAL.iter().map(|d| Domain::new(*d)).collect();
    for record in &records {
        if !domains.contains(&record.domain) {
            domains.push(record.domain.clone());
        }
    }

    FacetCounts {
        categories: options(categories, &records, |r| &r.category),
        levels: options(Level::ALL.to_vec(), &records, |r| &r.level),
        domains: options(domains, &records, |r| &r.domain),
    }
}
