//! Display helpers for question text: fenced code in answers and search-term highlighting.

use serde::{Deserialize, Serialize};

use crate::filter::SearchPattern;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(tag = "kind", content = "text", rename_all = "camelCase")]
pub enum AnswerBlock {
    Prose(String),
    Code(String),
}

/// Splits an answer on ``` fences. Segments alternate prose, code, prose, ...; an unclosed
/// fence turns the rest of the answer into code.
pub fn answer_blocks(answer: &str) -> Vec<AnswerBlock> {
    answer
        .split("```")
        .enumerate()
        .filter_map(|(i, segment)| {
            if i % 2 == 1 {
                let code = segment.trim();
                (!code.is_empty()).then(|| AnswerBlock::Code(code.to_string()))
            } else {
                (!segment.trim().is_empty()).then(|| AnswerBlock::Prose(segment.to_string()))
            }
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
pub struct Highlight {
    pub text: String,
    pub matched: bool,
}

/// Cuts `text` into runs that do and do not match `term`, using the same matching as the
/// question filter.
pub fn highlight(text: &str, term: &str) -> Vec<Highlight> {
    let pattern = SearchPattern::new(term).unwrap_or_else(|e| {
        log::warn!("Not highlighting {term:?}: {e}");
        SearchPattern::default()
    });

    let mut segments = Vec::new();
    let mut plain_start = 0;
    for found in pattern.find_iter(text) {
        if plain_start < found.start() {
            segments.push(Highlight {
                text: text[plain_start..found.start()].to_string(),
                matched: false,
            });
        }
        segments.push(Highlight {
            text: found.as_str().to_string(),
            matched: true,
        });
        plain_start = found.end();
    }
    if plain_start < text.len() {
        segments.push(Highlight {
            text: text[plain_start..].to_string(),
            matched: false,
        });
    }
    segments
}
