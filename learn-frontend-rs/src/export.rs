//! Markdown cheat sheet of the visible list, and picking a random question from it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{QuestionRecord, Source};

pub const MARKDOWN_MIME: &str = "text/markdown";

const FENCE: &str = "```";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub file_name: String,
    pub mime_type: String,
    pub contents: String,
}

impl ExportDocument {
    pub fn bytes(&self) -> &[u8] {
        self.contents.as_bytes()
    }
}

pub fn file_name(tab: Source, date: NaiveDate) -> String {
    format!(
        "Interview_CheatSheet_{tab}_{date}.md",
        date = date.format("%Y-%m-%d")
    )
}

fn section(record: &QuestionRecord) -> String {
    // fences get their own line so code renders as a block
    let answer = record.answer.replace(FENCE, &format!("\n{FENCE}"));
    format!(
        "# {question}\n\n**Category:** {category} | **Level:** {level}\n\n## Answer\n{answer}\n\n---\n",
        question = record.question,
        category = record.category,
        level = record.level,
    )
}

/// Returns `None` for an empty list; there is nothing to export.
pub fn export_markdown<'a>(
    list: impl IntoIterator<Item = &'a QuestionRecord>,
    tab: Source,
    date: NaiveDate,
) -> Option<ExportDocument> {
    let sections: Vec<String> = list.into_iter().map(section).collect();
    if sections.is_empty() {
        return None;
    }
    let document = ExportDocument {
        file_name: file_name(tab, date),
        mime_type: MARKDOWN_MIME.to_string(),
        contents: sections.join("\n"),
    };
    log::info!(
        "Exported {} questions to {}",
        sections.len(),
        document.file_name
    );
    Some(document)
}

/// `unit` is a uniform sample from `[0, 1)`.
pub fn pick_with<T>(list: &[T], unit: f64) -> Option<&T> {
    if list.is_empty() {
        return None;
    }
    let index = (unit * list.len() as f64).floor() as usize;
    list.get(index.min(list.len() - 1))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn randomize<'a, T>(list: &'a [T], rng: &mut impl rand::Rng) -> Option<&'a T> {
    pick_with(list, rng.random::<f64>())
}

#[cfg(target_arch = "wasm32")]
pub fn randomize<T>(list: &[T]) -> Option<&T> {
    pick_with(list, js_sys::Math::random())
}
