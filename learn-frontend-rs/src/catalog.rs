use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Primary key of a question row. The hosted table uses integers, but older exports used
/// strings, and both show up in persisted progress arrays.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(untagged)]
pub enum QuestionId {
    Number(i64),
    Text(String),
}

impl From<i64> for QuestionId {
    fn from(id: i64) -> Self {
        QuestionId::Number(id)
    }
}

impl From<&str> for QuestionId {
    fn from(id: &str) -> Self {
        QuestionId::Text(id.to_string())
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Number(n) => write!(f, "{n}"),
            QuestionId::Text(s) => f.write_str(s),
        }
    }
}

/// Which tab a question belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "lowercase")]
pub enum Source {
    General,
    Jd,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::General => "general",
            Source::Jd => "jd",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rows spell levels with any capitalization; they always serialize capitalized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(try_from = "String")]
pub enum Level {
    Fresher,
    Junior,
    Middle,
    Senior,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Fresher, Level::Junior, Level::Middle, Level::Senior];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Fresher => "Fresher",
            Level::Junior => "Junior",
            Level::Middle => "Middle",
            Level::Senior => "Senior",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown level {0:?}")]
pub struct UnknownLevel(pub String);

impl TryFrom<String> for Level {
    type Error = UnknownLevel;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for Level {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLevel(s.to_string()))
    }
}

/// Free-form topic label ("React", "ASP.NET Core", ...). The set comes from the data.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(transparent)]
pub struct Category(pub String);

impl Category {
    pub fn new(label: impl Into<String>) -> Self {
        Category(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.trim().is_empty() {
            f.write_str("Unknown")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Frontend / Backend / Mobile by convention, but rows may carry anything.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(transparent)]
pub struct Domain(pub String);

impl Domain {
    pub const CONVENTIONAL: [&'static str; 3] = ["Frontend", "Backend", "Mobile"];

    pub fn new(label: impl Into<String>) -> Self {
        Domain(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.trim().is_empty() {
            f.write_str("Unknown")
        } else {
            f.write_str(&self.0)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub question: String,
    /// Prose, optionally interleaved with code segments fenced by ```.
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_blank")]
    pub category: Category,
    pub level: Level,
    #[serde(default, deserialize_with = "null_as_blank")]
    pub domain: Domain,
    pub source: Source,
}

/// A null label reads as a blank one, which displays as "Unknown".
fn null_as_blank<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("response was not a list of rows: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Fetches the whole question list in one call.
pub trait CatalogLoader {
    fn load(&self) -> impl Future<Output = Result<Vec<QuestionRecord>, FetchError>>;
}

/// Loader over a list that is already in memory.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    records: Vec<QuestionRecord>,
}

impl StaticCatalog {
    pub fn new(records: Vec<QuestionRecord>) -> Self {
        Self { records }
    }
}

impl CatalogLoader for StaticCatalog {
    async fn load(&self) -> Result<Vec<QuestionRecord>, FetchError> {
        Ok(self.records.clone())
    }
}

/// Converts raw rows, dropping the ones that do not describe a question.
pub fn parse_rows(rows: Vec<serde_json::Value>) -> Vec<QuestionRecord> {
    let total = rows.len();
    let records: Vec<QuestionRecord> = rows
        .into_iter()
        .filter_map(|row| {
            serde_json::from_value::<QuestionRecord>(row.clone())
                .inspect_err(|e| {
                    log::warn!(
                        "Skipping question row {id}: {e}",
                        id = row.get("id").map(|id| id.to_string()).unwrap_or_default()
                    );
                })
                .ok()
        })
        .collect();
    if records.len() < total {
        log::warn!("Kept {} of {total} question rows", records.len());
    }
    records
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub enum CatalogStatus {
    NotRequested,
    Loading,
    Ready,
    Failed,
}

/// Every question fetched for this page, in server order.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    records: Vec<QuestionRecord>,
}

impl Catalog {
    pub fn new(records: Vec<QuestionRecord>) -> Self {
        let mut seen = BTreeSet::new();
        for record in &records {
            if !seen.insert((&record.id, record.source)) {
                log::warn!(
                    "Question id {id} appears more than once in the {source} partition",
                    id = record.id,
                    source = record.source
                );
            }
        }
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The records of one tab, in catalog order.
    pub fn partition(&self, source: Source) -> Vec<&QuestionRecord> {
        self.records
            .iter()
            .filter(|record| record.source == source)
            .collect()
    }
}

#[cfg(test)]
pub(crate) fn record(id: i64, category: &str, level: Level, domain: &str) -> QuestionRecord {
    QuestionRecord {
        id: QuestionId::Number(id),
        question: format!("Question {id}"),
        answer: format!("Answer {id}"),
        category: Category::new(category),
        level,
        domain: Domain::new(domain),
        source: Source::General,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_row_from_table() {
        let rows = vec![json!({
            "id": 1,
            "question": "What is the virtual DOM?",
            "answer": "A tree ```const a = 1;```",
            "category": "React",
            "level": "Junior",
            "domain": "Frontend",
            "source": "general",
            "created_at": "2024-05-01T00:00:00Z"
        })];
        let records = parse_rows(rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, QuestionId::Number(1));
        assert_eq!(records[0].level, Level::Junior);
        assert_eq!(records[0].source, Source::General);
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let rows = vec![
            json!({"id": 1, "question": "q", "answer": "a", "category": "CSS",
                   "level": "Senior", "domain": "Frontend", "source": "jd"}),
            json!({"id": 2, "question": "q", "answer": "a", "category": "CSS",
                   "level": "Wizard", "domain": "Frontend", "source": "jd"}),
            json!({"id": 3, "question": "q"}),
        ];
        let records = parse_rows(rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, Source::Jd);
    }

    #[test]
    fn test_missing_labels_are_kept_as_unknown() {
        let rows = vec![
            json!({"id": 1, "question": "q", "answer": "a", "category": null,
                   "level": "Junior", "domain": "Frontend", "source": "general"}),
            json!({"id": 2, "question": "q", "answer": "a", "category": "Git",
                   "level": "Middle", "source": "general"}),
        ];
        let records = parse_rows(rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category, Category::default());
        assert_eq!(records[0].category.to_string(), "Unknown");
        assert_eq!(records[1].domain.to_string(), "Unknown");
    }

    #[test]
    fn test_level_capitalization_is_ignored() {
        let rows = vec![
            json!({"id": 1, "question": "q", "answer": "a", "category": "CSS",
                   "level": "junior", "domain": "Frontend", "source": "general"}),
            json!({"id": 2, "question": "q", "answer": "a", "category": "CSS",
                   "level": "SENIOR", "domain": "Frontend", "source": "jd"}),
        ];
        let records = parse_rows(rows);
        let levels: Vec<Level> = records.iter().map(|r| r.level).collect();
        assert_eq!(levels, vec![Level::Junior, Level::Senior]);
        assert_eq!(serde_json::to_value(Level::Junior).unwrap(), json!("Junior"));
    }

    #[test]
    fn test_string_ids_are_accepted() {
        let id: QuestionId = serde_json::from_str("\"q-17\"").unwrap();
        assert_eq!(id, QuestionId::from("q-17"));
        let id: QuestionId = serde_json::from_str("17").unwrap();
        assert_eq!(id, QuestionId::from(17));
        assert_eq!(serde_json::to_string(&id).unwrap(), "17");
    }

    #[test]
    fn test_partition_keeps_order() {
        let mut a = record(1, "HTML", Level::Junior, "Frontend");
        let mut b = record(2, "CSS", Level::Senior, "Backend");
        let c = record(3, "Git", Level::Middle, "Frontend");
        a.source = Source::Jd;
        b.source = Source::General;
        let catalog = Catalog::new(vec![a, b, c]);

        let general: Vec<_> = catalog
            .partition(Source::General)
            .iter()
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(general, vec![QuestionId::from(2), QuestionId::from(3)]);
        assert_eq!(catalog.partition(Source::Jd).len(), 1);
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("Senior".parse::<Level>().unwrap(), Level::Senior);
        assert_eq!("fresher".parse::<Level>().unwrap(), Level::Fresher);
        assert!("Wizard".parse::<Level>().is_err());
    }

    #[test]
    fn test_blank_labels_display_unknown() {
        assert_eq!(Category::new("  ").to_string(), "Unknown");
        assert_eq!(Domain::new("").to_string(), "Unknown");
        assert_eq!(Category::new("C#").to_string(), "C#");
    }

    #[test]
    fn test_static_loader() {
        let loader = StaticCatalog::new(vec![record(1, "HTML", Level::Junior, "Frontend")]);
        let records = futures::executor::block_on(loader.load()).unwrap();
        assert_eq!(records.len(), 1);
    }
}
