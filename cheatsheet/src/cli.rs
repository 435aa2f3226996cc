use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use learn_frontend_rs::{Category, Domain, Facet, FilterCriteria, Level, QuestionId, Source};

#[derive(Parser)]
#[command(name = "cheatsheet")]
#[command(about = "Study sheets and random drills from the interview question bank", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Directory holding read and starred progress
    #[arg(long, global = true, default_value = ".learn-progress")]
    pub progress_dir: PathBuf,

    /// Read question rows from a JSON file instead of Supabase
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the visible questions as a Markdown cheat sheet
    Export {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Print one visible question at random
    Random,
    /// Show mastered and starred counts for the tab
    Summary,
    /// Flip the starred flag of a question
    Star { id: String },
    /// Flip the read flag of a question
    Read { id: String },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Tab {
    General,
    Jd,
}

impl From<Tab> for Source {
    fn from(tab: Tab) -> Self {
        match tab {
            Tab::General => Source::General,
            Tab::Jd => Source::Jd,
        }
    }
}

#[derive(Args)]
pub struct FilterArgs {
    #[arg(long, value_enum, global = true, default_value = "general")]
    pub tab: Tab,

    #[arg(long, global = true)]
    pub category: Option<String>,

    /// Fresher, Junior, Middle or Senior
    #[arg(long, global = true)]
    pub level: Option<String>,

    #[arg(long, global = true)]
    pub domain: Option<String>,

    /// Case-insensitive text to look for in questions and answers
    #[arg(long, global = true)]
    pub search: Option<String>,

    #[arg(long, global = true)]
    pub unread_only: bool,

    #[arg(long, global = true)]
    pub starred_only: bool,
}

fn facet<T>(
    label: &Option<String>,
    parse: impl FnOnce(&str) -> anyhow::Result<T>,
) -> anyhow::Result<Facet<T>> {
    match label.as_deref() {
        None | Some("All") => Ok(Facet::All),
        Some(label) => Ok(Facet::Only(parse(label)?)),
    }
}

impl FilterArgs {
    pub fn criteria(&self) -> anyhow::Result<FilterCriteria> {
        Ok(FilterCriteria {
            search_term: self.search.clone().unwrap_or_default(),
            category: facet(&self.category, |c| Ok(Category::new(c)))?,
            level: facet(&self.level, |l| {
                l.parse::<Level>().context("invalid --level")
            })?,
            domain: facet(&self.domain, |d| Ok(Domain::new(d)))?,
            unread_only: self.unread_only,
            starred_only: self.starred_only,
        })
    }
}

/// Numeric ids are the norm; anything else is kept as a string id.
pub fn parse_id(raw: &str) -> QuestionId {
    raw.trim()
        .parse::<i64>()
        .map(QuestionId::from)
        .unwrap_or_else(|_| QuestionId::from(raw.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("cheatsheet").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_filters_become_criteria() {
        let cli = parse(&["export", "--category", "React", "--level", "junior", "--unread-only"]);
        let criteria = cli.filters.criteria().unwrap();
        assert_eq!(criteria.category, Facet::Only(Category::new("React")));
        assert_eq!(criteria.level, Facet::Only(Level::Junior));
        assert_eq!(criteria.domain, Facet::All);
        assert!(criteria.unread_only);
        assert!(!criteria.starred_only);
    }

    #[test]
    fn test_all_is_no_filter() {
        let cli = parse(&["random", "--domain", "All", "--tab", "jd"]);
        assert_eq!(cli.filters.criteria().unwrap(), FilterCriteria::default());
        assert_eq!(Source::from(cli.filters.tab), Source::Jd);
    }

    #[test]
    fn test_bad_level_is_an_error() {
        let cli = parse(&["summary", "--level", "Wizard"]);
        assert!(cli.filters.criteria().is_err());
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42"), QuestionId::from(42));
        assert_eq!(parse_id("q-7"), QuestionId::from("q-7"));
    }
}
