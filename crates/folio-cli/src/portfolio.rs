//! Portfolio directory listing and assignment lookup

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// URL prefix every assignment lives under
pub const PORTFOLIO_ROUTE: &str = "/portfolio";

#[derive(Debug, Error)]
pub enum PortfolioError {
    /// The portfolio directory is missing or cannot be listed
    #[error("cannot read portfolio directory {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No readable assignment by that name
    #[error("assignment not found: {0}")]
    NotFound(String),
}

/// One `.html` file in the portfolio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub filename: String,
    pub title: String,
    pub href: String,
}

impl Assignment {
    pub fn new(filename: impl Into<String>) -> Self {
        let filename = filename.into();
        Self {
            title: format_title(&filename),
            href: assignment_href(&filename),
            filename,
        }
    }
}

/// A loaded assignment ready to embed
#[derive(Debug, Clone)]
pub struct AssignmentPage {
    pub filename: String,
    pub title: String,
    pub html: String,
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Human title for a file name.
///
/// Drops the first `.html`, turns `-` and `_` into spaces, and upper-cases
/// every ASCII word character that starts a word. Non-ASCII letters count as
/// word breaks, so `résumé` becomes `RéSumé`.
pub fn format_title(filename: &str) -> String {
    let stem = filename.replacen(".html", "", 1);
    let mut title = String::with_capacity(stem.len());
    let mut prev_word = false;
    for c in stem.chars() {
        let c = if c == '-' || c == '_' { ' ' } else { c };
        let word = is_word_char(c);
        if word && !prev_word {
            title.push(c.to_ascii_uppercase());
        } else {
            title.push(c);
        }
        prev_word = word;
    }
    title
}

pub fn assignment_href(filename: &str) -> String {
    format!("{PORTFOLIO_ROUTE}/{}", urlencoding::encode(filename))
}

/// All `.html` files in `dir`, sorted by file name
pub fn list_assignments(dir: &Path) -> Result<Vec<Assignment>, PortfolioError> {
    let entries = fs::read_dir(dir).map_err(|source| PortfolioError::Unreadable {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut filenames: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".html"))
        .collect();
    filenames.sort();

    tracing::debug!(dir = %dir.display(), count = filenames.len(), "listed portfolio");
    Ok(filenames.into_iter().map(Assignment::new).collect())
}

/// Load the assignment named by a percent-encoded path segment.
///
/// Names that would leave the portfolio directory are treated like
/// missing files.
pub fn read_assignment(dir: &Path, requested: &str) -> Result<AssignmentPage, PortfolioError> {
    let not_found = || PortfolioError::NotFound(requested.to_string());

    let name = urlencoding::decode(requested).map_err(|_| not_found())?;
    if name.is_empty() || name.contains("..") || name.contains(['/', '\\', '\0']) {
        tracing::debug!(requested, "rejected assignment name");
        return Err(not_found());
    }

    let path = dir.join(name.as_ref());
    let html = fs::read_to_string(&path).map_err(|e| {
        tracing::warn!(path = %path.display(), "cannot read assignment: {}", e);
        not_found()
    })?;

    Ok(AssignmentPage {
        title: format_title(&name),
        filename: name.into_owned(),
        html,
    })
}
