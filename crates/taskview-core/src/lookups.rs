//! Name lookups for tasks and saved views with fuzzy suggestions.

use strsim::levenshtein;
use taskview_model::models::TaskRecord;
use thiserror::Error;

use crate::views::SavedView;

/// Maximum Levenshtein distance to consider a name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Number of candidates listed in an ambiguity error.
const MAX_AMBIGUOUS_LISTED: usize = 5;

/// A specialized Result type for lookups.
pub type LookupResult<T> = Result<T, LookupError>;

/// Errors returned when a name does not resolve to exactly one record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// Nothing matched.
    #[error("{}", format_not_found_error(resource_type, identifier, suggestion.as_deref()))]
    NotFound {
        /// The kind of record, e.g. "Task".
        resource_type: &'static str,
        /// What the user asked for.
        identifier: String,
        /// A close name, if one exists.
        suggestion: Option<String>,
    },

    /// More than one record matched (contains the full message).
    #[error("{0}")]
    Ambiguous(String),
}

impl LookupError {
    fn not_found<'a>(
        resource_type: &'static str,
        identifier: &str,
        candidates: impl Iterator<Item = &'a str>,
    ) -> Self {
        LookupError::NotFound {
            resource_type,
            identifier: identifier.to_string(),
            suggestion: find_similar_name(identifier, candidates),
        }
    }
}

/// Formats the "not found" error message, optionally including a suggestion.
pub fn format_not_found_error(resource_type: &str, identifier: &str, suggestion: Option<&str>) -> String {
    let base = format!("{} '{}' not found.", resource_type, identifier);
    match suggestion {
        Some(s) => format!("{} Did you mean '{}'?", base, s),
        None => base,
    }
}

/// Finds the best matching name from a list of candidates using Levenshtein distance.
///
/// Returns the best match if its edit distance is within the threshold,
/// otherwise returns `None`.
pub fn find_similar_name<'a>(query: &str, candidates: impl Iterator<Item = &'a str>) -> Option<String> {
    let query_lower = query.to_lowercase();

    let (best_match, best_distance) = candidates
        .filter(|name| !name.is_empty())
        .map(|name| {
            let distance = levenshtein(&query_lower, &name.to_lowercase());
            (name.to_string(), distance)
        })
        .min_by_key(|(_, d)| *d)?;

    // Only suggest if the distance is within threshold and not an exact match
    if best_distance > 0 && best_distance <= MAX_SUGGESTION_DISTANCE {
        Some(best_match)
    } else {
        None
    }
}

/// File name of a task path without directories or the `.md` extension.
fn path_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.strip_suffix(".md").unwrap_or(name)
}

/// Resolves a task by exact path, then by title or file name (case-insensitive).
pub fn find_task<'a>(tasks: &'a [TaskRecord], query: &str) -> LookupResult<&'a TaskRecord> {
    if let Some(task) = tasks.iter().find(|t| t.path == query) {
        return Ok(task);
    }

    let wanted = query.trim().to_lowercase();
    let matches: Vec<&TaskRecord> = tasks
        .iter()
        .filter(|t| t.title.to_lowercase() == wanted || path_stem(&t.path).to_lowercase() == wanted)
        .collect();

    match matches.as_slice() {
        [] => Err(LookupError::not_found(
            "Task",
            query,
            tasks.iter().map(|t| t.title.as_str()),
        )),
        [task] => Ok(*task),
        _ => {
            let mut msg = format!("Ambiguous task \"{}\"\n\nMultiple tasks match:", query);
            for task in matches.iter().take(MAX_AMBIGUOUS_LISTED) {
                msg.push_str(&format!("\n  {}  {}", task.path, task.title));
            }
            if matches.len() > MAX_AMBIGUOUS_LISTED {
                msg.push_str(&format!("\n  ... and {} more", matches.len() - MAX_AMBIGUOUS_LISTED));
            }
            msg.push_str("\n\nPlease use the full path.");
            Err(LookupError::Ambiguous(msg))
        }
    }
}

/// Resolves a saved view by id or name (case-insensitive).
///
/// Views sharing a name resolve to the most recently created one.
pub fn find_view<'a>(views: &'a [SavedView], name_or_id: &str) -> LookupResult<&'a SavedView> {
    let wanted = name_or_id.trim().to_lowercase();
    views
        .iter()
        .rev()
        .find(|v| v.id == name_or_id || v.name.to_lowercase() == wanted)
        .ok_or_else(|| {
            LookupError::not_found("View", name_or_id, views.iter().map(|v| v.name.as_str()))
        })
}
