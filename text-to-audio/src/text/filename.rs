//! Base names for output files, derived from where the text came from.

use crate::TIMESTAMP_FORMAT;
use crate::source::{SourceDescriptor, SourceKind};
use chrono::{DateTime, Local};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Longest base name produced, in characters.
pub const MAX_NAME_LENGTH: usize = 50;

/// Characters that are unsafe in file names on common filesystems.
static UNSAFE_CHARS: OnceLock<Regex> = OnceLock::new();
static UNDERSCORE_RUNS: OnceLock<Regex> = OnceLock::new();

fn unsafe_chars() -> &'static Regex {
    UNSAFE_CHARS.get_or_init(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("valid pattern"))
}

fn underscore_runs() -> &'static Regex {
    UNDERSCORE_RUNS.get_or_init(|| Regex::new(r"_+").expect("valid pattern"))
}

/// Derive a filesystem-safe base name for `source` using the current time
/// for unnamed sources.
pub fn sanitize_filename(source: &SourceDescriptor) -> String {
    sanitize_filename_at(source, &Local::now())
}

/// Derive a filesystem-safe base name for `source`.
///
/// Never returns an empty string, never contains any of `< > : " / \ | ? *`,
/// and is at most [`MAX_NAME_LENGTH`] characters long.
pub fn sanitize_filename_at(source: &SourceDescriptor, now: &DateTime<Local>) -> String {
    let timestamp = now.format(TIMESTAMP_FORMAT).to_string();

    let candidate = match source.kind {
        SourceKind::Pdf if !source.name.is_empty() => strip_extension(&source.name).to_string(),
        SourceKind::Url if !source.name.is_empty() => name_from_url(&source.name),
        _ => format!("text_audio_{}", timestamp),
    };

    let cleaned = unsafe_chars().replace_all(&candidate, "_");
    let cleaned = underscore_runs().replace_all(&cleaned, "_");
    let cleaned: String = cleaned.trim_matches('_').chars().take(MAX_NAME_LENGTH).collect();

    if cleaned.is_empty() {
        format!("audio_{}", timestamp)
    } else {
        cleaned
    }
}

/// Last non-empty path segment without its extension, or the host (with any
/// explicit port) when the URL has no path.
fn name_from_url(address: &str) -> String {
    match Url::parse(address) {
        Ok(url) => {
            let last_segment = url
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last());

            match last_segment {
                Some(segment) => strip_extension(segment).to_string(),
                None => {
                    let host = url.host_str().unwrap_or_default();
                    let host = host.strip_prefix("www.").unwrap_or(host);
                    match url.port() {
                        Some(port) => format!("{}:{}", host, port),
                        None => host.to_string(),
                    }
                }
            }
        }
        // Scheme-less input such as "example.com/notes.html" is treated as a bare path
        Err(_) => address
            .split('/')
            .filter(|s| !s.is_empty())
            .last()
            .map(|segment| strip_extension(segment).to_string())
            .unwrap_or_default(),
    }
}

/// Remove the final extension from the last path component.
///
/// Leading dots do not start an extension, so ".profile" is kept whole.
fn strip_extension(name: &str) -> &str {
    let component_start = name.rfind('/').map_or(0, |i| i + 1);
    let component = &name[component_start..];

    match component.rfind('.') {
        Some(dot) if component[..dot].chars().any(|c| c != '.') => &name[..component_start + dot],
        _ => name,
    }
}
