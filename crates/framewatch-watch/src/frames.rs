//! Output-path template expansion.
//!
//! Render templates name their frame slot with a run of `#` characters
//! (`frame_####.png` becomes `frame_0042.png`). Only the last run counts;
//! earlier runs are kept literally. A template with no placeholder gets a
//! four-digit frame number slotted in front of the extension, which is how
//! most renderers name files when the user never asked for numbering.

use std::path::{Path, PathBuf};

use framewatch_core::{Result, WatchError};

/// Fallback job label when the template has no usable file stem.
const FALLBACK_LABEL: &str = "Render";

/// Width used when the template carries no `#` placeholder.
const DEFAULT_PAD: usize = 4;

/// Expand `template` for a single frame number.
pub fn frame_path(template: &Path, frame: i64) -> Result<PathBuf> {
    let name = file_name(template)?;
    let expanded = match last_hash_run(name) {
        Some((start, len)) => {
            let mut out = String::with_capacity(name.len() + 8);
            out.push_str(&name[..start]);
            out.push_str(&padded(frame, len));
            out.push_str(&name[start + len..]);
            out
        }
        None => match name.rfind('.') {
            // Dotfiles like `.hidden` have no real extension.
            Some(dot) if dot > 0 => {
                format!("{}{}{}", &name[..dot], padded(frame, DEFAULT_PAD), &name[dot..])
            }
            _ => format!("{}{}", name, padded(frame, DEFAULT_PAD)),
        },
    };
    Ok(template.with_file_name(expanded))
}

/// Expand `template` for every frame in `first..=last`, in order.
pub fn expected_frame_paths(template: &Path, first: i64, last: i64) -> Result<Vec<PathBuf>> {
    if last < first {
        return Err(WatchError::EmptyFrameRange {
            template: template.to_path_buf(),
            first,
            last,
        });
    }
    (first..=last).map(|frame| frame_path(template, frame)).collect()
}

/// Derive a human label from the template file stem.
///
/// Trailing `#` placeholders and whitespace are stripped, so
/// `shot_040_####.png` reads as `shot_040_` and `beauty ###.png` as `beauty`.
pub fn job_label(template: &Path) -> String {
    let stem = template
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("");
    let label = stem.trim_end_matches('#').trim_end();
    if label.is_empty() {
        FALLBACK_LABEL.to_string()
    } else {
        label.to_string()
    }
}

/// Resolve a possibly-relative template against the current directory.
pub fn absolutize(template: &Path) -> Result<PathBuf> {
    std::path::absolute(template)
        .map_err(|source| WatchError::io("resolving output template", template, source))
}

fn file_name(template: &Path) -> Result<&str> {
    let name = template
        .file_name()
        .ok_or_else(|| WatchError::template(template, "template has no file name"))?;
    name.to_str()
        .ok_or_else(|| WatchError::template(template, "template file name is not valid UTF-8"))
}

/// Locate the last contiguous run of `#` as `(byte offset, length)`.
fn last_hash_run(name: &str) -> Option<(usize, usize)> {
    let bytes = name.as_bytes();
    let mut found = None;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'#' {
            let start = i;
            while i < bytes.len() && bytes[i] == b'#' {
                i += 1;
            }
            found = Some((start, i - start));
        } else {
            i += 1;
        }
    }
    found
}

fn padded(frame: i64, width: usize) -> String {
    if frame < 0 {
        // Keep the digit count; the sign rides in front of the padding.
        format!("-{:0width$}", frame.unsigned_abs())
    } else {
        format!("{frame:0width$}")
    }
}
