//! Keyframe file resolution.
//!
//! The asset producer's naming convention has changed over time, so a
//! cue is matched against several historical file-name schemes before
//! falling back to directory position. For cue index `i` (0-based) with
//! variant number `nn = i + 1` zero-padded to two digits, the rules are
//! tried in [`ResolveRule`] order.

use std::fmt;
use std::path::{Path, PathBuf};

/// Which naming scheme matched a keyframe file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveRule {
    /// `<prefix>_<mood>_variant_<nn>_<sanitized cue>.png`
    Descriptive,
    /// `<prefix>_<mood>_variant_<nn>.png`
    Variant,
    /// `variant_<nn>.png`
    BareVariant,
    /// `<nn>.png`
    BareIndex,
    /// The i-th PNG of the directory in file-name order.
    ListingPosition,
}

impl fmt::Display for ResolveRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Descriptive => "descriptive",
            Self::Variant => "variant",
            Self::BareVariant => "bare-variant",
            Self::BareIndex => "bare-index",
            Self::ListingPosition => "listing-position",
        };
        f.write_str(label)
    }
}

/// A keyframe file chosen for a cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// The file to encode.
    pub path: PathBuf,
    /// The rule that selected it.
    pub rule: ResolveRule,
}

/// Lookup context for one mood directory.
#[derive(Debug, Clone)]
pub struct MoodDirectory<'a> {
    /// The mood's directory.
    pub dir: &'a Path,
    /// Lowercased character name.
    pub prefix: &'a str,
    /// Mood name.
    pub mood: &'a str,
    /// PNG files in the directory, sorted by file name.
    pub listing: &'a [PathBuf],
}

impl MoodDirectory<'_> {
    /// Resolve the file for cue `index` with text `cue`.
    ///
    /// Returns `None` if no rule matches.
    pub fn resolve(&self, index: usize, cue: &str) -> Option<ResolvedAsset> {
        let nn = variant_number(index);
        let candidates = [
            (
                ResolveRule::Descriptive,
                format!(
                    "{}_{}_variant_{nn}_{}.png",
                    self.prefix,
                    self.mood,
                    sanitize_cue(cue)
                ),
            ),
            (
                ResolveRule::Variant,
                format!("{}_{}_variant_{nn}.png", self.prefix, self.mood),
            ),
            (ResolveRule::BareVariant, format!("variant_{nn}.png")),
            (ResolveRule::BareIndex, format!("{nn}.png")),
        ];

        for (rule, name) in candidates {
            let path = self.dir.join(name);
            if path.is_file() {
                return Some(ResolvedAsset { path, rule });
            }
        }

        self.listing.get(index).map(|path| ResolvedAsset {
            path: path.clone(),
            rule: ResolveRule::ListingPosition,
        })
    }
}

/// Zero-padded 1-based variant number for a 0-based cue index.
pub fn variant_number(index: usize) -> String {
    format!("{:02}", index.saturating_add(1))
}

/// Turn cue text into the file-name fragment the asset producer writes:
/// spaces become underscores, and commas, apostrophes and parentheses are
/// dropped.
pub fn sanitize_cue(cue: &str) -> String {
    cue.chars()
        .filter(|c| !matches!(c, ',' | '\'' | '(' | ')'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// List the PNG files (case-insensitive extension) in `dir`, sorted by
/// file name.
///
/// # Errors
///
/// Returns the I/O error if the directory cannot be read.
pub fn list_png_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_png = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if is_png && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
