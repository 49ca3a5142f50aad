//! Filename sanitization and slug derivation.
//!
//! `sanitize_filename` is the sole gate between user-supplied names and the
//! store directory: its output must never contain a path separator or any
//! other character capable of escaping the store root.

/// The single recognized document extension. Files with any other extension
/// are invisible to listings and rejected by mutations.
pub const REPORT_EXTENSION: &str = ".mdx";

/// Returns true when `name` carries the recognized extension,
/// case-insensitively. Compares raw bytes so multibyte filenames cannot
/// split a character boundary.
pub fn has_report_extension(name: &str) -> bool {
    let bytes = name.as_bytes();
    let ext = REPORT_EXTENSION.as_bytes();
    bytes.len() >= ext.len() && bytes[bytes.len() - ext.len()..].eq_ignore_ascii_case(ext)
}

/// Produces the canonical on-disk name for a user-supplied filename.
///
/// Lower-cases the name, maps every character outside `[a-z0-9.-]` to `-`,
/// and collapses runs of `-` into one. The extension survives because `.`
/// is in the allowed set and lower-casing normalizes `.MDX` to `.mdx`.
/// Idempotent: sanitizing an already-sanitized name is a no-op.
pub fn sanitize_filename(original: &str) -> String {
    let mut out = String::with_capacity(original.len());
    let mut prev_dash = false;
    for ch in original.to_lowercase().chars() {
        let mapped = match ch {
            'a'..='z' | '0'..='9' | '.' | '-' => ch,
            _ => '-',
        };
        if mapped == '-' {
            if prev_dash {
                continue;
            }
            prev_dash = true;
        } else {
            prev_dash = false;
        }
        out.push(mapped);
    }
    out
}

/// Derives the slug for a stored filename by stripping the extension.
///
/// Injective over sanitizer-accepted names: two distinct accepted filenames
/// differ somewhere outside the fixed-width suffix being removed.
pub fn slug_for_filename(filename: &str) -> &str {
    if has_report_extension(filename) {
        &filename[..filename.len() - REPORT_EXTENSION.len()]
    } else {
        filename
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_replaces_disallowed_characters() {
        assert_eq!(
            sanitize_filename("Q3 2025 NVIDIA Report.mdx"),
            "q3-2025-nvidia-report.mdx"
        );
    }

    #[test]
    fn collapses_dash_runs() {
        assert_eq!(sanitize_filename("a  b!!.mdx"), "a-b-.mdx");
        assert_eq!(sanitize_filename("a---b.mdx"), "a-b.mdx");
    }

    #[test]
    fn is_idempotent() {
        for name in [
            "Q3 2025 NVIDIA Report.mdx",
            "already-clean.mdx",
            "Ünïcode (draft) [v2].MDX",
            "../../etc/passwd.mdx",
        ] {
            let once = sanitize_filename(name);
            assert_eq!(sanitize_filename(&once), once, "not idempotent for {name}");
        }
    }

    #[test]
    fn output_cannot_escape_the_store_root() {
        let out = sanitize_filename("../../etc/passwd.mdx");
        assert!(!out.contains('/'));
        assert!(!out.contains('\\'));
        assert_eq!(out, "..-..-etc-passwd.mdx");

        let windows = sanitize_filename("..\\..\\boot.ini.mdx");
        assert!(!windows.contains('\\'));
    }

    #[test]
    fn preserves_and_normalizes_the_extension() {
        assert_eq!(sanitize_filename("REPORT.MDX"), "report.mdx");
        assert!(has_report_extension(&sanitize_filename("REPORT.MDX")));
    }

    #[test]
    fn non_ascii_maps_to_dashes() {
        assert_eq!(
            sanitize_filename("Résumé Überblick.mdx"),
            "r-sum-berblick.mdx"
        );
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(has_report_extension("report.mdx"));
        assert!(has_report_extension("report.MDX"));
        assert!(!has_report_extension("report.txt"));
        assert!(!has_report_extension("mdx"));
        assert!(!has_report_extension("日本語"));
        assert!(has_report_extension("日本語.mdx"));
    }

    #[test]
    fn slug_strips_exactly_the_extension() {
        assert_eq!(slug_for_filename("q3-2025-nvidia.mdx"), "q3-2025-nvidia");
        assert_eq!(slug_for_filename("notes.txt"), "notes.txt");
    }

    #[test]
    fn slugs_stay_distinct_for_distinct_accepted_names() {
        let names = [
            "alpha.mdx",
            "alpha-2.mdx",
            "alpha.2.mdx",
            "beta.mdx",
            "alpha-beta.mdx",
        ];
        let mut slugs: Vec<&str> = names.iter().map(|n| slug_for_filename(n)).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), names.len());
    }
}
