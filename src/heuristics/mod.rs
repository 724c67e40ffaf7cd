//! Deterministic commit-message classifier.
//!
//! Maps a staged file list and its patch text to a single-line
//! conventional-style message without any I/O. Rules are tried in a fixed
//! order (tests, docs, config, rename, generic) and the first one that
//! applies wins. The test/docs/config rules only apply when **every** file
//! in the change set matches; one outlier sends the change down the
//! generic path.

pub mod rules;

use rules::{
    CATEGORY_KEYWORDS, CONFIG_BASENAMES, CONFIG_DEFAULT, CONFIG_PREFIXES, CONFIG_REFINEMENTS,
    CONFIG_SUFFIXES, DOC_BASENAMES, DOC_DEFAULT, DOC_PREFIXES, DOC_REFINEMENTS, DOC_SUFFIXES,
    EMPTY_MESSAGE, ENV_FILE_PREFIX, HUNK_HEADER, LISTED_FILES, RENAME_FROM, RENAME_TO,
    TEST_FIX_KEYWORDS, TEST_PREFIXES, TEST_SUFFIXES, contains_any, first_match,
};

/// Classify a change set into a commit message.
///
/// Never fails and never returns an empty or multi-line string.
pub fn classify(files: &[String], patch: &str) -> String {
    if files.is_empty() {
        return EMPTY_MESSAGE.to_string();
    }

    let paths: Vec<String> = files.iter().map(|f| f.to_lowercase()).collect();
    let patch_lower = patch.to_lowercase();

    let message = if paths.iter().all(|p| is_test_file(p)) {
        test_message(&patch_lower, patch)
    } else if paths.iter().all(|p| is_doc_file(p)) {
        first_match(&patch_lower, DOC_REFINEMENTS)
            .unwrap_or(DOC_DEFAULT)
            .to_string()
    } else if paths.iter().all(|p| is_config_file(p)) {
        first_match(&patch_lower, CONFIG_REFINEMENTS)
            .unwrap_or(CONFIG_DEFAULT)
            .to_string()
    } else if is_pure_rename(&patch_lower) {
        rename_message(files)
    } else {
        generic_message(files, &patch_lower, patch)
    };

    // File names come straight from git and could in theory carry control
    // characters; keep the single-line contract regardless.
    message.replace(['\n', '\r'], " ")
}

/// Category name derived for the generic path (`fix`, `perf`, ..., `feat`, `chore`).
pub fn generic_category(patch: &str) -> &'static str {
    let patch_lower = patch.to_lowercase();
    category_for(&patch_lower, patch)
}

pub fn is_test_file(path: &str) -> bool {
    TEST_SUFFIXES.iter().any(|s| path.ends_with(s))
        || TEST_PREFIXES.iter().any(|p| path.starts_with(p))
}

pub fn is_doc_file(path: &str) -> bool {
    DOC_SUFFIXES.iter().any(|s| path.ends_with(s))
        || DOC_PREFIXES.iter().any(|p| path.starts_with(p))
        || DOC_BASENAMES.contains(&file_stem(path))
}

pub fn is_config_file(path: &str) -> bool {
    let name = basename(path);
    CONFIG_SUFFIXES.iter().any(|s| path.ends_with(s))
        || CONFIG_BASENAMES.contains(&name)
        || CONFIG_PREFIXES.iter().any(|p| path.starts_with(p))
        || name.starts_with(ENV_FILE_PREFIX)
}

/// Rename markers present and no hunk header.
///
/// A rename that also edits content carries hunks and is classified on the
/// generic path instead.
pub fn is_pure_rename(patch_lower: &str) -> bool {
    patch_lower.contains(RENAME_FROM)
        && patch_lower.contains(RENAME_TO)
        && !patch_lower.contains(HUNK_HEADER)
}

/// Count `+`/`-` content lines, skipping the `+++`/`---` file headers.
pub fn count_changes(patch: &str) -> (usize, usize) {
    let mut added = 0;
    let mut removed = 0;
    for line in patch.lines() {
        if line.starts_with('+') && !line.starts_with("+++") {
            added += 1;
        } else if line.starts_with('-') && !line.starts_with("---") {
            removed += 1;
        }
    }
    (added, removed)
}

fn test_message(patch_lower: &str, patch: &str) -> String {
    if contains_any(patch_lower, TEST_FIX_KEYWORDS) {
        return "test: fix failing tests".to_string();
    }
    let (added, removed) = count_changes(patch);
    if added > removed {
        "test: add test coverage".to_string()
    } else {
        "test: update test cases".to_string()
    }
}

fn rename_message(files: &[String]) -> String {
    match files {
        [only] => format!("refactor: rename {only}"),
        _ => format!("refactor: rename {} files", files.len()),
    }
}

fn generic_message(files: &[String], patch_lower: &str, patch: &str) -> String {
    let category = category_for(patch_lower, patch);
    format!("{category}: update {}", describe_files(files))
}

fn category_for(patch_lower: &str, patch: &str) -> &'static str {
    if let Some((category, _)) = CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| contains_any(patch_lower, keywords))
    {
        return category;
    }

    let (added, removed) = count_changes(patch);
    if added > removed * 2 { "feat" } else { "chore" }
}

/// `a`, `a, b`, or `a, b and N more files`.
fn describe_files(files: &[String]) -> String {
    let shown = files.len().min(LISTED_FILES);
    let listed = files[..shown].join(", ");
    let rest = files.len() - shown;
    if rest > 0 {
        format!("{listed} and {rest} more files")
    } else {
        listed
    }
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Basename without its final extension (`readme.md` → `readme`).
fn file_stem(path: &str) -> &str {
    let name = basename(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn files(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn empty_file_list_uses_fallback() {
        assert_eq!(classify(&[], "anything"), "chore: add missing files");
    }

    #[test]
    fn readme_is_documentation() {
        let msg = classify(&files(&["README.md"]), "+Some words");
        assert!(msg.starts_with("docs:"), "got: {msg}");
    }

    #[test]
    fn readme_keyword_in_patch_names_readme() {
        let patch = "diff --git a/README.md b/README.md\n+Install steps";
        assert_eq!(classify(&files(&["README.md"]), patch), "docs: update README");
    }

    #[test]
    fn docs_api_then_typo_then_generic() {
        let docs = files(&["docs/guide.rst"]);
        assert_eq!(classify(&docs, "+The API takes"), "docs: update API documentation");
        assert_eq!(classify(&docs, "+corrected typo"), "docs: fix documentation typos");
        assert_eq!(classify(&docs, "+More prose"), "docs: update documentation");
    }

    #[test]
    fn doc_basename_ignores_extension_and_case() {
        assert!(is_doc_file("changelog"));
        assert!(is_doc_file(&"pkg/CONTRIBUTING.txt".to_lowercase()));
        assert!(!is_doc_file("src/readme_parser.rs"));
    }

    #[test]
    fn fix_across_three_files_lists_two() {
        let msg = classify(
            &files(&["src/a.go", "src/b.go", "src/c.go"]),
            "-broken\n+fix the loop",
        );
        assert_eq!(msg, "fix: update src/a.go, src/b.go and 1 more files");
    }

    #[test]
    fn two_files_are_listed_without_suffix() {
        let msg = classify(&files(&["src/a.go", "src/b.go"]), "+fix");
        assert_eq!(msg, "fix: update src/a.go, src/b.go");
    }

    #[test]
    fn mixed_doc_and_code_falls_through_to_generic() {
        let msg = classify(&files(&["a.md", "b.go"]), "+x\n+y\n+z");
        assert_eq!(msg, "feat: update a.md, b.go");
    }

    #[test]
    fn test_files_take_priority_over_docs() {
        // tests/ prefix and .md suffix both match; test rule runs first.
        let msg = classify(&files(&["tests/fixtures/sample.md"]), "+a\n+b");
        assert_eq!(msg, "test: add test coverage");
    }

    #[test]
    fn test_refinements() {
        let tests = files(&["pkg/server_test.go", "web/app.spec.ts"]);
        assert_eq!(classify(&tests, "+fix flaky assertion"), "test: fix failing tests");
        assert_eq!(classify(&tests, "+a\n+b\n-c"), "test: add test coverage");
        assert_eq!(classify(&tests, "+a\n-b"), "test: update test cases");
    }

    #[test]
    fn config_refinements() {
        let cfg = files(&["Cargo.toml", "Cargo.lock"]);
        assert_eq!(classify(&cfg, "-version = \"1\""), "chore: update dependencies");
        let ci = files(&[".github/workflows/release.yml"]);
        let ci_patch = "diff --git a/.github/workflows/release.yml b/.github/workflows/release.yml\n+on: push";
        assert_eq!(classify(&ci, ci_patch), "ci: update CI configuration");
        let build = files(&["webpack.config.js"]);
        assert_eq!(classify(&build, "+// webpack mode: 'production'"), "build: update build configuration");
        let plain = files(&["settings.ini"]);
        assert_eq!(classify(&plain, "+timeout = 5"), "chore: update configuration");
    }

    #[test]
    fn dotenv_files_are_config() {
        assert!(is_config_file(".env"));
        assert!(is_config_file("deploy/.env.production"));
        assert!(is_config_file("dockerfile"));
        assert!(!is_config_file("src/environment.rs"));
    }

    #[test]
    fn pure_rename_without_hunks() {
        let patch = "diff --git a/old.rs b/new.rs\nsimilarity index 100%\nrename from old.rs\nrename to new.rs\n";
        assert_eq!(classify(&files(&["new.rs"]), patch), "refactor: rename new.rs");
        assert_eq!(
            classify(&files(&["a.rs", "b.rs"]), patch),
            "refactor: rename 2 files"
        );
    }

    #[test]
    fn rename_with_hunks_goes_generic() {
        let patch = "rename from old.rs\nrename to new.rs\n@@ -1 +1 @@\n-a\n+b\n";
        let msg = classify(&files(&["new.rs"]), patch);
        assert_eq!(msg, "chore: update new.rs");
    }

    #[test]
    fn keyword_family_priority() {
        assert_eq!(generic_category("+optimize the bug path"), "fix");
        assert_eq!(generic_category("+faster lookups, harden security"), "perf");
        assert_eq!(generic_category("+escape to prevent XSS"), "security");
        assert_eq!(generic_category("+simplify the loop"), "refactor");
        assert_eq!(generic_category("+run lint"), "style");
    }

    #[test]
    fn feat_requires_more_than_double_additions() {
        assert_eq!(generic_category("+a\n+b\n+c\n-d"), "feat");
        assert_eq!(generic_category("+a\n+b\n-c"), "chore");
    }

    #[test]
    fn file_headers_are_not_counted() {
        let patch = "--- a/x.rs\n+++ b/x.rs\n+one\n";
        assert_eq!(count_changes(patch), (1, 0));
    }

    #[test]
    fn classification_is_deterministic() {
        let f = files(&["src/lib.rs", "README.md"]);
        let patch = "+pub fn new() {}\n-old\n";
        assert_eq!(classify(&f, patch), classify(&f, patch));
    }

    #[test]
    fn output_is_single_line_even_for_odd_paths() {
        let msg = classify(&files(&["weird\nname.go"]), "+x");
        assert!(!msg.contains('\n'));
        assert!(!msg.is_empty());
    }
}
