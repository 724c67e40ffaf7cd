//! Static rule tables for the heuristic classifier.
//!
//! Every table is plain data so membership and ordering can be tested
//! independently of [`super::classify`]. All entries are lowercase; paths
//! and patches are lowercased before matching.

/// Path suffixes that mark a test file.
pub const TEST_SUFFIXES: &[&str] = &[
    "_test.go",
    "_test.rs",
    "_test.py",
    "_spec.rb",
    "test.java",
    ".test.js",
    ".test.jsx",
    ".test.ts",
    ".test.tsx",
    ".spec.js",
    ".spec.jsx",
    ".spec.ts",
    ".spec.tsx",
];

/// Directory prefixes that hold tests.
pub const TEST_PREFIXES: &[&str] = &["test/", "tests/", "__tests__/", "spec/", "testdata/"];

/// Markup extensions treated as documentation.
pub const DOC_SUFFIXES: &[&str] = &[".md", ".markdown", ".rst", ".adoc"];

/// Directory prefixes that hold documentation.
pub const DOC_PREFIXES: &[&str] = &["docs/", "doc/", "documentation/"];

/// Basenames (extension ignored) that are always documentation.
pub const DOC_BASENAMES: &[&str] = &["readme", "changelog", "contributing"];

/// Extensions treated as configuration.
pub const CONFIG_SUFFIXES: &[&str] = &[
    ".json",
    ".yaml",
    ".yml",
    ".toml",
    ".ini",
    ".cfg",
    ".conf",
    ".xml",
    ".properties",
    ".lock",
];

/// Well-known configuration filenames.
pub const CONFIG_BASENAMES: &[&str] = &[
    "dockerfile",
    "makefile",
    "go.mod",
    "go.sum",
    ".gitignore",
    ".dockerignore",
    ".editorconfig",
    ".gitattributes",
    ".npmrc",
    ".nvmrc",
    ".prettierrc",
    ".eslintrc",
    "requirements.txt",
    "webpack.config.js",
    "gulpfile.js",
    "vite.config.ts",
    "jest.config.js",
];

/// Directory prefixes that hold configuration.
pub const CONFIG_PREFIXES: &[&str] = &["config/", "configs/", ".github/", ".circleci/", ".config/"];

/// Basename prefix for dotenv files (`.env`, `.env.local`, ...).
pub const ENV_FILE_PREFIX: &str = ".env";

// ── Wording refinements ─────────────────────────────────────────────

/// Patch keywords that turn a test change into "fix failing tests".
pub const TEST_FIX_KEYWORDS: &[&str] = &["fix"];

/// Documentation refinements, checked in order.
pub const DOC_REFINEMENTS: &[(&[&str], &str)] = &[
    (&["readme"], "docs: update README"),
    (&["api"], "docs: update API documentation"),
    (&["fix", "typo"], "docs: fix documentation typos"),
];

pub const DOC_DEFAULT: &str = "docs: update documentation";

/// Configuration refinements, checked in order.
pub const CONFIG_REFINEMENTS: &[(&[&str], &str)] = &[
    (&["dependency", "package", "version"], "chore: update dependencies"),
    (&["ci", "workflow", "pipeline"], "ci: update CI configuration"),
    (&["build", "webpack", "gulp"], "build: update build configuration"),
];

pub const CONFIG_DEFAULT: &str = "chore: update configuration";

// ── Generic path ────────────────────────────────────────────────────

/// Markers that together (and without any hunk header) signal a pure rename.
pub const RENAME_FROM: &str = "rename from";
pub const RENAME_TO: &str = "rename to";
pub const HUNK_HEADER: &str = "@@";

/// Keyword families for the generic path, in priority order.
pub const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("fix", &["fix", "bug", "error", "issue"]),
    ("perf", &["performance", "optimize", "optimise", "speed up", "faster"]),
    (
        "security",
        &["security", "vulnerab", "exploit", "sanitize", "xss", "csrf", "injection"],
    ),
    ("refactor", &["refactor", "restructure", "cleanup", "clean up", "simplify"]),
    ("style", &["style", "format", "lint", "whitespace"]),
];

/// Number of file names spelled out in a generic message.
pub const LISTED_FILES: usize = 2;

/// Message used when there is nothing staged to describe.
pub const EMPTY_MESSAGE: &str = "chore: add missing files";

/// Returns the first rule whose keywords occur in `haystack`.
pub fn first_match<'a, T: Copy>(haystack: &str, table: &'a [(&'a [&'a str], T)]) -> Option<T> {
    table
        .iter()
        .find(|(keywords, _)| contains_any(haystack, keywords))
        .map(|(_, value)| *value)
}

/// `true` when any keyword is a substring of `haystack`.
pub fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}
