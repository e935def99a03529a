//! Configuration validation engine.
//!
//! Validates suite configuration files against the known schema, detects
//! unknown/misspelled fields, and runs semantic checks on the page catalog
//! and render parameters.

use std::{collections::HashMap, path::Path};

use crate::schema::SuiteConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "type-error", "catalog",
    /// "render", "file-ref"
    pub category: &'static str,
    /// Dotted path, e.g. "render.viewport_width" or "pages[2].url"
    pub path: String,
    pub message: String,
}

/// Result of validating a configuration file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<std::path::PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

// ── Schema tree for unknown-field detection ─────────────────────────────────

/// Represents the expected shape of the configuration schema.
enum KnownKeys {
    /// A struct with fixed field names.
    Struct(HashMap<&'static str, KnownKeys>),
    /// An array of typed items.
    Array(Box<KnownKeys>),
    /// Scalar value; stop recursion.
    Leaf,
}

/// Build the schema map mirroring every field in `schema.rs`.
fn build_schema_map() -> KnownKeys {
    use KnownKeys::{Array, Leaf, Struct};

    let render = Struct(HashMap::from([
        ("headless", Leaf),
        ("viewport_width", Leaf),
        ("viewport_height", Leaf),
        ("device_scale_factor", Leaf),
        ("navigation_timeout_ms", Leaf),
        ("settle_ms", Leaf),
        ("scroll_step_px", Leaf),
        ("scroll_pause_ms", Leaf),
        ("max_scroll_steps", Leaf),
        ("chrome_path", Leaf),
        ("chrome_args", Leaf),
    ]));

    let snapshots = Struct(HashMap::from([
        ("root", Leaf),
        ("baseline_dir", Leaf),
        ("current_dir", Leaf),
        ("diff_dir", Leaf),
    ]));

    let report = Struct(HashMap::from([("path", Leaf), ("title", Leaf)]));

    let page = Struct(HashMap::from([("id", Leaf), ("url", Leaf)]));

    Struct(HashMap::from([
        ("render", render),
        ("snapshots", snapshots),
        ("report", report),
        ("pages", Array(Box::new(page))),
    ]))
}

// ── Levenshtein distance ────────────────────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_len = a.len();
    let b_len = b.len();
    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_len]
}

/// Find the best match for `needle` among `candidates` using Levenshtein
/// distance. Returns `Some(best)` if the distance is <= `max_distance`.
fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    let mut best: Option<(&'a str, usize)> = None;
    for &candidate in candidates {
        let d = levenshtein(needle, candidate);
        if d > 0 && d <= max_distance && best.as_ref().is_none_or(|(_, bd)| d < *bd) {
            best = Some((candidate, d));
        }
    }
    best.map(|(s, _)| s)
}

// ── Core validation ─────────────────────────────────────────────────────────

/// Validate a config file at the given path, or discover the default config
/// file location if `path` is `None`.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = if let Some(p) = path {
        Some(p.to_path_buf())
    } else {
        crate::loader::find_config_file()
    };

    let Some(ref actual_path) = config_path else {
        return ValidationResult {
            diagnostics: vec![Diagnostic {
                severity: Severity::Info,
                category: "file-ref",
                path: String::new(),
                message: "no config file found; using defaults (empty page catalog)".into(),
            }],
            config_path: None,
        };
    };

    let is_toml = actual_path
        .extension()
        .and_then(|e| e.to_str())
        .is_none_or(|e| e == "toml");

    let mut result = if is_toml {
        match std::fs::read_to_string(actual_path) {
            Ok(content) => validate_toml_str(&content),
            Err(e) => ValidationResult {
                diagnostics: vec![Diagnostic {
                    severity: Severity::Error,
                    category: "syntax",
                    path: String::new(),
                    message: format!("failed to read config file: {e}"),
                }],
                config_path: None,
            },
        }
    } else {
        // YAML/JSON: no unknown-field walk, just a parse + semantic pass.
        let mut diagnostics = Vec::new();
        match crate::loader::load_config(actual_path) {
            Ok(config) => check_semantic(&config, &mut diagnostics),
            Err(e) => diagnostics.push(Diagnostic {
                severity: Severity::Error,
                category: "type-error",
                path: String::new(),
                message: format!("{e}"),
            }),
        }
        ValidationResult {
            diagnostics,
            config_path: None,
        }
    };

    result.config_path = Some(actual_path.clone());
    if let Ok(config) = crate::loader::load_config(actual_path) {
        check_file_references(&config, &mut result.diagnostics);
    }
    result
}

/// Validate a TOML string without file-system side effects (useful for tests).
#[must_use]
pub fn validate_toml_str(toml_str: &str) -> ValidationResult {
    let mut diagnostics = Vec::new();

    // 1. Syntax: parse raw TOML
    let toml_value: toml::Value = match toml::from_str(toml_str) {
        Ok(v) => v,
        Err(e) => {
            diagnostics.push(Diagnostic {
                severity: Severity::Error,
                category: "syntax",
                path: String::new(),
                message: format!("TOML syntax error: {e}"),
            });
            return ValidationResult {
                diagnostics,
                config_path: None,
            };
        },
    };

    // 2. Unknown fields: walk the TOML tree against KnownKeys
    let schema = build_schema_map();
    check_unknown_fields(&toml_value, &schema, "", &mut diagnostics);

    // 3. Type check: attempt full deserialization
    match toml::from_str::<SuiteConfig>(toml_str) {
        Ok(config) => check_semantic(&config, &mut diagnostics),
        Err(e) => diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "type-error",
            path: String::new(),
            message: format!("type error: {e}"),
        }),
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

/// Walk the TOML value tree against the schema tree and flag unknown keys.
fn check_unknown_fields(
    value: &toml::Value,
    schema: &KnownKeys,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match (value, schema) {
        (toml::Value::Table(table), KnownKeys::Struct(fields)) => {
            let known_keys: Vec<&str> = fields.keys().copied().collect();
            for (key, child_value) in table {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                if let Some(child_schema) = fields.get(key.as_str()) {
                    check_unknown_fields(child_value, child_schema, &path, diagnostics);
                } else {
                    let level = if prefix.is_empty() {
                        "at top level "
                    } else {
                        ""
                    };
                    let suggestion = suggest(key, &known_keys, 3);
                    let msg = if let Some(s) = suggestion {
                        format!("unknown field {level}(did you mean \"{s}\"?)")
                    } else {
                        format!("unknown field {level}")
                    };
                    diagnostics.push(Diagnostic {
                        severity: Severity::Error,
                        category: "unknown-field",
                        path,
                        message: msg.trim().to_string(),
                    });
                }
            }
        },
        (toml::Value::Array(arr), KnownKeys::Array(item_schema)) => {
            for (i, item) in arr.iter().enumerate() {
                let path = format!("{prefix}[{i}]");
                check_unknown_fields(item, item_schema, &path, diagnostics);
            }
        },
        // Leaf or type mismatch; stop recursion (type errors caught later)
        _ => {},
    }
}

/// True when `id` is safe to use as a snapshot filename stem.
fn is_safe_page_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Run semantic checks on a successfully parsed config.
fn check_semantic(config: &SuiteConfig, diagnostics: &mut Vec<Diagnostic>) {
    // Catalog shape
    if config.pages.is_empty() {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "catalog",
            path: "pages".into(),
            message: "page catalog is empty; nothing to capture".into(),
        });
    }

    let mut seen: Vec<&str> = Vec::new();
    for (idx, page) in config.pages.iter().enumerate() {
        if !is_safe_page_id(&page.id) {
            diagnostics.push(Diagnostic {
                severity: Severity::Error,
                category: "catalog",
                path: format!("pages[{idx}].id"),
                message: format!(
                    "page id \"{}\" must be non-empty and contain only ASCII letters, digits, '-' or '_'",
                    page.id
                ),
            });
        }
        if seen.contains(&page.id.as_str()) {
            diagnostics.push(Diagnostic {
                severity: Severity::Error,
                category: "catalog",
                path: format!("pages[{idx}].id"),
                message: format!("duplicate page id \"{}\"", page.id),
            });
        }
        seen.push(&page.id);

        match url::Url::parse(&page.url) {
            Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {},
            Ok(parsed) => diagnostics.push(Diagnostic {
                severity: Severity::Error,
                category: "catalog",
                path: format!("pages[{idx}].url"),
                message: format!("unsupported URL scheme \"{}\"", parsed.scheme()),
            }),
            Err(e) => diagnostics.push(Diagnostic {
                severity: Severity::Error,
                category: "catalog",
                path: format!("pages[{idx}].url"),
                message: format!("invalid URL: {e}"),
            }),
        }
    }

    // Render parameters
    if config.render.viewport_width == 0 || config.render.viewport_height == 0 {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "render",
            path: "render".into(),
            message: "viewport dimensions must be nonzero".into(),
        });
    }
    if config.render.scroll_step_px == 0 {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "render",
            path: "render.scroll_step_px".into(),
            message: "scroll step must be nonzero or the sweep cannot advance".into(),
        });
    }
    if config.render.max_scroll_steps == 0 {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "render",
            path: "render.max_scroll_steps".into(),
            message: "max_scroll_steps must be nonzero".into(),
        });
    } else {
        let coverage =
            u64::from(config.render.max_scroll_steps) * u64::from(config.render.scroll_step_px);
        if coverage < 2 * u64::from(config.render.viewport_height) {
            diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                category: "render",
                path: "render.max_scroll_steps".into(),
                message: format!(
                    "sweep bound covers only {coverage}px; pages taller than two viewports will be cut short"
                ),
            });
        }
    }
    if config.render.navigation_timeout_ms == 0 {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "render",
            path: "render.navigation_timeout_ms".into(),
            message: "navigation deadline must be nonzero".into(),
        });
    }

    // Report output
    if config.report.path.as_os_str().is_empty() {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "render",
            path: "report.path".into(),
            message: "report path must not be empty".into(),
        });
    }
}

/// Check that file paths referenced in the config exist on disk.
fn check_file_references(config: &SuiteConfig, diagnostics: &mut Vec<Diagnostic>) {
    if let Some(ref chrome_path) = config.render.chrome_path {
        if !Path::new(chrome_path).exists() {
            diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                category: "file-ref",
                path: "render.chrome_path".into(),
                message: format!("file not found: {chrome_path}"),
            });
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
