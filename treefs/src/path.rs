// ── Constants ───────────────────────────────────────────────────────────────

pub const SEPARATOR: char = '/';
pub const ROOT_NAME: &str = "/";
pub const CURRENT_DIR: &str = ".";
pub const PARENT_DIR: &str = "..";

// ── Limits ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameLimits {
    pub max_name_length: usize,
}

impl Default for NameLimits {
    fn default() -> Self {
        Self {
            max_name_length: 255,
        }
    }
}

// ── Tokens ──────────────────────────────────────────────────────────────────

/// A single path argument as understood by resolution.
///
/// Only one segment is ever resolved; `a/b` is looked up as a literal name
/// and therefore never matches anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathToken<'a> {
    Current,
    Parent,
    Root,
    Name(&'a str),
}

impl<'a> PathToken<'a> {
    pub fn parse(token: &'a str) -> Self {
        match token {
            CURRENT_DIR => Self::Current,
            PARENT_DIR => Self::Parent,
            ROOT_NAME => Self::Root,
            name => Self::Name(name),
        }
    }
}

// ── Validation ──────────────────────────────────────────────────────────────

/// Whitespace is forbidden because the shell splits on it and the state file
/// uses it as a field separator.
fn has_forbidden_chars(name: &str) -> bool {
    name.chars()
        .any(|c| c == SEPARATOR || c.is_whitespace() || c.is_control())
}

/// Validate a node name. Returns `Some(error_message)` if invalid.
pub fn validate_name(name: &str, limits: &NameLimits) -> Option<String> {
    if name.is_empty() {
        return Some("name cannot be empty".to_string());
    }
    if name == CURRENT_DIR || name == PARENT_DIR {
        return Some(format!("'{}' is reserved", name));
    }
    if name.len() > limits.max_name_length {
        return Some(format!(
            "name exceeds max length ({})",
            limits.max_name_length
        ));
    }
    if has_forbidden_chars(name) {
        return Some(format!("'{}' contains forbidden characters", name));
    }
    None
}

/// Join root-to-node names into a full path. An empty slice is the root.
pub fn join_path<S: AsRef<str>>(names: &[S]) -> String {
    if names.is_empty() {
        return ROOT_NAME.to_string();
    }
    let mut out = String::new();
    for name in names {
        out.push(SEPARATOR);
        out.push_str(name.as_ref());
    }
    out
}

// ── Tests ───────────────────────────────────────────────────────────────────
