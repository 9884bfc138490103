//! Message template rendering
//!
//! A template is an ordered list of blocks. Each block is literal text that
//! may reference one `$placeholder`. A block whose placeholder has no value
//! (absent or empty) is dropped entirely, so separators written inside a
//! block disappear together with the value they decorate.

use std::collections::HashMap;

/// Placeholder for the defining call's label
pub const LABEL: &str = "label";
/// Placeholder for the kind name
pub const ERROR: &str = "error";
/// Placeholder for the caller-supplied raw message
pub const MESSAGE: &str = "message";
/// Placeholder for the construction call site's file
pub const FILE: &str = "file";

/// Opt-in block rendering the construction file, e.g. ` (src/api.rs)`
pub const FILE_BLOCK: &str = " ($file)";

/// Default template producing `[label] Name: message`
pub fn default_template() -> Vec<String> {
    vec![
        "[$label] ".to_string(),
        "$error".to_string(),
        ": $message".to_string(),
    ]
}

/// Named placeholder values for one rendering
#[derive(Debug, Clone, Default)]
pub struct TemplateValues<'a> {
    values: HashMap<&'a str, &'a str>,
}

impl<'a> TemplateValues<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value; `None` leaves the placeholder absent
    pub fn with(mut self, key: &'a str, value: Option<&'a str>) -> Self {
        if let Some(value) = value {
            self.values.insert(key, value);
        }
        self
    }

    fn get(&self, key: &str) -> Option<&'a str> {
        self.values.get(key).copied().filter(|v| !v.is_empty())
    }
}

/// Render `template` against `values`
///
/// Blocks are processed in order. A block without a placeholder is kept
/// verbatim. A block with a placeholder is kept, with the value substituted,
/// only when that value is present and non-empty.
pub fn render<S: AsRef<str>>(template: &[S], values: &TemplateValues<'_>) -> String {
    let mut output = String::new();

    for block in template {
        let block = block.as_ref();
        match find_placeholder(block) {
            None => output.push_str(block),
            Some((start, end)) => {
                let key = &block[start + 1..end];
                if let Some(value) = values.get(key) {
                    output.push_str(&block[..start]);
                    output.push_str(value);
                    output.push_str(&block[end..]);
                }
            }
        }
    }

    output
}

/// Byte range of the first `$ident` in `block`, `$` included
fn find_placeholder(block: &str) -> Option<(usize, usize)> {
    let bytes = block.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let start = i;
            let mut end = i + 1;
            while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
                end += 1;
            }
            if end > start + 1 {
                return Some((start, end));
            }
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_block_with_absent_value() {
        let template = ["[$label] ", "$error", ": $message"];
        let values = TemplateValues::new()
            .with(ERROR, Some("X"))
            .with(MESSAGE, Some("boom"));

        assert_eq!(render(&template, &values), "X: boom");
    }

    #[test]
    fn test_full_shape() {
        let values = TemplateValues::new()
            .with(LABEL, Some("L"))
            .with(ERROR, Some("ApiError"))
            .with(MESSAGE, Some("timeout"));

        assert_eq!(
            render(&default_template(), &values),
            "[L] ApiError: timeout"
        );
    }

    #[test]
    fn test_empty_value_counts_as_absent() {
        let values = TemplateValues::new()
            .with(LABEL, Some("L"))
            .with(ERROR, Some("EmptyError"))
            .with(MESSAGE, Some(""));

        assert_eq!(render(&default_template(), &values), "[L] EmptyError");
    }

    #[test]
    fn test_literal_blocks_survive() {
        let template = ["<", "$error", ">"];
        let values = TemplateValues::new();
        assert_eq!(render(&template, &values), "<>");
    }

    #[test]
    fn test_file_block_opt_in() {
        let mut template = default_template();
        template.push(FILE_BLOCK.to_string());
        let values = TemplateValues::new()
            .with(ERROR, Some("E"))
            .with(FILE, Some("src/api.rs"));

        assert_eq!(render(&template, &values), "E (src/api.rs)");
    }

    #[test]
    fn test_lone_dollar_is_literal() {
        let template = ["cost $ ", "$error"];
        let values = TemplateValues::new().with(ERROR, Some("E"));
        assert_eq!(render(&template, &values), "cost $ E");
    }
}
