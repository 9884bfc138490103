//! Call-site scope inference
//!
//! Kinds are bucketed by where they are requested from. A resolver turns the
//! requesting call site into a location string, reduced to a path relative
//! to this crate's own source directory. When nothing qualifies the scope
//! degrades to `"global"`; resolution never fails.

use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;

use exkind_core_types::{ScopeKey, GLOBAL_SCOPE};

/// A source location parsed from a stack frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl CallSite {
    pub fn from_location(location: &Location<'_>) -> Self {
        Self {
            file: normalize(location.file()),
            line: location.line(),
            column: location.column(),
        }
    }

    /// Parse one frame of stack text
    ///
    /// A frame qualifies when it ends in `path:line:column` where the path
    /// has a separator and a file extension. Bare locations, `at path:l:c`
    /// and `name (path:l:c)` shapes are accepted.
    pub fn parse_frame(frame: &str) -> Option<Self> {
        let trimmed = frame.trim();
        let candidate = match (trimmed.rfind('('), trimmed.ends_with(')')) {
            (Some(open), true) => &trimmed[open + 1..trimmed.len() - 1],
            _ => trimmed.split_whitespace().last()?,
        };

        let mut parts = candidate.rsplitn(3, ':');
        let column = parts.next()?.parse().ok()?;
        let line = parts.next()?.parse().ok()?;
        let path = parts.next()?;

        if !path.contains(is_separator) {
            return None;
        }
        let file_part = path.rsplit(is_separator).next()?;
        match file_part.rsplit_once('.') {
            Some((stem, ext))
                if !stem.is_empty()
                    && !ext.is_empty()
                    && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {}
            _ => return None,
        }

        Some(Self {
            file: normalize(path),
            line,
            column,
        })
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Find the originating frame in stack text
///
/// With `exclude_root`, frames under that root belong to the resolver
/// itself: the first frame after the last such frame is returned. Without
/// one, or when no own frame is present, the first qualifying frame wins.
pub fn parse_stack(text: &str, exclude_root: Option<&str>) -> Option<CallSite> {
    let frames: Vec<CallSite> = text.lines().filter_map(CallSite::parse_frame).collect();

    let start = exclude_root
        .map(normalize)
        .and_then(|root| frames.iter().rposition(|site| site.file.contains(&root)))
        .map_or(0, |last_own| last_own + 1);

    frames.into_iter().nth(start)
}

/// Reduce `path` to a path relative to `root`
///
/// The longest run of leading `root` segments found in `path` is stripped
/// together with everything before it, so absolute and workspace-relative
/// spellings of the same file reduce alike.
pub fn relative_to(path: &str, root: &str) -> String {
    let path = normalize(path);
    let root = normalize(root);
    let path_segs: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let root_segs: Vec<&str> = root.split('/').filter(|s| !s.is_empty()).collect();

    let mut best: Option<(usize, usize)> = None;
    for start in 0..path_segs.len() {
        let matched = path_segs[start..]
            .iter()
            .zip(&root_segs)
            .take_while(|(a, b)| a == b)
            .count();
        if matched > 0 && best.map_or(true, |(_, m)| matched > m) {
            best = Some((start, matched));
        }
    }

    match best {
        Some((start, matched)) if start + matched < path_segs.len() => {
            path_segs[start + matched..].join("/")
        }
        _ => path,
    }
}

/// Directory of this module's own source file
pub fn reference_root() -> String {
    let own = normalize(file!());
    match own.rsplit_once('/') {
        Some((dir, _)) => dir.to_string(),
        None => String::new(),
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    let path = path.strip_prefix("file://").unwrap_or(&path);
    path.strip_prefix("./").unwrap_or(path).to_string()
}

/// Source of the location string that names a scope
pub trait CallSiteResolver: Send + Sync + fmt::Debug {
    /// Resolve the location of `caller`; `None` means no frame qualified
    fn resolve(&self, caller: &Location<'_>) -> Option<String>;
}

/// Uses the `#[track_caller]` location of the requesting call
#[derive(Debug, Clone, Copy, Default)]
pub struct CallerLocation;

impl CallSiteResolver for CallerLocation {
    fn resolve(&self, caller: &Location<'_>) -> Option<String> {
        let file = caller.file();
        if file.is_empty() {
            return None;
        }
        Some(relative_to(file, &reference_root()))
    }
}

/// Captures a backtrace and parses its text
///
/// Frames are only available with debug info; without them the scope
/// degrades to `"global"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceResolver;

impl CallSiteResolver for BacktraceResolver {
    fn resolve(&self, _caller: &Location<'_>) -> Option<String> {
        let text = Backtrace::force_capture().to_string();
        let root = reference_root();
        parse_stack(&text, Some(&root)).map(|site| relative_to(&site.file, &root))
    }
}

/// Canned stack text, parsed like a captured one
#[derive(Debug, Clone)]
pub struct StackTextResolver {
    text: String,
}

impl StackTextResolver {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl CallSiteResolver for StackTextResolver {
    fn resolve(&self, _caller: &Location<'_>) -> Option<String> {
        parse_stack(&self.text, None).map(|site| relative_to(&site.file, &reference_root()))
    }
}

/// Always resolves to the same location
#[derive(Debug, Clone)]
pub struct FixedLocation(Option<String>);

impl FixedLocation {
    pub fn new(location: impl Into<String>) -> Self {
        Self(Some(location.into()))
    }

    /// A resolver that never finds a frame
    pub fn unresolved() -> Self {
        Self(None)
    }
}

impl CallSiteResolver for FixedLocation {
    fn resolve(&self, _caller: &Location<'_>) -> Option<String> {
        self.0.clone()
    }
}

/// Effective scope key for a request made at `caller`
pub fn resolve_scope(
    resolver: &dyn CallSiteResolver,
    label: Option<&str>,
    caller: &Location<'_>,
) -> ScopeKey {
    let location = resolver
        .resolve(caller)
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| GLOBAL_SCOPE.to_string());
    ScopeKey::compose(label, &location)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rust_backtrace_frame() {
        let site = CallSite::parse_frame("             at ./src/api/handler.rs:42:9").unwrap();
        assert_eq!(site.file, "src/api/handler.rs");
        assert_eq!(site.line, 42);
        assert_eq!(site.column, 9);
    }

    #[test]
    fn test_parse_parenthesised_frame() {
        let site = CallSite::parse_frame("    at load (/srv/app/lib/db.js:10:3)").unwrap();
        assert_eq!(site.file, "/srv/app/lib/db.js");
        assert_eq!(site.to_string(), "/srv/app/lib/db.js:10:3");
    }

    #[test]
    fn test_parse_windows_frame() {
        let site = CallSite::parse_frame("at C:\\work\\src\\main.rs:3:1").unwrap();
        assert_eq!(site.file, "C:/work/src/main.rs");
    }

    #[test]
    fn test_non_frames_rejected() {
        for frame in [
            "",
            "   3: exkind_core::factory::ExceptionEnum::kind",
            "at main.rs:1:2",
            "at src/Makefile:1:2",
            "at src/main.rs:1",
            "at src/main.rs:x:2",
            "stack backtrace:",
        ] {
            assert!(CallSite::parse_frame(frame).is_none(), "{frame}");
        }
    }

    #[test]
    fn test_parse_stack_skips_own_frames() {
        let text = "\
   0: std::backtrace::Backtrace::force_capture
             at /rustc/abc/library/std/src/backtrace.rs:312:9
   1: exkind_core::resolver::BacktraceResolver::resolve
             at /w/crates/exkind-core/src/resolver.rs:190:20
   2: exkind_core::factory::ExceptionEnum::kind
             at /w/crates/exkind-core/src/factory.rs:88:9
   3: app::main
             at /w/app/src/main.rs:7:5";

        let site = parse_stack(text, Some("crates/exkind-core/src")).unwrap();
        assert_eq!(site.file, "/w/app/src/main.rs");
        assert_eq!(site.line, 7);
    }

    #[test]
    fn test_parse_stack_without_own_frames_takes_first() {
        let text = "boom\n    at a (/x/one.js:1:1)\n    at b (/x/two.js:2:2)";
        let site = parse_stack(text, Some("crates/exkind-core/src")).unwrap();
        assert_eq!(site.file, "/x/one.js");
    }

    #[test]
    fn test_parse_stack_malformed() {
        assert!(parse_stack("", None).is_none());
        assert!(parse_stack("no frames here\n\n:::", None).is_none());
    }

    #[test]
    fn test_relative_to_strips_common_prefix() {
        assert_eq!(
            relative_to("crates/exkind-core/tests/api.rs", "crates/exkind-core/src"),
            "tests/api.rs"
        );
        assert_eq!(
            relative_to("/w/crates/exkind-core/src/kind.rs", "crates/exkind-core/src"),
            "kind.rs"
        );
    }

    #[test]
    fn test_relative_to_unrelated_path_kept() {
        assert_eq!(relative_to("app/main.rs", "crates/exkind-core/src"), "app/main.rs");
    }

    #[test]
    fn test_reference_root_is_own_directory() {
        assert!(reference_root().ends_with("src"));
    }

    #[test]
    fn test_caller_location_resolver() {
        let location = Location::caller();
        let resolved = CallerLocation.resolve(location).unwrap();
        assert_eq!(resolved, "resolver.rs");
    }

    #[test]
    fn test_resolve_scope_degrades_to_global() {
        let caller = Location::caller();
        let key = resolve_scope(&FixedLocation::unresolved(), None, caller);
        assert_eq!(key.as_str(), "global");

        let key = resolve_scope(&StackTextResolver::new("garbage"), Some("L"), caller);
        assert_eq!(key.as_str(), "L:global");
    }

    #[test]
    fn test_resolve_scope_with_label() {
        let caller = Location::caller();
        let key = resolve_scope(&FixedLocation::new("tests/api.rs"), Some("http"), caller);
        assert_eq!(key.as_str(), "http:tests/api.rs");
    }
}
