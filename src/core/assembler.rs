//! Record assembly
//!
//! A record line is `[thread] Type.method(file:line) body`. Each prefix part
//! is optional. Block payloads (pretty-printed documents, hex dumps, stack
//! traces) start on their own line below the prefix.

use super::caller::CallSite;

/// Tag used when neither a tag nor a caller could be determined.
pub const FALLBACK_TAG: &str = "taglog";

/// Which prefix parts to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrefixOptions {
    pub thread: bool,
    pub class: bool,
    pub method: bool,
    pub line: bool,
}

impl PrefixOptions {
    /// Whether any part needs the enclosing type or function of the caller.
    pub fn needs_symbols(&self) -> bool {
        self.class || self.method
    }

    pub fn is_empty(&self) -> bool {
        !(self.thread || self.class || self.method || self.line)
    }
}

/// Builds the prefix. Parts that are enabled but unknown are left out.
pub fn compose_prefix(options: PrefixOptions, thread: Option<&str>, site: Option<&CallSite>) -> String {
    let mut prefix = String::new();

    if options.thread {
        if let Some(thread) = thread {
            prefix.push('[');
            prefix.push_str(thread);
            prefix.push(']');
        }
    }

    let Some(site) = site else {
        return prefix;
    };

    let mut location = String::new();
    let class = site.class.as_deref().filter(|_| options.class);
    let method = site.method.as_deref().filter(|_| options.method);
    match (class, method) {
        (Some(class), Some(method)) => {
            location.push_str(class);
            location.push('.');
            location.push_str(method);
        }
        (Some(name), None) | (None, Some(name)) => location.push_str(name),
        (None, None) => {}
    }
    if options.line {
        location.push_str(&format!("({}:{})", site.file_name(), site.line));
    }

    if !location.is_empty() {
        if !prefix.is_empty() {
            prefix.push(' ');
        }
        prefix.push_str(&location);
    }
    prefix
}

/// Joins prefix and body into the record message.
pub fn assemble(prefix: &str, body: &str, block: bool) -> String {
    match (prefix.is_empty(), block) {
        (true, _) => body.to_string(),
        (false, true) => format!("{}\n{}", prefix, body),
        (false, false) if body.is_empty() => prefix.to_string(),
        (false, false) => format!("{} {}", prefix, body),
    }
}

/// Picks the record tag: an explicit tag, else the caller's type or module,
/// else the caller's file stem.
pub fn resolve_tag(explicit: Option<&str>, site: Option<&CallSite>) -> String {
    if let Some(tag) = explicit {
        return tag.to_string();
    }
    match site {
        Some(site) => match &site.class {
            Some(class) => class.clone(),
            None => site.file_stem().to_string(),
        },
        None => FALLBACK_TAG.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(class: Option<&str>, method: Option<&str>) -> CallSite {
        CallSite {
            file: "src/net/server.rs".to_string(),
            line: 42,
            class: class.map(str::to_string),
            method: method.map(str::to_string),
        }
    }

    const ALL: PrefixOptions = PrefixOptions {
        thread: true,
        class: true,
        method: true,
        line: true,
    };

    #[test]
    fn test_full_prefix() {
        let site = site(Some("Server"), Some("start"));
        assert_eq!(
            compose_prefix(ALL, Some("main"), Some(&site)),
            "[main] Server.start(server.rs:42)"
        );
    }

    #[test]
    fn test_partial_prefixes() {
        let site = site(Some("Server"), Some("start"));
        let options = PrefixOptions {
            method: true,
            ..PrefixOptions::default()
        };
        assert_eq!(compose_prefix(options, Some("main"), Some(&site)), "start");

        let options = PrefixOptions {
            thread: true,
            line: true,
            ..PrefixOptions::default()
        };
        assert_eq!(
            compose_prefix(options, Some("io"), Some(&site)),
            "[io] (server.rs:42)"
        );
        assert_eq!(compose_prefix(PrefixOptions::default(), Some("io"), Some(&site)), "");
    }

    #[test]
    fn test_unresolved_parts_are_omitted() {
        let site = site(None, None);
        assert_eq!(
            compose_prefix(ALL, Some("main"), Some(&site)),
            "[main] (server.rs:42)"
        );
        assert_eq!(compose_prefix(ALL, Some("main"), None), "[main]");
    }

    #[test]
    fn test_assemble() {
        assert_eq!(assemble("", "body", false), "body");
        assert_eq!(assemble("[main]", "body", false), "[main] body");
        assert_eq!(assemble("[main]", "{\n}", true), "[main]\n{\n}");
        assert_eq!(assemble("[main]", "", false), "[main]");
    }

    #[test]
    fn test_tag_resolution_order() {
        let with_class = site(Some("Server"), None);
        let without_class = site(None, Some("run"));
        assert_eq!(resolve_tag(Some("Explicit"), Some(&with_class)), "Explicit");
        assert_eq!(resolve_tag(None, Some(&with_class)), "Server");
        assert_eq!(resolve_tag(None, Some(&without_class)), "server");
        assert_eq!(resolve_tag(None, None), FALLBACK_TAG);
    }
}
