//! Built-in declarative content loader.
//!
//! Source text starting with a single `{` is a JSON node tree:
//!
//! ```json
//! { "role": "box", "children": [
//!     { "role": "label", "text": "{{time}}" },
//!     { "role": "button", "text": "Start" }
//! ] }
//! ```
//!
//! Anything else is shown as a single label. Label text may contain
//! `{{time}}`, `{{date}}` and `{{file:PATH}}`, expanded through the loader's
//! [`Capabilities`].

use super::{BoxFuture, Capabilities, ContentError, ContentLoader, ContentNode, ContentResult};
use std::path::Path;

/// Loads declarative markup. Resolves without suspending.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupLoader;

impl ContentLoader for MarkupLoader {
    fn load(&self, source: String, capabilities: Capabilities) -> BoxFuture<'static, ContentResult<ContentNode>> {
        Box::pin(async move { parse_markup(&source, &capabilities) })
    }
}

/// Parse `source` into a content tree.
pub fn parse_markup(source: &str, capabilities: &Capabilities) -> ContentResult<ContentNode> {
    let trimmed = source.trim();
    // A leading `{{` opens a token, not an object.
    let mut node = if trimmed.starts_with('{') && !trimmed.starts_with("{{") {
        serde_json::from_str::<ContentNode>(trimmed).map_err(|e| ContentError::Parse(e.to_string()))?
    } else {
        ContentNode::label(trimmed)
    };
    expand_node(&mut node, capabilities)?;
    Ok(node)
}

fn expand_node(node: &mut ContentNode, capabilities: &Capabilities) -> ContentResult<()> {
    if let Some(text) = node.text.as_mut() {
        if text.contains("{{") {
            *text = expand_text(text, capabilities)?;
        }
    }
    for child in &mut node.children {
        expand_node(child, capabilities)?;
    }
    Ok(())
}

fn expand_text(text: &str, capabilities: &Capabilities) -> ContentResult<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            // Unterminated: keep verbatim.
            out.push_str(&rest[start..]);
            return Ok(out);
        };
        let token = after[..end].trim();
        out.push_str(&expand_token(token, capabilities)?);
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

fn expand_token(token: &str, capabilities: &Capabilities) -> ContentResult<String> {
    match token {
        "time" => Ok(capabilities.now().format("%H:%M").to_string()),
        "date" => Ok(capabilities.now().format("%A, %b %-d").to_string()),
        _ => match token.strip_prefix("file:") {
            Some(path) => capabilities
                .read_file(Path::new(path.trim()))
                .map(|s| s.trim_end().to_string()),
            None => Ok(format!("{{{{{}}}}}", token)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::NodeRole;
    use std::fs;
    use std::task::{Context, Poll, Waker};
    use tempfile::tempdir;

    #[test]
    fn test_plain_text_is_label() {
        let node = parse_markup("  Hello  ", &Capabilities::default()).unwrap();
        assert_eq!(node.role, NodeRole::Label);
        assert_eq!(node.text.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_json_tree() {
        let source = r#"{"role":"box","children":[{"role":"label","text":"25:00"},{"role":"button","text":"Start"}]}"#;
        let node = parse_markup(source, &Capabilities::default()).unwrap();
        assert_eq!(node.children.len(), 2);
        assert!(node.children[1].is_interactive());
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let result = parse_markup("{ role: ", &Capabilities::default());
        assert!(matches!(result, Err(ContentError::Parse(_))));
    }

    #[test]
    fn test_time_expansion() {
        let node = parse_markup("Now {{time}}", &Capabilities::default()).unwrap();
        let text = node.text.unwrap();
        assert!(text.starts_with("Now "));
        assert_eq!(text.len(), "Now 00:00".len());
    }

    #[test]
    fn test_unknown_and_unterminated_tokens_are_kept() {
        let caps = Capabilities::default();
        assert_eq!(expand_text("a {{nope}} b", &caps).unwrap(), "a {{nope}} b");
        assert_eq!(expand_text("a {{time", &caps).unwrap(), "a {{time");
    }

    #[test]
    fn test_leading_token_is_a_label() {
        let caps = Capabilities::default();
        let node = parse_markup("{{time}} local", &caps).unwrap();
        assert_eq!(node.role, NodeRole::Label);
        assert!(node.text.as_deref().unwrap().ends_with(" local"));
        assert!(!node.text.as_deref().unwrap().contains("{{"));
    }

    #[test]
    fn test_file_expansion_uses_capabilities() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("quote.txt");
        fs::write(&file, "Stay hungry\n").unwrap();

        let source = format!("{{{{file:{}}}}}", file.display());
        let allowed = Capabilities::new(vec![dir.path().to_path_buf()]);
        let node = parse_markup(&source, &allowed).unwrap();
        assert_eq!(node.text.as_deref(), Some("Stay hungry"));

        let denied = parse_markup(&source, &Capabilities::default());
        assert!(denied.is_err());
    }

    #[test]
    fn test_loader_future_is_ready_immediately() {
        let mut future = MarkupLoader.load("Hi".to_string(), Capabilities::default());
        let mut cx = Context::from_waker(Waker::noop());
        match future.as_mut().poll(&mut cx) {
            Poll::Ready(Ok(node)) => assert_eq!(node.text.as_deref(), Some("Hi")),
            _ => panic!("markup load should resolve on first poll"),
        }
    }
}
