//! Uniform, null-safe access to XML nodes, attributes and text.
//!
//! Every function here takes (or returns) an `Option<Node>` rather than a bare
//! `Node`, so chaining through a missing parent never panics:
//!
//! ```ignore
//! let role_instance = find(doc_root(&doc), "RoleInstance");
//! let instance_id = findtext(role_instance, "InstanceId");
//! ```
//!
//! If `RoleInstance` is absent, `findtext` simply sees `None` and returns
//! `None`. No branch is needed at each step.

use roxmltree::{Document, Node};

/// Parse a document. This is the only place `roxmltree::Error` is named;
/// every other function in this module works in terms of `Option<Node>`.
pub fn parse_doc(text: &str) -> std::result::Result<Document<'_>, roxmltree::Error> {
    Document::parse(text)
}

/// The root element of a parsed document, ready to be handed to `find`.
pub fn doc_root<'a, 'input>(doc: &'a Document<'input>) -> Node<'a, 'input> {
    doc.root_element()
}

/// First direct child element named `name`, or `None` if `parent` is absent
/// or has no such child.
pub fn find<'a, 'input>(parent: Option<Node<'a, 'input>>, name: &str) -> Option<Node<'a, 'input>> {
    parent?.children().find(|n| n.is_element() && n.tag_name().name() == name)
}

/// All direct child elements named `name`, in document order. Empty if
/// `parent` is absent.
pub fn findall<'a, 'input>(parent: Option<Node<'a, 'input>>, name: &str) -> Vec<Node<'a, 'input>> {
    match parent {
        Some(p) => p.children().filter(|n| n.is_element() && n.tag_name().name() == name).collect(),
        None => Vec::new(),
    }
}

/// Text of the first direct child element named `name`, trimmed. `None` if
/// the child is absent or its text is empty after trimming.
pub fn findtext(parent: Option<Node<'_, '_>>, name: &str) -> Option<String> {
    gettext(find(parent, name))
}

/// Value of attribute `name` on `node`. `None` if `node` is absent or the
/// attribute is unset.
pub fn getattrib(node: Option<Node<'_, '_>>, name: &str) -> Option<String> {
    node?.attribute(name).map(|s| s.to_string())
}

/// Concatenated text of `node`'s text children, trimmed. `None` if `node` is
/// absent or the result is empty.
pub fn gettext(node: Option<Node<'_, '_>>) -> Option<String> {
    let node = node?;
    let text: String = node.children().filter_map(|c| c.text()).collect();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parent_is_safe_everywhere() {
        assert!(find(None, "Foo").is_none());
        assert!(findall(None, "Foo").is_empty());
        assert!(findtext(None, "Foo").is_none());
        assert!(getattrib(None, "foo").is_none());
        assert!(gettext(None).is_none());
    }

    #[test]
    fn find_and_findtext_roundtrip() {
        let doc = parse_doc("<Root><Incarnation>7</Incarnation><Container><ContainerId>abc</ContainerId></Container></Root>").unwrap();
        let root = Some(doc_root(&doc));
        assert_eq!(findtext(root, "Incarnation"), Some("7".to_string()));
        let container = find(root, "Container");
        assert_eq!(findtext(container, "ContainerId"), Some("abc".to_string()));
        assert_eq!(findtext(root, "DoesNotExist"), None);
    }

    #[test]
    fn findall_collects_siblings_in_order() {
        let doc = parse_doc("<Root><Uris><Uri>a</Uri><Uri>b</Uri><Uri>c</Uri></Uris></Root>").unwrap();
        let root = Some(doc_root(&doc));
        let uris_node = find(root, "Uris");
        let uris: Vec<String> = findall(uris_node, "Uri").into_iter().filter_map(|n| gettext(Some(n))).collect();
        assert_eq!(uris, vec!["a", "b", "c"]);
    }

    #[test]
    fn getattrib_missing_is_none() {
        let doc = parse_doc(r#"<Root><Plugin name="X"/></Root>"#).unwrap();
        let root = Some(doc_root(&doc));
        let plugin = find(root, "Plugin");
        assert_eq!(getattrib(plugin, "name"), Some("X".to_string()));
        assert_eq!(getattrib(plugin, "version"), None);
    }

    #[test]
    fn empty_text_is_none_not_empty_string() {
        let doc = parse_doc("<Root><Empty>   </Empty></Root>").unwrap();
        let root = Some(doc_root(&doc));
        assert_eq!(findtext(root, "Empty"), None);
    }
}
