use crate::xmlutil::gettext;
use roxmltree::Node;
use std::collections::BTreeMap;

/// Opaque metadata extracted from `InVMGoalStateMetaData`. Kept as a flat
/// map of child element name to text rather than a typed struct: the
/// field set isn't part of this crate's contract (it's consumed
/// downstream), so this retains whatever the wire server sends without
/// this crate needing to know its shape, the same way `SharedConfig`
/// retains its raw XML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InVmGoalStateMetadata {
    pub fields: BTreeMap<String, String>,
}

impl InVmGoalStateMetadata {
    pub fn parse_node(node: Option<Node<'_, '_>>) -> Self {
        let mut fields = BTreeMap::new();
        if let Some(node) = node {
            for child in node.children().filter(|n| n.is_element()) {
                if let Some(text) = gettext(Some(child)) {
                    fields.insert(child.tag_name().name().to_string(), text);
                }
            }
        }
        InVmGoalStateMetadata { fields }
    }
}
