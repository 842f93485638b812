//! `SharedConfig` subdocument: opaque. Downstream consumers parse the raw
//! XML again for their own purposes, so this crate doesn't build a tree
//! for it at all. It just keeps the bytes.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedConfig {
    pub xml_text: String,
}

impl SharedConfig {
    pub fn new(xml_text: String) -> SharedConfig {
        SharedConfig { xml_text }
    }
}
