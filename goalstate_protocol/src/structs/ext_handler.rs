use crate::structs::Extension;

/// A named, versioned extension handler and the extensions configured
/// under it. `invalid_setting_reason` is set, and `extensions` left empty,
/// when parsing this handler's `PluginSettings` failed. The handler is
/// still retained so its failure can be reported upstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtHandler {
    pub name: String,
    pub version: String,
    pub state: String,
    pub version_uris: Vec<String>,
    pub supports_multi_config: bool,
    pub extensions: Vec<Extension>,
    pub invalid_setting_reason: Option<String>,
}
