//! `ExtensionsConfig` parser, by far the largest component here.
//!
//! Parses agent-manifest families, the plugin list, plugin settings,
//! required features and status-upload metadata, and reconciles the two
//! loosely-coupled `Plugins`/`PluginSettings` sections into a
//! dependency-annotated extension handler list.

use crate::structs::{Extension, ExtHandler, InVmGoalStateMetadata, RequiredFeature, VmAgentManifest};
use crate::xmlutil::{doc_root, find, findall, findtext, getattrib, gettext, parse_doc};
use crate::{ExtensionConfigError, ProtocolError};
use roxmltree::Node;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionsConfig {
    xml_text: Option<String>,
    pub vmagent_manifests: Vec<VmAgentManifest>,
    pub ext_handlers: Vec<ExtHandler>,
    pub required_features: Vec<RequiredFeature>,
    pub status_upload_blob: Option<String>,
    pub status_upload_blob_type: Option<String>,
    pub artifacts_profile_blob: Option<String>,
    pub in_vm_gs_metadata: InVmGoalStateMetadata,
}

impl ExtensionsConfig {
    /// The value used when the goal state carries no `ExtensionsConfig`
    /// URI at all. Still a real, empty config, never absent.
    pub fn empty() -> ExtensionsConfig {
        ExtensionsConfig::default()
    }

    pub fn parse(xml_text: Option<&str>) -> crate::Result<ExtensionsConfig> {
        let xml_text = match xml_text {
            Some(t) => t,
            None => return Ok(ExtensionsConfig::empty()),
        };

        let doc = parse_doc(xml_text)
            .map_err(|e| ProtocolError::new(format!("could not parse ExtensionsConfig: {}", e)))?;
        let root = Some(doc_root(&doc));

        let vmagent_manifests = parse_ga_families(root);
        let ext_handlers = parse_plugins_and_settings(root);
        let required_features = parse_required_features(root);

        let status_upload_blob = findtext(root, "StatusUploadBlob");
        let artifacts_profile_blob = findtext(root, "InVMArtifactsProfileBlob");
        let status_upload_blob_type = getattrib(find(root, "StatusUploadBlob"), "statusBlobType");
        debug!("extension config shows status blob type as [{:?}]", status_upload_blob_type);

        let in_vm_gs_metadata = InVmGoalStateMetadata::parse_node(find(root, "InVMGoalStateMetaData"));

        Ok(ExtensionsConfig {
            xml_text: Some(xml_text.to_string()),
            vmagent_manifests,
            ext_handlers,
            required_features,
            status_upload_blob,
            status_upload_blob_type,
            artifacts_profile_blob,
            in_vm_gs_metadata,
        })
    }

    /// The raw XML with every non-null `protectedSettings` literal
    /// replaced by `*** REDACTED ***`. Substring-level replacement, so an
    /// identical string appearing elsewhere is over-redacted too. This
    /// matches the behaviour being preserved for compatibility.
    pub fn get_redacted_xml_text(&self) -> String {
        let xml_text = match &self.xml_text {
            Some(t) => t,
            None => return "<None/>".to_string(),
        };

        let mut redacted = xml_text.clone();
        for handler in &self.ext_handlers {
            for extension in &handler.extensions {
                if let Some(protected) = &extension.protected_settings {
                    let literal = match protected {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    if !literal.is_empty() {
                        redacted = redacted.replace(&literal, "*** REDACTED ***");
                    }
                }
            }
        }
        redacted
    }
}

fn parse_ga_families(root: Option<Node>) -> Vec<VmAgentManifest> {
    let families_node = find(root, "GAFamilies");
    findall(families_node, "GAFamily")
        .into_iter()
        .map(|family_node| {
            let family = findtext(Some(family_node), "Name").unwrap_or_default();
            let uris_node = find(Some(family_node), "Uris");
            let versions_manifest_uris = findall(uris_node, "Uri")
                .into_iter()
                .filter_map(|uri| gettext(Some(uri)))
                .collect();
            VmAgentManifest { family, versions_manifest_uris }
        })
        .collect()
}

fn parse_required_features(root: Option<Node>) -> Vec<RequiredFeature> {
    let list_node = find(root, "RequiredFeatures");
    findall(list_node, "RequiredFeature")
        .into_iter()
        .map(|node| RequiredFeature {
            name: findtext(Some(node), "Name").unwrap_or_default(),
            value: findtext(Some(node), "Value").unwrap_or_default(),
        })
        .collect()
}

fn parse_plugins_and_settings(root: Option<Node>) -> Vec<ExtHandler> {
    let plugins_node = find(root, "Plugins");
    let plugins = findall(plugins_node, "Plugin");

    let settings_node = find(root, "PluginSettings");
    let plugin_settings = findall(settings_node, "Plugin");

    plugins
        .into_iter()
        .map(|plugin| {
            let mut handler = ExtHandler::default();
            let version_attr = getattrib(Some(plugin), "version");
            let result = parse_plugin(&mut handler, plugin)
                .and_then(|_| parse_plugin_settings(&mut handler, &plugin_settings, version_attr));
            if let Err(error) = result {
                handler.invalid_setting_reason = Some(error.to_string());
            }
            handler
        })
        .collect()
}

/// Fatal only for a missing/empty `state`; missing `name`/`version` are
/// logged and otherwise tolerated.
fn parse_plugin(handler: &mut ExtHandler, plugin: Node) -> Result<(), ExtensionConfigError> {
    let name = getattrib(Some(plugin), "name");
    if name.as_deref().unwrap_or("").is_empty() {
        warn!("Extensions.Plugins.Plugin.name is missing for ExtensionConfig, logging error");
    }
    handler.name = name.unwrap_or_default();

    let version = getattrib(Some(plugin), "version");
    if version.as_deref().unwrap_or("").is_empty() {
        warn!("Extensions.Plugins.Plugin.version is missing for handler '{}', logging error", handler.name);
    }
    handler.version = version.unwrap_or_default();

    let state = getattrib(Some(plugin), "state").unwrap_or_default();
    if state.is_empty() {
        return Err(ExtensionConfigError::new("received empty Extensions.Plugins.Plugin.state, failing handler"));
    }
    handler.state = state;

    let mut locations = Vec::new();
    if let Some(location) = getattrib(Some(plugin), "location") {
        if !location.is_empty() {
            locations.push(location);
        }
    }
    if let Some(failover) = getattrib(Some(plugin), "failoverlocation") {
        if !failover.is_empty() {
            locations.push(failover);
        }
    }
    let additional_node = find(Some(plugin), "additionalLocations");
    for node in findall(additional_node, "additionalLocation") {
        if let Some(text) = gettext(Some(node)) {
            locations.push(text);
        }
    }
    handler.version_uris = locations;

    Ok(())
}

/// Matches `PluginSettings/Plugin` entries to `handler` by case-insensitive
/// name, validates the version, and dispatches to the single- or
/// multi-config path.
fn parse_plugin_settings<'a, 'input>(
    handler: &mut ExtHandler,
    plugin_settings: &[Node<'a, 'input>],
    plugin_version: Option<String>,
) -> Result<(), ExtensionConfigError> {
    let handler_name_lower = handler.name.to_lowercase();

    let matched: Vec<Node<'a, 'input>> = plugin_settings
        .iter()
        .filter(|node| getattrib(Some(**node), "name").map(|n| n.to_lowercase()) == Some(handler_name_lower.clone()))
        .cloned()
        .collect();

    if matched.is_empty() {
        return Ok(());
    }

    // Compare as Option<String>, not the display-only `handler.version`
    // String: a Plugin and its matching PluginSettings/Plugin that both
    // lack a version attribute agree (None == None), they shouldn't be
    // flagged as a mismatch just because neither one carries a version.
    let version = handler.version.clone();
    let version_matched: Vec<Node<'a, 'input>> = matched
        .iter()
        .filter(|node| getattrib(Some(**node), "version") == plugin_version)
        .cloned()
        .collect();

    if version_matched.len() != matched.len() {
        let found: BTreeSet<String> = matched.iter().filter_map(|node| getattrib(Some(*node), "version")).collect();
        return Err(ExtensionConfigError::new(format!(
            "ExtHandler PluginSettings Version Mismatch! Expected PluginSettings version: {} for Handler: {} but found versions: ({})",
            version,
            handler.name,
            found.into_iter().collect::<Vec<_>>().join(", ")
        )));
    }

    if version_matched.len() > 1 {
        return Err(ExtensionConfigError::new(format!(
            "Multiple plugin settings found for the same handler: {} and version: {} (Expected: 1; Available: {})",
            handler.name,
            version,
            version_matched.len()
        )));
    }

    let settings_node = version_matched[0];
    let runtime_settings_nodes = findall(Some(settings_node), "RuntimeSettings");
    let extension_runtime_settings_nodes = findall(Some(settings_node), "ExtensionRuntimeSettings");

    if !runtime_settings_nodes.is_empty() && !extension_runtime_settings_nodes.is_empty() {
        return Err(ExtensionConfigError::new(format!(
            "Both RuntimeSettings and ExtensionRuntimeSettings found for the same handler: {} and version: {}",
            handler.name, version
        )));
    }

    if !runtime_settings_nodes.is_empty() {
        if runtime_settings_nodes.len() > 1 {
            return Err(ExtensionConfigError::new(format!(
                "Multiple RuntimeSettings found for the same handler: {} and version: {} (Expected: 1; Available: {})",
                handler.name,
                version,
                runtime_settings_nodes.len()
            )));
        }
        let handler_name = handler.name.clone();
        parse_runtime_settings(settings_node, runtime_settings_nodes[0], &handler_name, handler)?;
    } else if !extension_runtime_settings_nodes.is_empty() {
        parse_extension_runtime_settings(settings_node, &extension_runtime_settings_nodes, handler)?;
    }

    Ok(())
}

fn dependency_level_from_node(node: Option<Node>, name_for_log: &str) -> i64 {
    match node.and_then(|n| getattrib(Some(n), "dependencyLevel")) {
        Some(raw) => match raw.parse::<i64>() {
            Ok(level) => level,
            Err(_) => {
                warn!("could not parse dependencyLevel for handler '{}'; setting it to 0", name_for_log);
                0
            }
        },
        None => 0,
    }
}

/// Single-config path: at most one `DependsOn` sibling of `RuntimeSettings`.
fn parse_runtime_settings(
    plugin_settings_node: Node,
    runtime_settings_node: Node,
    handler_name: &str,
    handler: &mut ExtHandler,
) -> Result<(), ExtensionConfigError> {
    let depends_on_nodes = findall(Some(plugin_settings_node), "DependsOn");
    if depends_on_nodes.len() > 1 {
        return Err(ExtensionConfigError::new(format!(
            "extension handler can only have a single DependsOn node for single-config extensions, found {}",
            depends_on_nodes.len()
        )));
    }
    let depends_on_level = dependency_level_from_node(depends_on_nodes.first().copied(), handler_name);
    parse_and_add_extension_settings(runtime_settings_node, handler_name, handler, depends_on_level, "enabled")
}

/// Multi-config path: every `ExtensionRuntimeSettings` becomes its own
/// `Extension`, looked up against a `DependsOn`-derived dependency map.
fn parse_extension_runtime_settings(
    plugin_settings_node: Node,
    extension_runtime_settings_nodes: &[Node],
    handler: &mut ExtHandler,
) -> Result<(), ExtensionConfigError> {
    let mut dependency_levels: HashMap<String, i64> = HashMap::new();
    for depends_on_node in findall(Some(plugin_settings_node), "DependsOn") {
        let extension_name = getattrib(Some(depends_on_node), "name").unwrap_or_default();
        if extension_name.is_empty() {
            return Err(ExtensionConfigError::new(
                "no name specified for DependsOn object in ExtensionRuntimeSettings for multi-config",
            ));
        }
        let level = dependency_level_from_node(Some(depends_on_node), &extension_name);
        dependency_levels.insert(extension_name, level);
    }

    handler.supports_multi_config = true;
    for node in extension_runtime_settings_nodes {
        let extension_name = getattrib(Some(*node), "name").unwrap_or_default();
        if extension_name.is_empty() {
            return Err(ExtensionConfigError::new(
                "extension name not specified for ExtensionRuntimeSettings for multi-config",
            ));
        }
        let state = getattrib(Some(*node), "state")
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
            .unwrap_or_else(|| "enabled".to_string());
        let level = *dependency_levels.get(&extension_name).unwrap_or(&0);
        parse_and_add_extension_settings(*node, &extension_name, handler, level, &state)?;
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct RuntimeSettingsDoc {
    #[serde(rename = "runtimeSettings")]
    runtime_settings: Vec<RuntimeSettingsEntry>,
}

#[derive(Debug, Deserialize)]
struct RuntimeSettingsEntry {
    #[serde(rename = "handlerSettings", default)]
    handler_settings: HandlerSettings,
}

#[derive(Debug, Deserialize, Default)]
struct HandlerSettings {
    #[serde(rename = "publicSettings", default)]
    public_settings: Option<Value>,
    #[serde(rename = "protectedSettings", default)]
    protected_settings: Option<Value>,
    #[serde(rename = "protectedSettingsCertThumbprint", default)]
    protected_settings_cert_thumbprint: Option<String>,
}

/// Parses the JSON body of a `RuntimeSettings`/`ExtensionRuntimeSettings`
/// node and appends one `Extension` per `runtimeSettings` entry. On JSON
/// parse failure, appends a single placeholder `Extension` instead of
/// dropping the entry silently.
fn parse_and_add_extension_settings(
    settings_node: Node,
    name: &str,
    handler: &mut ExtHandler,
    dependency_level: i64,
    state: &str,
) -> Result<(), ExtensionConfigError> {
    let seq_no = match getattrib(Some(settings_node), "seqNo") {
        Some(ref s) if !s.is_empty() => s.clone(),
        _ => return Err(ExtensionConfigError::new(format!("SeqNo not specified for the Extension: {}", name))),
    };

    let body = gettext(Some(settings_node)).unwrap_or_default();
    match serde_json::from_str::<RuntimeSettingsDoc>(body.trim()) {
        Err(error) => {
            error!("invalid extension settings for '{}': {}", name, error);
            handler.extensions.push(Extension::placeholder(name, &seq_no, state, dependency_level));
        }
        Ok(doc) => {
            for entry in doc.runtime_settings {
                handler.extensions.push(Extension {
                    name: name.to_string(),
                    sequence_number: seq_no.clone(),
                    state: state.to_string(),
                    dependency_level,
                    public_settings: entry.handler_settings.public_settings,
                    protected_settings: entry.handler_settings.protected_settings,
                    certificate_thumbprint: entry.handler_settings.protected_settings_cert_thumbprint,
                });
            }
        }
    }

    Ok(())
}
