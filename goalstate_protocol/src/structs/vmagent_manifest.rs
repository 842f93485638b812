/// One `GAFamily`: a family name and the ordered URIs of its version
/// manifests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VmAgentManifest {
    pub family: String,
    pub versions_manifest_uris: Vec<String>,
}
