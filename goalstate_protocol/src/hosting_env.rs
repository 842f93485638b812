//! `HostingEnvironmentConfig` subdocument: three attributes, nothing else.

use crate::xmlutil::{doc_root, find, getattrib, parse_doc};
use crate::ProtocolError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostingEnv {
    pub vm_name: Option<String>,
    pub role_name: Option<String>,
    pub deployment_name: Option<String>,
}

impl HostingEnv {
    pub fn parse(xml_text: &str) -> Result<HostingEnv, ProtocolError> {
        let doc = parse_doc(xml_text)
            .map_err(|e| ProtocolError::new(format!("could not parse HostingEnvironmentConfig: {}", e)))?;
        let root = Some(doc_root(&doc));

        let incarnation = find(root, "Incarnation");
        let vm_name = getattrib(incarnation, "instance");

        let role = find(root, "Role");
        let role_name = getattrib(role, "name");

        let deployment = find(root, "Deployment");
        let deployment_name = getattrib(deployment, "name");

        Ok(HostingEnv { vm_name, role_name, deployment_name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_three_attributes() {
        let xml = r#"<HostingEnvironmentConfig>
            <Incarnation instance="vm-0"/>
            <Role name="WebRole"/>
            <Deployment name="dep-42"/>
        </HostingEnvironmentConfig>"#;
        let env = HostingEnv::parse(xml).unwrap();
        assert_eq!(env.vm_name, Some("vm-0".to_string()));
        assert_eq!(env.role_name, Some("WebRole".to_string()));
        assert_eq!(env.deployment_name, Some("dep-42".to_string()));
    }

    #[test]
    fn missing_nodes_yield_none_not_error() {
        let env = HostingEnv::parse("<HostingEnvironmentConfig/>").unwrap();
        assert_eq!(env, HostingEnv::default());
    }
}
