//! Root `GoalState` fetcher and the `fetch_full_goal_state` orchestrator.

use crate::certificates::Certificates;
use crate::clock::Clock;
use crate::container::ContainerIdRegister;
use crate::crypto::Crypto;
use crate::errors::IncompleteGoalStateError;
use crate::extensions_config::ExtensionsConfig;
use crate::hosting_env::HostingEnv;
use crate::remote_access::RemoteAccess;
use crate::shared_config::SharedConfig;
use crate::transport::{HeaderKind, Transport};
use crate::xmlutil::{doc_root, find, findtext, parse_doc};
use crate::ProtocolError;
use std::path::Path;
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 6;
const RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalState {
    pub xml_text: String,
    pub incarnation: String,
    pub role_instance_id: String,
    pub role_config_name: String,
    pub container_id: String,

    pub hosting_env_uri: Option<String>,
    pub shared_conf_uri: Option<String>,
    pub certs_uri: Option<String>,
    pub ext_conf_uri: Option<String>,
    pub remote_access_uri: Option<String>,

    pub hosting_env: Option<HostingEnv>,
    pub shared_conf: Option<SharedConfig>,
    pub certs: Option<Certificates>,
    pub ext_conf: Option<ExtensionsConfig>,
    pub remote_access: Option<RemoteAccess>,
}

/// Fetch and parse the root document, retrying up to `MAX_ATTEMPTS` times,
/// 500ms apart, while it lacks a `RoleInstance` node. Updates
/// `container_register` on success.
pub fn fetch_goal_state(
    transport: &dyn Transport,
    clock: &dyn Clock,
    container_register: &ContainerIdRegister,
    root_uri: &str,
) -> crate::Result<GoalState> {
    let mut attempt = 0;

    loop {
        attempt += 1;
        let xml_text = transport.fetch_config(root_uri, HeaderKind::Standard)?;

        let doc =
            parse_doc(&xml_text).map_err(|e| ProtocolError::new(format!("could not parse root GoalState: {}", e)))?;
        let root = Some(doc_root(&doc));

        let incarnation = findtext(root, "Incarnation").unwrap_or_default();
        let container_node = find(root, "Container");
        let role_instance_list = find(container_node, "RoleInstanceList");
        let role_instance = find(role_instance_list, "RoleInstance");

        let role_instance = match role_instance {
            Some(node) => node,
            None => {
                if attempt >= MAX_ATTEMPTS {
                    return Err(IncompleteGoalStateError { attempts: attempt, incarnation }.into());
                }
                warn!(
                    "GoalState fetch attempt {}/{} is missing a RoleInstance node (incarnation {})",
                    attempt, MAX_ATTEMPTS, incarnation
                );
                clock.sleep(RETRY_DELAY);
                continue;
            }
        };

        let role_instance_id = findtext(Some(role_instance), "InstanceId").unwrap_or_default();
        let container_id = findtext(container_node, "ContainerId").unwrap_or_default();
        let configuration = find(Some(role_instance), "Configuration");
        let role_config_name = findtext(configuration, "ConfigName").unwrap_or_default();

        let hosting_env_uri = findtext(configuration, "HostingEnvironmentConfig");
        let shared_conf_uri = findtext(configuration, "SharedConfig");
        let certs_uri = findtext(configuration, "Certificates");
        let ext_conf_uri = findtext(configuration, "ExtensionsConfig");
        let remote_access_uri = findtext(container_node, "RemoteAccessInfo");

        container_register.update(&container_id);

        return Ok(GoalState {
            xml_text,
            incarnation,
            role_instance_id,
            role_config_name,
            container_id,
            hosting_env_uri,
            shared_conf_uri,
            certs_uri,
            ext_conf_uri,
            remote_access_uri,
            hosting_env: None,
            shared_conf: None,
            certs: None,
            ext_conf: None,
            remote_access: None,
        });
    }
}

impl GoalState {
    /// Sequentially fetches and materializes every subdocument.
    /// `hosting_env_uri`/`shared_conf_uri` are treated as required; their
    /// absence is itself a `ProtocolError` rather than a silent skip, unlike
    /// the three genuinely optional subdocuments.
    pub fn fetch_full_goal_state(
        &mut self,
        transport: &dyn Transport,
        crypto: &dyn Crypto,
        lib_dir: &Path,
    ) -> crate::Result<()> {
        info!("fetching full goal state for incarnation {}", self.incarnation);
        let result = self.fetch_subdocuments(transport, crypto, lib_dir);
        info!("finished fetching full goal state for incarnation {}", self.incarnation);
        result.map_err(|e| ProtocolError::new(format!("failed to fetch full goal state: {}", e)).into())
    }

    fn fetch_subdocuments(
        &mut self,
        transport: &dyn Transport,
        crypto: &dyn Crypto,
        lib_dir: &Path,
    ) -> crate::Result<()> {
        let hosting_env_uri = self
            .hosting_env_uri
            .clone()
            .ok_or_else(|| ProtocolError::new("goal state is missing a HostingEnvironmentConfig uri"))?;
        let hosting_env_xml = transport.fetch_config(&hosting_env_uri, HeaderKind::Standard)?;
        self.hosting_env = Some(HostingEnv::parse(&hosting_env_xml)?);

        let shared_conf_uri = self
            .shared_conf_uri
            .clone()
            .ok_or_else(|| ProtocolError::new("goal state is missing a SharedConfig uri"))?;
        let shared_conf_xml = transport.fetch_config(&shared_conf_uri, HeaderKind::Standard)?;
        self.shared_conf = Some(SharedConfig::new(shared_conf_xml));

        if let Some(uri) = self.certs_uri.clone() {
            let certs_xml = transport.fetch_config(&uri, HeaderKind::Cert)?;
            self.certs = Some(Certificates::parse(&certs_xml, lib_dir, crypto)?);
        }

        if let Some(uri) = self.ext_conf_uri.clone() {
            let ext_conf_xml = transport.fetch_config(&uri, HeaderKind::Standard)?;
            self.ext_conf = Some(ExtensionsConfig::parse(Some(&ext_conf_xml))?);
        } else {
            self.ext_conf = Some(ExtensionsConfig::empty());
        }

        if let Some(uri) = self.remote_access_uri.clone() {
            let remote_access_xml = transport.fetch_config(&uri, HeaderKind::Cert)?;
            self.remote_access = Some(RemoteAccess::parse(&remote_access_xml)?);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CryptoError;
    use std::cell::RefCell;

    struct ScriptedTransport {
        responses: RefCell<Vec<String>>,
    }

    impl Transport for ScriptedTransport {
        fn fetch_config(&self, _uri: &str, _header: HeaderKind) -> Result<String, crate::TransportError> {
            let mut responses = self.responses.borrow_mut();
            assert!(!responses.is_empty(), "no more scripted responses");
            Ok(responses.remove(0))
        }
    }

    struct CountingClock {
        sleeps: RefCell<u32>,
    }

    impl Clock for CountingClock {
        fn sleep(&self, _dur: Duration) {
            *self.sleeps.borrow_mut() += 1;
        }
    }

    struct NoopCrypto;

    impl Crypto for NoopCrypto {
        fn decrypt_p7m(&self, _: &Path, _: &Path, _: &Path, _: &Path) -> Result<(), CryptoError> {
            unimplemented!("not exercised by this test")
        }
        fn pubkey_from_prv(&self, _: &Path) -> Result<String, CryptoError> {
            unimplemented!("not exercised by this test")
        }
        fn pubkey_from_crt(&self, _: &Path) -> Result<String, CryptoError> {
            unimplemented!("not exercised by this test")
        }
        fn thumbprint_from_crt(&self, _: &Path) -> Result<String, CryptoError> {
            unimplemented!("not exercised by this test")
        }
    }

    fn role_instance_xml(incarnation: &str, container_id: &str, role_instance: &str) -> String {
        format!(
            "<GoalState><Incarnation>{}</Incarnation><Container><ContainerId>{}</ContainerId><RoleInstanceList>{}</RoleInstanceList></Container></GoalState>",
            incarnation, container_id, role_instance
        )
    }

    #[test]
    fn minimal_happy_path_root_fetch() {
        let present = role_instance_xml(
            "1",
            "container-1",
            "<RoleInstance><InstanceId>instance-1</InstanceId><Configuration><ConfigName>cfg</ConfigName></Configuration></RoleInstance>",
        );
        let transport = ScriptedTransport { responses: RefCell::new(vec![present]) };
        let clock = CountingClock { sleeps: RefCell::new(0) };
        let register = ContainerIdRegister::new();

        let gs = fetch_goal_state(&transport, &clock, &register, "http://168.63.129.16/machine/?comp=goalstate").unwrap();

        assert_eq!(gs.incarnation, "1");
        assert_eq!(gs.role_instance_id, "instance-1");
        assert_eq!(gs.container_id, "container-1");
        assert_eq!(gs.role_config_name, "cfg");
        assert_eq!(gs.hosting_env_uri, None);
        assert_eq!(gs.ext_conf_uri, None);
        assert_eq!(*clock.sleeps.borrow(), 0);
        assert_eq!(register.get(), "container-1");
    }

    #[test]
    fn five_missing_role_instance_then_success_on_sixth() {
        let missing = role_instance_xml("7", "c", "");
        let present = role_instance_xml(
            "7",
            "c",
            "<RoleInstance><InstanceId>i</InstanceId><Configuration><ConfigName>cfg</ConfigName></Configuration></RoleInstance>",
        );
        let mut responses = vec![missing; 5];
        responses.push(present);
        let transport = ScriptedTransport { responses: RefCell::new(responses) };
        let clock = CountingClock { sleeps: RefCell::new(0) };
        let register = ContainerIdRegister::new();

        let gs = fetch_goal_state(&transport, &clock, &register, "uri").unwrap();

        assert_eq!(gs.incarnation, "7");
        assert_eq!(*clock.sleeps.borrow(), 5);
    }

    #[test]
    fn exhausted_retries_raise_incomplete_goal_state_error() {
        let missing = role_instance_xml("9", "c", "");
        let transport = ScriptedTransport { responses: RefCell::new(vec![missing; 6]) };
        let clock = CountingClock { sleeps: RefCell::new(0) };
        let register = ContainerIdRegister::new();

        let err = fetch_goal_state(&transport, &clock, &register, "uri").unwrap_err();

        assert!(err.to_string().contains("RoleInstance"));
        assert_eq!(*clock.sleeps.borrow(), 5);
    }

    #[test]
    fn fetch_full_goal_state_defaults_to_empty_extensions_config() {
        let mut gs = GoalState {
            incarnation: "1".to_string(),
            hosting_env_uri: Some("host-uri".to_string()),
            shared_conf_uri: Some("shared-uri".to_string()),
            ..GoalState::default()
        };

        let hosting_env_xml =
            r#"<HostingEnvironmentConfig><Incarnation instance="vm-0"/><Role name="R"/><Deployment name="D"/></HostingEnvironmentConfig>"#;
        let shared_conf_xml = "<SharedConfig/>";
        let transport =
            ScriptedTransport { responses: RefCell::new(vec![hosting_env_xml.to_string(), shared_conf_xml.to_string()]) };
        let crypto = NoopCrypto;

        gs.fetch_full_goal_state(&transport, &crypto, Path::new("/tmp")).unwrap();

        assert_eq!(gs.hosting_env.unwrap().vm_name, Some("vm-0".to_string()));
        assert_eq!(gs.shared_conf.unwrap().xml_text, shared_conf_xml);
        assert_eq!(gs.ext_conf, Some(ExtensionsConfig::empty()));
        assert!(gs.certs.is_none());
        assert!(gs.remote_access.is_none());
    }

    #[test]
    fn fetch_full_goal_state_requires_hosting_env_uri() {
        let mut gs = GoalState::default();
        let transport = ScriptedTransport { responses: RefCell::new(vec![]) };
        let crypto = NoopCrypto;

        let err = gs.fetch_full_goal_state(&transport, &crypto, Path::new("/tmp")).unwrap_err();
        assert!(err.to_string().contains("HostingEnvironmentConfig"));
    }
}
