//! `RemoteAccess` subdocument: the user-provisioning list.

use crate::structs::RemoteAccessUser;
use crate::xmlutil::{doc_root, find, findall, findtext, parse_doc};
use crate::ProtocolError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteAccess {
    pub version: Option<String>,
    pub incarnation: Option<String>,
    pub user_list: Vec<RemoteAccessUser>,
}

impl RemoteAccess {
    /// An empty or absent body produces an empty user list, not an error.
    pub fn parse(xml_text: &str) -> Result<RemoteAccess, ProtocolError> {
        if xml_text.trim().is_empty() {
            return Ok(RemoteAccess::default());
        }

        let doc = parse_doc(xml_text)
            .map_err(|e| ProtocolError::new(format!("could not parse RemoteAccess: {}", e)))?;
        let root = Some(doc_root(&doc));

        let version = findtext(root, "Version");
        let incarnation = findtext(root, "Incarnation");

        let users_node = find(root, "Users");
        let user_list = findall(users_node, "User")
            .into_iter()
            .map(|user| RemoteAccessUser {
                name: findtext(Some(user), "Name").unwrap_or_default(),
                encrypted_password: findtext(Some(user), "Password").unwrap_or_default(),
                expiration: findtext(Some(user), "Expiration").unwrap_or_default(),
            })
            .collect();

        Ok(RemoteAccess { version, incarnation, user_list })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_has_no_error_and_no_users() {
        let ra = RemoteAccess::parse("").unwrap();
        assert_eq!(ra.user_list, vec![]);
        assert_eq!(ra.version, None);
    }

    #[test]
    fn parses_users_in_document_order() {
        let xml = r#"<RemoteAccess>
            <Version>1.0</Version>
            <Incarnation>3</Incarnation>
            <Users>
                <User><Name>alice</Name><Password>enc1</Password><Expiration>2026-01-01</Expiration></User>
                <User><Name>bob</Name><Password>enc2</Password><Expiration>2026-02-01</Expiration></User>
            </Users>
        </RemoteAccess>"#;
        let ra = RemoteAccess::parse(xml).unwrap();
        assert_eq!(ra.version, Some("1.0".to_string()));
        assert_eq!(ra.incarnation, Some("3".to_string()));
        assert_eq!(ra.user_list.len(), 2);
        assert_eq!(ra.user_list[0].name, "alice");
        assert_eq!(ra.user_list[0].encrypted_password, "enc1");
        assert_eq!(ra.user_list[1].name, "bob");
    }
}
