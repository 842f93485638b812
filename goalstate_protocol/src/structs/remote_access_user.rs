#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAccessUser {
    pub name: String,
    /// Opaque encrypted blob, passed through unexamined.
    pub encrypted_password: String,
    pub expiration: String,
}
