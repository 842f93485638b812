/// One entry of `Certificates.cert_list`. `name` is always `None`: the wire
/// protocol never assigns certificates a friendly name, only a thumbprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cert {
    pub name: Option<String>,
    pub thumbprint: String,
}
