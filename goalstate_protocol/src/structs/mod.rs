//! Small data types shared across the parsers, split one-per-concept the
//! way the manifest's own field types are (see `cert`, `ext_handler`, ...).

pub mod cert;
pub mod ext_handler;
pub mod extension;
pub mod in_vm_gs_metadata;
pub mod remote_access_user;
pub mod required_feature;
pub mod vmagent_manifest;

pub use cert::Cert;
pub use ext_handler::ExtHandler;
pub use extension::Extension;
pub use in_vm_gs_metadata::InVmGoalStateMetadata;
pub use remote_access_user::RemoteAccessUser;
pub use required_feature::RequiredFeature;
pub use vmagent_manifest::VmAgentManifest;
