use serde_json::Value;

/// One configured instance of an `ExtHandler`. Single-config handlers have
/// exactly one; multi-config handlers have one per `ExtensionRuntimeSettings`.
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    pub name: String,
    pub sequence_number: String,
    pub state: String,
    pub dependency_level: i64,
    pub public_settings: Option<Value>,
    pub protected_settings: Option<Value>,
    pub certificate_thumbprint: Option<String>,
}

impl Extension {
    /// A placeholder extension carrying only identity, for the case where
    /// the settings body failed to parse as JSON: status reporting still
    /// needs something to report.
    pub fn placeholder(name: &str, sequence_number: &str, state: &str, dependency_level: i64) -> Extension {
        Extension {
            name: name.to_string(),
            sequence_number: sequence_number.to_string(),
            state: state.to_string(),
            dependency_level,
            public_settings: None,
            protected_settings: None,
            certificate_thumbprint: None,
        }
    }
}
