use serde::{Deserialize, Serialize};

/// Role of this process in the single-instance protocol.
///
/// ```text
/// Unregistered ──► Attempting ──┬──► Primary ──► Released ──► Attempting ...
///                               └──► Secondary
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceRole {
    Unregistered,
    Attempting,
    Primary,
    Secondary,
    Released,
}

impl std::fmt::Display for InstanceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unregistered => "unregistered",
            Self::Attempting => "attempting",
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Released => "released",
        };
        f.write_str(s)
    }
}
