use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Options for `relaunch`.
///
/// `args` replaces the current command line arguments and `exec_path`
/// replaces the executable. Unset fields mean "same as the current instance".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelaunchOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_path: Option<PathBuf>,
}
