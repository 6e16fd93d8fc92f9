use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Arguments of a debug launch: the local script is read and evaluated remotely
/// under debugger control.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchParams {
    pub script_path: PathBuf,
    pub database: Option<String>,
    pub modules: Option<String>,
    pub root: Option<String>,
    pub txn_id: Option<String>,
}

/// A breakpoint as the remote engine sees it: module URL and 0-based position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteBreakpoint {
    pub url: String,
    pub line: u32,
    pub column: u32,
    pub condition: Option<String>,
}
