use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Identifies one process start across the forwarding boundary.
///
/// A secondary launch sends its id along with argv so both sides can
/// correlate the delivery in their logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaunchId(String);

impl_id!(LaunchId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(LaunchId::new(), LaunchId::new());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = LaunchId::from("launch-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"launch-1\"");
    }
}
