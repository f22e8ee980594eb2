mod attrs;
pub use attrs::AttrMap;

/// Name of a registered task type.
pub type TaskName = String;

/// Value of a single task-type attribute.
///
/// Attribute values travel as JSON documents over the control plane, so the
/// store keeps them as [`serde_json::Value`] without interpretation.
pub type AttrValue = serde_json::Value;
