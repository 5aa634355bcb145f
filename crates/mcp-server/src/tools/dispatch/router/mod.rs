// Per-tool handlers used by the MCP tool router.

pub(super) mod code;
pub(super) mod data;
pub(super) mod entities;
pub(super) mod response;
pub(super) mod servers;

use binja_bridge::Target;

/// Empty or missing `binary_id` routes to the default instance.
pub(super) fn target_of(binary_id: Option<&str>) -> Target {
    Target::from_optional(binary_id)
}
