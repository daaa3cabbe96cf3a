//! Reserved state field names and engine defaults.

/// State field holding the component's unique key.
pub const FIELD_KEY: &str = "key";

/// State field holding the developer-chosen (non-unique) component name.
pub const FIELD_COMPONENT_NAME: &str = "componentName";

/// State field listing the ids of every bus the component publishes on.
pub const FIELD_EVENT_BUS: &str = "eventBus";

/// State field set once listeners have been attached to the component's node.
pub const FIELD_EVENT_LISTENERS_EXIST: &str = "eventListenersExist";

/// Dispatch method that receives notifications when no handler is set.
pub const NOTIFICATION_METHOD: &str = "update";

/// Bus state field holding the bus id.
pub const FIELD_BUS_ID: &str = "id";

/// Id of the bus every engine registers at start-up.
pub const DEFAULT_BUS_ID: &str = "GlobalComponentEvents";

/// Prefix of generated component keys.
pub const KEY_PREFIX: &str = "component";

/// Default size of the random suffix space for generated keys.
pub const DEFAULT_KEY_SUFFIX_SPACE: u32 = 100_000;

/// Default number of candidates tried per key space before giving up.
pub const DEFAULT_KEY_RETRY_LIMIT: u32 = 32;

/// Default bound on nested notification fan-out.
pub const DEFAULT_MAX_NOTIFY_DEPTH: usize = 64;
