use core::cmp::Ordering;
use core::hash::{Hash, Hasher};
use std::collections::HashMap;

use serde::Serialize;

use nostify_core::{DomainError, DomainResult};

/// Name-keyed descriptor of an operation type.
///
/// Commands tag events with their intent. They are created once per domain
/// operation (typically in a `LazyLock`) and registered in a [`CommandRegistry`]
/// so inbound events can be mapped back to the shared instance by name.
///
/// Identity is the name alone: equality, ordering and hashing ignore the
/// `is_new` / `allow_null_payload` metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    name: String,
    is_new: bool,
    allow_null_payload: bool,
}

/// Name of the built-in command used to seed a projection from aggregate state.
pub const PROJECTION_INIT: &str = "projection.init";

impl Command {
    /// Fails when `name` is empty or whitespace.
    pub fn new(name: impl Into<String>, is_new: bool, allow_null_payload: bool) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::invalid_argument(
                "name",
                "command name cannot be empty or whitespace",
            ));
        }
        Ok(Self {
            name,
            is_new,
            allow_null_payload,
        })
    }

    /// Command that updates an existing aggregate with a payload.
    pub fn update(name: impl Into<String>) -> DomainResult<Self> {
        Self::new(name, false, false)
    }

    /// Command that creates a new aggregate.
    pub fn create(name: impl Into<String>) -> DomainResult<Self> {
        Self::new(name, true, false)
    }

    /// Command whose events carry no payload (deletes and the like).
    pub fn without_payload(name: impl Into<String>) -> DomainResult<Self> {
        Self::new(name, false, true)
    }

    pub(crate) fn projection_init() -> Self {
        Self {
            name: PROJECTION_INIT.to_string(),
            is_new: true,
            allow_null_payload: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn allow_null_payload(&self) -> bool {
        self.allow_null_payload
    }
}

impl core::fmt::Display for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}

impl PartialEq for Command {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Command {}

impl PartialOrd for Command {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Command {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl Hash for Command {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Process-wide lookup of commands by name, populated at startup.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: HashMap<String, Command>,
}

impl CommandRegistry {
    /// A registry holding only the built-in commands.
    pub fn new() -> Self {
        let mut registry = Self {
            commands: HashMap::new(),
        };
        registry.register(Command::projection_init());
        registry
    }

    /// Register (or replace) a command under its name.
    pub fn register(&mut self, command: Command) -> &mut Self {
        self.commands.insert(command.name.clone(), command);
        self
    }

    pub fn with(mut self, command: Command) -> Self {
        self.register(command);
        self
    }

    pub fn resolve(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use proptest::prelude::*;

    use super::*;

    fn hash_of(c: &Command) -> u64 {
        let mut h = DefaultHasher::new();
        c.hash(&mut h);
        h.finish()
    }

    #[test]
    fn blank_names_are_rejected() {
        for name in ["", "   ", "\t\n"] {
            let err = Command::new(name, false, false).unwrap_err();
            assert!(matches!(err, DomainError::InvalidArgument { param: "name", .. }));
        }
    }

    #[test]
    fn ordering_is_ordinal_and_case_sensitive() {
        let a = Command::update("Create_Item").unwrap();
        let b = Command::update("create_Item").unwrap();
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[test]
    fn registry_resolves_by_name() {
        let registry = CommandRegistry::new().with(Command::create("Create_Item").unwrap());
        assert!(registry.resolve("Create_Item").unwrap().is_new());
        assert!(registry.resolve(PROJECTION_INIT).is_some());
        assert!(registry.resolve("create_item").is_none());
    }

    proptest! {
        #[test]
        fn identity_is_the_name(
            name in "[A-Za-z_][A-Za-z0-9_ ]{0,30}",
            a_new in any::<bool>(),
            a_null in any::<bool>(),
            b_new in any::<bool>(),
            b_null in any::<bool>(),
        ) {
            let a = Command::new(name.clone(), a_new, a_null).unwrap();
            let b = Command::new(name.clone(), b_new, b_null).unwrap();
            prop_assert_eq!(a.to_string(), name);
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(a.cmp(&b), Ordering::Equal);
            prop_assert_eq!(hash_of(&a), hash_of(&b));
        }
    }
}
