use std::collections::BTreeMap;

/// Identity of one revision of an event type
///
/// Revisions of the same name coexist, so payloads written under an older
/// revision stay decodable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventTypeKey {
    pub name: String,
    pub vsn: u64,
}

impl EventTypeKey {
    pub fn new(name: impl Into<String>, vsn: u64) -> Self {
        Self {
            name: name.into(),
            vsn,
        }
    }
}

/// An entity type and every revision of its event types
#[derive(Debug, Clone, PartialEq)]
pub struct EntityType<S> {
    pub name: String,
    /// Number of event-type mutations applied to this entity
    pub vsn: u64,
    pub events: BTreeMap<EventTypeKey, S>,
}

impl<S> EntityType<S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vsn: 0,
            events: BTreeMap::new(),
        }
    }

    /// Schema of revision `vsn` of event type `name`
    pub fn get(&self, name: &str, vsn: u64) -> Option<&S> {
        self.events.get(&EventTypeKey::new(name, vsn))
    }

    /// Newest revision of event type `name`
    pub fn latest(&self, name: &str) -> Option<(&EventTypeKey, &S)> {
        self.events.iter().rev().find(|(key, _)| key.name == name)
    }

    pub fn has_event(&self, name: &str) -> bool {
        self.latest(name).is_some()
    }

    /// Revision number the next update of `name` will get
    pub fn next_vsn(&self, name: &str) -> u64 {
        self.latest(name).map_or(0, |(key, _)| key.vsn + 1)
    }
}

/// Registry state reconstructed by folding the schema item
#[derive(Debug, Clone, PartialEq)]
pub struct Schema<S> {
    /// Number of schema mutations folded
    pub vsn: u64,
    pub entities: BTreeMap<String, EntityType<S>>,
}

impl<S> Default for Schema<S> {
    fn default() -> Self {
        Self {
            vsn: 0,
            entities: BTreeMap::new(),
        }
    }
}

impl<S> Schema<S> {
    pub fn entity(&self, name: &str) -> Option<&EntityType<S>> {
        self.entities.get(name)
    }
}
