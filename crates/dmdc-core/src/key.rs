use core::fmt;

/// Identifier value drawn from a panel's id column.
///
/// Keys are the join key back to caller-side metadata, so they keep the
/// exact value and kind found in the input table.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum EntityKey {
    Int(i64),
    Text(String),
}

impl EntityKey {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            EntityKey::Text(s) => Some(s),
            EntityKey::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            EntityKey::Int(v) => Some(*v),
            EntityKey::Text(_) => None,
        }
    }
}

impl fmt::Debug for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Int(v) => write!(f, "EntityKey({v})"),
            EntityKey::Text(s) => write!(f, "EntityKey({s:?})"),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Int(v) => write!(f, "{v}"),
            EntityKey::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for EntityKey {
    fn from(s: &str) -> Self {
        EntityKey::Text(s.to_owned())
    }
}

impl From<String> for EntityKey {
    fn from(s: String) -> Self {
        EntityKey::Text(s)
    }
}

impl From<i64> for EntityKey {
    fn from(v: i64) -> Self {
        EntityKey::Int(v)
    }
}
