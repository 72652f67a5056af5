//! Tri-state field for partial updates.
//!
//! A JSON body like `{"one": "x"}` must be told apart from `{"one": null}`
//! and `{}`: the first sets the field, the second clears it and the last
//! leaves it alone. `Option<T>` cannot express that, `Patch<T>` can.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// Set the field to this value
    Some(T),
    /// Set the field to null
    ExplicitNull,
    /// Leave the field unchanged
    Missing,
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Missing
    }
}

impl<T> Patch<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Patch::Missing)
    }

    /// `Some(Some(v))` to set, `Some(None)` to clear, `None` to leave unchanged
    pub fn into_option(self) -> Option<Option<T>> {
        match self {
            Patch::Some(value) => Some(Some(value)),
            Patch::ExplicitNull => Some(None),
            Patch::Missing => None,
        }
    }

    /// Value to store when there is no previous value. Null and missing are
    /// the same thing for an insert.
    pub fn into_value(self) -> Option<T> {
        self.into_option().flatten()
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Patch::Some(value) => Some(value),
            Patch::ExplicitNull | Patch::Missing => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Some(value) => Patch::Some(f(value)),
            Patch::ExplicitNull => Patch::ExplicitNull,
            Patch::Missing => Patch::Missing,
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Patch::Some(value),
            None => Patch::ExplicitNull,
        }
    }
}

/// An absent key never reaches this impl: fields of this type need
/// `#[serde(default)]` so that serde falls back to `Patch::Missing`.
impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(de: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(de).map(Patch::from)
    }
}

impl<T> Serialize for Patch<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Some(value) => serializer.serialize_some(value),
            Patch::ExplicitNull | Patch::Missing => serializer.serialize_none(),
        }
    }
}
