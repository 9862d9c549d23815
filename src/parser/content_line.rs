//! Content line data types.
//!
//! A property keeps exactly what the document said: the name as written, every parameter
//! with all of its values, and the raw value. Interpretation of the value (dates, text) is
//! left to the component builders.

use derive_more::{Deref, From, Into};
use itertools::Itertools;
use std::fmt;

use crate::{PARAM_DELIMITER, PARAM_NAME_DELIMITER, PARAM_VALUE_DELIMITER, VALUE_DELIMITER};

/// The values of one parameter, e.g. `MEMBER="a","b"`.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, From, Into, Deref)]
pub struct Parameter(pub Vec<String>);

impl Parameter {
    /// First value, the only one for most parameters.
    #[inline]
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }
}

impl<const N: usize> From<[&str; N]> for Parameter {
    fn from(values: [&str; N]) -> Self {
        Self(values.into_iter().map(str::to_owned).collect())
    }
}

/// Parameters of a property, keyed by name.
///
/// Keys are unique: inserting a name that is already present replaces its values in place.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct Params(pub(crate) Vec<(String, Parameter)>);

impl Params {
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.0
            .iter()
            .find(|(key, _)| name == key)
            .map(|(_, value)| value)
    }

    #[inline]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Parameter::first)
    }

    #[inline]
    pub fn get_tzid(&self) -> Option<&str> {
        self.get_param("TZID")
    }

    #[inline]
    pub fn get_value_type(&self) -> Option<&str> {
        self.get_param("VALUE")
    }

    pub fn insert(&mut self, name: String, value: Parameter) {
        if let Some(pos) = self.0.iter().position(|(n, _)| n == &name) {
            self.0[pos].1 = value;
        } else {
            self.0.push((name, value));
        }
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Parameter>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Params::default();
        for (name, value) in iter {
            params.insert(name.into(), value.into());
        }
        params
    }
}

/// An unparsed iCalendar property.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct Property {
    /// Property name.
    pub name: String,
    /// Property parameters.
    pub params: Params,
    /// Raw property value, possibly empty.
    pub value: String,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Params::default(),
            value: value.into(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Parameter>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

/// Renders the property as a content line without terminator. Quoting and folding are not
/// applied, this is meant for diagnostics.
impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for (name, param) in self.params.iter() {
            write!(
                f,
                "{PARAM_DELIMITER}{name}{PARAM_NAME_DELIMITER}{}",
                param.iter().join(&PARAM_VALUE_DELIMITER.to_string())
            )?;
        }
        write!(f, "{VALUE_DELIMITER}{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::{Parameter, Params, Property};

    #[test]
    fn insert_replaces_in_place() {
        let mut params: Params = [("A", ["1"]), ("B", ["2"])].into_iter().collect();
        params.insert("A".to_owned(), ["3", "4"].into());
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("A"), Some(&Parameter::from(["3", "4"])));
        assert_eq!(params.iter().map(|(k, _)| k).collect::<Vec<_>>(), ["A", "B"]);
    }

    #[test]
    fn getters() {
        let prop = Property::new("DTSTART", "19980119T020000")
            .with_param("TZID", ["America/New_York"])
            .with_param("VALUE", ["DATE-TIME"]);
        assert_eq!(prop.params.get_tzid(), Some("America/New_York"));
        assert_eq!(prop.params.get_value_type(), Some("DATE-TIME"));
        assert_eq!(prop.params.get_param("X"), None);
    }

    #[test]
    fn display() {
        let prop = Property::new("ATTENDEE", "mailto:a@example.com")
            .with_param("MEMBER", ["a", "b"])
            .with_param("ROLE", ["CHAIR"]);
        insta::assert_snapshot!(prop, @"ATTENDEE;MEMBER=a,b;ROLE=CHAIR:mailto:a@example.com");
    }
}
