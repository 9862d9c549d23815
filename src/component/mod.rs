mod alarm;
pub use alarm::*;
mod calendar;
pub use calendar::*;
mod event;
pub use event::*;
mod timezone;
pub use timezone::*;

use crate::parser::Property;
use crate::property::ValidationError;
use crate::types::Tz;
use derive_more::Display;
use std::collections::HashSet;

/// The components the parser knows how to nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ComponentKind {
    #[display("VCALENDAR")]
    Calendar,
    #[display("VEVENT")]
    Event,
    #[display("VALARM")]
    Alarm,
    #[display("VTIMEZONE")]
    Timezone,
    #[display("STANDARD")]
    Standard,
    #[display("DAYLIGHT")]
    Daylight,
}

impl ComponentKind {
    /// Whether a `child` component may open directly inside `self`.
    pub fn allows_child(self, child: ComponentKind) -> bool {
        matches!(
            (self, child),
            (Self::Calendar, Self::Event)
                | (Self::Calendar, Self::Timezone)
                | (Self::Event, Self::Alarm)
                | (Self::Timezone, Self::Standard)
                | (Self::Timezone, Self::Daylight)
        )
    }
}

/// Context handed to a component builder when it is closed.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext {
    /// Zone for date values that carry neither a UTC marker nor a TZID.
    pub default_tz: Tz,
    /// The enclosing calendar declares a METHOD.
    pub has_method: bool,
}

/// An immutable interface for an iCalendar component.
/// This is also implemented by the builders.
pub trait Component {
    const NAME: ComponentKind;

    fn get_comp_name(&self) -> ComponentKind {
        Self::NAME
    }

    fn get_properties(&self) -> &Vec<Property>;

    fn get_property<'c>(&'c self, name: &str) -> Option<&'c Property> {
        self.get_properties().iter().find(|p| p.name == name)
    }

    fn get_named_properties<'c>(&'c self, name: &'c str) -> impl Iterator<Item = &'c Property> {
        self.get_properties().iter().filter(move |p| p.name == name)
    }

    /// TZIDs referenced by the properties of this component.
    fn get_tzids(&self) -> HashSet<&str> {
        self.get_properties()
            .iter()
            .filter_map(|prop| prop.params.get_tzid())
            .collect()
    }
}

/// A component under construction.
///
/// The parser creates it empty on `BEGIN`, appends content lines and children until the
/// matching `END`, and then calls [`ComponentMut::build`] exactly once.
pub trait ComponentMut: Component + Default {
    type Verified: Component;

    fn get_properties_mut(&mut self) -> &mut Vec<Property>;

    /// Add the given property.
    #[inline]
    fn add_content_line(&mut self, property: Property) {
        self.get_properties_mut().push(property);
    }

    /// Validate the collected properties and promote them into typed fields.
    fn build(self, ctx: &BuildContext) -> Result<Self::Verified, ValidationError>;
}

#[cfg(test)]
mod tests {
    use super::ComponentKind::{self, *};
    use rstest::rstest;

    #[rstest]
    #[case(Calendar, Event, true)]
    #[case(Calendar, Timezone, true)]
    #[case(Event, Alarm, true)]
    #[case(Timezone, Standard, true)]
    #[case(Timezone, Daylight, true)]
    #[case(Calendar, Alarm, false)]
    #[case(Calendar, Calendar, false)]
    #[case(Event, Event, false)]
    #[case(Timezone, Alarm, false)]
    #[case(Alarm, Alarm, false)]
    #[case(Standard, Daylight, false)]
    fn nesting(#[case] parent: ComponentKind, #[case] child: ComponentKind, #[case] ok: bool) {
        assert_eq!(parent.allows_child(child), ok);
    }

    #[test]
    fn display() {
        assert_eq!(Calendar.to_string(), "VCALENDAR");
        assert_eq!(Daylight.to_string(), "DAYLIGHT");
    }
}
