use crate::{
    component::{BuildContext, Component, ComponentKind, ComponentMut},
    parser::{ICalProperty, Property},
    property::{IcalTZIDProperty, ValidationError},
    types::lookup_tzid,
};

/// A VTIMEZONE definition. It is kept as written; its rules are not evaluated.
#[derive(Debug, Clone, Default)]
pub struct Timezone<const VERIFIED: bool = true> {
    pub properties: Vec<Property>,
    pub standards: Vec<TimezoneTransition>,
    pub daylights: Vec<TimezoneTransition>,
}

pub type TimezoneBuilder = Timezone<false>;

impl Timezone {
    pub fn get_tzid(&self) -> Option<&str> {
        self.get_property(IcalTZIDProperty::NAME)
            .map(|prop| prop.value.as_str())
    }

    /// This is a common property containing a timezone identifier from the IANA TZDB
    pub fn get_lic_location(&self) -> Option<&str> {
        self.get_property("X-LIC-LOCATION")
            .map(|prop| prop.value.as_str())
    }

    /// Standard and daylight transitions in document order of their kind.
    pub fn transitions(&self) -> impl Iterator<Item = &TimezoneTransition> {
        self.standards.iter().chain(self.daylights.iter())
    }
}

impl From<&Timezone> for Option<chrono_tz::Tz> {
    fn from(value: &Timezone) -> Self {
        // Try X-LIC-LOCATION
        if let Some(loc) = value.get_lic_location()
            && let Some(tz) = lookup_tzid(loc)
        {
            return Some(tz);
        };

        // Try using TZID in Olson DB, then the proprietary names
        lookup_tzid(value.get_tzid()?)
    }
}

impl TimezoneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_transition(&mut self, transition: TimezoneTransition) {
        match transition.transition {
            TransitionKind::Standard => self.standards.push(transition),
            TransitionKind::Daylight => self.daylights.push(transition),
        }
    }
}

impl<const VERIFIED: bool> Component for Timezone<VERIFIED> {
    const NAME: ComponentKind = ComponentKind::Timezone;

    fn get_properties(&self) -> &Vec<Property> {
        &self.properties
    }
}

impl ComponentMut for TimezoneBuilder {
    type Verified = Timezone<true>;

    fn get_properties_mut(&mut self) -> &mut Vec<Property> {
        &mut self.properties
    }

    fn build(self, _ctx: &BuildContext) -> Result<Timezone<true>, ValidationError> {
        Ok(Timezone {
            properties: self.properties,
            standards: self.standards,
            daylights: self.daylights,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionKind {
    #[default]
    Standard,
    Daylight,
}

impl From<TransitionKind> for ComponentKind {
    fn from(value: TransitionKind) -> Self {
        match value {
            TransitionKind::Standard => ComponentKind::Standard,
            TransitionKind::Daylight => ComponentKind::Daylight,
        }
    }
}

/// A STANDARD or DAYLIGHT sub-component of a VTIMEZONE.
#[derive(Debug, Clone, Default)]
pub struct TimezoneTransition<const VERIFIED: bool = true> {
    pub transition: TransitionKind,
    pub properties: Vec<Property>,
}

pub type TimezoneTransitionBuilder = TimezoneTransition<false>;

impl TimezoneTransitionBuilder {
    pub fn new(transition: TransitionKind) -> Self {
        Self {
            transition,
            properties: Vec::new(),
        }
    }
}

impl<const VERIFIED: bool> Component for TimezoneTransition<VERIFIED> {
    const NAME: ComponentKind = ComponentKind::Standard;

    fn get_comp_name(&self) -> ComponentKind {
        self.transition.into()
    }

    fn get_properties(&self) -> &Vec<Property> {
        &self.properties
    }
}

impl ComponentMut for TimezoneTransitionBuilder {
    type Verified = TimezoneTransition<true>;

    fn get_properties_mut(&mut self) -> &mut Vec<Property> {
        &mut self.properties
    }

    fn build(self, _ctx: &BuildContext) -> Result<TimezoneTransition<true>, ValidationError> {
        Ok(TimezoneTransition {
            transition: self.transition,
            properties: self.properties,
        })
    }
}
