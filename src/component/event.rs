use crate::{
    component::{Alarm, BuildContext, Component, ComponentKind, ComponentMut},
    parser::{ICalProperty, Property},
    property::{
        GetProperty, IcalDESCRIPTIONProperty, IcalDTENDProperty, IcalDTSTAMPProperty,
        IcalDTSTARTProperty, IcalDURATIONProperty, IcalSUMMARYProperty, IcalUIDProperty,
        ValidationError,
    },
    types::Tz,
};
use chrono::{DateTime, TimeDelta};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct Event {
    pub properties: Vec<Property>,
    pub alarms: Vec<Alarm>,
    pub uid: String,
    /// Only optional when the calendar carries a METHOD.
    pub dtstamp: Option<DateTime<Tz>>,
    pub dtstart: DateTime<Tz>,
    /// DTEND, or DTSTART plus one day.
    pub dtend: DateTime<Tz>,
    pub summary: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EventBuilder {
    pub properties: Vec<Property>,
    pub alarms: Vec<Alarm>,
}

impl Event {
    pub fn get_uid(&self) -> &str {
        &self.uid
    }

    pub fn get_alarms(&self) -> &[Alarm] {
        &self.alarms
    }

    /// Whether the end was taken from DTEND rather than derived from DTSTART.
    pub fn has_explicit_end(&self) -> bool {
        self.get_property(IcalDTENDProperty::NAME).is_some()
    }
}

impl Component for Event {
    const NAME: ComponentKind = ComponentKind::Event;

    fn get_properties(&self) -> &Vec<Property> {
        &self.properties
    }

    fn get_tzids(&self) -> HashSet<&str> {
        self.properties
            .iter()
            .filter_map(|prop| prop.params.get_tzid())
            .chain(self.alarms.iter().flat_map(Alarm::get_tzids))
            .collect()
    }
}

impl Component for EventBuilder {
    const NAME: ComponentKind = ComponentKind::Event;

    fn get_properties(&self) -> &Vec<Property> {
        &self.properties
    }
}

impl EventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_alarm(&mut self, alarm: Alarm) {
        self.alarms.push(alarm);
    }
}

impl ComponentMut for EventBuilder {
    type Verified = Event;

    fn get_properties_mut(&mut self) -> &mut Vec<Property> {
        &mut self.properties
    }

    fn build(self, ctx: &BuildContext) -> Result<Event, ValidationError> {
        let tz = ctx.default_tz;

        // REQUIRED, but ONLY ONCE
        let IcalUIDProperty(uid, _) = self.safe_get_required(tz)?;
        if uid.is_empty() {
            return Err(ValidationError::MissingProperty(IcalUIDProperty::NAME));
        }
        let IcalDTSTARTProperty(dtstart, _) = self.safe_get_required(tz)?;
        // REQUIRED unless the calendar has a METHOD
        let dtstamp = self
            .safe_get_optional::<IcalDTSTAMPProperty>(tz)?
            .map(|IcalDTSTAMPProperty(dtstamp, _)| dtstamp);
        if dtstamp.is_none() && !ctx.has_method {
            return Err(ValidationError::MissingProperty(IcalDTSTAMPProperty::NAME));
        }

        // OPTIONAL, but MUTUALLY EXCLUSIVE
        let dtend = self.safe_get_optional::<IcalDTENDProperty>(tz)?;
        let duration = self.safe_get_optional::<IcalDURATIONProperty>(tz)?;
        if dtend.is_some() && duration.is_some() {
            return Err(ValidationError::PropertyConflict(
                IcalDTENDProperty::NAME,
                IcalDURATIONProperty::NAME,
            ));
        }

        // OPTIONAL, but ONLY ONCE
        let summary = self
            .safe_get_optional::<IcalSUMMARYProperty>(tz)?
            .map(|IcalSUMMARYProperty(summary, _)| summary);
        let description = self
            .safe_get_optional::<IcalDESCRIPTIONProperty>(tz)?
            .map(|IcalDESCRIPTIONProperty(description, _)| description);

        let dtend = match dtend {
            Some(IcalDTENDProperty(dtend, _)) => dtend,
            None => dtstart + TimeDelta::hours(24),
        };

        Ok(Event {
            properties: self.properties,
            alarms: self.alarms,
            uid,
            dtstamp,
            dtstart,
            dtend,
            summary,
            description,
        })
    }
}
