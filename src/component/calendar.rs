use crate::{
    component::{BuildContext, Component, ComponentKind, ComponentMut, Event, Timezone},
    parser::Property,
    property::{
        GetProperty, IcalCALSCALEProperty, IcalMETHODProperty, IcalPRODIDProperty,
        IcalVERSIONProperty, ValidationError,
    },
};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct Calendar {
    pub properties: Vec<Property>,
    pub events: Vec<Event>,
    pub timezones: Vec<Timezone>,
    pub prodid: String,
    pub version: String,
    /// Defaults to `GREGORIAN`.
    pub calscale: String,
    pub method: Option<String>,
}

impl Calendar {
    pub fn get_events(&self) -> &[Event] {
        &self.events
    }

    pub fn get_timezones(&self) -> &[Timezone] {
        &self.timezones
    }

    pub fn get_timezone(&self, tzid: &str) -> Option<&Timezone> {
        self.timezones.iter().find(|tz| tz.get_tzid() == Some(tzid))
    }

    pub fn get_method(&self) -> Option<&str> {
        self.method.as_deref()
    }
}

impl Component for Calendar {
    const NAME: ComponentKind = ComponentKind::Calendar;

    fn get_properties(&self) -> &Vec<Property> {
        &self.properties
    }

    fn get_tzids(&self) -> HashSet<&str> {
        self.properties
            .iter()
            .filter_map(|prop| prop.params.get_tzid())
            .chain(self.events.iter().flat_map(Event::get_tzids))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CalendarBuilder {
    pub properties: Vec<Property>,
    pub events: Vec<Event>,
    pub timezones: Vec<Timezone>,
}

impl CalendarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn add_timezone(&mut self, timezone: Timezone) {
        self.timezones.push(timezone);
    }

    /// Whether a METHOD line has been added so far.
    pub fn has_method(&self) -> bool {
        self.has_prop::<IcalMETHODProperty>()
    }
}

impl Component for CalendarBuilder {
    const NAME: ComponentKind = ComponentKind::Calendar;

    fn get_properties(&self) -> &Vec<Property> {
        &self.properties
    }
}

impl ComponentMut for CalendarBuilder {
    type Verified = Calendar;

    fn get_properties_mut(&mut self) -> &mut Vec<Property> {
        &mut self.properties
    }

    fn build(self, ctx: &BuildContext) -> Result<Calendar, ValidationError> {
        let tz = ctx.default_tz;

        // REQUIRED, but ONLY ONCE
        let IcalPRODIDProperty(prodid, _) = self.safe_get_required(tz)?;
        let IcalVERSIONProperty(version, _) = self.safe_get_required(tz)?;

        // OPTIONAL, the last one wins
        let calscale = self
            .safe_get_last::<IcalCALSCALEProperty>(tz)?
            .map_or_else(|| "GREGORIAN".to_owned(), |IcalCALSCALEProperty(scale, _)| scale);
        let method = self
            .safe_get_last::<IcalMETHODProperty>(tz)?
            .map(|IcalMETHODProperty(method, _)| method);

        Ok(Calendar {
            properties: self.properties,
            events: self.events,
            timezones: self.timezones,
            prodid,
            version,
            calscale,
            method,
        })
    }
}
