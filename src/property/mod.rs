use crate::{
    component::Component,
    parser::{ICalProperty, property},
    types::{CalDateTimeError, Tz},
};
use chrono::DateTime;

/// Reasons a component is rejected when it closes.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing property: {0}")]
    MissingProperty(&'static str),
    #[error("property must not occur more than once: {0}")]
    DuplicateProperty(&'static str),
    #[error("property conflict: either {0} or {1} may appear")]
    PropertyConflict(&'static str, &'static str),
    #[error("invalid date in {property}: {source}")]
    InvalidDate {
        property: &'static str,
        source: CalDateTimeError,
    },
}

pub trait GetProperty: Component {
    fn safe_get_all<T: ICalProperty>(&self, default_tz: Tz) -> Result<Vec<T>, ValidationError> {
        self.get_named_properties(T::NAME)
            .map(|prop| ICalProperty::parse_prop(prop, default_tz))
            .collect::<Result<Vec<_>, _>>()
    }

    /// At most one instance of the property.
    fn safe_get_optional<T: ICalProperty>(
        &self,
        default_tz: Tz,
    ) -> Result<Option<T>, ValidationError> {
        let mut props = self.get_named_properties(T::NAME);
        let Some(prop) = props.next() else {
            return Ok(None);
        };
        if props.next().is_some() {
            return Err(ValidationError::DuplicateProperty(T::NAME));
        }
        ICalProperty::parse_prop(prop, default_tz).map(Some)
    }

    /// The last instance of the property, earlier ones are ignored.
    fn safe_get_last<T: ICalProperty>(&self, default_tz: Tz) -> Result<Option<T>, ValidationError> {
        self.get_named_properties(T::NAME)
            .last()
            .map(|prop| ICalProperty::parse_prop(prop, default_tz))
            .transpose()
    }

    /// Exactly one instance of the property.
    fn safe_get_required<T: ICalProperty>(&self, default_tz: Tz) -> Result<T, ValidationError> {
        self.safe_get_optional(default_tz)?
            .ok_or(ValidationError::MissingProperty(T::NAME))
    }

    fn has_prop<T: ICalProperty>(&self) -> bool {
        self.get_property(T::NAME).is_some()
    }
}

impl<C: Component> GetProperty for C {}

// VCALENDAR
property!("PRODID", IcalPRODIDProperty, String);
property!("VERSION", IcalVERSIONProperty, String);
property!("CALSCALE", IcalCALSCALEProperty, String);
property!("METHOD", IcalMETHODProperty, String);

// VEVENT
property!("UID", IcalUIDProperty, String);
property!("DTSTAMP", IcalDTSTAMPProperty, DateTime<Tz>);
property!("DTSTART", IcalDTSTARTProperty, DateTime<Tz>);
property!("DTEND", IcalDTENDProperty, DateTime<Tz>);
property!("DURATION", IcalDURATIONProperty, String);
property!("SUMMARY", IcalSUMMARYProperty, String);
property!("DESCRIPTION", IcalDESCRIPTIONProperty, String);

// VALARM
property!("ACTION", IcalACTIONProperty, String);
property!("TRIGGER", IcalTRIGGERProperty, String);

// VTIMEZONE
property!("TZID", IcalTZIDProperty, String);

#[cfg(test)]
mod tests {
    use super::{
        GetProperty, IcalDTSTARTProperty, IcalSUMMARYProperty, IcalUIDProperty, ValidationError,
    };
    use crate::{component::EventBuilder, parser::Property, types::Tz};

    fn event(props: &[(&str, &str)]) -> EventBuilder {
        EventBuilder {
            properties: props
                .iter()
                .map(|(name, value)| Property::new(*name, *value))
                .collect(),
            alarms: vec![],
        }
    }

    #[test]
    fn required_and_optional() {
        let comp = event(&[("UID", "1"), ("DTSTART", "20240101T000000Z")]);
        let IcalUIDProperty(uid, _) = comp.safe_get_required(Tz::UTC).unwrap();
        assert_eq!(uid, "1");
        assert!(
            comp.safe_get_optional::<IcalSUMMARYProperty>(Tz::UTC)
                .unwrap()
                .is_none()
        );
        assert!(comp.has_prop::<IcalDTSTARTProperty>());
        assert_eq!(
            comp.safe_get_required::<IcalSUMMARYProperty>(Tz::UTC),
            Err(ValidationError::MissingProperty("SUMMARY"))
        );
    }

    #[test]
    fn duplicates() {
        let comp = event(&[("UID", "1"), ("UID", "2")]);
        assert_eq!(
            comp.safe_get_optional::<IcalUIDProperty>(Tz::UTC),
            Err(ValidationError::DuplicateProperty("UID"))
        );
        assert_eq!(
            comp.safe_get_all::<IcalUIDProperty>(Tz::UTC)
                .unwrap()
                .into_iter()
                .map(|IcalUIDProperty(uid, _)| uid)
                .collect::<Vec<_>>(),
            ["1", "2"]
        );
        let IcalUIDProperty(uid, _) = comp.safe_get_last(Tz::UTC).unwrap().unwrap();
        assert_eq!(uid, "2");
        assert!(
            event(&[])
                .safe_get_last::<IcalUIDProperty>(Tz::UTC)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn invalid_date() {
        let comp = event(&[("DTSTART", "2024-01-01")]);
        let err = comp
            .safe_get_required::<IcalDTSTARTProperty>(Tz::UTC)
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidDate {
                property: "DTSTART",
                ..
            }
        ));
    }
}
