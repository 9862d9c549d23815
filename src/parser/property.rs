use chrono::DateTime;

use crate::{
    parser::Property,
    types::{CalDateTimeError, Tz, resolve_datetime},
};

/// Conversion of a raw property value into a typed value.
pub trait ParseProp: Sized {
    fn parse_prop(prop: &Property, default_tz: Tz) -> Result<Self, CalDateTimeError>;
}

impl ParseProp for String {
    fn parse_prop(prop: &Property, _default_tz: Tz) -> Result<Self, CalDateTimeError> {
        Ok(prop.value.to_owned())
    }
}

impl ParseProp for DateTime<Tz> {
    fn parse_prop(prop: &Property, default_tz: Tz) -> Result<Self, CalDateTimeError> {
        resolve_datetime(&prop.value, &prop.params, default_tz)
    }
}

/// A property with a fixed name and a typed value.
pub trait ICalProperty: Sized {
    const NAME: &'static str;

    fn parse_prop(
        prop: &Property,
        default_tz: Tz,
    ) -> Result<Self, crate::property::ValidationError>;
}

macro_rules! property {
    ($name:literal, $prop:ident, $inner:ty) => {
        #[derive(Debug, Clone, PartialEq, Eq, derive_more::From)]
        pub struct $prop(pub $inner, pub crate::parser::Params);

        impl crate::parser::ICalProperty for $prop {
            const NAME: &'static str = $name;

            #[inline]
            fn parse_prop(
                prop: &crate::parser::Property,
                default_tz: crate::types::Tz,
            ) -> Result<Self, crate::property::ValidationError> {
                let inner = crate::parser::ParseProp::parse_prop(prop, default_tz).map_err(
                    |source| crate::property::ValidationError::InvalidDate {
                        property: $name,
                        source,
                    },
                )?;
                Ok(Self(inner, prop.params.clone()))
            }
        }
    };
}

pub(crate) use property;
