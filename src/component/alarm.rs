use crate::{
    component::{BuildContext, Component, ComponentKind, ComponentMut},
    parser::Property,
    property::{GetProperty, IcalACTIONProperty, IcalTRIGGERProperty, ValidationError},
};

#[derive(Debug, Clone)]
pub struct Alarm {
    pub properties: Vec<Property>,
    pub action: String,
    pub trigger: String,
}

#[derive(Debug, Clone, Default)]
pub struct AlarmBuilder {
    pub properties: Vec<Property>,
}

impl AlarmBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for Alarm {
    const NAME: ComponentKind = ComponentKind::Alarm;

    fn get_properties(&self) -> &Vec<Property> {
        &self.properties
    }
}

impl Component for AlarmBuilder {
    const NAME: ComponentKind = ComponentKind::Alarm;

    fn get_properties(&self) -> &Vec<Property> {
        &self.properties
    }
}

impl ComponentMut for AlarmBuilder {
    type Verified = Alarm;

    fn get_properties_mut(&mut self) -> &mut Vec<Property> {
        &mut self.properties
    }

    fn build(self, ctx: &BuildContext) -> Result<Alarm, ValidationError> {
        // REQUIRED, but ONLY ONCE
        let IcalACTIONProperty(action, _) = self.safe_get_required(ctx.default_tz)?;
        let IcalTRIGGERProperty(trigger, _) = self.safe_get_required(ctx.default_tz)?;

        Ok(Alarm {
            properties: self.properties,
            action,
            trigger,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::AlarmBuilder;
    use crate::{
        component::{BuildContext, ComponentMut},
        parser::Property,
        property::ValidationError,
        types::Tz,
    };
    use rstest::rstest;

    const CTX: BuildContext = BuildContext {
        default_tz: Tz::UTC,
        has_method: false,
    };

    fn alarm(props: &[(&str, &str)]) -> AlarmBuilder {
        let mut alarm = AlarmBuilder::new();
        for (name, value) in props {
            alarm.add_content_line(Property::new(*name, *value));
        }
        alarm
    }

    #[test]
    fn valid() {
        let alarm = alarm(&[
            ("ACTION", "DISPLAY"),
            ("TRIGGER", "-PT15M"),
            ("DESCRIPTION", "Reminder"),
        ])
        .build(&CTX)
        .unwrap();
        assert_eq!(alarm.action, "DISPLAY");
        assert_eq!(alarm.trigger, "-PT15M");
        assert_eq!(alarm.properties.len(), 3);
    }

    #[rstest]
    #[case(&[("TRIGGER", "-PT15M")], ValidationError::MissingProperty("ACTION"))]
    #[case(&[("ACTION", "AUDIO")], ValidationError::MissingProperty("TRIGGER"))]
    #[case(&[("ACTION", "AUDIO"), ("ACTION", "DISPLAY"), ("TRIGGER", "-PT15M")], ValidationError::DuplicateProperty("ACTION"))]
    #[case(&[("ACTION", "AUDIO"), ("TRIGGER", "-PT15M"), ("TRIGGER", "-PT5M")], ValidationError::DuplicateProperty("TRIGGER"))]
    fn invalid(#[case] props: &[(&str, &str)], #[case] expected: ValidationError) {
        assert_eq!(alarm(props).build(&CTX).unwrap_err(), expected);
    }
}
