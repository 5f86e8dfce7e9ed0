use super::ValidationIssue;
use crate::keys;
use crate::tag::Tag;
use crate::value::ValueType;

/// Checks the attributes of a single tag.
pub trait TagValidator: Send + Sync {
    fn validate(&self, tag: &Tag) -> Vec<ValidationIssue>;
}

/// Expects exactly one value of the given type.
#[derive(Clone, Copy, Debug)]
pub struct SingleValueValidator {
    value_type: ValueType,
}

impl SingleValueValidator {
    pub const fn new(value_type: ValueType) -> Self {
        Self { value_type }
    }
}

impl TagValidator for SingleValueValidator {
    fn validate(&self, tag: &Tag) -> Vec<ValidationIssue> {
        let descriptor = tag.descriptor();
        let attributes = match tag.attributes() {
            Some(attributes) if attributes.len() == 1 => attributes,
            Some(attributes) => {
                return vec![ValidationIssue::error(format!(
                    "{} expects one value, found {}",
                    descriptor,
                    attributes.len()
                ))]
            }
            None => return vec![ValidationIssue::error(format!("{} has no parsed value", descriptor))],
        };

        let value = attributes
            .value(keys::VALUE)
            .or_else(|| attributes.values().next().map(|v| v.value.as_str()))
            .unwrap_or_default();
        if self.value_type.accepts(value) {
            Vec::new()
        } else {
            vec![ValidationIssue::error(format!(
                "{} value {:?} is not a {}",
                descriptor, value, self.value_type
            ))]
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct KeyRule {
    pub key: &'static str,
    pub optional: bool,
    pub value_type: ValueType,
}

impl KeyRule {
    pub const fn mandatory(key: &'static str, value_type: ValueType) -> Self {
        Self {
            key,
            optional: false,
            value_type,
        }
    }

    pub const fn optional(key: &'static str, value_type: ValueType) -> Self {
        Self {
            key,
            optional: true,
            value_type,
        }
    }
}

/// Checks mandatory keys are present and known keys have the right type.
/// Keys without a rule are accepted.
#[derive(Clone, Copy, Debug)]
pub struct DictionaryValidator {
    rules: &'static [KeyRule],
}

impl DictionaryValidator {
    pub const fn new(rules: &'static [KeyRule]) -> Self {
        Self { rules }
    }
}

impl TagValidator for DictionaryValidator {
    fn validate(&self, tag: &Tag) -> Vec<ValidationIssue> {
        let descriptor = tag.descriptor();
        let Some(attributes) = tag.attributes() else {
            return vec![ValidationIssue::error(format!("{} has no attributes", descriptor))];
        };

        self.rules
            .iter()
            .filter_map(|rule| match attributes.value(rule.key) {
                None if rule.optional => None,
                None => Some(ValidationIssue::error(format!(
                    "{} is missing mandatory attribute {}",
                    descriptor, rule.key
                ))),
                Some(value) if rule.value_type.accepts(value) => None,
                Some(value) => Some(ValidationIssue::error(format!(
                    "{} attribute {}={:?} is not a {}",
                    descriptor, rule.key, value, rule.value_type
                ))),
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pantos::PantosTag;
    use crate::registry::TagRegistry;
    use crate::validate::IssueSeverity;

    #[test]
    fn single_value_type_mismatch() {
        let registry = TagRegistry::new();
        let tag = Tag::new(PantosTag::TargetDuration, "FIVE", &registry).unwrap();
        let issues = SingleValueValidator::new(ValueType::Integer).validate(&tag);
        assert_eq!(1, issues.len());
        assert_eq!(IssueSeverity::Error, issues[0].severity);
        assert!(issues[0].description.contains("decimal integer"), "{}", issues[0].description);

        let tag = Tag::new(PantosTag::TargetDuration, "5", &registry).unwrap();
        assert!(SingleValueValidator::new(ValueType::Integer).validate(&tag).is_empty());
    }

    #[test]
    fn single_value_missing() {
        let registry = TagRegistry::new();
        let tag = Tag::new(PantosTag::TargetDuration, "", &registry).unwrap();
        let issues = SingleValueValidator::new(ValueType::Integer).validate(&tag);
        assert_eq!(1, issues.len());
        assert!(issues[0].is_error());
    }

    #[test]
    fn dictionary_reports_each_missing_mandatory_key() {
        static RULES: &[KeyRule] = &[
            KeyRule::mandatory("A", ValueType::Integer),
            KeyRule::mandatory("B", ValueType::String),
            KeyRule::optional("C", ValueType::Boolean),
            KeyRule::optional("D", ValueType::Boolean),
        ];
        let registry = TagRegistry::new();
        let tag = Tag::new(PantosTag::SessionData, "E=1", &registry).unwrap();
        let issues = DictionaryValidator::new(RULES).validate(&tag);
        assert_eq!(2, issues.len());
        assert!(issues.iter().all(ValidationIssue::is_error));
        assert!(issues[0].description.ends_with("mandatory attribute A"));
        assert!(issues[1].description.ends_with("mandatory attribute B"));
    }

    #[test]
    fn dictionary_checks_value_types() {
        let registry = TagRegistry::new();
        let tag = Tag::new(PantosTag::Media, "TYPE=SOUND,GROUP-ID=\"a\",NAME=\"en\",DEFAULT=maybe", &registry).unwrap();
        let issues = registry
            .validator(&tag.descriptor())
            .map(|validator| validator.validate(&tag))
            .unwrap_or_default();
        assert_eq!(2, issues.len());
        assert!(issues[0].description.contains("TYPE"));
        assert!(issues[1].description.contains("DEFAULT"));
    }
}
