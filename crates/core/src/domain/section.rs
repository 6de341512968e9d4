use rust_decimal::Decimal;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// One deliverable of a documentation package.
///
/// Definitions live in a static table and are never mutated. The base rate is
/// kept in thousandths of an hour per square metre so the table stays `const`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionDefinition {
    pub key: &'static str,
    pub title: &'static str,
    pub group: &'static str,
    base_millihours_per_area: i64,
    pub uses_detail: bool,
    pub uses_automation: bool,
}

impl SectionDefinition {
    pub const fn new(
        key: &'static str,
        title: &'static str,
        group: &'static str,
        base_millihours_per_area: i64,
        uses_detail: bool,
        uses_automation: bool,
    ) -> Self {
        Self { key, title, group, base_millihours_per_area, uses_detail, uses_automation }
    }

    pub fn base_hours_per_area(&self) -> Decimal {
        Decimal::new(self.base_millihours_per_area, 3)
    }
}

impl Serialize for SectionDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SectionDefinition", 6)?;
        state.serialize_field("key", self.key)?;
        state.serialize_field("title", self.title)?;
        state.serialize_field("group", self.group)?;
        state.serialize_field("base_hours_per_area", &self.base_hours_per_area())?;
        state.serialize_field("uses_detail", &self.uses_detail)?;
        state.serialize_field("uses_automation", &self.uses_automation)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::SectionDefinition;

    #[test]
    fn base_rate_is_expressed_in_hours() {
        let section = SectionDefinition::new("pz", "Пояснительная записка", "Общая часть", 5, false, false);
        assert_eq!(section.base_hours_per_area(), Decimal::new(5, 3));

        let json = serde_json::to_value(section).expect("serialize");
        assert_eq!(json["key"], "pz");
        assert_eq!(json["base_hours_per_area"], "0.005");
        assert_eq!(json["uses_detail"], false);
    }
}
