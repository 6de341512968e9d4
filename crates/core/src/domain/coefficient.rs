//! Coefficient vocabularies.
//!
//! Each of the six axes is a closed enum whose variants carry the label shown to
//! users and the multiplier that label contributes to an estimate. Labels arrive
//! from the outside world as strings, so every axis can be resolved from its
//! label; an unknown label is a [`LookupError`], never a silent default.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::LookupError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoefficientAxis {
    ObjectType,
    Stage,
    Urgency,
    Complexity,
    Detail,
    Automation,
}

impl CoefficientAxis {
    pub const ALL: [Self; 6] = [
        Self::ObjectType,
        Self::Stage,
        Self::Urgency,
        Self::Complexity,
        Self::Detail,
        Self::Automation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ObjectType => "object_type",
            Self::Stage => "stage",
            Self::Urgency => "urgency",
            Self::Complexity => "complexity",
            Self::Detail => "detail",
            Self::Automation => "automation",
        }
    }

    pub fn labels(self) -> Vec<&'static str> {
        match self {
            Self::ObjectType => ObjectType::labels(),
            Self::Stage => Stage::labels(),
            Self::Urgency => Urgency::labels(),
            Self::Complexity => Complexity::labels(),
            Self::Detail => DetailLevel::labels(),
            Self::Automation => AutomationLevel::labels(),
        }
    }

    pub fn entries(self) -> Vec<VocabularyEntry> {
        match self {
            Self::ObjectType => ObjectType::entries(),
            Self::Stage => Stage::entries(),
            Self::Urgency => Urgency::entries(),
            Self::Complexity => Complexity::entries(),
            Self::Detail => DetailLevel::entries(),
            Self::Automation => AutomationLevel::entries(),
        }
    }
}

/// One label of a vocabulary with its multiplier, as published to clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct VocabularyEntry {
    pub label: &'static str,
    pub multiplier: Decimal,
}

/// Every vocabulary keyed by axis name.
pub fn vocabularies() -> BTreeMap<&'static str, Vec<VocabularyEntry>> {
    CoefficientAxis::ALL.into_iter().map(|axis| (axis.as_str(), axis.entries())).collect()
}

impl fmt::Display for CoefficientAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A closed vocabulary of labels, each mapped to a positive multiplier.
pub trait Coefficient: Copy + Sized + 'static {
    const AXIS: CoefficientAxis;
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    fn multiplier(self) -> Decimal;

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|value| value.label() == label)
    }

    fn resolve(label: &str) -> Result<Self, LookupError> {
        Self::from_label(label).ok_or_else(|| LookupError::unknown_label(Self::AXIS, label))
    }

    fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|value| value.label()).collect()
    }

    fn entries() -> Vec<VocabularyEntry> {
        Self::ALL
            .iter()
            .map(|value| VocabularyEntry { label: value.label(), multiplier: value.multiplier() })
            .collect()
    }
}

/// Returns the multiplier of `label` on `axis`.
pub fn resolve(axis: CoefficientAxis, label: &str) -> Result<Decimal, LookupError> {
    let multiplier = match axis {
        CoefficientAxis::ObjectType => ObjectType::from_label(label).map(Coefficient::multiplier),
        CoefficientAxis::Stage => Stage::from_label(label).map(Coefficient::multiplier),
        CoefficientAxis::Urgency => Urgency::from_label(label).map(Coefficient::multiplier),
        CoefficientAxis::Complexity => Complexity::from_label(label).map(Coefficient::multiplier),
        CoefficientAxis::Detail => DetailLevel::from_label(label).map(Coefficient::multiplier),
        CoefficientAxis::Automation => {
            AutomationLevel::from_label(label).map(Coefficient::multiplier)
        }
    };

    multiplier.ok_or_else(|| LookupError::unknown_label(axis, label))
}

macro_rules! coefficient_vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident => $axis:expr,
        { $($variant:ident = ($label:literal, $units:literal)),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl Coefficient for $name {
            const AXIS: CoefficientAxis = $axis;
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            /// Multipliers are stored in hundredths.
            fn multiplier(self) -> Decimal {
                match self {
                    $(Self::$variant => Decimal::new($units, 2)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let label = String::deserialize(deserializer)?;
                Self::from_label(&label).ok_or_else(|| {
                    de::Error::custom(format!("unknown {} label `{label}`", Self::AXIS))
                })
            }
        }
    };
}

coefficient_vocabulary! {
    /// Kind of building the documentation is produced for.
    ObjectType => CoefficientAxis::ObjectType,
    {
        PrivateHouse = ("Частный дом", 95),
        Commercial = ("Коммерция", 100),
        Social = ("Соц. объект", 110),
        Industrial = ("Производство", 115),
    }
}

coefficient_vocabulary! {
    /// Design stage: П (project), РД (working drawings) or both.
    Stage => CoefficientAxis::Stage,
    {
        Project = ("П", 60),
        WorkingDrawings = ("РД", 100),
        ProjectAndWorkingDrawings = ("П+РД", 120),
    }
}

coefficient_vocabulary! {
    Urgency => CoefficientAxis::Urgency,
    {
        Standard = ("Стандартные сроки", 100),
        Urgent = ("Срочно", 125),
        Critical = ("Критично", 150),
    }
}

coefficient_vocabulary! {
    /// Per-section complexity. Applies to every section.
    Complexity => CoefficientAxis::Complexity,
    {
        Base = ("Базовая", 100),
        Elevated = ("Повышенная", 120),
        High = ("Высокая", 140),
    }
}

coefficient_vocabulary! {
    /// Drawing detail, only for sections flagged `uses_detail`.
    DetailLevel => CoefficientAxis::Detail,
    {
        Essentials = ("Основные чертежи и схемы", 100),
        FullPackage = ("Полный пакет с детализацией (узлы, спецификации)", 125),
    }
}

coefficient_vocabulary! {
    /// Automation depth, only for sections flagged `uses_automation`.
    AutomationLevel => CoefficientAxis::Automation,
    {
        Minimal = ("Нет / минимальная автоматика", 100),
        Basic = ("Базовая автоматика / АВР", 120),
        Advanced = ("Сложная автоматика, диспетчеризация, АСУ ТП", 140),
    }
}

impl Default for Complexity {
    fn default() -> Self {
        Self::Base
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{
        resolve, vocabularies, AutomationLevel, Coefficient, CoefficientAxis, Complexity,
        DetailLevel, ObjectType, Stage, Urgency,
    };
    use crate::errors::LookupError;

    #[test]
    fn resolves_reference_multipliers() {
        assert_eq!(resolve(CoefficientAxis::ObjectType, "Частный дом"), Ok(Decimal::new(95, 2)));
        assert_eq!(resolve(CoefficientAxis::Stage, "П+РД"), Ok(Decimal::new(120, 2)));
        assert_eq!(resolve(CoefficientAxis::Urgency, "Критично"), Ok(Decimal::new(150, 2)));
        assert_eq!(resolve(CoefficientAxis::Complexity, "Высокая"), Ok(Decimal::new(140, 2)));
        assert_eq!(
            resolve(CoefficientAxis::Detail, "Полный пакет с детализацией (узлы, спецификации)"),
            Ok(Decimal::new(125, 2))
        );
        assert_eq!(
            resolve(CoefficientAxis::Automation, "Базовая автоматика / АВР"),
            Ok(Decimal::new(120, 2))
        );
    }

    #[test]
    fn unknown_label_names_axis_and_label() {
        let error = resolve(CoefficientAxis::Stage, "ПД").expect_err("unknown stage");
        assert_eq!(
            error,
            LookupError::UnknownLabel {
                axis: CoefficientAxis::Stage,
                label: "ПД".to_string(),
                section: None,
            }
        );
        assert!(error.to_string().contains("stage"));
        assert!(error.to_string().contains("ПД"));
    }

    #[test]
    fn labels_match_exactly() {
        assert_eq!(Urgency::from_label("срочно"), None);
        assert_eq!(Urgency::from_label(" Срочно"), None);
        assert_eq!(Urgency::from_label("Срочно"), Some(Urgency::Urgent));
    }

    #[test]
    fn every_multiplier_is_positive_and_labels_are_unique() {
        for axis in CoefficientAxis::ALL {
            let labels = axis.labels();
            let mut deduped = labels.clone();
            deduped.sort_unstable();
            deduped.dedup();
            assert_eq!(deduped.len(), labels.len(), "duplicate label on {axis}");

            for label in labels {
                let multiplier = resolve(axis, label).expect("listed label resolves");
                assert!(multiplier > Decimal::ZERO, "{axis}/{label} must be positive");
            }
        }
    }

    #[test]
    fn vocabularies_serialize_as_labels() {
        let json = serde_json::to_string(&ObjectType::Social).expect("serialize");
        assert_eq!(json, "\"Соц. объект\"");

        let stage: Stage = serde_json::from_str("\"РД\"").expect("deserialize");
        assert_eq!(stage, Stage::WorkingDrawings);

        assert!(serde_json::from_str::<DetailLevel>("\"Эскиз\"").is_err());
        assert_eq!(Complexity::default(), Complexity::Base);
        assert_eq!(AutomationLevel::ALL.len(), 3);
    }

    #[test]
    fn published_vocabularies_cover_every_axis_in_order() {
        let all = vocabularies();
        assert_eq!(all.len(), CoefficientAxis::ALL.len());

        let urgency = &all["urgency"];
        let labels: Vec<&str> = urgency.iter().map(|entry| entry.label).collect();
        assert_eq!(labels, vec!["Стандартные сроки", "Срочно", "Критично"]);
        assert_eq!(urgency[2].multiplier, Decimal::new(150, 2));
    }
}
