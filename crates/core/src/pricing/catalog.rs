use serde::Serialize;

use crate::domain::section::SectionDefinition;

const GENERAL: &str = "Общая часть";
const ARCHITECTURE: &str = "Архитектура и конструкция";
const INTERNAL_SYSTEMS: &str = "Инженерные системы (внутренние)";
const HEAT_SYSTEMS: &str = "Инженерные системы (тепло)";
const LOW_VOLTAGE: &str = "Связь и слаботочные системы";
const SECURITY: &str = "Безопасность";
const FIRE_SAFETY: &str = "Пожарная безопасность";
const AUTOMATION: &str = "Автоматизация";
const SPECIAL: &str = "Специальные разделы";
const EXTERNAL_NETWORKS: &str = "Наружные сети";
const TECHNOLOGY: &str = "Технология";
const CONSTRUCTION: &str = "Организация строительства";
const ESTIMATES: &str = "Сметы";

/// Documentation sections in presentation order. Rates are millihours per m².
pub static SECTIONS: [SectionDefinition; 35] = [
    SectionDefinition::new("pz", "Пояснительная записка", GENERAL, 5, false, false),
    SectionDefinition::new(
        "gpzu",
        "Схема планировочной организации земельного участка",
        GENERAL,
        10,
        false,
        false,
    ),
    SectionDefinition::new("ep", "Экскизный проект", ARCHITECTURE, 30, true, false),
    SectionDefinition::new("ar", "Архитектурные решения", ARCHITECTURE, 50, true, false),
    SectionDefinition::new("kr", "Конструктивные решения", ARCHITECTURE, 55, true, false),
    SectionDefinition::new(
        "electro_internal",
        "Внутренние сети электроснабжения и электроосвещения, молниезащита",
        INTERNAL_SYSTEMS,
        60,
        true,
        true,
    ),
    SectionDefinition::new(
        "ws_internal",
        "Внутренние сети водоснабжения и водоотведения",
        INTERNAL_SYSTEMS,
        40,
        true,
        false,
    ),
    SectionDefinition::new("nvk", "НВК", INTERNAL_SYSTEMS, 35, true, false),
    SectionDefinition::new(
        "hvac",
        "Отопление, вентиляция и кондиционирование",
        INTERNAL_SYSTEMS,
        55,
        true,
        false,
    ),
    SectionDefinition::new("aitp", "АИТП", HEAT_SYSTEMS, 30, true, true),
    SectionDefinition::new("heat_networks", "Тепловые сети", HEAT_SYSTEMS, 30, true, false),
    SectionDefinition::new(
        "heat_mech",
        "Тепломеханические решения тепловых сетей",
        HEAT_SYSTEMS,
        25,
        true,
        false,
    ),
    SectionDefinition::new("fiber", "Волокно-оптические линии связи", LOW_VOLTAGE, 20, false, true),
    SectionDefinition::new("tf", "ТФ", LOW_VOLTAGE, 15, false, true),
    SectionDefinition::new("sks", "СКС", LOW_VOLTAGE, 20, false, true),
    SectionDefinition::new("lvs", "ЛВС", LOW_VOLTAGE, 20, false, true),
    SectionDefinition::new("lso", "ЛСО", LOW_VOLTAGE, 15, false, false),
    SectionDefinition::new("internet", "Интернет", LOW_VOLTAGE, 10, false, true),
    SectionDefinition::new("cctv", "Система охранного видеонаблюдения", SECURITY, 20, false, true),
    SectionDefinition::new("skud", "СКУД", SECURITY, 20, false, true),
    SectionDefinition::new("fire_extinguish", "Пожаротушение", FIRE_SAFETY, 30, true, false),
    SectionDefinition::new(
        "aps",
        "Автоматическая пожарная сигнализация",
        FIRE_SAFETY,
        25,
        false,
        true,
    ),
    SectionDefinition::new("soue", "СОУЭ", FIRE_SAFETY, 15, false, true),
    SectionDefinition::new(
        "automation_dispatch",
        "Система автоматизации и диспетчеризации инженерных систем",
        AUTOMATION,
        30,
        false,
        true,
    ),
    SectionDefinition::new(
        "gochs",
        "Мероприятия гражданской обороны и предупреждения ЧС (ИТМ ГОЧС)",
        SPECIAL,
        10,
        false,
        false,
    ),
    SectionDefinition::new("external_comm", "Наружные сети связи", EXTERNAL_NETWORKS, 20, true, false),
    SectionDefinition::new("tech", "Технологические решения", TECHNOLOGY, 30, true, false),
    SectionDefinition::new("keo", "КЕО", SPECIAL, 8, false, false),
    SectionDefinition::new("asa", "АСА", SPECIAL, 8, false, false),
    SectionDefinition::new("tbe", "ТБЭ", SPECIAL, 8, false, false),
    SectionDefinition::new("mgn", "Мероприятия по обеспечению доступности МГН", SPECIAL, 8, false, false),
    SectionDefinition::new(
        "pos",
        "Проект организации строительства",
        CONSTRUCTION,
        15,
        true,
        false,
    ),
    SectionDefinition::new("eco", "Мероприятия по охране окружающей среды", SPECIAL, 10, false, false),
    SectionDefinition::new(
        "fire_measures",
        "Перечень мероприятий по обеспечению пожарной безопасности",
        FIRE_SAFETY,
        10,
        false,
        false,
    ),
    SectionDefinition::new("smeta", "Сметная документация", ESTIMATES, 20, false, false),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SectionGroup {
    pub label: &'static str,
    pub sections: Vec<&'static SectionDefinition>,
}

#[derive(Clone, Copy, Debug)]
pub struct Catalog {
    sections: &'static [SectionDefinition],
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(&SECTIONS)
    }
}

impl Catalog {
    pub const fn new(sections: &'static [SectionDefinition]) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &'static [SectionDefinition] {
        self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn find(&self, key: &str) -> Option<&'static SectionDefinition> {
        self.sections.iter().find(|section| section.key == key)
    }

    /// Sections bucketed by group label. Groups appear in the order of their
    /// first section; sections keep catalog order within a group.
    pub fn groups(&self) -> Vec<SectionGroup> {
        let mut groups: Vec<SectionGroup> = Vec::new();
        for section in self.sections {
            match groups.iter_mut().find(|group| group.label == section.group) {
                Some(group) => group.sections.push(section),
                None => groups.push(SectionGroup { label: section.group, sections: vec![section] }),
            }
        }
        groups
    }

    /// Structural problems with the table, used by startup diagnostics.
    pub fn integrity_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for (index, section) in self.sections.iter().enumerate() {
            if section.key.trim().is_empty() {
                issues.push(format!("section #{index} has an empty key"));
            }
            if self.sections[..index].iter().any(|earlier| earlier.key == section.key) {
                issues.push(format!("section key `{}` is duplicated", section.key));
            }
            if section.base_hours_per_area() <= rust_decimal::Decimal::ZERO {
                issues.push(format!("section `{}` has a non-positive base rate", section.key));
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Catalog, SECTIONS};
    use crate::domain::section::SectionDefinition;

    #[test]
    fn reference_catalog_is_consistent() {
        let catalog = Catalog::default();
        assert_eq!(catalog.len(), 35);
        assert!(catalog.integrity_issues().is_empty(), "{:?}", catalog.integrity_issues());
    }

    #[test]
    fn find_returns_flags_and_rates() {
        let catalog = Catalog::default();

        let electro = catalog.find("electro_internal").expect("electro section");
        assert!(electro.uses_detail);
        assert!(electro.uses_automation);
        assert_eq!(electro.base_hours_per_area(), Decimal::new(60, 3));

        let pz = catalog.find("pz").expect("pz section");
        assert!(!pz.uses_detail);
        assert!(!pz.uses_automation);
        assert_eq!(pz.base_hours_per_area(), Decimal::new(5, 3));

        assert!(catalog.find("unknown").is_none());
    }

    #[test]
    fn groups_keep_first_appearance_order() {
        let groups = Catalog::default().groups();
        let labels: Vec<&str> = groups.iter().map(|group| group.label).collect();

        assert_eq!(labels.first(), Some(&"Общая часть"));
        assert_eq!(labels.last(), Some(&"Сметы"));
        assert_eq!(groups.iter().map(|group| group.sections.len()).sum::<usize>(), SECTIONS.len());

        let fire = groups
            .iter()
            .find(|group| group.label == "Пожарная безопасность")
            .expect("fire safety group");
        let keys: Vec<&str> = fire.sections.iter().map(|section| section.key).collect();
        assert_eq!(keys, vec!["fire_extinguish", "aps", "soue", "fire_measures"]);
    }

    #[test]
    fn integrity_check_reports_duplicates_and_bad_rates() {
        static BROKEN: [SectionDefinition; 2] = [
            SectionDefinition::new("pz", "A", "G", 5, false, false),
            SectionDefinition::new("pz", "B", "G", 0, false, false),
        ];

        let issues = Catalog::new(&BROKEN).integrity_issues();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().any(|issue| issue.contains("duplicated")));
        assert!(issues.iter().any(|issue| issue.contains("non-positive")));
    }
}
