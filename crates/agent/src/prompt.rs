use std::fmt::Write;

use docquote_core::domain::coefficient::CoefficientAxis;
use docquote_core::pricing::catalog::Catalog;

const PREAMBLE: &str = "Ты — опытный инженер-проектировщик. По описанию объекта на русском \
языке подбери разделы проектной документации для расчёта стоимости и параметры для каждого \
из них.";

const SCHEMA: &str = r#"{
  "object_type": "<одно значение из object_type>",
  "stage": "<одно значение из stage>",
  "urgency": "<одно значение из urgency>",
  "sections": {
    "<section_key>": {
      "enabled": true или false,
      "complexity": "<одно значение из complexity>",
      "detail": "<одно значение из detail или null>",
      "automation": "<одно значение из automation или null>"
    }
  }
}"#;

const RULES: [&str; 5] = [
    "Если у раздела uses_detail = false, ставь \"detail\": null.",
    "Если у раздела uses_automation = false, ставь \"automation\": null.",
    "Ненужный раздел можно не включать в sections или указать enabled: false.",
    "Не добавляй полей, которых нет в схеме.",
    "Верни только JSON, без текста до или после него.",
];

/// Builds the completion prompt. Every allowed label and every catalog section
/// is listed so the model has no room to invent values.
pub fn build_prompt(catalog: &Catalog, description: &str) -> String {
    let mut prompt = String::with_capacity(4096);
    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\nЗначения выбирай строго из списков, без изменений:\n\n");

    for axis in CoefficientAxis::ALL {
        let quoted: Vec<String> =
            axis.labels().into_iter().map(|label| format!("\"{label}\"")).collect();
        let _ = writeln!(prompt, "{}: {}", axis.as_str(), quoted.join(", "));
    }

    prompt.push_str("\nРазделы (в JSON используется поле key):\n");
    for section in catalog.sections() {
        let _ = writeln!(
            prompt,
            "- key \"{}\", title \"{}\", uses_detail: {}, uses_automation: {}",
            section.key, section.title, section.uses_detail, section.uses_automation
        );
    }

    prompt.push_str("\nСхема ответа:\n\n");
    prompt.push_str(SCHEMA);
    prompt.push_str("\n\nПравила:\n");
    for rule in RULES {
        let _ = writeln!(prompt, "- {rule}");
    }

    let _ = write!(prompt, "\nОписание объекта:\n\"\"\"{}\"\"\"", description.trim());
    prompt
}

#[cfg(test)]
mod tests {
    use docquote_core::domain::coefficient::CoefficientAxis;
    use docquote_core::pricing::catalog::Catalog;

    use super::build_prompt;

    #[test]
    fn prompt_lists_every_vocabulary_label() {
        let prompt = build_prompt(&Catalog::default(), "Склад 1200 м²");

        for axis in CoefficientAxis::ALL {
            for label in axis.labels() {
                assert!(prompt.contains(&format!("\"{label}\"")), "missing label {label}");
            }
        }
        assert!(prompt.contains("object_type: \"Частный дом\""));
    }

    #[test]
    fn prompt_lists_every_section_with_flags() {
        let catalog = Catalog::default();
        let prompt = build_prompt(&catalog, "Склад");

        for section in catalog.sections() {
            assert!(prompt.contains(&format!("key \"{}\"", section.key)));
        }
        assert!(prompt.contains("key \"ar\", title \""));
        assert!(prompt.contains("uses_detail: true"));
        assert!(prompt.contains("uses_automation: true"));
    }

    #[test]
    fn description_is_trimmed_and_placed_last() {
        let prompt = build_prompt(&Catalog::default(), "  Школа на 300 мест \n");
        assert!(prompt.ends_with("\"\"\"Школа на 300 мест\"\"\""));
    }
}
