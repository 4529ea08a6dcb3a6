pub mod rules;
pub mod text;

use crate::model::{ExtractedInfo, GeneralInfo, ProgramRecord};
use rules::{FIELD_RULES, GENERAL_RULES, NAME_RULES};

/// Bytes of context kept before a name match when searching for its
/// sub-fields, and after it.
const CONTEXT_BEFORE: usize = 200;
const CONTEXT_AFTER: usize = 500;

/// Best-effort heuristic extraction of grant programs and general
/// information from a text blob. Pure function of the input; absence of
/// a pattern yields empty fields, never an error.
pub fn extract_grant_info(text: &str) -> ExtractedInfo {
    let mut programs: Vec<ProgramRecord> = Vec::new();

    for rule in NAME_RULES.iter() {
        for caps in rule.re.captures_iter(text) {
            let Some(m) = caps.get(rule.group) else { continue };
            let name = m.as_str().trim();
            let name_chars = name.chars().count();
            if name_chars <= 3 || name_chars >= 100 {
                continue;
            }
            // Exact-name dedup, first extraction wins.
            if programs.iter().any(|p| p.name == name) {
                continue;
            }

            let context = context_window(text, m.start(), m.end());
            programs.push(build_record(name, context));
        }
    }

    ExtractedInfo {
        programs,
        general: extract_general(text),
    }
}

/// Merge document-derived programs into an existing list: a name already
/// present (e.g. found in the page text) keeps its first record.
pub fn merge_programs(into: &mut Vec<ProgramRecord>, extra: &[ProgramRecord]) {
    for program in extra {
        if !into.iter().any(|p| p.name == program.name) {
            into.push(program.clone());
        }
    }
}

fn build_record(name: &str, context: &str) -> ProgramRecord {
    let mut record = ProgramRecord {
        name: name.to_string(),
        ..Default::default()
    };
    for rule in FIELD_RULES.iter() {
        let value = rule.first(context).unwrap_or_default().to_string();
        match rule.label {
            "description" => record.description = value,
            "eligibility" => record.eligibility = value,
            "funding" => record.funding = value,
            "deadline" => record.deadline = value,
            "contact" => record.contact = value,
            _ => {}
        }
    }
    record
}

fn extract_general(text: &str) -> GeneralInfo {
    let mut general = GeneralInfo::default();
    for rule in GENERAL_RULES.iter() {
        let Some(value) = rule.first(text) else { continue };
        let value = Some(value.to_string());
        match rule.label {
            "eligibility" => general.eligibility = value,
            "application_process" => general.application_process = value,
            "contact" => general.contact = value,
            _ => {}
        }
    }
    general
}

/// Window of [start - CONTEXT_BEFORE, end + CONTEXT_AFTER] byte offsets,
/// clipped to the text and nudged onto char boundaries.
fn context_window(text: &str, start: usize, end: usize) -> &str {
    let mut lo = start.saturating_sub(CONTEXT_BEFORE);
    while !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (end + CONTEXT_AFTER).min(text.len());
    while !text.is_char_boundary(hi) {
        hi += 1;
    }
    &text[lo..hi]
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_quoted_program_name() {
        let info = extract_grant_info(r#"Grant: "Home Repair Fund" helps owners."#);
        assert!(info.programs.iter().any(|p| p.name == "Home Repair Fund"));
    }

    #[test]
    fn short_and_long_names_rejected() {
        let long_name = "A".repeat(120);
        let text = format!(r#"Grant: "ab". Grant: "{}"."#, long_name);
        let info = extract_grant_info(&text);
        assert!(info.programs.is_empty());
    }

    #[test]
    fn sub_fields_found_in_context() {
        let text = concat!(
            "The city announces a program called \"Solar Assist\". ",
            "Eligibility: homeowners with income below 80% AMI. ",
            "Funding: up to $10,000 per household. ",
            "Deadline: June 1, 2026. ",
            "Contact: solar@citygov.example.",
        );
        let info = extract_grant_info(text);
        let p = info.programs.iter().find(|p| p.name == "Solar Assist").unwrap();
        assert!(p.eligibility.contains("homeowners"));
        assert!(p.funding.contains("$10,000"));
        assert!(p.deadline.contains("June 1, 2026"));
        assert!(p.contact.contains("solar@citygov"));
    }

    #[test]
    fn duplicate_names_keep_first_record() {
        let text = concat!(
            "A grant called \"River Fund\". Funding: $1,000 total. Filler sentence here. ",
            "More filler text to separate the two mentions well beyond the context window. ",
            "Later, another grant called \"River Fund\". Funding: $999,999 total.",
        );
        let info = extract_grant_info(text);
        let matches: Vec<_> = info.programs.iter().filter(|p| p.name == "River Fund").collect();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].funding.contains("$1,000"));
    }

    #[test]
    fn name_length_gate_counts_characters_not_bytes() {
        // 60 chars but 120 bytes: must pass the upper gate.
        let long = "é".repeat(60);
        // 4 bytes but 2 chars: must fail the lower gate.
        let text = format!(r#"Grant: "{long}". Grant: "éé"."#);
        let info = extract_grant_info(&text);
        assert!(info.programs.iter().any(|p| p.name == long));
        assert!(!info.programs.iter().any(|p| p.name == "éé"));
    }

    #[test]
    fn general_info_uses_first_match() {
        let text = "Who can apply: any resident of the county applies freely here";
        let info = extract_grant_info(text);
        assert!(info.general.eligibility.unwrap().contains("any resident"));
        assert!(info.general.application_process.is_none());
    }

    #[test]
    fn empty_text_yields_empty_info() {
        let info = extract_grant_info("");
        assert!(info.programs.is_empty());
        assert!(info.general.is_empty());
    }

    #[test]
    fn merge_keeps_page_record_over_document_record() {
        let mut page = vec![ProgramRecord {
            name: "Home Repair Fund".into(),
            funding: "$5,000".into(),
            ..Default::default()
        }];
        let from_doc = vec![
            ProgramRecord {
                name: "Home Repair Fund".into(),
                funding: "$99,999".into(),
                ..Default::default()
            },
            ProgramRecord {
                name: "Roofing Initiative".into(),
                ..Default::default()
            },
        ];
        merge_programs(&mut page, &from_doc);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].funding, "$5,000");
        assert_eq!(page[1].name, "Roofing Initiative");
    }

    #[test]
    fn context_window_respects_utf8_boundaries() {
        let text = format!("{}grant called \"Größe Fund\" details", "é".repeat(150));
        // Must not panic slicing through multi-byte chars.
        let info = extract_grant_info(&text);
        assert!(info.programs.iter().any(|p| p.name == "Größe Fund"));
    }
}
