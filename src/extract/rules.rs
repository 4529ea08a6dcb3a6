use std::sync::LazyLock;

use regex::Regex;

/// One heuristic extraction rule: a label, a compiled pattern, and the
/// capture group holding the value. Kept in ordered tables so the rule
/// set stays auditable and each rule is testable in isolation.
pub struct Rule {
    pub label: &'static str,
    pub re: Regex,
    pub group: usize,
}

impl Rule {
    fn new(label: &'static str, pattern: &str) -> Self {
        Self {
            label,
            re: Regex::new(pattern).expect("invalid extraction rule pattern"),
            group: 1,
        }
    }

    /// First match of this rule in `text`, trimmed.
    pub fn first<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.re
            .captures(text)
            .and_then(|c| c.get(self.group))
            .map(|m| m.as_str().trim())
    }
}

/// Program-name detection, applied in order across the whole text:
/// quoted names after a trigger word, then capitalized phrases after a
/// trigger word, then "The X grant/program" prefixed phrases.
pub static NAME_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            "quoted",
            r#"(?i)(?:grant|program|initiative|fund)s?:?\s+(?:called|named|titled)?\s*"([^"]+)""#,
        ),
        Rule::new(
            "labelled",
            r"(?i)(?:grant|program|initiative|fund)s?:?\s+([A-Z][A-Za-z0-9\s\-]+(?:\([^)]+\))?)",
        ),
        Rule::new(
            "prefixed",
            r"(?i)The\s+([A-Z][A-Za-z0-9\s\-]+(?:\([^)]+\))?)\s+(?:grant|program|initiative|fund)s?",
        ),
    ]
});

/// Per-program sub-fields, searched inside the context window around a
/// name match. Each captures the label's trailing sentences (2-4).
pub static FIELD_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            "description",
            r"(?i)(?:description|overview|summary|about)s?:?\s+([^.]+(?:\.[^.]+){0,3})",
        ),
        Rule::new(
            "eligibility",
            r"(?i)(?:eligibility|eligible|qualify|qualifications?):?\s+([^.]+(?:\.[^.]+){0,3})",
        ),
        Rule::new(
            "funding",
            r"(?i)(?:funding|amount|award|grant size):?\s+([^.]+(?:\.[^.]+){0,2})",
        ),
        Rule::new(
            "deadline",
            r"(?i)(?:deadline|due date|application period|applications due):?\s+([^.]+)",
        ),
        Rule::new(
            "contact",
            r"(?i)(?:contact|for more information|questions):?\s+([^.]+(?:\.[^.]+){0,2})",
        ),
    ]
});

/// Page-level statements, searched once over the whole text. Single
/// `captures` call per rule, so the first match wins.
pub static GENERAL_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            "eligibility",
            r"(?i)(?:eligibility|who can apply|requirements):?\s+([^.]+(?:\.[^.]+){0,5})",
        ),
        Rule::new(
            "application_process",
            r"(?i)(?:how to apply|application process):?\s+([^.]+(?:\.[^.]+){0,5})",
        ),
        Rule::new(
            "contact",
            r"(?i)(?:contact|for more information):?\s+([^.]+(?:\.[^.]+){0,3})",
        ),
    ]
});

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn rule<'a>(table: &'a [Rule], label: &str) -> &'a Rule {
        table.iter().find(|r| r.label == label).unwrap()
    }

    #[test]
    fn quoted_name() {
        let r = rule(&NAME_RULES, "quoted");
        let text = r#"The city runs a grant called "Home Repair Fund" for owners."#;
        assert_eq!(r.first(text), Some("Home Repair Fund"));
    }

    #[test]
    fn quoted_name_after_colon() {
        let r = rule(&NAME_RULES, "quoted");
        assert_eq!(r.first(r#"Grant: "Home Repair Fund""#), Some("Home Repair Fund"));
    }

    #[test]
    fn labelled_name() {
        let r = rule(&NAME_RULES, "labelled");
        let text = "Program: Weatherization Assistance for low-income residents";
        assert_eq!(r.first(text), Some("Weatherization Assistance for low-income residents"));
    }

    #[test]
    fn prefixed_name() {
        let r = rule(&NAME_RULES, "prefixed");
        let text = "Apply now! The Solar Rooftop initiative accepts applications.";
        assert_eq!(r.first(text), Some("Solar Rooftop"));
    }

    #[test]
    fn funding_captures_up_to_three_sentences() {
        let r = rule(&FIELD_RULES, "funding");
        let text = "Funding: up to $50,000 per unit. Matching required. No exceptions. Extra.";
        let got = r.first(text).unwrap();
        assert!(got.starts_with("up to $50,000"));
        assert!(got.contains("No exceptions"));
        assert!(!got.contains("Extra"));
    }

    #[test]
    fn deadline_stops_at_first_period() {
        let r = rule(&FIELD_RULES, "deadline");
        let text = "Deadline: March 31, 2026 at 5pm EST. Late entries rejected.";
        assert_eq!(r.first(text), Some("March 31, 2026 at 5pm EST"));
    }

    #[test]
    fn general_rules_first_match_wins() {
        let r = rule(&GENERAL_RULES, "contact");
        let text = "Contact: first@example.org for details. Contact: second@example.org.";
        assert!(r.first(text).unwrap().contains("first@example.org"));
    }

    #[test]
    fn absent_label_yields_none() {
        for r in FIELD_RULES.iter().chain(GENERAL_RULES.iter()) {
            assert_eq!(r.first("nothing relevant here"), None, "rule {}", r.label);
        }
    }
}
