use url::Url;

use crate::model::FetchResult;

/// Render batch results as a Markdown report: one section per input
/// URL, in input order, failures included.
pub fn format_results(results: &[FetchResult]) -> String {
    let mut out: Vec<String> = Vec::new();

    for result in results {
        let domain = Url::parse(&result.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| result.url.clone());

        out.push(format!("## Source: {domain}"));
        out.push(format!("URL: {}", result.url));

        if !result.success {
            out.push("**Error:** Failed to scrape this website.".to_string());
            if let Some(error) = &result.error {
                out.push(format!("Error details: {error}"));
            }
            out.push(String::new());
            continue;
        }

        let programs = &result.info.programs;
        if programs.is_empty() {
            out.push("\nNo specific grant programs identified.".to_string());
        } else {
            out.push("\n### Grant Programs Found:".to_string());
            for program in programs {
                out.push(format!("\n#### {}", program.name));
                for (label, value) in [
                    ("Description", &program.description),
                    ("Eligibility", &program.eligibility),
                    ("Funding", &program.funding),
                    ("Deadline", &program.deadline),
                    ("Contact", &program.contact),
                ] {
                    if !value.is_empty() {
                        out.push(format!("**{label}:** {value}"));
                    }
                }
            }
        }

        let general = &result.info.general;
        if !general.is_empty() {
            out.push("\n### General Information:".to_string());
            for (label, value) in [
                ("Eligibility", &general.eligibility),
                ("Application Process", &general.application_process),
                ("Contact", &general.contact),
            ] {
                if let Some(value) = value {
                    out.push(format!("**{label}:** {value}"));
                }
            }
        }

        if !result.documents.is_empty() {
            out.push(format!("\n### Documents Found ({}):", result.documents.len()));
            for (i, doc) in result.documents.iter().enumerate() {
                out.push(format!("\n#### Document {}: {}", i + 1, doc.file_name));
                if !doc.anchor_text.is_empty() {
                    out.push(format!("**Link text:** {}", doc.anchor_text));
                }
                if !doc.info.programs.is_empty() {
                    out.push("**Programs mentioned in document:**".to_string());
                    for program in &doc.info.programs {
                        out.push(format!("- {}", program.name));
                    }
                }
            }
        }

        out.push(format!("\n{}\n", "-".repeat(80)));
    }

    out.join("\n")
}

// ── Tests ──
