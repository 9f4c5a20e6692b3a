//! Links extractor: whole-document scan for URLs and bare known-platform
//! domains, canonicalized and deduplicated, with platform classification.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::EngineConfig;
use crate::models::{FieldValue, LinkKind, LinkValue, Section, Span};

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:https?://|www\.)[^\s<>()\[\]{}"']+"#).expect("valid url regex")
});

/// Profile paths on well-known platforms are links even without a scheme.
static BARE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:linkedin\.com|github\.com|gitlab\.com|bitbucket\.org|behance\.net|dribbble\.com)/[A-Za-z0-9_\-./~%]+",
    )
    .expect("valid bare-domain regex")
});

pub fn extract(sections: &[Section], config: &EngineConfig) -> Vec<FieldValue<LinkValue>> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut links = Vec::new();

    for section in sections {
        for (re, confidence) in [
            (&*URL_RE, config.confidence.link),
            (&*BARE_RE, config.confidence.link_bare),
        ] {
            for m in re.find_iter(&section.text) {
                let raw = m
                    .as_str()
                    .trim_end_matches(['.', ',', ';', ')', ']', '"', '\'']);
                if raw.is_empty() {
                    continue;
                }
                let url = canonicalize(raw);
                if !seen.insert(url.clone()) {
                    continue;
                }
                let kind = classify(&url);
                links.push(FieldValue::new(
                    LinkValue { url, kind },
                    confidence,
                    section.kind,
                    Span::new(section.start + m.start(), section.start + m.end()),
                ));
            }
        }
    }

    links
}

/// Lowercases scheme and host, drops a "www." host prefix, prepends
/// https:// to schemeless matches, and strips the trailing slash.
fn canonicalize(raw: &str) -> String {
    let mut url = if raw.len() >= 4 && raw[..4].eq_ignore_ascii_case("http") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    if let Some(scheme_end) = url.find("://") {
        let host_start = scheme_end + 3;
        let host_end = url[host_start..]
            .find('/')
            .map(|i| host_start + i)
            .unwrap_or(url.len());
        let head = url[..host_end].to_lowercase().replacen("://www.", "://", 1);
        let tail = url[host_end..].to_string();
        url = format!("{head}{tail}");
    }

    url.trim_end_matches('/').to_string()
}

fn classify(url: &str) -> LinkKind {
    let host = url
        .split("://")
        .nth(1)
        .unwrap_or(url)
        .split('/')
        .next()
        .unwrap_or("");
    if host.ends_with("linkedin.com") {
        LinkKind::LinkedIn
    } else if host.ends_with("github.com")
        || host.ends_with("gitlab.com")
        || host.ends_with("bitbucket.org")
    {
        LinkKind::GitHub
    } else if url.contains("portfolio") || url.contains("personal") {
        LinkKind::Portfolio
    } else {
        LinkKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectionKind;

    fn section(text: &str) -> Section {
        Section {
            kind: SectionKind::Other,
            start: 0,
            end: text.len(),
            text: text.to_string(),
            has_heading: false,
        }
    }

    #[test]
    fn test_extracts_and_classifies_urls() {
        let sections = vec![section(
            "https://github.com/janedoe and https://www.linkedin.com/in/janedoe\n",
        )];
        let links = extract(&sections, &EngineConfig::default());
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].value.kind, LinkKind::GitHub);
        assert_eq!(links[1].value.kind, LinkKind::LinkedIn);
    }

    #[test]
    fn test_bare_platform_domain_gets_scheme() {
        let sections = vec![section("github.com/janedoe\n")];
        let config = EngineConfig::default();
        let links = extract(&sections, &config);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].value.url, "https://github.com/janedoe");
        assert!((links[0].confidence - config.confidence.link_bare).abs() < f32::EPSILON);
    }

    #[test]
    fn test_duplicates_collapse_by_canonical_url() {
        let sections = vec![section(
            "HTTPS://GitHub.com/janedoe/ and github.com/janedoe\n",
        )];
        let links = extract(&sections, &EngineConfig::default());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].value.url, "https://github.com/janedoe");
    }

    #[test]
    fn test_path_casing_is_preserved() {
        let sections = vec![section("https://github.com/JaneDoe\n")];
        let links = extract(&sections, &EngineConfig::default());
        assert_eq!(links[0].value.url, "https://github.com/JaneDoe");
    }

    #[test]
    fn test_trailing_punctuation_is_stripped() {
        let sections = vec![section("see https://example.com/work.\n")];
        let links = extract(&sections, &EngineConfig::default());
        assert_eq!(links[0].value.url, "https://example.com/work");
    }

    #[test]
    fn test_portfolio_classification() {
        let sections = vec![section("https://janedoe.dev/portfolio\n")];
        let links = extract(&sections, &EngineConfig::default());
        assert_eq!(links[0].value.kind, LinkKind::Portfolio);
    }

    #[test]
    fn test_plain_text_has_no_links() {
        let sections = vec![section("no urls in here at all\n")];
        assert!(extract(&sections, &EngineConfig::default()).is_empty());
    }
}
