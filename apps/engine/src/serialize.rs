//! Serializer: renders an assembled record as JSON (plain or verbose) or
//! a one-row CSV. Absent fields are omitted, never null; an empty record
//! still serializes to a valid structure with empty arrays.

use serde::Serialize;
use serde_json::json;

use crate::errors::EngineError;
use crate::models::{
    EducationEntry, ExperienceEntry, FieldValue, ParseReport, StructuredResume,
};
use crate::normalize::OffsetMap;

/// Delimiter for multi-valued CSV cells, chosen to avoid the record
/// separator.
const CELL_DELIMITER: &str = ";";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

/// Renders a parse report. `verbose` adds per-field confidence, source
/// spans (in original-document offsets), and the report envelope; it only
/// affects JSON output.
pub fn render(
    report: &ParseReport,
    format: OutputFormat,
    verbose: bool,
) -> Result<String, EngineError> {
    match format {
        OutputFormat::Json if verbose => {
            Ok(serde_json::to_string_pretty(&verbose_envelope(report))?)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&plain_dto(&report.resume))?),
        OutputFormat::Csv => Ok(to_csv(&report.resume)),
    }
}

// Plain JSON output: the shape promised to API consumers.

#[derive(Debug, Serialize)]
struct JsonResume {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contact: Option<JsonContact>,
    education: Vec<JsonEducation>,
    experience: Vec<JsonExperience>,
    skills: Vec<String>,
    certifications: Vec<String>,
    links: Vec<String>,
}

#[derive(Debug, Serialize)]
struct JsonContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
}

#[derive(Debug, Serialize)]
struct JsonEducation {
    #[serde(skip_serializing_if = "Option::is_none")]
    institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gpa: Option<String>,
}

#[derive(Debug, Serialize)]
struct JsonExperience {
    #[serde(skip_serializing_if = "Option::is_none")]
    organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

fn plain_dto(resume: &StructuredResume) -> JsonResume {
    let email = resume.email.as_ref().map(|f| f.value.clone());
    let phone = resume.phone.as_ref().map(|f| f.value.clone());
    let contact = if email.is_some() || phone.is_some() {
        Some(JsonContact { email, phone })
    } else {
        None
    };

    JsonResume {
        name: resume.name.as_ref().map(|f| f.value.clone()),
        contact,
        education: resume.education.iter().map(education_dto).collect(),
        experience: resume.experience.iter().map(experience_dto).collect(),
        skills: resume.skills.iter().map(|f| f.value.clone()).collect(),
        certifications: resume
            .certifications
            .iter()
            .map(|f| f.value.clone())
            .collect(),
        links: resume.links.iter().map(|f| f.value.url.clone()).collect(),
    }
}

fn education_dto(entry: &EducationEntry) -> JsonEducation {
    let range = entry.dates.as_ref().map(|f| f.value);
    JsonEducation {
        institution: entry.institution.as_ref().map(|f| f.value.clone()),
        degree: entry.degree.as_ref().map(|f| f.value.clone()),
        start: range.and_then(|r| r.start).map(|d| d.display()),
        end: range.and_then(|r| r.end_display()),
        gpa: entry.gpa.as_ref().map(|f| f.value.clone()),
    }
}

fn experience_dto(entry: &ExperienceEntry) -> JsonExperience {
    let range = entry.dates.as_ref().map(|f| f.value);
    JsonExperience {
        organization: entry.organization.as_ref().map(|f| f.value.clone()),
        title: entry.title.as_ref().map(|f| f.value.clone()),
        start: range.and_then(|r| r.start).map(|d| d.display()),
        end: range.and_then(|r| r.end_display()),
        description: entry.description.as_ref().map(|f| f.value.clone()),
    }
}

// Verbose JSON: plain fields replaced by {value, confidence, section,
// span} objects plus the report envelope.

fn verbose_envelope(report: &ParseReport) -> serde_json::Value {
    let mut warnings: Vec<String> = report
        .empty_families
        .iter()
        .map(|f| format!("no {} extracted", f.as_str()))
        .collect();
    if report.lossy {
        warnings.push("input contained malformed sequences".to_string());
    }
    if report.truncated {
        warnings.push("extraction time budget exceeded; results are partial".to_string());
    }

    json!({
        "document_id": report.document_id,
        "source_format": report.format,
        "parsed_at": report.parsed_at.to_rfc3339(),
        "elapsed_ms": report.elapsed_ms,
        "lossy": report.lossy,
        "truncated": report.truncated,
        "warnings": warnings,
        "resume": verbose_resume(report),
    })
}

fn verbose_resume(report: &ParseReport) -> serde_json::Value {
    let map = &report.offset_map;
    let resume = &report.resume;
    json!({
        "name": resume.name.as_ref().map(|f| annotated(f, &f.value, map)),
        "email": resume.email.as_ref().map(|f| annotated(f, &f.value, map)),
        "phone": resume.phone.as_ref().map(|f| annotated(f, &f.value, map)),
        "education": resume.education.iter().map(|e| json!({
            "institution": e.institution.as_ref().map(|f| annotated(f, &f.value, map)),
            "degree": e.degree.as_ref().map(|f| annotated(f, &f.value, map)),
            "dates": e.dates.as_ref().map(|f| annotated(f, &json!({
                "start": f.value.start.map(|d| d.display()),
                "end": f.value.end_display(),
            }), map)),
            "gpa": e.gpa.as_ref().map(|f| annotated(f, &f.value, map)),
        })).collect::<Vec<_>>(),
        "experience": resume.experience.iter().map(|e| json!({
            "organization": e.organization.as_ref().map(|f| annotated(f, &f.value, map)),
            "title": e.title.as_ref().map(|f| annotated(f, &f.value, map)),
            "dates": e.dates.as_ref().map(|f| annotated(f, &json!({
                "start": f.value.start.map(|d| d.display()),
                "end": f.value.end_display(),
            }), map)),
            "description": e.description.as_ref().map(|f| annotated(f, &f.value, map)),
        })).collect::<Vec<_>>(),
        "skills": resume.skills.iter().map(|f| annotated(f, &f.value, map)).collect::<Vec<_>>(),
        "certifications": resume.certifications.iter().map(|f| annotated(f, &f.value, map)).collect::<Vec<_>>(),
        "links": resume.links.iter().map(|f| annotated(f, &json!({
            "url": f.value.url,
            "kind": f.value.kind,
        }), map)).collect::<Vec<_>>(),
    })
}

fn annotated<T, V: Serialize>(
    field: &FieldValue<T>,
    value: &V,
    map: &OffsetMap,
) -> serde_json::Value {
    json!({
        "value": value,
        "confidence": field.confidence,
        "section": field.section,
        "span": {
            "start": map.to_original(field.span.start),
            "end": map.to_original(field.span.end),
        },
    })
}

// CSV output: header row plus one record row.

const CSV_HEADER: [&str; 8] = [
    "name",
    "email",
    "phone",
    "education",
    "experience",
    "skills",
    "certifications",
    "links",
];

fn to_csv(resume: &StructuredResume) -> String {
    let single = |f: &Option<FieldValue<String>>| {
        f.as_ref().map(|v| v.value.clone()).unwrap_or_default()
    };

    let education = resume
        .education
        .iter()
        .map(format_education_cell)
        .collect::<Vec<String>>()
        .join(CELL_DELIMITER);
    let experience = resume
        .experience
        .iter()
        .map(format_experience_cell)
        .collect::<Vec<String>>()
        .join(CELL_DELIMITER);
    let skills = join_values(&resume.skills);
    let certifications = join_values(&resume.certifications);
    let links = resume
        .links
        .iter()
        .map(|f| f.value.url.clone())
        .collect::<Vec<String>>()
        .join(CELL_DELIMITER);

    let cells = [
        single(&resume.name),
        single(&resume.email),
        single(&resume.phone),
        education,
        experience,
        skills,
        certifications,
        links,
    ];

    let mut out = CSV_HEADER.join(",");
    out.push('\n');
    out.push_str(
        &cells
            .iter()
            .map(|c| escape_cell(c))
            .collect::<Vec<String>>()
            .join(","),
    );
    out.push('\n');
    out
}

fn join_values(values: &[FieldValue<String>]) -> String {
    values
        .iter()
        .map(|f| f.value.clone())
        .collect::<Vec<String>>()
        .join(CELL_DELIMITER)
}

/// "Institution | Degree (start-end)" with absent parts dropped.
fn format_education_cell(entry: &EducationEntry) -> String {
    let mut parts = Vec::new();
    if let Some(i) = &entry.institution {
        parts.push(i.value.clone());
    }
    if let Some(d) = &entry.degree {
        parts.push(d.value.clone());
    }
    let mut cell = parts.join(" | ");
    if let Some(range) = format_range(entry.dates.as_ref()) {
        if cell.is_empty() {
            cell = range;
        } else {
            cell = format!("{cell} ({range})");
        }
    }
    cell
}

fn format_experience_cell(entry: &ExperienceEntry) -> String {
    let mut parts = Vec::new();
    if let Some(o) = &entry.organization {
        parts.push(o.value.clone());
    }
    if let Some(t) = &entry.title {
        parts.push(t.value.clone());
    }
    let mut cell = parts.join(" | ");
    if let Some(range) = format_range(entry.dates.as_ref()) {
        if cell.is_empty() {
            cell = range;
        } else {
            cell = format!("{cell} ({range})");
        }
    }
    cell
}

fn format_range(dates: Option<&FieldValue<crate::models::DateRange>>) -> Option<String> {
    let range = dates.map(|f| f.value)?;
    let start = range.start.map(|d| d.display());
    let end = range.end_display();
    match (start, end) {
        (Some(s), Some(e)) => Some(format!("{s}-{e}")),
        (Some(s), None) => Some(s),
        (None, Some(e)) => Some(format!("-{e}")),
        (None, None) => None,
    }
}

/// RFC 4180 quoting: cells containing the separator, quotes, or line
/// breaks are wrapped and inner quotes doubled.
fn escape_cell(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
