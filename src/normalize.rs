// src/normalize.rs
//! Ingress normalization: turns a raw multipart submission into the
//! canonical form relayed to the evaluation service.

use crate::error::CvMatchError;

/// Characters removed from file name stems before they touch the upload store.
const UNSAFE_CHARS: &[char] = &['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>'];

/// Fallback for file parts that arrive without a file name.
const DEFAULT_FILE_NAME: &str = "uploaded-cv.pdf";

/// Stem used when sanitization strips a name down to nothing.
const FALLBACK_STEM: &str = "cv";

/// One file part exactly as the transport delivered it.
pub struct RawUpload {
    pub name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// A file with a repaired, sanitized name, ready for staging and relay.
#[derive(Debug)]
pub struct NormalizedFile {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// The validated, normalized form of an inbound submission.
#[derive(Debug)]
pub struct CanonicalRequest {
    pub job_codes: Vec<String>,
    pub files: Vec<NormalizedFile>,
}

/// Normalize a raw submission.
///
/// Job references are mapped to bare job codes one-to-one, order and
/// duplicates preserved. File names are encoding-repaired and sanitized.
/// An empty file list is the only rejected input; malformed job references
/// pass through as literal codes.
pub fn normalize(
    files: Vec<RawUpload>,
    job_references: &[String],
) -> Result<CanonicalRequest, CvMatchError> {
    if files.is_empty() {
        return Err(CvMatchError::Validation("No files uploaded".to_string()));
    }

    let job_codes = job_references
        .iter()
        .map(|reference| extract_job_code(reference).to_string())
        .collect();

    let files = files
        .into_iter()
        .map(|file| {
            let original = file.name.unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
            let repaired = repair_transport_encoding(&original);
            NormalizedFile {
                name: sanitize_file_name(&repaired),
                content_type: file
                    .content_type
                    .unwrap_or_else(|| "application/pdf".to_string()),
                data: file.data,
            }
        })
        .collect();

    Ok(CanonicalRequest { job_codes, files })
}

/// Extract the job code from a reference: everything after the last
/// `/job/` segment. A reference without that segment (or with nothing
/// after it) passes through unchanged, so bare codes and full URLs share
/// one code path.
pub fn extract_job_code(reference: &str) -> &str {
    match reference.rfind("/job/") {
        Some(idx) => {
            let code = &reference[idx + "/job/".len()..];
            if code.is_empty() {
                reference
            } else {
                code
            }
        }
        None => reference,
    }
}

/// Repair a file name that a transport mis-decoded as Latin-1.
///
/// Only applies when every char fits in a single byte and the resulting
/// byte sequence is valid UTF-8; a name the multipart layer already
/// delivered correctly fails that test and is returned untouched. ASCII
/// names round-trip to themselves.
pub fn repair_transport_encoding(name: &str) -> String {
    let bytes: Option<Vec<u8>> = name
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect();

    match bytes.and_then(|b| String::from_utf8(b).ok()) {
        Some(repaired) => repaired,
        None => name.to_string(),
    }
}

/// Sanitize a file name for the upload store.
///
/// The extension is split off and preserved verbatim; the stem has every
/// filesystem-unsafe character removed and surrounding whitespace trimmed.
/// Exclusion filter, not an allow-list: anything else, Unicode letters
/// included, passes through.
pub fn sanitize_file_name(name: &str) -> String {
    let (stem, extension) = split_extension(name);

    let stem: String = stem.chars().filter(|c| !UNSAFE_CHARS.contains(c)).collect();
    let stem = stem.trim();
    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem };

    format!("{stem}{extension}")
}

/// Split `name` at the last dot. A leading dot is part of the stem, so
/// dotfiles keep their full name.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}
