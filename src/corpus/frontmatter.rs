//! Front-matter splitting and parsing for `page.mdx` files.

use serde::Deserialize;

use crate::corpus::CorpusError;

const DELIMITER: &str = "---";

/// Metadata block at the head of a post file.
///
/// Dates are kept as strings here and validated by the loader, so a bad date
/// reports the file it came from.
#[derive(Debug, Default, Deserialize)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(alias = "updated")]
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<String>,
}

/// Split a file into its front-matter and body.
///
/// Files that do not start with `---` have no front-matter; the whole text is
/// the body.
///
/// # Errors
///
/// Returns `CorpusError::FrontMatter` if the opening delimiter is not closed
/// or the YAML block cannot be parsed.
pub fn parse(source: &str) -> Result<(FrontMatter, &str), CorpusError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let Some(rest) = strip_delimiter_line(source) else {
        return Ok((FrontMatter::default(), source));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            let front: FrontMatter = if yaml.trim().is_empty() {
                FrontMatter::default()
            } else {
                serde_yaml::from_str(yaml).map_err(|e| CorpusError::FrontMatter(e.to_string()))?
            };
            return Ok((front, body.trim_start_matches(['\r', '\n'])));
        }
        offset += line.len();
    }

    Err(CorpusError::FrontMatter(
        "missing closing '---' delimiter".to_string(),
    ))
}

fn strip_delimiter_line(source: &str) -> Option<&str> {
    let rest = source.strip_prefix(DELIMITER)?;
    let rest = rest.trim_start_matches([' ', '\t']);
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}
