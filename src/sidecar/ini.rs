// Minimal INI reader for Picasa sidecar files
// Follows the rules Picasa's files were written for: case-sensitive section
// names, case-insensitive keys, '=' or ':' delimiters, full-line '#'/';'
// comments, repeated sections merge and repeated keys keep the last value.

use regex::Regex;
use crate::error::{MigrateError, Result};

/// One `[section]` with its entries in file order (keys lowercased).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    pub name: String,
    pub entries: Vec<(String, String)>,
}

impl RawSection {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn set(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}

/// Parse INI text into sections, in order of first appearance.
pub fn parse_ini(text: &str) -> Result<Vec<RawSection>> {
    let section_re = Regex::new(r"^\[(?P<header>.+)\]$")
        .map_err(|e| MigrateError::Sidecar(e.to_string()))?;
    let option_re = Regex::new(r"^(?P<key>.*?)\s*[=:]\s*(?P<value>.*)$")
        .map_err(|e| MigrateError::Sidecar(e.to_string()))?;

    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut sections: Vec<RawSection> = Vec::new();
    let mut current: Option<usize> = None;
    let mut last_key: Option<String> = None;

    for (line_no, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim_end();
        let trimmed = line.trim_start();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        // Indented line continues the previous value
        if trimmed.len() != line.len() {
            if let (Some(idx), Some(key)) = (current, last_key.as_ref()) {
                let section = &mut sections[idx];
                if let Some(entry) = section.entries.iter_mut().find(|(k, _)| k == key) {
                    entry.1.push('\n');
                    entry.1.push_str(trimmed);
                    continue;
                }
            }
        }

        if let Some(caps) = section_re.captures(trimmed) {
            let name = caps["header"].to_string();
            let idx = match sections.iter().position(|s| s.name == name) {
                Some(idx) => idx,
                None => {
                    sections.push(RawSection { name, entries: Vec::new() });
                    sections.len() - 1
                }
            };
            current = Some(idx);
            last_key = None;
            continue;
        }

        let idx = current.ok_or_else(|| {
            MigrateError::Sidecar(format!("line {}: entry before any section header", line_no + 1))
        })?;

        let caps = option_re.captures(trimmed).ok_or_else(|| {
            MigrateError::Sidecar(format!("line {}: expected key = value, got {:?}", line_no + 1, trimmed))
        })?;
        let key = caps["key"].trim().to_lowercase();
        if key.is_empty() {
            return Err(MigrateError::Sidecar(format!("line {}: empty key", line_no + 1)));
        }
        let value = caps["value"].trim().to_string();

        sections[idx].set(key.clone(), value);
        last_key = Some(key);
    }

    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections_and_keys() {
        let text = "\u{feff}[Picasa]\nname=Holiday\n\n[IMG_0001.JPG]\nStar=yes\nfaces = rect64(1),abc\n";
        let sections = parse_ini(text).unwrap();
        assert_eq!(2, sections.len());
        assert_eq!("Picasa", sections[0].name);
        assert_eq!(Some("Holiday"), sections[0].get("name"));
        assert_eq!("IMG_0001.JPG", sections[1].name);
        assert_eq!(Some("yes"), sections[1].get("star"));
        assert_eq!(Some("rect64(1),abc"), sections[1].get("faces"));
    }

    #[test]
    fn test_repeated_sections_merge_and_last_key_wins() {
        let text = "[a.jpg]\nstar=yes\n[b.jpg]\nstar=yes\n[a.jpg]\nstar=no\nalbums=x\n";
        let sections = parse_ini(text).unwrap();
        assert_eq!(2, sections.len());
        assert_eq!(Some("no"), sections[0].get("star"));
        assert_eq!(Some("x"), sections[0].get("albums"));
    }

    #[test]
    fn test_comments_colon_delimiter_and_continuation() {
        let text = "# comment\n[Contacts2]\n; another\nabc: Jane Doe;;\nnote=first\n  second\n";
        let sections = parse_ini(text).unwrap();
        assert_eq!(Some("Jane Doe;;"), sections[0].get("abc"));
        assert_eq!(Some("first\nsecond"), sections[0].get("note"));
    }

    #[test]
    fn test_value_may_contain_delimiters() {
        let sections = parse_ini("[x.jpg]\nfaces=rect64(1),a;rect64(2),b\nk=v=w\n").unwrap();
        assert_eq!(Some("rect64(1),a;rect64(2),b"), sections[0].get("faces"));
        assert_eq!(Some("v=w"), sections[0].get("k"));
    }

    #[test]
    fn test_entry_before_section_fails() {
        assert!(matches!(parse_ini("star=yes\n"), Err(MigrateError::Sidecar(_))));
    }

    #[test]
    fn test_line_without_delimiter_fails() {
        assert!(matches!(parse_ini("[a.jpg]\njustakey\n"), Err(MigrateError::Sidecar(_))));
    }
}
