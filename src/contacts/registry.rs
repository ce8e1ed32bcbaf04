// Picasa contacts.xml registry
// The file is a flat list of <contact id=".." name=".." .../> elements; we only
// need those two attributes, so a pair of regexes is enough.

use std::path::Path;
use regex::Regex;
use crate::error::{MigrateError, Result};

/// Read `(contact id, name)` pairs from a Picasa contacts.xml file.
pub fn load_contacts_xml(path: &Path) -> Result<Vec<(String, String)>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| MigrateError::Registry(format!("Failed to read {}: {}", path.display(), e)))?;
    let contacts = parse_contacts_xml(&text)
        .map_err(|e| MigrateError::Registry(format!("{}: {}", path.display(), e)))?;
    log::info!("Loaded {} contacts from {}", contacts.len(), path.display());
    Ok(contacts)
}

pub fn parse_contacts_xml(text: &str) -> Result<Vec<(String, String)>> {
    let element_re = Regex::new(r"<contact\b(?P<attrs>[^>]*)>")
        .map_err(|e| MigrateError::Registry(e.to_string()))?;
    let attr_re = Regex::new(r#"(?P<key>[\w:-]+)\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#)
        .map_err(|e| MigrateError::Registry(e.to_string()))?;

    let mut contacts = Vec::new();
    for element in element_re.captures_iter(text) {
        let mut id = None;
        let mut name = None;
        for attr in attr_re.captures_iter(&element["attrs"]) {
            let value = attr.name("dq").or_else(|| attr.name("sq")).map_or("", |m| m.as_str());
            match &attr["key"] {
                "id" => id = Some(unescape_xml(value).to_lowercase()),
                "name" => name = Some(unescape_xml(value)),
                _ => {}
            }
        }

        match (id, name) {
            (Some(id), Some(name)) => contacts.push((id, name)),
            (Some(id), None) => log::warn!("Contact {} in the registry has no name, ignoring it", id),
            (None, _) => {
                return Err(MigrateError::Registry(format!(
                    "contact element without id: <contact{}>", &element["attrs"]
                )))
            }
        }
    }
    Ok(contacts)
}

fn unescape_xml(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONTACTS_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<contacts>
 <contact id="8F2B1A" name="Jane Doe" modified_time="2013-01-01T10:00:00+01:00" local_contact="1"/>
 <contact id="c001" name="Tom &amp; Jerry" display="T&amp;J">
  <subject user="someone@example.com"/>
 </contact>
 <contact id='d002' name='Single Quoted'/>
 <contact id="e003" display="No Name"/>
</contacts>
"#;

    #[test]
    fn test_parse_contacts_xml() {
        let contacts = parse_contacts_xml(CONTACTS_XML).unwrap();
        assert_eq!(
            vec![
                ("8f2b1a".to_string(), "Jane Doe".to_string()),
                ("c001".to_string(), "Tom & Jerry".to_string()),
                ("d002".to_string(), "Single Quoted".to_string()),
            ],
            contacts
        );
    }

    #[test]
    fn test_contact_without_id_fails() {
        assert!(parse_contacts_xml(r#"<contacts><contact name="X"/></contacts>"#).is_err());
    }

    #[test]
    fn test_contacts_element_is_not_a_contact() {
        assert!(parse_contacts_xml("<contacts></contacts>").unwrap().is_empty());
    }

    #[test]
    fn test_load_contacts_xml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("contacts.xml");
        std::fs::write(&path, CONTACTS_XML).unwrap();
        assert_eq!(3, load_contacts_xml(&path).unwrap().len());
        assert!(matches!(
            load_contacts_xml(&tmp.path().join("missing.xml")),
            Err(MigrateError::Registry(_))
        ));
    }
}
