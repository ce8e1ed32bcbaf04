// Picasa sidecar (.picasa.ini) module
// Reads a sidecar file into typed sections, validated at parse time.

pub mod ini;

use std::path::{Path, PathBuf};
use crate::constants::{
    ALBUM_SECTION_PREFIX, IGNORED_FILE_KEYS, KEY_ALBUMS, KEY_FACES, KEY_STAR, SECTION_CONTACTS,
    SECTION_CONTACTS2, SECTION_PICASA,
};
use crate::discover::is_media_file;
use crate::error::{MigrateError, Result};
use ini::RawSection;

/// `[Contacts2]` entry: a contact id with the display name this directory knows it by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredContact {
    pub id: String,
    pub name: String,
}

/// `[Contacts]` entry from older Picasa versions: only a hash of the name survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyContact {
    pub id: String,
    pub name_hash: String,
}

/// `[.album:<token>]` section declaring a Picasa album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumDeclaration {
    pub token: String,
    pub name: String,
}

/// One `faces=` entry: `rect64(...),<contact id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceEntry {
    pub rect: String,
    pub contact_id: String,
}

/// Per-file section (section name is the file name).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileEntry {
    pub file_name: String,
    pub star: bool,
    pub albums: Vec<String>,
    pub faces: Vec<FaceEntry>,
    /// Keys that were present but are not migrated.
    pub unused_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    Picasa,
    Contacts(Vec<LegacyContact>),
    Contacts2(Vec<DeclaredContact>),
    Album(AlbumDeclaration),
    /// Album section without a name; Picasa leaves these behind for deleted albums.
    UnnamedAlbum(String),
    File(FileEntry),
    Other(String),
}

impl Section {
    pub fn name(&self) -> String {
        match self {
            Section::Picasa => SECTION_PICASA.to_string(),
            Section::Contacts(_) => SECTION_CONTACTS.to_string(),
            Section::Contacts2(_) => SECTION_CONTACTS2.to_string(),
            Section::Album(album) => format!("{}{}", ALBUM_SECTION_PREFIX, album.token),
            Section::UnnamedAlbum(token) => format!("{}{}", ALBUM_SECTION_PREFIX, token),
            Section::File(entry) => entry.file_name.clone(),
            Section::Other(name) => name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sidecar {
    pub path: PathBuf,
    pub sections: Vec<Section>,
}

impl Sidecar {
    pub fn declared_contacts(&self) -> impl Iterator<Item = &DeclaredContact> {
        self.sections.iter().flat_map(|s| match s {
            Section::Contacts2(contacts) => contacts.as_slice(),
            _ => &[][..],
        })
    }

    pub fn legacy_contacts(&self) -> impl Iterator<Item = &LegacyContact> {
        self.sections.iter().flat_map(|s| match s {
            Section::Contacts(contacts) => contacts.as_slice(),
            _ => &[][..],
        })
    }

    pub fn albums(&self) -> impl Iterator<Item = &AlbumDeclaration> {
        self.sections.iter().filter_map(|s| match s {
            Section::Album(album) => Some(album),
            _ => None,
        })
    }

    pub fn file(&self, file_name: &str) -> Option<&FileEntry> {
        self.files().find(|f| f.file_name == file_name)
    }

    pub fn files(&self) -> impl Iterator<Item = &FileEntry> {
        self.sections.iter().filter_map(|s| match s {
            Section::File(entry) => Some(entry),
            _ => None,
        })
    }

    /// Sections that are never migrated, whatever the directory contents.
    pub fn unused_section_names(&self) -> Vec<String> {
        self.sections
            .iter()
            .filter(|s| matches!(s, Section::UnnamedAlbum(_) | Section::Other(_)))
            .map(Section::name)
            .collect()
    }
}

/// Read and validate `<dir>/<file_name>`.
pub fn read_sidecar(dir: &Path, file_name: &str) -> Result<Sidecar> {
    let path = dir.join(file_name);
    let bytes = std::fs::read(&path).map_err(|source| MigrateError::SidecarRead {
        path: path.clone(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|e| MigrateError::SidecarRead {
        path: path.clone(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;
    parse_sidecar(&path, &text)
}

/// Parse sidecar text; `path` is only used for error messages.
pub fn parse_sidecar(path: &Path, text: &str) -> Result<Sidecar> {
    let raw = ini::parse_ini(text)
        .map_err(|e| MigrateError::Sidecar(format!("{}: {}", path.display(), e)))?;

    let sections = raw
        .into_iter()
        .map(classify_section)
        .collect::<Result<Vec<_>>>()
        .map_err(|e| MigrateError::Sidecar(format!("{}: {}", path.display(), e)))?;

    Ok(Sidecar { path: path.to_path_buf(), sections })
}

fn classify_section(raw: RawSection) -> Result<Section> {
    if raw.name == SECTION_PICASA {
        return Ok(Section::Picasa);
    }
    if raw.name == SECTION_CONTACTS2 {
        let contacts = raw
            .entries
            .into_iter()
            .map(|(id, value)| DeclaredContact {
                name: value.split(';').next().unwrap_or_default().to_string(),
                id,
            })
            .collect();
        return Ok(Section::Contacts2(contacts));
    }
    if raw.name == SECTION_CONTACTS {
        let contacts = raw
            .entries
            .into_iter()
            .map(|(id, value)| match value.split(',').nth(1) {
                Some(hash) => Ok(LegacyContact { id, name_hash: hash.to_string() }),
                None => Err(MigrateError::Sidecar(format!(
                    "[{}] entry {} has no name hash: {:?}", SECTION_CONTACTS, id, value
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        return Ok(Section::Contacts(contacts));
    }
    if let Some(token) = raw.name.strip_prefix(ALBUM_SECTION_PREFIX) {
        return parse_album_section(token, &raw);
    }
    if is_media_file(&raw.name) {
        return parse_file_section(raw).map(Section::File);
    }
    Ok(Section::Other(raw.name))
}

fn parse_album_section(token: &str, raw: &RawSection) -> Result<Section> {
    let name = match raw.get("name") {
        Some(name) if !name.is_empty() => name,
        _ => return Ok(Section::UnnamedAlbum(token.to_string())),
    };
    if let Some(declared) = raw.get("token") {
        if declared != token {
            return Err(MigrateError::Sidecar(format!(
                "[{}{}] declares token {:?}", ALBUM_SECTION_PREFIX, token, declared
            )));
        }
    }
    Ok(Section::Album(AlbumDeclaration {
        token: token.to_string(),
        name: name.to_string(),
    }))
}

fn parse_file_section(raw: RawSection) -> Result<FileEntry> {
    let mut entry = FileEntry {
        file_name: raw.name.clone(),
        ..FileEntry::default()
    };

    for (key, value) in &raw.entries {
        match key.as_str() {
            KEY_STAR => entry.star = parse_bool(value).ok_or_else(|| {
                MigrateError::Sidecar(format!("[{}] star is not a boolean: {:?}", raw.name, value))
            })?,
            KEY_ALBUMS => {
                entry.albums = value
                    .split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            KEY_FACES => {
                entry.faces = value
                    .split(';')
                    .filter(|f| !f.trim().is_empty())
                    .map(|f| parse_face(&raw.name, f))
                    .collect::<Result<Vec<_>>>()?;
            }
            k if IGNORED_FILE_KEYS.contains(&k) => {}
            _ => entry.unused_keys.push(key.clone()),
        }
    }

    Ok(entry)
}

fn parse_face(section: &str, face: &str) -> Result<FaceEntry> {
    let parts: Vec<&str> = face.split(',').collect();
    match parts.as_slice() {
        [rect, contact_id] => Ok(FaceEntry {
            rect: rect.trim().to_string(),
            contact_id: contact_id.trim().to_lowercase(),
        }),
        _ => Err(MigrateError::Sidecar(format!(
            "[{}] face entry is not rect64(...),<contact>: {:?}", section, face
        ))),
    }
}

/// Booleans as Picasa (and Python's configparser) spell them.
fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}
