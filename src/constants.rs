// picasa2digikam Constants
// Names below are fixed by Picasa's sidecar format and digiKam's database schema.

// Sidecar files
pub const PICASA_INI_FILE: &str = ".picasa.ini";
pub const OLD_PICASA_INI_FILE: &str = "Picasa.ini"; // Seen in folders from 2002
pub const SIDECAR_FILE_NAMES: [&str; 2] = [PICASA_INI_FILE, OLD_PICASA_INI_FILE];
pub const PICASA_ORIGINALS_FOLDER: &str = ".picasaoriginals";

// Sidecar sections
pub const SECTION_PICASA: &str = "Picasa";
pub const SECTION_CONTACTS: &str = "Contacts";
pub const SECTION_CONTACTS2: &str = "Contacts2";
pub const ALBUM_SECTION_PREFIX: &str = ".album:";

// Per-file keys
pub const KEY_STAR: &str = "star";
pub const KEY_ALBUMS: &str = "albums";
pub const KEY_FACES: &str = "faces";
/// Keys Picasa writes that carry nothing digiKam can use.
pub const IGNORED_FILE_KEYS: [&str; 2] = ["backuphash", "rotate"];

// Faces
pub const UNKNOWN_FACE_ID: &str = "ffffffffffffffff";
pub const RECT64_PREFIX: &str = "rect64(";
pub const RECT64_SUFFIX: &str = ")";
pub const RECT64_DIGITS: usize = 16;

// Contact names
pub const AMBIGUOUS_NAME_SEPARATOR: &str = "|";
pub const LEGACY_NAME_PREFIX: &str = ".NoName-";
pub const RECT64_NAME_SUFFIX: &str = "-from-rect64";

// digiKam tags
pub const ROOT_TAG_ID: i64 = 0;
pub const PICASA_TAG_NAME: &str = "Picasa";
pub const INTERNAL_ROOT_TAG_NAME: &str = "_Digikam_Internal_Tags_";
pub const PERSON_ROOT_TAG_NAMES: [&str; 2] = ["Persons", "Personen"];
pub const PICK_LABEL_ACCEPTED: &str = "Pick Label Accepted";
pub const PICK_LABEL_OTHERS: [&str; 3] = ["Pick Label Pending", "Pick Label Rejected", "Pick Label None"];

// digiKam properties
pub const FACE_TAG_REGION_PROPERTY: &str = "tagRegion";
pub const TAG_PROPERTY_PERSON: &str = "person";
pub const TAG_PROPERTY_FACE_ENGINE: &str = "faceEngineId";

// digiKam album roots
pub const ALBUM_ROOT_STATUS_AVAILABLE: i64 = 0;
/// 1=VolumeHardWired, 2=VolumeRemovable, 3=Network (0=Undefined is skipped)
pub const ALBUM_ROOT_TYPES: [i64; 3] = [1, 2, 3];
pub const VOLUME_UUID_PREFIX: &str = "volumeid:?uuid=";
pub const VOLUME_PATH_PREFIX: &str = "volumeid:?path=";
pub const NETWORK_SHARE_PREFIX: &str = "networkshareid:?mountpath=";
pub const DISK_BY_UUID_DIR: &str = "/dev/disk/by-uuid";
pub const PROC_MOUNTS_FILE: &str = "/proc/self/mounts";
pub const IMAGE_STATUS_VISIBLE: i64 = 1;

// Backup
pub const BACKUP_SUFFIX: &str = "bak";

// Formats that digiKam cannot size, so faces cannot be placed on them
pub const NO_REGION_EXTENSIONS: [&str; 1] = ["psd"];

// Photo and video extensions Picasa annotates
pub const PHOTO_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "raw", "psd", "webp"];

pub const VIDEO_EXTENSIONS: [&str; 13] = [
    "mkv", "mp4", "mov", "avi", "wmv", "flv", "webm", "mpeg", "mpg",
    "m4v", "3gp", "3g2", "ogv"
];
