use super::error::MetainfoError;
use crate::bencode::{decode, decode_text, encode, Value};
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A parsed `.torrent` file.
///
/// String fields are read leniently: the file is decoded with UTF-8
/// detection, so names and URLs come back as text while the binary
/// `pieces` blob stays raw.
#[derive(Debug, Clone)]
pub struct Metainfo {
    pub info: Info,
    /// SHA-1 of the bencoded info dictionary.
    pub info_hash: [u8; 20],
    pub announce: Option<String>,
    /// Tracker tiers ([BEP-12](http://bittorrent.org/beps/bep_0012.html)).
    pub announce_list: Vec<Vec<String>>,
    pub creation_date: Option<i64>,
    pub comment: Option<String>,
    pub created_by: Option<String>,
}

/// The info dictionary.
#[derive(Debug, Clone)]
pub struct Info {
    pub name: String,
    pub piece_length: u64,
    /// One SHA-1 digest per piece.
    pub pieces: Vec<[u8; 20]>,
    /// A single entry named after the torrent for single-file torrents.
    pub files: Vec<FileEntry>,
    pub total_length: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Relative to the torrent root, starting with the torrent name.
    pub path: PathBuf,
    pub length: u64,
}

impl Info {
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_single_file(&self) -> bool {
        self.files.len() == 1 && self.files[0].path == PathBuf::from(&self.name)
    }
}

impl Metainfo {
    /// Parses a torrent file.
    ///
    /// # Errors
    ///
    /// Fails on malformed bencode, a missing `info`, `name`, `piece length`
    /// or `pieces`, a `pieces` blob that is not a multiple of 20 bytes, or
    /// when neither `length` nor `files` is present.
    pub fn from_bytes(data: &[u8]) -> Result<Self, MetainfoError> {
        let root = load_tree(data, true)?;
        let dict = root.as_dict().ok_or(MetainfoError::InvalidField("root"))?;

        let info_value = dict
            .get(b"info".as_slice())
            .ok_or(MetainfoError::MissingField("info"))?;
        let info_hash = hash_info(info_value)?;
        let info = parse_info(info_value)?;

        let announce_list = dict
            .get(b"announce-list".as_slice())
            .and_then(Value::as_list)
            .map(|tiers| {
                tiers
                    .iter()
                    .filter_map(Value::as_list)
                    .map(|tier| strings(tier))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            info,
            info_hash,
            announce: text_field(dict, b"announce"),
            announce_list,
            creation_date: dict
                .get(b"creation date".as_slice())
                .and_then(Value::as_integer),
            comment: text_field(dict, b"comment"),
            created_by: text_field(dict, b"created by"),
        })
    }

    /// Number of pieces; sizes a fresh peer bitfield.
    pub fn piece_count(&self) -> usize {
        self.info.piece_count()
    }

    /// `announce` followed by every tier of `announce-list`, without
    /// duplicates.
    pub fn trackers(&self) -> Vec<String> {
        let mut trackers: Vec<String> = self.announce.iter().cloned().collect();
        for url in self.announce_list.iter().flatten() {
            if !trackers.contains(url) {
                trackers.push(url.clone());
            }
        }
        trackers
    }
}

/// Decodes a torrent file into its raw bencode tree.
///
/// With `text` set, strings that are valid UTF-8 come back as
/// [`Value::Text`]; binary fields such as `pieces` stay raw either way.
pub fn load_tree(data: &[u8], text: bool) -> Result<Value, MetainfoError> {
    let tree = if text { decode_text(data)? } else { decode(data)? };
    if tree.as_dict().is_none() {
        return Err(MetainfoError::InvalidField("root"));
    }
    Ok(tree)
}

fn hash_info(info: &Value) -> Result<[u8; 20], MetainfoError> {
    let raw = encode(info)?;
    Ok(Sha1::digest(&raw).into())
}

fn parse_info(value: &Value) -> Result<Info, MetainfoError> {
    let dict = value.as_dict().ok_or(MetainfoError::InvalidField("info"))?;

    let name = text_field(dict, b"name").ok_or(MetainfoError::MissingField("name"))?;
    let piece_length = unsigned_field(dict, b"piece length", "piece length")?
        .ok_or(MetainfoError::MissingField("piece length"))?;

    let blob = dict
        .get(b"pieces".as_slice())
        .and_then(Value::as_bytes)
        .ok_or(MetainfoError::MissingField("pieces"))?;
    if blob.len() % 20 != 0 {
        return Err(MetainfoError::InvalidField("pieces"));
    }
    let pieces = blob
        .chunks_exact(20)
        .map(|chunk| {
            let mut digest = [0u8; 20];
            digest.copy_from_slice(chunk);
            digest
        })
        .collect();

    let files = if let Some(length) = unsigned_field(dict, b"length", "length")? {
        vec![FileEntry {
            path: PathBuf::from(&name),
            length,
        }]
    } else {
        let list = dict
            .get(b"files".as_slice())
            .and_then(Value::as_list)
            .ok_or(MetainfoError::MissingField("length or files"))?;
        list.iter()
            .map(|entry| parse_file(&name, entry))
            .collect::<Result<Vec<_>, _>>()?
    };
    let total_length = files.iter().map(|f| f.length).sum();

    Ok(Info {
        name,
        piece_length,
        pieces,
        files,
        total_length,
    })
}

fn parse_file(name: &str, value: &Value) -> Result<FileEntry, MetainfoError> {
    let dict = value.as_dict().ok_or(MetainfoError::InvalidField("files"))?;
    let length = unsigned_field(dict, b"length", "file length")?
        .ok_or(MetainfoError::MissingField("file length"))?;
    let segments = dict
        .get(b"path".as_slice())
        .and_then(Value::as_list)
        .ok_or(MetainfoError::MissingField("file path"))?;

    let mut path = PathBuf::from(name);
    path.extend(strings(segments));
    Ok(FileEntry { path, length })
}

fn text_field(dict: &BTreeMap<Bytes, Value>, key: &[u8]) -> Option<String> {
    dict.get(key).and_then(Value::as_str).map(String::from)
}

/// `Ok(None)` when absent, an error when present but negative or too large.
fn unsigned_field(
    dict: &BTreeMap<Bytes, Value>,
    key: &[u8],
    name: &'static str,
) -> Result<Option<u64>, MetainfoError> {
    match dict.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_integer()
            .and_then(|v| u64::try_from(v).ok())
            .map(Some)
            .ok_or(MetainfoError::InvalidField(name)),
    }
}

fn strings(list: &[Value]) -> Vec<String> {
    list.iter()
        .filter_map(Value::as_str)
        .map(String::from)
        .collect()
}
