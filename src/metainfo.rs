//! Torrent metainfo ([BEP-3]).
//!
//! Reads the fields a peer connection needs from a `.torrent` file: the info
//! hash it is bound to and the piece count that sizes the peer bitfield,
//! along with names, file layout and tracker URLs.
//!
//! ```
//! use btwire::metainfo::Metainfo;
//!
//! let data = b"d8:announce20:http://t.example/ann4:infod6:lengthi5e4:name5:a.txt\
//!              12:piece lengthi16384e6:pieces20:aaaaaaaaaaaaaaaaaaaaee";
//! let torrent = Metainfo::from_bytes(data).unwrap();
//!
//! assert_eq!(torrent.info.name, "a.txt");
//! assert_eq!(torrent.piece_count(), 1);
//! assert_eq!(torrent.trackers(), vec!["http://t.example/ann"]);
//! ```
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod error;
mod torrent;

pub use error::MetainfoError;
pub use torrent::{load_tree, FileEntry, Info, Metainfo};
