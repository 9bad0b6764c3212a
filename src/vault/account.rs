//! A single credential entry and its fixed binary encoding.
//!
//! Wire layout, repeated back to back inside a decrypted vault:
//!
//! ```text
//! [len(tag): u32 LE][tag][len(username): u32 LE][username]
//! [len(password): u32 LE][password][len(note): u32 LE][note]
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::codec::{put_len_prefixed, ByteCursor, LEN_PREFIX};
use crate::crypto::secure_wipe;
use crate::errors::{ClamError, Result};

/// One credential record.  Every field is wiped when the record is dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Account {
    tag: String,
    username: String,
    password: String,
    note: String,
}

impl Account {
    /// An account with the given tag and empty details.
    pub fn new(tag: &str) -> Self {
        Self::with_credentials(tag, "", "")
    }

    /// An account with a username and password and an empty note.
    pub fn with_credentials(tag: &str, username: &str, password: &str) -> Self {
        Self {
            tag: tag.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            note: String::new(),
        }
    }

    /// Parse an unencrypted import file's contents.
    ///
    /// Line 1 is the username, line 2 the password, and every remaining
    /// line belongs to the note (joined with `\n`, trailing newline
    /// dropped).
    pub fn parse_import(tag: &str, contents: &str) -> Result<Self> {
        let mut lines = contents.lines();
        let (Some(username), Some(password)) = (lines.next(), lines.next()) else {
            return Err(ClamError::ImportFormat(
                "expected a username line and a password line".into(),
            ));
        };

        let mut account = Self::with_credentials(tag, username, password);
        for (i, line) in lines.enumerate() {
            if i > 0 {
                account.note.push('\n');
            }
            account.note.push_str(line);
        }
        Ok(account)
    }

    /// Read and parse an import file.  The raw file contents are wiped
    /// once parsed.
    pub fn from_import_file(tag: &str, path: &Path) -> Result<Self> {
        let contents = Zeroizing::new(fs::read_to_string(path).map_err(|e| {
            ClamError::ImportFormat(format!("cannot read {}: {e}", path.display()))
        })?);
        Self::parse_import(tag, &contents)
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn set_username(&mut self, username: &str) {
        replace_secret(&mut self.username, username);
    }

    pub fn set_password(&mut self, password: &str) {
        replace_secret(&mut self.password, password);
    }

    pub fn set_note(&mut self, note: &str) {
        replace_secret(&mut self.note, note);
    }

    /// Number of bytes `serialize` will produce.
    pub fn encoded_len(&self) -> usize {
        4 * LEN_PREFIX + self.tag.len() + self.username.len() + self.password.len() + self.note.len()
    }

    /// Append this record's encoding to `buf`.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) -> Result<()> {
        put_len_prefixed(buf, self.tag.as_bytes())?;
        put_len_prefixed(buf, self.username.as_bytes())?;
        put_len_prefixed(buf, self.password.as_bytes())?;
        put_len_prefixed(buf, self.note.as_bytes())?;
        Ok(())
    }

    /// Encode this record into a fresh buffer that is wiped when dropped.
    pub fn serialize(&self) -> Result<Zeroizing<Vec<u8>>> {
        let mut buf = Zeroizing::new(Vec::with_capacity(self.encoded_len()));
        self.serialize_into(&mut buf)?;
        Ok(buf)
    }

    /// Decode one record, advancing `cursor` past it.
    ///
    /// Fails with `TruncatedRecord` if a length prefix declares more bytes
    /// than remain, or `MalformedRecord` if a field is not UTF-8.
    pub fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        // Fields already read are wiped if a later one fails.
        let mut tag = read_string(cursor, "tag")?;
        let mut username = read_string(cursor, "username")?;
        let mut password = read_string(cursor, "password")?;
        let mut note = read_string(cursor, "note")?;
        Ok(Self {
            tag: std::mem::take(&mut *tag),
            username: std::mem::take(&mut *username),
            password: std::mem::take(&mut *password),
            note: std::mem::take(&mut *note),
        })
    }

    /// Overwrite all four fields with zeros.
    pub fn wipe_sensitive_data(&mut self) {
        self.zeroize();
    }
}

// Keep secrets out of debug output.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("tag", &self.tag)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("note_len", &self.note.len())
            .finish()
    }
}

fn read_string(cursor: &mut ByteCursor<'_>, field: &str) -> Result<Zeroizing<String>> {
    let bytes = cursor.read_len_prefixed()?;
    String::from_utf8(bytes.to_vec()).map(Zeroizing::new).map_err(|e| {
        let mut bad = e.into_bytes();
        secure_wipe(&mut bad);
        ClamError::MalformedRecord(format!("{field} is not valid UTF-8"))
    })
}

fn replace_secret(slot: &mut String, value: &str) {
    secure_wipe(slot);
    slot.push_str(value);
}
