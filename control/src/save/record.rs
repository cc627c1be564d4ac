//! Binary image of all persisted pairs, fitting a single flash sector.
//!
//! ```text
//! [token u16][version u32][len u8][namespace][count u8]
//! {[len u8][key][tag u8][value 4B]} * count
//! [padding ...][crc u16]
//! ```
//!
//! All integers are little endian. The CRC covers everything but itself.

use crc::{Crc, CRC_16_USB};

use super::{Error, Value};

// This constant is used to invalidate data when needed
const TOKEN: u16 = 1;
const CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_USB);

const SIZE: usize = 512;
const HEADER: usize = 2 + 4;
const PAYLOAD: usize = SIZE - 2;

const TAG_INT: u8 = 0;
const TAG_FLOAT: u8 = 1;
const TAG_BOOL: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidData;

#[derive(Clone, Copy)]
pub struct Record {
    bytes: [u8; SIZE],
}

impl Record {
    pub const SIZE: usize = SIZE;

    /// # Errors
    ///
    /// This fails with `Error::Full` when the pairs do not fit into
    /// `Record::SIZE`, and with `Error::KeyTooLong` when a key or the
    /// namespace is longer than 255 bytes.
    pub fn new<'a>(
        namespace: &str,
        version: u32,
        entries: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> Result<Self, Error> {
        let mut writer = Writer::default();
        writer.put(&TOKEN.to_le_bytes())?;
        writer.put(&version.to_le_bytes())?;
        writer.put_str(namespace)?;

        let count_position = writer.position;
        writer.put(&[0])?;
        let mut count: u8 = 0;
        for (key, value) in entries {
            writer.put_str(key)?;
            writer.put_value(value)?;
            count = count.checked_add(1).ok_or(Error::Full)?;
        }
        writer.bytes[count_position] = count;

        let crc = CRC.checksum(&writer.bytes[..PAYLOAD]);
        writer.bytes[PAYLOAD..].copy_from_slice(&crc.to_le_bytes());

        Ok(Self {
            bytes: writer.bytes,
        })
    }

    /// # Errors
    ///
    /// This fails with `InvalidData` when the recovered bytes do not carry
    /// the expected token, do not pass CRC check or cannot be parsed.
    pub fn from_bytes(bytes: [u8; Self::SIZE]) -> Result<Self, InvalidData> {
        let record = Self { bytes };

        if u16::from_le_bytes([bytes[0], bytes[1]]) != TOKEN {
            return Err(InvalidData);
        }

        let crc = u16::from_le_bytes([bytes[PAYLOAD], bytes[PAYLOAD + 1]]);
        if CRC.checksum(&bytes[..PAYLOAD]) != crc {
            return Err(InvalidData);
        }

        let (_, entries) = record.body().ok_or(InvalidData)?;
        let expected = entries.remaining as usize;
        if entries.count() != expected {
            return Err(InvalidData);
        }

        Ok(record)
    }

    #[must_use]
    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        self.bytes
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        let b = &self.bytes;
        u32::from_le_bytes([b[2], b[3], b[4], b[5]])
    }

    pub fn namespace(&self) -> &str {
        self.body().map_or("", |(namespace, _)| namespace)
    }

    pub fn entries(&self) -> Entries<'_> {
        self.body().map_or_else(Entries::empty, |(_, entries)| entries)
    }

    fn body(&self) -> Option<(&str, Entries<'_>)> {
        let mut reader = Reader::new(&self.bytes[..PAYLOAD]);
        reader.take(HEADER)?;
        let namespace = reader.str()?;
        let remaining = reader.byte()?;
        Some((namespace, Entries { reader, remaining }))
    }
}

pub struct Entries<'a> {
    reader: Reader<'a>,
    remaining: u8,
}

impl<'a> Entries<'a> {
    fn empty() -> Self {
        Self {
            reader: Reader::new(&[]),
            remaining: 0,
        }
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = (&'a str, Value);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let key = self.reader.str()?;
        let value = self.reader.value()?;
        Some((key, value))
    }
}

struct Writer {
    bytes: [u8; SIZE],
    position: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self {
            bytes: [0; SIZE],
            position: 0,
        }
    }
}

impl Writer {
    fn put(&mut self, data: &[u8]) -> Result<(), Error> {
        let end = self.position + data.len();
        if end > PAYLOAD {
            return Err(Error::Full);
        }
        self.bytes[self.position..end].copy_from_slice(data);
        self.position = end;
        Ok(())
    }

    fn put_str(&mut self, s: &str) -> Result<(), Error> {
        let len = u8::try_from(s.len()).map_err(|_| Error::KeyTooLong)?;
        self.put(&[len])?;
        self.put(s.as_bytes())
    }

    fn put_value(&mut self, value: Value) -> Result<(), Error> {
        let (tag, raw) = match value {
            Value::Int(x) => (TAG_INT, x.to_le_bytes()),
            Value::Float(x) => (TAG_FLOAT, x.to_le_bytes()),
            Value::Bool(x) => (TAG_BOOL, [x as u8, 0, 0, 0]),
        };
        self.put(&[tag])?;
        self.put(&raw)
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.position.checked_add(len)?;
        let slice = self.bytes.get(self.position..end)?;
        self.position = end;
        Some(slice)
    }

    fn byte(&mut self) -> Option<u8> {
        self.take(1)?.first().copied()
    }

    fn str(&mut self) -> Option<&'a str> {
        let len = self.byte()?;
        core::str::from_utf8(self.take(len as usize)?).ok()
    }

    fn value(&mut self) -> Option<Value> {
        let tag = self.byte()?;
        let raw: [u8; 4] = self.take(4)?.try_into().ok()?;
        match (tag, raw[0]) {
            (TAG_INT, _) => Some(Value::Int(i32::from_le_bytes(raw))),
            (TAG_FLOAT, _) => Some(Value::Float(f32::from_le_bytes(raw))),
            (TAG_BOOL, 0) => Some(Value::Bool(false)),
            (TAG_BOOL, 1) => Some(Value::Bool(true)),
            _ => None,
        }
    }
}
