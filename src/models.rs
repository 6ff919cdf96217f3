use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One scraped game item. `url` is carried through the intermediate file
/// only; the cache pass clears it so it never reaches the final output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub title: String,
    pub image: String,
    pub ase: bool,
    pub asa: bool,
    pub gfi: String,
    pub blueprint_path: String,
    pub item_id: String,
    pub item_id_number: String,
}

/// One row of a record set: a single-key mapping from slug to record.
/// Serializes as `{"<slug>": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEntry {
    pub key: String,
    pub record: ItemRecord,
}

impl Serialize for RecordEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.record)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for RecordEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = RecordEntry;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map with a single slug key")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let (key, record) = access
                    .next_entry::<String, ItemRecord>()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                if access.next_key::<String>()?.is_some() {
                    return Err(de::Error::custom("expected exactly one key per record"));
                }
                Ok(RecordEntry { key, record })
            }
        }

        deserializer.deserialize_map(EntryVisitor)
    }
}
