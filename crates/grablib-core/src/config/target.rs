//! Value shapes of the `download` and `build.cat` tables.

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use std::fmt;

use super::OrderedMap;

/// Where a downloaded source goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadTarget {
    /// Destination template for a single file.
    File(String),
    /// Zip archive: entry pattern to target, first match wins.
    Archive(OrderedMap<String, EntryTarget>),
}

/// What happens to archive entries matched by one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryTarget {
    /// Drop matching entries (`null` in JSON, `false` in TOML).
    Skip,
    One(String),
    /// Copy matching entries to every destination.
    Many(Vec<String>),
}

impl DownloadTarget {
    /// Short rendering used in error context.
    pub fn describe(&self) -> String {
        match self {
            DownloadTarget::File(t) => format!("\"{}\"", t),
            DownloadTarget::Archive(rules) => {
                let parts: Vec<String> = rules
                    .iter()
                    .map(|(pattern, target)| format!("\"{}\": {}", pattern, target.describe()))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
        }
    }
}

impl EntryTarget {
    pub fn templates(&self) -> &[String] {
        match self {
            EntryTarget::Skip => &[],
            EntryTarget::One(t) => std::slice::from_ref(t),
            EntryTarget::Many(ts) => ts,
        }
    }

    fn describe(&self) -> String {
        match self {
            EntryTarget::Skip => "null".to_string(),
            EntryTarget::One(t) => format!("\"{}\"", t),
            EntryTarget::Many(ts) => format!("{:?}", ts),
        }
    }
}

impl<'de> Deserialize<'de> for DownloadTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TargetVisitor;

        impl<'de> Visitor<'de> for TargetVisitor {
            type Value = DownloadTarget;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a destination path or a map of archive patterns")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(DownloadTarget::File(v.to_string()))
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                let rules = OrderedMap::deserialize(de::value::MapAccessDeserializer::new(map))?;
                Ok(DownloadTarget::Archive(rules))
            }
        }

        deserializer.deserialize_any(TargetVisitor)
    }
}

impl<'de> Deserialize<'de> for EntryTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = EntryTarget;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a destination, a non-empty list of destinations, null or false")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(EntryTarget::Skip)
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(EntryTarget::Skip)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                if v {
                    Err(E::invalid_value(de::Unexpected::Bool(true), &self))
                } else {
                    Ok(EntryTarget::Skip)
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(EntryTarget::One(v.to_string()))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut targets = Vec::new();
                while let Some(t) = seq.next_element::<String>()? {
                    targets.push(t);
                }
                if targets.is_empty() {
                    return Err(de::Error::invalid_length(0, &self));
                }
                Ok(EntryTarget::Many(targets))
            }
        }

        deserializer.deserialize_any(EntryVisitor)
    }
}

/// One input of a concatenation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatSource {
    /// Path; a `DOWNLOAD/` or `DL/` prefix means "under the download root".
    pub src: String,
    /// Regex to replacement, applied in order to the file content.
    pub replace: OrderedMap<String, String>,
}

impl CatSource {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            replace: OrderedMap::new(),
        }
    }
}

impl<'de> Deserialize<'de> for CatSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Full {
            src: String,
            #[serde(default)]
            replace: OrderedMap<String, String>,
        }

        struct SourceVisitor;

        impl<'de> Visitor<'de> for SourceVisitor {
            type Value = CatSource;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a source path or {src, replace}")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(CatSource::new(v))
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                let full = Full::deserialize(de::value::MapAccessDeserializer::new(map))?;
                Ok(CatSource {
                    src: full.src,
                    replace: full.replace,
                })
            }
        }

        deserializer.deserialize_any(SourceVisitor)
    }
}

/// A single value or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(v) => std::slice::from_ref(v),
            OneOrMany::Many(vs) => vs,
        }
    }
}
