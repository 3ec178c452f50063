//! Package metadata descriptor.
//!
//! The descriptor is a line-oriented `Name: value` document. A line that begins
//! with a single space continues the previous value, and the main section ends
//! at the first blank line. Only the main section is read.

use anyhow::{anyhow, Result};
use std::collections::BTreeMap;

/// Default descriptor path inside a package.
pub const DESCRIPTOR_PATH: &str = "META-INF/MANIFEST.MF";

/// Main-section attributes of a package descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Keyed by lower-cased attribute name; the original spelling is kept
    /// alongside the value.
    attributes: BTreeMap<String, (String, String)>,
}

impl Manifest {
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut attributes: BTreeMap<String, (String, String)> = BTreeMap::new();
        let mut current: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.strip_suffix('\r').unwrap_or(raw);

            if line.is_empty() {
                break;
            }

            if let Some(cont) = line.strip_prefix(' ') {
                let key = current.as_ref().ok_or_else(|| {
                    anyhow!("line {}: continuation without a preceding attribute", line_no)
                })?;
                if let Some((_, value)) = attributes.get_mut(key) {
                    value.push_str(cont);
                }
                continue;
            }

            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| anyhow!("line {}: expected `Name: value`, got {:?}", line_no, line))?;
            let name = name.trim();
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(anyhow!("line {}: invalid attribute name {:?}", line_no, name));
            }
            let value = value.strip_prefix(' ').unwrap_or(value);
            let key = name.to_ascii_lowercase();
            attributes.insert(key.clone(), (name.to_string(), value.to_string()));
            current = Some(key);
        }

        Ok(Self { attributes })
    }

    /// Look up an attribute; names compare case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(&name.to_ascii_lowercase())
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Attributes in original spelling.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .values()
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let m = Manifest::parse("Manifest-Version: 1.0\r\nUpgrade-Classes: com.x.Foo com.x.Bar\r\n")
            .unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m.get("Upgrade-Classes"), Some("com.x.Foo com.x.Bar"));
        assert_eq!(m.get("upgrade-classes"), Some("com.x.Foo com.x.Bar"));
        assert_eq!(m.get("Missing"), None);
    }

    #[test]
    fn test_continuation_lines() {
        let m = Manifest::parse("Upgrade-Classes: com.x.Foo\n  com.x.Bar\n com.x.Baz\n").unwrap();
        // The continuation marker space is dropped, the rest of the line is kept.
        assert_eq!(m.get("Upgrade-Classes"), Some("com.x.Foo com.x.Barcom.x.Baz"));
    }

    #[test]
    fn test_main_section_ends_at_blank_line() {
        let m = Manifest::parse("A: 1\n\nName: com/x/\nB: 2\n").unwrap();
        assert_eq!(m.get("A"), Some("1"));
        assert_eq!(m.get("B"), None);
    }

    #[test]
    fn test_malformed_lines() {
        assert!(Manifest::parse("no colon here\n").is_err());
        assert!(Manifest::parse(" leading continuation\n").is_err());
        assert!(Manifest::parse("Bad Name: x\n").is_err());
    }

    #[test]
    fn test_empty_descriptor() {
        assert!(Manifest::parse("").unwrap().is_empty());
    }
}
