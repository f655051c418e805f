/// One piano key and the code the module firmware plays for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDefinition {
    pub code: char,
    pub label: &'static str,
}

impl KeyDefinition {
    const fn new(code: char, label: &'static str) -> Self {
        KeyDefinition { code, label }
    }

    /// The string written to the serial link when this key is pressed.
    pub fn code_str(&self) -> String {
        self.code.to_string()
    }

    pub fn is_accidental(&self) -> bool {
        ACCIDENTAL_KEYS.contains(self)
    }
}

impl std::fmt::Display for KeyDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

pub const NATURAL_KEYS: [KeyDefinition; 7] = [
    KeyDefinition::new('a', "C"),
    KeyDefinition::new('c', "D"),
    KeyDefinition::new('e', "E"),
    KeyDefinition::new('f', "F"),
    KeyDefinition::new('h', "G"),
    KeyDefinition::new('j', "A"),
    KeyDefinition::new('l', "B"),
];

pub const ACCIDENTAL_KEYS: [KeyDefinition; 5] = [
    KeyDefinition::new('b', "C#"),
    KeyDefinition::new('d', "D#"),
    KeyDefinition::new('g', "F#"),
    KeyDefinition::new('i', "G#"),
    KeyDefinition::new('k', "A#"),
];

/// A natural key together with the accidental drawn on top of it, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySlot {
    pub natural: KeyDefinition,
    pub accidental: Option<KeyDefinition>,
}

// no black key between E-F and B-C
fn has_accidental(natural: &KeyDefinition) -> bool {
    natural.label != "E" && natural.label != "B"
}

/// The keyboard from left to right.
pub fn keyboard_layout() -> Vec<KeySlot> {
    let mut accidentals = ACCIDENTAL_KEYS.iter();

    NATURAL_KEYS
        .iter()
        .map(|natural| KeySlot {
            natural: *natural,
            accidental: if has_accidental(natural) { accidentals.next().copied() } else { None },
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn all_keys() -> impl Iterator<Item = &'static KeyDefinition> {
    NATURAL_KEYS.iter().chain(ACCIDENTAL_KEYS.iter())
}

#[cfg(test)]
pub(crate) fn find_key(label: &str) -> Option<KeyDefinition> {
    all_keys().find(|key| key.label.eq_ignore_ascii_case(label)).copied()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use super::*;

    #[test]
    fn codes_are_unique() {
        let codes: HashSet<char> = all_keys().map(|key| key.code).collect();
        assert_eq!(codes.len(), 12);

        let labels: HashSet<&str> = all_keys().map(|key| key.label).collect();
        assert_eq!(labels.len(), 12);
    }

    #[test]
    fn codes_are_single_ascii_bytes() {
        for key in all_keys() {
            assert!(key.code.is_ascii_lowercase(), "{} has code {:?}", key, key.code);
            assert_eq!(key.code_str().len(), 1);
        }
    }

    #[test]
    fn c_sharp_sends_b() {
        let key = find_key("C#").unwrap();
        assert_eq!(key.code_str(), "b");
        assert!(key.is_accidental());
    }

    #[test]
    fn naturals_map_to_expected_codes() {
        let expected = [("C", 'a'), ("D", 'c'), ("E", 'e'), ("F", 'f'), ("G", 'h'), ("A", 'j'), ("B", 'l')];
        for (label, code) in expected {
            let key = find_key(label).unwrap();
            assert_eq!(key.code, code);
            assert!(!key.is_accidental());
        }
    }

    #[test]
    fn layout_skips_e_and_b() {
        let layout = keyboard_layout();
        let pairs: Vec<(&str, Option<&str>)> = layout
            .iter()
            .map(|slot| (slot.natural.label, slot.accidental.map(|key| key.label)))
            .collect();

        assert_eq!(pairs, vec![
            ("C", Some("C#")),
            ("D", Some("D#")),
            ("E", None),
            ("F", Some("F#")),
            ("G", Some("G#")),
            ("A", Some("A#")),
            ("B", None),
        ]);
    }

    #[test]
    fn layout_is_stable_across_calls() {
        assert_eq!(keyboard_layout(), keyboard_layout());
    }

    #[test]
    fn unknown_lookups() {
        assert_eq!(find_key("H"), None);
    }
}
