//! Keysym to Scancode Resolution
//!
//! Keysyms in the 16-bit range are looked up in a two-level table indexed by
//! their high byte (page) and low byte. The table itself is injected: the
//! resolver only knows how to index it and how to shape the outbound event.

/// Largest keysym that can be looked up
pub const MAX_KEYSYM: u32 = 0xFFFF;

/// Scancode table entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ScancodeEntry {
    /// XT scancode (0 = unmapped)
    pub scancode: u16,
    /// Key needs the extended (E0) prefix
    pub extended: bool,
}

impl ScancodeEntry {
    /// Entry for a keysym with no scancode
    pub const UNMAPPED: Self = Self::new(0, false);

    /// Create an entry
    pub const fn new(scancode: u16, extended: bool) -> Self {
        Self { scancode, extended }
    }

    /// Whether this entry maps to a scancode
    pub const fn is_mapped(&self) -> bool {
        self.scancode != 0
    }
}

/// Read-only keysym → scancode lookup
pub trait KeysymLookup {
    /// Entry at `table[page][index]`
    fn entry(&self, page: u8, index: u8) -> ScancodeEntry;

    /// Look up a keysym, `None` if it lies outside the 16-bit table domain
    fn lookup(&self, keysym: u32) -> Option<ScancodeEntry> {
        if keysym > MAX_KEYSYM {
            return None;
        }
        Some(self.entry(((keysym >> 8) & 0xFF) as u8, (keysym & 0xFF) as u8))
    }
}

impl<T: KeysymLookup + ?Sized> KeysymLookup for &T {
    fn entry(&self, page: u8, index: u8) -> ScancodeEntry {
        (**self).entry(page, index)
    }
}

/// A fully populated static table, as generated keymaps are usually laid out
impl KeysymLookup for [[ScancodeEntry; 256]; 256] {
    fn entry(&self, page: u8, index: u8) -> ScancodeEntry {
        self[page as usize][index as usize]
    }
}

/// Sparse keysym table
///
/// Only pages that hold at least one entry are allocated, so a keymap
/// covering Latin-1 and the 0xFF function-key page costs two pages.
#[derive(Debug, Clone, Default)]
pub struct ScancodeTable {
    pages: Vec<Option<Box<[ScancodeEntry; 256]>>>,
    mapped: usize,
}

impl ScancodeTable {
    /// Create an empty table (every keysym unmapped)
    pub fn new() -> Self {
        Self {
            pages: vec![None; 256],
            mapped: 0,
        }
    }

    /// Set the entry for a keysym, returning the previous one
    pub fn insert(&mut self, keysym: u16, entry: ScancodeEntry) -> ScancodeEntry {
        if self.pages.is_empty() {
            self.pages = vec![None; 256];
        }

        let page = self.pages[(keysym >> 8) as usize]
            .get_or_insert_with(|| Box::new([ScancodeEntry::UNMAPPED; 256]));
        let slot = &mut page[(keysym & 0xFF) as usize];
        let previous = std::mem::replace(slot, entry);

        match (previous.is_mapped(), entry.is_mapped()) {
            (false, true) => self.mapped += 1,
            (true, false) => self.mapped -= 1,
            _ => {}
        }

        previous
    }

    /// Number of keysyms with a scancode
    pub fn mapped_key_count(&self) -> usize {
        self.mapped
    }
}

impl KeysymLookup for ScancodeTable {
    fn entry(&self, page: u8, index: u8) -> ScancodeEntry {
        self.pages
            .get(page as usize)
            .and_then(Option::as_ref)
            .map_or(ScancodeEntry::UNMAPPED, |page| page[index as usize])
    }
}

impl FromIterator<(u16, ScancodeEntry)> for ScancodeTable {
    fn from_iter<I: IntoIterator<Item = (u16, ScancodeEntry)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (keysym, entry) in iter {
            table.insert(keysym, entry);
        }
        table
    }
}

/// Key transition as seen by the RDP input call
///
/// The stack's scancode call takes a *releasing* flag. Building it through
/// this type keeps the inversion in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyTransition {
    /// Key is being released
    pub releasing: bool,
}

impl KeyTransition {
    /// Transition for a client key event
    pub const fn from_pressed(pressed: bool) -> Self {
        Self { releasing: !pressed }
    }
}

/// Scancode event ready for `RemoteInput::send_scancode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScancodeEvent {
    /// Key is being released
    pub releasing: bool,
    /// Extended (E0) key
    pub extended: bool,
    /// XT scancode
    pub scancode: u16,
}

/// Outcome of resolving one key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Send this scancode event
    Send(ScancodeEvent),
    /// Keysym is in range but the table has no scancode for it
    Unmapped(u32),
    /// Keysym is outside the table domain; drop silently
    OutOfRange(u32),
}

/// Resolve a client key event against a keymap
pub fn resolve<K: KeysymLookup + ?Sized>(keymap: &K, keysym: u32, pressed: bool) -> Resolution {
    let Some(entry) = keymap.lookup(keysym) else {
        return Resolution::OutOfRange(keysym);
    };

    if !entry.is_mapped() {
        return Resolution::Unmapped(keysym);
    }

    let transition = KeyTransition::from_pressed(pressed);
    Resolution::Send(ScancodeEvent {
        releasing: transition.releasing,
        extended: entry.extended,
        scancode: entry.scancode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const XK_A: u16 = 0x0061;
    const XK_HOME: u16 = 0xFF50;

    fn keymap() -> ScancodeTable {
        [
            (XK_A, ScancodeEntry::new(0x1E, false)),
            (XK_HOME, ScancodeEntry::new(0x47, true)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_press_is_not_releasing() {
        let resolution = resolve(&keymap(), XK_A as u32, true);
        assert_eq!(
            resolution,
            Resolution::Send(ScancodeEvent {
                releasing: false,
                extended: false,
                scancode: 0x1E,
            })
        );
    }

    #[test]
    fn test_release_is_releasing() {
        match resolve(&keymap(), XK_A as u32, false) {
            Resolution::Send(event) => assert!(event.releasing),
            other => panic!("Expected Send, got {:?}", other),
        }
    }

    #[test]
    fn test_extended_flag_carried() {
        match resolve(&keymap(), XK_HOME as u32, true) {
            Resolution::Send(event) => {
                assert!(event.extended);
                assert_eq!(event.scancode, 0x47);
            }
            other => panic!("Expected Send, got {:?}", other),
        }
    }

    #[test]
    fn test_unmapped_keysym() {
        assert_eq!(resolve(&keymap(), 0x0062, true), Resolution::Unmapped(0x0062));
    }

    #[test]
    fn test_out_of_range_keysym() {
        assert_eq!(
            resolve(&keymap(), 0x1_0000, true),
            Resolution::OutOfRange(0x1_0000)
        );
        assert_eq!(
            resolve(&keymap(), 0x0100_0061, false),
            Resolution::OutOfRange(0x0100_0061)
        );
    }

    #[test]
    fn test_lookup_splits_page_and_index() {
        struct PageProbe;
        impl KeysymLookup for PageProbe {
            fn entry(&self, page: u8, index: u8) -> ScancodeEntry {
                ScancodeEntry::new(((page as u16) << 8) | index as u16, false)
            }
        }

        assert_eq!(PageProbe.lookup(0xFF50).map(|e| e.scancode), Some(0xFF50));
        assert_eq!(PageProbe.lookup(0x0001).map(|e| e.scancode), Some(0x0001));
        assert_eq!(PageProbe.lookup(0x10000), None);
    }

    #[test]
    fn test_static_table_lookup() {
        let mut table = Box::new([[ScancodeEntry::UNMAPPED; 256]; 256]);
        table[0xFF][0x0D] = ScancodeEntry::new(0x1C, false);

        assert_eq!(table.lookup(0xFF0D), Some(ScancodeEntry::new(0x1C, false)));
        assert_eq!(table.lookup(0xFF0E), Some(ScancodeEntry::UNMAPPED));
    }

    #[test]
    fn test_table_mapped_count() {
        let mut table = keymap();
        assert_eq!(table.mapped_key_count(), 2);

        let previous = table.insert(XK_A, ScancodeEntry::UNMAPPED);
        assert_eq!(previous, ScancodeEntry::new(0x1E, false));
        assert_eq!(table.mapped_key_count(), 1);

        table.insert(XK_HOME, ScancodeEntry::new(0x47, true));
        assert_eq!(table.mapped_key_count(), 1);
    }

    #[test]
    fn test_default_table_is_empty() {
        let table = ScancodeTable::default();
        assert_eq!(table.lookup(0x0061), Some(ScancodeEntry::UNMAPPED));
    }
}
