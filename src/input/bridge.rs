//! Per-Session Input Bridge
//!
//! Holds the state one client connection needs to translate its input: the
//! last button mask and the injected keymap. Each inbound event is translated
//! and forwarded to the session's [`RemoteInput`] before the call returns.

use tracing::{debug, info, trace};

use crate::config::InputConfig;
use crate::input::buttons::{button_mask, translate, ButtonMask};
use crate::input::keysym::{resolve, KeysymLookup, Resolution};
use crate::input::remote::RemoteInput;

/// Narrow a client coordinate to the RDP pointer range
pub fn clamp_coordinate(value: i64) -> u16 {
    value.clamp(0, i64::from(u16::MAX)) as u16
}

/// Counters for one bridge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputStats {
    /// Pointer events received from the client
    pub pointer_events: u64,
    /// Key events received from the client
    pub key_events: u64,
    /// Pointer PDUs sent to the RDP stack
    pub pointer_sent: u64,
    /// Scancode PDUs sent to the RDP stack
    pub scancodes_sent: u64,
    /// Key events dropped because the keymap has no scancode
    pub unmapped_keysyms: u64,
    /// Key events dropped because the keysym is outside the table domain
    pub out_of_range_keysyms: u64,
}

/// Input bridge for one session
#[derive(Debug)]
pub struct InputBridge<K> {
    keymap: K,
    button_mask: ButtonMask,
    log_unmapped: bool,
    stats: InputStats,
}

impl<K: KeysymLookup> InputBridge<K> {
    /// Create a bridge with no buttons held
    pub fn new(keymap: K) -> Self {
        Self {
            keymap,
            button_mask: ButtonMask::empty(),
            log_unmapped: true,
            stats: InputStats::default(),
        }
    }

    /// Create a bridge configured from the `[input]` section
    pub fn from_config(keymap: K, config: &InputConfig) -> Self {
        let mut bridge = Self::new(keymap);
        bridge.set_log_unmapped(config.log_unmapped_keysyms);
        bridge
    }

    /// Enable or disable the informational record for unmapped keysyms
    pub fn set_log_unmapped(&mut self, enabled: bool) {
        self.log_unmapped = enabled;
    }

    /// Handle a client pointer event
    ///
    /// The stored mask changes only after every derived event was sent.
    ///
    /// RDP pointer PDUs carry unsigned 16-bit positions. Callers holding
    /// wider or signed client coordinates narrow them with
    /// [`clamp_coordinate`]: negatives become 0 and anything past the range
    /// becomes `u16::MAX`.
    pub fn handle_pointer<R>(&mut self, remote: &mut R, x: u16, y: u16, raw_mask: u32)
    where
        R: RemoteInput + ?Sized,
    {
        self.stats.pointer_events += 1;

        let new_mask = button_mask(raw_mask);
        let events = translate(self.button_mask, new_mask, x, y);

        for event in &events {
            trace!(
                "Pointer {:?}: flags={:#06x} at ({}, {})",
                event.kind,
                event.flags.bits(),
                event.x,
                event.y
            );
            remote.send_pointer(event.flags, event.x, event.y);
        }

        self.stats.pointer_sent += events.len() as u64;
        self.button_mask = new_mask;
    }

    /// Handle a client key event
    pub fn handle_key<R>(&mut self, remote: &mut R, keysym: u32, pressed: bool)
    where
        R: RemoteInput + ?Sized,
    {
        self.stats.key_events += 1;

        match resolve(&self.keymap, keysym, pressed) {
            Resolution::Send(event) => {
                debug!(
                    "Keysym {:#06x} -> scancode {:#04x} (extended={}, releasing={})",
                    keysym, event.scancode, event.extended, event.releasing
                );
                remote.send_scancode(event.releasing, event.extended, event.scancode);
                self.stats.scancodes_sent += 1;
            }
            Resolution::Unmapped(keysym) => {
                self.stats.unmapped_keysyms += 1;
                if self.log_unmapped {
                    info!("unmapped keysym: {:#x}", keysym);
                }
            }
            Resolution::OutOfRange(_) => {
                self.stats.out_of_range_keysyms += 1;
            }
        }
    }

    /// Button mask after the last pointer event
    pub fn button_mask(&self) -> ButtonMask {
        self.button_mask
    }

    /// Counters since creation
    pub fn stats(&self) -> InputStats {
        self.stats
    }

    /// Injected keymap
    pub fn keymap(&self) -> &K {
        &self.keymap
    }
}
