//! Pointer Button State Translation
//!
//! The display protocol reports the full button state with every pointer
//! event. RDP wants edges: a move, a button release, or a button press.
//! This module derives those edges from the difference between two masks.

use enumflags2::{bitflags, make_bitflags, BitFlags};
use tracing::debug;

use crate::input::remote::PointerFlags;

/// Wheel rotation sent for one forward scroll step (120 = one notch)
pub const WHEEL_FORWARD_STEP: u16 = 0x0078;

/// Wheel rotation sent for one backward scroll step (-120 in the nine-bit
/// two's complement field once combined with [`PointerFlags::WHEEL_NEGATIVE`])
pub const WHEEL_BACKWARD_STEP: u16 = 0x0088;

/// One signal in the display protocol's pointer button mask
#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerSignal {
    /// Left button
    Left = 0x01,
    /// Right button
    Right = 0x02,
    /// Middle button
    Middle = 0x04,
    /// Momentary forward scroll
    ScrollForward = 0x08,
    /// Momentary backward scroll
    ScrollBackward = 0x10,
}

/// Pointer button mask as reported by the display protocol
pub type ButtonMask = BitFlags<PointerSignal>;

impl PointerSignal {
    /// Signals that have both a press and a release edge
    pub const BUTTONS: ButtonMask = make_bitflags!(PointerSignal::{Left | Right | Middle});

    /// Protocol flags contributed by this signal
    ///
    /// RDP numbers buttons differently from the display protocol, so
    /// `Right` lands on `BUTTON3` and `Middle` on `BUTTON2`.
    pub fn pointer_flags(self) -> PointerFlags {
        match self {
            PointerSignal::Left => PointerFlags::BUTTON1,
            PointerSignal::Right => PointerFlags::BUTTON3,
            PointerSignal::Middle => PointerFlags::BUTTON2,
            PointerSignal::ScrollForward => {
                PointerFlags::WHEEL | PointerFlags::rotation(WHEEL_FORWARD_STEP)
            }
            PointerSignal::ScrollBackward => {
                PointerFlags::WHEEL
                    | PointerFlags::WHEEL_NEGATIVE
                    | PointerFlags::rotation(WHEEL_BACKWARD_STEP)
            }
        }
    }
}

/// Build a mask from the raw integer the client sent
///
/// Bits above the five known signals are ignored.
pub fn button_mask(raw: u32) -> ButtonMask {
    BitFlags::from_bits_truncate((raw & 0xFF) as u8)
}

/// Kind of outbound pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Movement only, no button change
    Move,
    /// One or more buttons released
    Release,
    /// One or more buttons pressed and/or a wheel step
    Press,
}

/// Pointer event ready for `RemoteInput::send_pointer`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    /// Event kind
    pub kind: PointerEventKind,
    /// Protocol flag word
    pub flags: PointerFlags,
    /// X coordinate
    pub x: u16,
    /// Y coordinate
    pub y: u16,
}

/// Derive the outbound pointer events for a transition from `old` to `new`
///
/// An unchanged mask yields a single move. A changed mask yields at most one
/// release (buttons only) followed by at most one press (buttons and wheel),
/// and never a move: RDP button events carry the position themselves.
pub fn translate(old: ButtonMask, new: ButtonMask, x: u16, y: u16) -> Vec<PointerEvent> {
    if old == new {
        return vec![PointerEvent {
            kind: PointerEventKind::Move,
            flags: PointerFlags::MOVE,
            x,
            y,
        }];
    }

    let released = old & !new & PointerSignal::BUTTONS;
    let pressed = !old & new;

    let mut events = Vec::with_capacity(2);

    if !released.is_empty() {
        events.push(PointerEvent {
            kind: PointerEventKind::Release,
            flags: fold_flags(released),
            x,
            y,
        });
    }

    if !pressed.is_empty() {
        events.push(PointerEvent {
            kind: PointerEventKind::Press,
            flags: PointerFlags::DOWN | fold_flags(pressed),
            x,
            y,
        });
    }

    debug!(
        "Pointer mask {:#04x} -> {:#04x}: released={:?} pressed={:?}",
        old.bits(),
        new.bits(),
        released,
        pressed
    );

    events
}

fn fold_flags(signals: ButtonMask) -> PointerFlags {
    signals
        .iter()
        .fold(PointerFlags::empty(), |flags, signal| flags | signal.pointer_flags())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(raw: u32) -> ButtonMask {
        button_mask(raw)
    }

    #[test]
    fn test_unchanged_mask_moves() {
        let events = translate(mask(0x01), mask(0x01), 10, 20);
        assert_eq!(
            events,
            vec![PointerEvent {
                kind: PointerEventKind::Move,
                flags: PointerFlags::MOVE,
                x: 10,
                y: 20,
            }]
        );
    }

    #[test]
    fn test_left_press() {
        let events = translate(mask(0x00), mask(0x01), 5, 6);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, PointerEventKind::Press);
        assert_eq!(events[0].flags, PointerFlags::DOWN | PointerFlags::BUTTON1);
        assert_eq!((events[0].x, events[0].y), (5, 6));
    }

    #[test]
    fn test_left_release() {
        let events = translate(mask(0x01), mask(0x00), 5, 6);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, PointerEventKind::Release);
        assert_eq!(events[0].flags, PointerFlags::BUTTON1);
    }

    #[test]
    fn test_combined_release() {
        let events = translate(mask(0x03), mask(0x00), 0, 0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, PointerEventKind::Release);
        assert_eq!(events[0].flags, PointerFlags::BUTTON1 | PointerFlags::BUTTON3);
    }

    #[test]
    fn test_button_numbering() {
        let right = translate(mask(0x00), mask(0x02), 0, 0);
        assert_eq!(right[0].flags, PointerFlags::DOWN | PointerFlags::BUTTON3);

        let middle = translate(mask(0x00), mask(0x04), 0, 0);
        assert_eq!(middle[0].flags, PointerFlags::DOWN | PointerFlags::BUTTON2);
    }

    #[test]
    fn test_scroll_forward() {
        let events = translate(mask(0x00), mask(0x08), 0, 0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, PointerEventKind::Press);
        assert_eq!(events[0].flags.bits(), 0x8000 | 0x0200 | 0x0078);
    }

    #[test]
    fn test_scroll_backward() {
        let events = translate(mask(0x00), mask(0x10), 0, 0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].flags.bits(), 0x8000 | 0x0200 | 0x0100 | 0x0088);
    }

    #[test]
    fn test_scroll_end_emits_nothing() {
        // Wheel signals have no release edge
        let events = translate(mask(0x08), mask(0x00), 0, 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_release_precedes_press() {
        let events = translate(mask(0x01), mask(0x02), 7, 8);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, PointerEventKind::Release);
        assert_eq!(events[0].flags, PointerFlags::BUTTON1);
        assert_eq!(events[1].kind, PointerEventKind::Press);
        assert_eq!(events[1].flags, PointerFlags::DOWN | PointerFlags::BUTTON3);
    }

    #[test]
    fn test_press_with_held_button_and_scroll() {
        // Left held, scroll step arrives: only the wheel is new
        let events = translate(mask(0x01), mask(0x09), 0, 0);
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].flags,
            PointerFlags::DOWN | PointerFlags::WHEEL | PointerFlags::rotation(WHEEL_FORWARD_STEP)
        );
    }

    #[test]
    fn test_unknown_bits_ignored() {
        assert_eq!(mask(0xE1), mask(0x01));
        assert_eq!(mask(0x1_0000), ButtonMask::empty());
    }

    #[test]
    fn test_signal_flags() {
        assert_eq!(PointerSignal::Left.pointer_flags(), PointerFlags::BUTTON1);
        assert_eq!(PointerSignal::Right.pointer_flags(), PointerFlags::BUTTON3);
        assert_eq!(PointerSignal::Middle.pointer_flags(), PointerFlags::BUTTON2);
        assert_eq!(PointerSignal::BUTTONS.bits(), 0x07);
    }
}
