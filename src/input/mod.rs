//! Input Event Translation
//!
//! Converts display-protocol input (button bitmasks and keysyms) into the
//! edge events and scancodes an RDP stack expects.
//!
//! # Architecture
//!
//! ```text
//! Pointer (x, y, mask)           Key (keysym, pressed)
//!       ↓                              ↓
//! ┌─────────────────────────────────────────────┐
//! │  InputBridge            ← per-session state │
//! │  - current ButtonMask                       │
//! │  - injected KeysymLookup                    │
//! └─────────────────────────────────────────────┘
//!       ↓                              ↓
//! ┌──────────────┐              ┌──────────────┐
//! │   buttons    │              │    keysym    │
//! │  mask delta  │              │  table page/ │
//! │  → flags     │              │  index →     │
//! │              │              │  scancode    │
//! └──────────────┘              └──────────────┘
//!       ↓                              ↓
//!  send_pointer(flags, x, y)    send_scancode(releasing, extended, code)
//!                  RemoteInput (RDP stack)
//! ```
//!
//! # Example
//!
//! ```rust
//! use lamco_rdp_gateway::input::{
//!     InputBridge, PointerFlags, RemoteInput, ScancodeEntry, ScancodeTable,
//! };
//!
//! #[derive(Default)]
//! struct Recorder {
//!     pointer: Vec<(PointerFlags, u16, u16)>,
//!     keys: Vec<(bool, bool, u16)>,
//! }
//!
//! impl RemoteInput for Recorder {
//!     fn send_pointer(&mut self, flags: PointerFlags, x: u16, y: u16) {
//!         self.pointer.push((flags, x, y));
//!     }
//!
//!     fn send_scancode(&mut self, releasing: bool, extended: bool, scancode: u16) {
//!         self.keys.push((releasing, extended, scancode));
//!     }
//! }
//!
//! let keymap: ScancodeTable = [(0x0061, ScancodeEntry::new(0x1E, false))]
//!     .into_iter()
//!     .collect();
//! let mut bridge = InputBridge::new(keymap);
//! let mut session = Recorder::default();
//!
//! bridge.handle_pointer(&mut session, 100, 200, 0x01);
//! assert_eq!(
//!     session.pointer,
//!     vec![(PointerFlags::DOWN | PointerFlags::BUTTON1, 100, 200)]
//! );
//!
//! bridge.handle_key(&mut session, 0x0061, true);
//! assert_eq!(session.keys, vec![(false, false, 0x1E)]);
//! ```

pub mod bridge;
pub mod buttons;
pub mod keysym;
pub mod remote;

pub use bridge::{clamp_coordinate, InputBridge, InputStats};
pub use buttons::{
    button_mask, translate, ButtonMask, PointerEvent, PointerEventKind, PointerSignal,
    WHEEL_BACKWARD_STEP, WHEEL_FORWARD_STEP,
};
pub use keysym::{
    resolve, KeyTransition, KeysymLookup, Resolution, ScancodeEntry, ScancodeEvent,
    ScancodeTable, MAX_KEYSYM,
};
pub use remote::{PointerFlags, RemoteInput};
