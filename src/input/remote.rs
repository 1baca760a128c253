//! Outbound RDP Input Capability
//!
//! The remote-protocol stack is an external collaborator. The bridge only
//! needs its two input calls, expressed here as [`RemoteInput`].

use bitflags::bitflags;

bitflags! {
    /// `TS_POINTER_EVENT` pointer flags (MS-RDPBCGR 2.2.8.1.1.3.1.1.3)
    ///
    /// The low nine bits carry the wheel rotation magnitude and its sign when
    /// [`PointerFlags::WHEEL`] is set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PointerFlags: u16 {
        /// Wheel rotation is negative (scroll backward)
        const WHEEL_NEGATIVE = 0x0100;
        /// Vertical wheel rotation
        const WHEEL = 0x0200;
        /// Pointer moved
        const MOVE = 0x0800;
        /// Button 1 (left)
        const BUTTON1 = 0x1000;
        /// Button 2
        const BUTTON2 = 0x2000;
        /// Button 3
        const BUTTON3 = 0x4000;
        /// Button pressed (absent means released)
        const DOWN = 0x8000;

        /// Rotation magnitude and sign bits
        const WHEEL_ROTATION_MASK = 0x01FF;
    }
}

impl PointerFlags {
    /// Wheel rotation bits with the given raw magnitude
    pub const fn rotation(magnitude: u16) -> Self {
        Self::from_bits_retain(magnitude & Self::WHEEL_ROTATION_MASK.bits())
    }

    /// Raw rotation bits (magnitude plus sign)
    pub fn rotation_bits(self) -> u16 {
        self.bits() & Self::WHEEL_ROTATION_MASK.bits()
    }
}

/// Input side of the driven RDP stack instance
///
/// Both calls are fire-and-forget: the stack queues the PDU and reports
/// transport failures through its own readiness processing.
pub trait RemoteInput {
    /// Send a pointer event with the given flag word at `(x, y)`
    fn send_pointer(&mut self, flags: PointerFlags, x: u16, y: u16);

    /// Send a keyboard scancode event
    ///
    /// Note the polarity: the stack takes `releasing`, not `pressed`.
    fn send_scancode(&mut self, releasing: bool, extended: bool, scancode: u16);
}

impl<T: RemoteInput + ?Sized> RemoteInput for &mut T {
    fn send_pointer(&mut self, flags: PointerFlags, x: u16, y: u16) {
        (**self).send_pointer(flags, x, y);
    }

    fn send_scancode(&mut self, releasing: bool, extended: bool, scancode: u16) {
        (**self).send_scancode(releasing, extended, scancode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_bits() {
        let flags = PointerFlags::WHEEL | PointerFlags::rotation(0x78);
        assert_eq!(flags.bits(), 0x0278);
        assert_eq!(flags.rotation_bits(), 0x78);
    }

    #[test]
    fn test_rotation_masks_out_of_range_bits() {
        assert_eq!(PointerFlags::rotation(0xFF88).bits(), 0x0188);
    }

    #[test]
    fn test_negative_rotation_includes_sign() {
        let flags = PointerFlags::WHEEL | PointerFlags::WHEEL_NEGATIVE | PointerFlags::rotation(0x88);
        assert_eq!(flags.rotation_bits(), 0x188);
        assert!(flags.contains(PointerFlags::WHEEL_NEGATIVE));
    }
}
