//! Linux input event codes (`linux/input-event-codes.h`) used by padmouse.
//!
//! Only the codes the daemon needs by name are listed here.  Everything else
//! travels through the remapper as an opaque `u16` and is forwarded verbatim.

// ── Event types ───────────────────────────────────────────────────────────────

pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_REL: u16 = 0x02;
pub const EV_ABS: u16 = 0x03;

// ── Synchronization ───────────────────────────────────────────────────────────

pub const SYN_REPORT: u16 = 0;

// ── Keyboard keys used by the default bindings ────────────────────────────────

pub const KEY_ESC: u16 = 1;
pub const KEY_A: u16 = 30;
pub const KEY_I: u16 = 23;
pub const KEY_J: u16 = 36;
pub const KEY_K: u16 = 37;
pub const KEY_L: u16 = 38;
pub const KEY_COMMA: u16 = 51;

/// Highest key code the kernel accepts (`KEY_MAX`).
pub const KEY_MAX: u16 = 0x2ff;

// ── Buttons ───────────────────────────────────────────────────────────────────

/// First code of the button block (`BTN_MISC`).  Codes in
/// `BTN_RANGE_START..BTN_RANGE_END` are buttons, not keyboard keys.
pub const BTN_RANGE_START: u16 = 0x100;
/// One past the last button code of the legacy button block.
pub const BTN_RANGE_END: u16 = 0x160;

pub const BTN_LEFT: u16 = 0x110;
pub const BTN_RIGHT: u16 = 0x111;
pub const BTN_MIDDLE: u16 = 0x112;

/// Reported by touchpads while at least one finger is in contact.
pub const BTN_TOUCH: u16 = 0x14a;

// ── Relative axes ─────────────────────────────────────────────────────────────

pub const REL_X: u16 = 0x00;
pub const REL_WHEEL: u16 = 0x08;

// ── Absolute axes (contact size / pressure) ───────────────────────────────────

pub const ABS_PRESSURE: u16 = 0x18;
pub const ABS_TOOL_WIDTH: u16 = 0x1c;
pub const ABS_MT_TOUCH_MAJOR: u16 = 0x30;
pub const ABS_MT_PRESSURE: u16 = 0x3a;

/// Returns `true` if `code` lies in the button block rather than the keyboard
/// key range.
pub fn is_button_code(code: u16) -> bool {
    (BTN_RANGE_START..BTN_RANGE_END).contains(&code)
}
