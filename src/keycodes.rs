//! USB HID keyboard usage IDs (usage page 0x07).
//!
//! Only the keyboard/keypad page is carried here; consumer and system pages
//! are not reported by this firmware.

pub const KC_NO: u8 = 0x00;
pub const KC_ROLL_OVER: u8 = 0x01;
pub const KC_POST_FAIL: u8 = 0x02;
pub const KC_UNDEFINED: u8 = 0x03;
pub const KC_A: u8 = 0x04;
pub const KC_B: u8 = 0x05;
pub const KC_C: u8 = 0x06;
pub const KC_D: u8 = 0x07;
pub const KC_E: u8 = 0x08;
pub const KC_F: u8 = 0x09;
pub const KC_G: u8 = 0x0A;
pub const KC_H: u8 = 0x0B;
pub const KC_I: u8 = 0x0C;
pub const KC_J: u8 = 0x0D;
pub const KC_K: u8 = 0x0E;
pub const KC_L: u8 = 0x0F;
pub const KC_M: u8 = 0x10;
pub const KC_N: u8 = 0x11;
pub const KC_O: u8 = 0x12;
pub const KC_P: u8 = 0x13;
pub const KC_Q: u8 = 0x14;
pub const KC_R: u8 = 0x15;
pub const KC_S: u8 = 0x16;
pub const KC_T: u8 = 0x17;
pub const KC_U: u8 = 0x18;
pub const KC_V: u8 = 0x19;
pub const KC_W: u8 = 0x1A;
pub const KC_X: u8 = 0x1B;
pub const KC_Y: u8 = 0x1C;
pub const KC_Z: u8 = 0x1D;
pub const KC_1: u8 = 0x1E;
pub const KC_2: u8 = 0x1F;
pub const KC_3: u8 = 0x20;
pub const KC_4: u8 = 0x21;
pub const KC_5: u8 = 0x22;
pub const KC_6: u8 = 0x23;
pub const KC_7: u8 = 0x24;
pub const KC_8: u8 = 0x25;
pub const KC_9: u8 = 0x26;
pub const KC_0: u8 = 0x27;
pub const KC_ENTER: u8 = 0x28;
pub const KC_ESCAPE: u8 = 0x29;
pub const KC_BSPACE: u8 = 0x2A;
pub const KC_TAB: u8 = 0x2B;
pub const KC_SPACE: u8 = 0x2C;
pub const KC_MINUS: u8 = 0x2D;
pub const KC_EQUAL: u8 = 0x2E;
pub const KC_LBRACKET: u8 = 0x2F;
pub const KC_RBRACKET: u8 = 0x30;
pub const KC_BSLASH: u8 = 0x31;
pub const KC_NONUS_HASH: u8 = 0x32;
pub const KC_SCOLON: u8 = 0x33;
pub const KC_QUOTE: u8 = 0x34;
pub const KC_GRAVE: u8 = 0x35;
pub const KC_COMMA: u8 = 0x36;
pub const KC_DOT: u8 = 0x37;
pub const KC_SLASH: u8 = 0x38;
pub const KC_CAPSLOCK: u8 = 0x39;
pub const KC_F1: u8 = 0x3A;
pub const KC_F2: u8 = 0x3B;
pub const KC_F3: u8 = 0x3C;
pub const KC_F4: u8 = 0x3D;
pub const KC_F5: u8 = 0x3E;
pub const KC_F6: u8 = 0x3F;
pub const KC_F7: u8 = 0x40;
pub const KC_F8: u8 = 0x41;
pub const KC_F9: u8 = 0x42;
pub const KC_F10: u8 = 0x43;
pub const KC_F11: u8 = 0x44;
pub const KC_F12: u8 = 0x45;
pub const KC_PTRSCR: u8 = 0x46;
pub const KC_SCRLOCK: u8 = 0x47;
pub const KC_PAUSE: u8 = 0x48;
pub const KC_INSERT: u8 = 0x49;
pub const KC_HOME: u8 = 0x4A;
pub const KC_PGUP: u8 = 0x4B;
pub const KC_DELETE: u8 = 0x4C;
pub const KC_END: u8 = 0x4D;
pub const KC_PGDN: u8 = 0x4E;
pub const KC_RIGHT: u8 = 0x4F;
pub const KC_LEFT: u8 = 0x50;
pub const KC_DOWN: u8 = 0x51;
pub const KC_UP: u8 = 0x52;
pub const KC_NUMLOCK: u8 = 0x53;
pub const KC_KP_SLASH: u8 = 0x54;
pub const KC_KP_ASTERISK: u8 = 0x55;
pub const KC_KP_MINUS: u8 = 0x56;
pub const KC_KP_PLUS: u8 = 0x57;
pub const KC_KP_ENTER: u8 = 0x58;
pub const KC_KP_1: u8 = 0x59;
pub const KC_KP_2: u8 = 0x5A;
pub const KC_KP_3: u8 = 0x5B;
pub const KC_KP_4: u8 = 0x5C;
pub const KC_KP_5: u8 = 0x5D;
pub const KC_KP_6: u8 = 0x5E;
pub const KC_KP_7: u8 = 0x5F;
pub const KC_KP_8: u8 = 0x60;
pub const KC_KP_9: u8 = 0x61;
pub const KC_KP_0: u8 = 0x62;
pub const KC_KP_DOT: u8 = 0x63;
pub const KC_NONUS_BSLASH: u8 = 0x64;
pub const KC_APPLICATION: u8 = 0x65;
pub const KC_POWER: u8 = 0x66;
pub const KC_KP_EQUAL: u8 = 0x67;
pub const KC_F13: u8 = 0x68;
pub const KC_F14: u8 = 0x69;
pub const KC_F15: u8 = 0x6A;
pub const KC_F16: u8 = 0x6B;
pub const KC_F17: u8 = 0x6C;
pub const KC_F18: u8 = 0x6D;
pub const KC_F19: u8 = 0x6E;
pub const KC_F20: u8 = 0x6F;
pub const KC_F21: u8 = 0x70;
pub const KC_F22: u8 = 0x71;
pub const KC_F23: u8 = 0x72;
pub const KC_F24: u8 = 0x73;
pub const KC_EXECUTE: u8 = 0x74;
pub const KC_HELP: u8 = 0x75;
pub const KC_MENU: u8 = 0x76;
pub const KC_SELECT: u8 = 0x77;
pub const KC_STOP: u8 = 0x78;
pub const KC_AGAIN: u8 = 0x79;
pub const KC_UNDO: u8 = 0x7A;
pub const KC_CUT: u8 = 0x7B;
pub const KC_COPY: u8 = 0x7C;
pub const KC_PASTE: u8 = 0x7D;
pub const KC_FIND: u8 = 0x7E;
pub const KC_MUTE: u8 = 0x7F;
pub const KC_VOLUP: u8 = 0x80;
pub const KC_VOLDOWN: u8 = 0x81;
pub const KC_LOCKING_CAPS: u8 = 0x82;
pub const KC_LOCKING_NUM: u8 = 0x83;
pub const KC_LOCKING_SCROLL: u8 = 0x84;
pub const KC_KP_COMMA: u8 = 0x85;
pub const KC_KP_EQUAL_AS400: u8 = 0x86;
pub const KC_INT1: u8 = 0x87;
pub const KC_INT2: u8 = 0x88;
pub const KC_INT3: u8 = 0x89;
pub const KC_INT4: u8 = 0x8A;
pub const KC_INT5: u8 = 0x8B;
pub const KC_INT6: u8 = 0x8C;
pub const KC_INT7: u8 = 0x8D;
pub const KC_INT8: u8 = 0x8E;
pub const KC_INT9: u8 = 0x8F;
pub const KC_LANG1: u8 = 0x90;
pub const KC_LANG2: u8 = 0x91;
pub const KC_LANG3: u8 = 0x92;
pub const KC_LANG4: u8 = 0x93;
pub const KC_LANG5: u8 = 0x94;
pub const KC_ALT_ERASE: u8 = 0x99;
pub const KC_SYSREQ: u8 = 0x9A;
pub const KC_CANCEL: u8 = 0x9B;
pub const KC_CLEAR: u8 = 0x9C;
pub const KC_PRIOR: u8 = 0x9D;
pub const KC_RETURN: u8 = 0x9E;
pub const KC_SEPARATOR: u8 = 0x9F;
pub const KC_OUT: u8 = 0xA0;
pub const KC_OPER: u8 = 0xA1;
pub const KC_CLEAR_AGAIN: u8 = 0xA2;
pub const KC_CRSEL: u8 = 0xA3;
pub const KC_EXSEL: u8 = 0xA4;

// Modifiers. Bit position in the report's modifier byte is `code & 7`.
pub const KC_LCTRL: u8 = 0xE0;
pub const KC_LSHIFT: u8 = 0xE1;
pub const KC_LALT: u8 = 0xE2;
pub const KC_LGUI: u8 = 0xE3;
pub const KC_RCTRL: u8 = 0xE4;
pub const KC_RSHIFT: u8 = 0xE5;
pub const KC_RALT: u8 = 0xE6;
pub const KC_RGUI: u8 = 0xE7;

/// Is this usage ID one of the eight modifiers carried in the modifier byte?
pub const fn is_modifier(code: u8) -> bool {
    code >= KC_LCTRL
}

/// Bit mask within the modifier byte for a modifier usage ID.
pub const fn modifier_bit(code: u8) -> u8 {
    1 << (code & 7)
}

/// Human-readable usage name for log lines.
pub const fn name(code: u8) -> &'static str {
    match code {
        KC_NO => "NO",
        KC_ROLL_OVER => "ROLL_OVER",
        KC_POST_FAIL => "POST_FAIL",
        KC_UNDEFINED => "UNDEFINED",
        KC_A => "A",
        KC_B => "B",
        KC_C => "C",
        KC_D => "D",
        KC_E => "E",
        KC_F => "F",
        KC_G => "G",
        KC_H => "H",
        KC_I => "I",
        KC_J => "J",
        KC_K => "K",
        KC_L => "L",
        KC_M => "M",
        KC_N => "N",
        KC_O => "O",
        KC_P => "P",
        KC_Q => "Q",
        KC_R => "R",
        KC_S => "S",
        KC_T => "T",
        KC_U => "U",
        KC_V => "V",
        KC_W => "W",
        KC_X => "X",
        KC_Y => "Y",
        KC_Z => "Z",
        KC_1 => "1",
        KC_2 => "2",
        KC_3 => "3",
        KC_4 => "4",
        KC_5 => "5",
        KC_6 => "6",
        KC_7 => "7",
        KC_8 => "8",
        KC_9 => "9",
        KC_0 => "0",
        KC_ENTER => "ENTER",
        KC_ESCAPE => "ESCAPE",
        KC_BSPACE => "BSPACE",
        KC_TAB => "TAB",
        KC_SPACE => "SPACE",
        KC_MINUS => "MINUS",
        KC_EQUAL => "EQUAL",
        KC_LBRACKET => "LBRACKET",
        KC_RBRACKET => "RBRACKET",
        KC_BSLASH => "BSLASH",
        KC_NONUS_HASH => "NONUS_HASH",
        KC_SCOLON => "SCOLON",
        KC_QUOTE => "QUOTE",
        KC_GRAVE => "GRAVE",
        KC_COMMA => "COMMA",
        KC_DOT => "DOT",
        KC_SLASH => "SLASH",
        KC_CAPSLOCK => "CAPSLOCK",
        KC_F1 => "F1",
        KC_F2 => "F2",
        KC_F3 => "F3",
        KC_F4 => "F4",
        KC_F5 => "F5",
        KC_F6 => "F6",
        KC_F7 => "F7",
        KC_F8 => "F8",
        KC_F9 => "F9",
        KC_F10 => "F10",
        KC_F11 => "F11",
        KC_F12 => "F12",
        KC_PTRSCR => "PTRSCR",
        KC_SCRLOCK => "SCRLOCK",
        KC_PAUSE => "PAUSE",
        KC_INSERT => "INSERT",
        KC_HOME => "HOME",
        KC_PGUP => "PGUP",
        KC_DELETE => "DELETE",
        KC_END => "END",
        KC_PGDN => "PGDN",
        KC_RIGHT => "RIGHT",
        KC_LEFT => "LEFT",
        KC_DOWN => "DOWN",
        KC_UP => "UP",
        KC_NUMLOCK => "NUMLOCK",
        KC_KP_SLASH => "KP_SLASH",
        KC_KP_ASTERISK => "KP_ASTERISK",
        KC_KP_MINUS => "KP_MINUS",
        KC_KP_PLUS => "KP_PLUS",
        KC_KP_ENTER => "KP_ENTER",
        KC_KP_1 => "KP_1",
        KC_KP_2 => "KP_2",
        KC_KP_3 => "KP_3",
        KC_KP_4 => "KP_4",
        KC_KP_5 => "KP_5",
        KC_KP_6 => "KP_6",
        KC_KP_7 => "KP_7",
        KC_KP_8 => "KP_8",
        KC_KP_9 => "KP_9",
        KC_KP_0 => "KP_0",
        KC_KP_DOT => "KP_DOT",
        KC_NONUS_BSLASH => "NONUS_BSLASH",
        KC_APPLICATION => "APPLICATION",
        KC_POWER => "POWER",
        KC_KP_EQUAL => "KP_EQUAL",
        KC_F13 => "F13",
        KC_F14 => "F14",
        KC_F15 => "F15",
        KC_F16 => "F16",
        KC_F17 => "F17",
        KC_F18 => "F18",
        KC_F19 => "F19",
        KC_F20 => "F20",
        KC_F21 => "F21",
        KC_F22 => "F22",
        KC_F23 => "F23",
        KC_F24 => "F24",
        KC_EXECUTE => "EXECUTE",
        KC_HELP => "HELP",
        KC_MENU => "MENU",
        KC_SELECT => "SELECT",
        KC_STOP => "STOP",
        KC_AGAIN => "AGAIN",
        KC_UNDO => "UNDO",
        KC_CUT => "CUT",
        KC_COPY => "COPY",
        KC_PASTE => "PASTE",
        KC_FIND => "FIND",
        KC_MUTE => "MUTE",
        KC_VOLUP => "VOLUP",
        KC_VOLDOWN => "VOLDOWN",
        KC_LOCKING_CAPS => "LOCKING_CAPS",
        KC_LOCKING_NUM => "LOCKING_NUM",
        KC_LOCKING_SCROLL => "LOCKING_SCROLL",
        KC_KP_COMMA => "KP_COMMA",
        KC_KP_EQUAL_AS400 => "KP_EQUAL_AS400",
        KC_INT1 => "INT1",
        KC_INT2 => "INT2",
        KC_INT3 => "INT3",
        KC_INT4 => "INT4",
        KC_INT5 => "INT5",
        KC_INT6 => "INT6",
        KC_INT7 => "INT7",
        KC_INT8 => "INT8",
        KC_INT9 => "INT9",
        KC_LANG1 => "LANG1",
        KC_LANG2 => "LANG2",
        KC_LANG3 => "LANG3",
        KC_LANG4 => "LANG4",
        KC_LANG5 => "LANG5",
        KC_ALT_ERASE => "ALT_ERASE",
        KC_SYSREQ => "SYSREQ",
        KC_CANCEL => "CANCEL",
        KC_CLEAR => "CLEAR",
        KC_PRIOR => "PRIOR",
        KC_RETURN => "RETURN",
        KC_SEPARATOR => "SEPARATOR",
        KC_OUT => "OUT",
        KC_OPER => "OPER",
        KC_CLEAR_AGAIN => "CLEAR_AGAIN",
        KC_CRSEL => "CRSEL",
        KC_EXSEL => "EXSEL",
        KC_LCTRL => "LCTRL",
        KC_LSHIFT => "LSHIFT",
        KC_LALT => "LALT",
        KC_LGUI => "LGUI",
        KC_RCTRL => "RCTRL",
        KC_RSHIFT => "RSHIFT",
        KC_RALT => "RALT",
        KC_RGUI => "RGUI",
        _ => "RESERVED",
    }
}
