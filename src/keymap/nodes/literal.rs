use super::{Behavior, Engine};

/// Emits a single HID keycode.
#[derive(Clone, Copy, Debug)]
pub struct Literal {
    code: u8,
}

impl Literal {
    pub const fn new(code: u8) -> Self {
        Self { code }
    }

    pub const fn keycode(&self) -> u8 {
        self.code
    }
}

impl Behavior for Literal {
    fn on_press(&mut self, cx: &mut Engine, _slot: u8) {
        cx.send_press(self.code);
    }

    fn on_release(&mut self, cx: &mut Engine, _slot: u8) {
        cx.send_release(self.code);
    }
}
