//! Input abstraction: polled key state plus discrete action and click feeds.
//!
//! The embedder owns the real event source (browser keys, gamepad,
//! whatever); the core only sees logical controls per player slot. The
//! queued implementation below doubles as the test harness.

use std::collections::HashSet;

/// Which local player a control belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerSlot {
    One,
    Two,
}

/// Held controls, polled every tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    Left,
    Right,
    Jump,
}

/// Edge-triggered actions, consumed once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputAction {
    Hit,
    Reset,
}

/// Pointer click in court coordinates.
#[derive(Clone, Copy, Debug)]
pub struct PointerClick {
    pub x: f32,
    pub y: f32,
}

pub trait InputSource {
    /// Is the logical control currently held for this slot?
    fn is_pressed(&self, slot: PlayerSlot, control: Control) -> bool;

    /// Drain actions pressed since the last tick.
    fn drain_actions(&mut self) -> Vec<(PlayerSlot, InputAction)>;

    /// Drain pointer clicks since the last tick.
    fn drain_clicks(&mut self) -> Vec<PointerClick>;
}

/// Input source with nothing ever pressed; the NPC-vs-NPC and server paths
/// use this.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullInput;

impl InputSource for NullInput {
    fn is_pressed(&self, _slot: PlayerSlot, _control: Control) -> bool {
        false
    }

    fn drain_actions(&mut self) -> Vec<(PlayerSlot, InputAction)> {
        Vec::new()
    }

    fn drain_clicks(&mut self) -> Vec<PointerClick> {
        Vec::new()
    }
}

/// Concrete buffered input: the embedder (or a test) pushes state in, the
/// coordinator drains it out.
#[derive(Clone, Debug, Default)]
pub struct QueuedInput {
    held: HashSet<(PlayerSlot, Control)>,
    actions: Vec<(PlayerSlot, InputAction)>,
    clicks: Vec<PointerClick>,
}

impl QueuedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pressed(&mut self, slot: PlayerSlot, control: Control, pressed: bool) {
        if pressed {
            self.held.insert((slot, control));
        } else {
            self.held.remove(&(slot, control));
        }
    }

    pub fn push_action(&mut self, slot: PlayerSlot, action: InputAction) {
        self.actions.push((slot, action));
    }

    pub fn push_click(&mut self, x: f32, y: f32) {
        self.clicks.push(PointerClick { x, y });
    }
}

/// Cloneable handle over a [`QueuedInput`]. The coordinator owns one clone
/// as its input source; the embedder keeps another and feeds it key and
/// pointer events as they arrive. Single-threaded by design, like the rest
/// of the tick loop.
#[derive(Clone, Debug, Default)]
pub struct SharedInput {
    inner: std::rc::Rc<std::cell::RefCell<QueuedInput>>,
}

impl SharedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pressed(&self, slot: PlayerSlot, control: Control, pressed: bool) {
        self.inner.borrow_mut().set_pressed(slot, control, pressed);
    }

    pub fn push_action(&self, slot: PlayerSlot, action: InputAction) {
        self.inner.borrow_mut().push_action(slot, action);
    }

    pub fn push_click(&self, x: f32, y: f32) {
        self.inner.borrow_mut().push_click(x, y);
    }
}

impl InputSource for SharedInput {
    fn is_pressed(&self, slot: PlayerSlot, control: Control) -> bool {
        self.inner.borrow().is_pressed(slot, control)
    }

    fn drain_actions(&mut self) -> Vec<(PlayerSlot, InputAction)> {
        self.inner.borrow_mut().drain_actions()
    }

    fn drain_clicks(&mut self) -> Vec<PointerClick> {
        self.inner.borrow_mut().drain_clicks()
    }
}

impl InputSource for QueuedInput {
    fn is_pressed(&self, slot: PlayerSlot, control: Control) -> bool {
        self.held.contains(&(slot, control))
    }

    fn drain_actions(&mut self) -> Vec<(PlayerSlot, InputAction)> {
        std::mem::take(&mut self.actions)
    }

    fn drain_clicks(&mut self) -> Vec<PointerClick> {
        std::mem::take(&mut self.clicks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_state_toggles() {
        let mut input = QueuedInput::new();
        assert!(!input.is_pressed(PlayerSlot::One, Control::Left));

        input.set_pressed(PlayerSlot::One, Control::Left, true);
        assert!(input.is_pressed(PlayerSlot::One, Control::Left));
        assert!(!input.is_pressed(PlayerSlot::Two, Control::Left));

        input.set_pressed(PlayerSlot::One, Control::Left, false);
        assert!(!input.is_pressed(PlayerSlot::One, Control::Left));
    }

    #[test]
    fn test_actions_drain_once() {
        let mut input = QueuedInput::new();
        input.push_action(PlayerSlot::One, InputAction::Hit);
        input.push_action(PlayerSlot::Two, InputAction::Hit);

        assert_eq!(input.drain_actions().len(), 2);
        assert!(input.drain_actions().is_empty());
    }

    #[test]
    fn test_clicks_drain_once() {
        let mut input = QueuedInput::new();
        input.push_click(120.0, 420.0);
        assert_eq!(input.drain_clicks().len(), 1);
        assert!(input.drain_clicks().is_empty());
    }
}
