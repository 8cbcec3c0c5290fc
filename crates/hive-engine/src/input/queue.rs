use std::collections::{HashMap, HashSet};

/// Raw key events fed by the host window layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A key was pressed.
    KeyDown { key_code: u32 },
    /// A key was released.
    KeyUp { key_code: u32 },
}

/// A queue of input events.
/// The host pushes events between ticks; the runner drains them each tick.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Check if there are pending events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Logical actions the gameplay systems read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
    Pickup,
}

/// Key code to action map. Codes follow the browser/ASCII convention
/// (`'A'` = 65, space = 32, arrows = 37..40).
#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<u32, Action>,
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn bind(mut self, key_code: u32, action: Action) -> Self {
        self.map.insert(key_code, action);
        self
    }

    pub fn action(&self, key_code: u32) -> Option<Action> {
        self.map.get(&key_code).copied()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::empty()
            .bind(65, Action::MoveLeft) // A
            .bind(37, Action::MoveLeft) // ←
            .bind(68, Action::MoveRight) // D
            .bind(39, Action::MoveRight) // →
            .bind(32, Action::Jump) // space
            .bind(38, Action::Jump) // ↑
            .bind(72, Action::Pickup) // H
    }
}

/// Which logical actions are currently held.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held_keys: HashSet<u32>,
    bindings: KeyBindings,
}

impl InputState {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            held_keys: HashSet::new(),
            bindings,
        }
    }

    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown { key_code } => {
                self.held_keys.insert(key_code);
            }
            InputEvent::KeyUp { key_code } => {
                self.held_keys.remove(&key_code);
            }
        }
    }

    /// True while any key bound to `action` is down.
    pub fn is_down(&self, action: Action) -> bool {
        self.held_keys
            .iter()
            .any(|code| self.bindings.action(*code) == Some(action))
    }

    /// Release everything, e.g. on focus loss.
    pub fn release_all(&mut self) {
        self.held_keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain() {
        let mut q = InputQueue::new();
        q.push(InputEvent::KeyDown { key_code: 65 });
        q.push(InputEvent::KeyDown { key_code: 32 });
        assert_eq!(q.len(), 2);
        let events = q.drain();
        assert_eq!(events.len(), 2);
        assert!(q.is_empty());
    }

    #[test]
    fn held_actions_follow_key_events() {
        let mut state = InputState::default();
        state.apply(InputEvent::KeyDown { key_code: 65 });
        assert!(state.is_down(Action::MoveLeft));
        assert!(!state.is_down(Action::MoveRight));

        state.apply(InputEvent::KeyUp { key_code: 65 });
        assert!(!state.is_down(Action::MoveLeft));
    }

    #[test]
    fn either_binding_holds_the_action() {
        let mut state = InputState::default();
        state.apply(InputEvent::KeyDown { key_code: 39 });
        state.apply(InputEvent::KeyDown { key_code: 68 });
        state.apply(InputEvent::KeyUp { key_code: 39 });
        assert!(state.is_down(Action::MoveRight));
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut state = InputState::new(KeyBindings::empty().bind(90, Action::Jump));
        state.apply(InputEvent::KeyDown { key_code: 32 });
        assert!(!state.is_down(Action::Jump));
        state.apply(InputEvent::KeyDown { key_code: 90 });
        assert!(state.is_down(Action::Jump));
        state.release_all();
        assert!(!state.is_down(Action::Jump));
    }
}
