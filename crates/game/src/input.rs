//! Input state.
//!
//! The input collaborator pushes key and pointer events in; the session
//! drains them once per tick and turns them into an [`ActorCommand`]. The
//! core never polls the OS.

use std::collections::HashSet;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use skyline_physics::ActorCommand;

/// Named keys and buttons the game reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    W,
    A,
    S,
    D,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    C,
    Control,
    E,
    F,
    Escape,
    MouseLeft,
}

impl FromStr for Key {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.to_ascii_lowercase().as_str() {
            "w" => Key::W,
            "a" => Key::A,
            "s" => Key::S,
            "d" => Key::D,
            "up" | "arrowup" | "arrow_up" => Key::ArrowUp,
            "down" | "arrowdown" | "arrow_down" => Key::ArrowDown,
            "left" | "arrowleft" | "arrow_left" => Key::ArrowLeft,
            "right" | "arrowright" | "arrow_right" => Key::ArrowRight,
            "space" => Key::Space,
            "c" => Key::C,
            "ctrl" | "control" => Key::Control,
            "e" => Key::E,
            "f" => Key::F,
            "esc" | "escape" => Key::Escape,
            "mouse_left" | "lmb" => Key::MouseLeft,
            _ => return Err(UnknownKey(s.to_string())),
        };
        Ok(key)
    }
}

/// A key name that [`Key::from_str`] does not recognize.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key '{0}'")]
pub struct UnknownKey(pub String);

/// What a key does, independent of which key it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
    Ascend,
    Descend,
    ToggleFly,
    /// Pick up the prop under the crosshair, or drop the held one.
    Grab,
    DragFarther,
    DragCloser,
}

impl Action {
    pub const ALL: [Action; 11] = [
        Action::Forward,
        Action::Backward,
        Action::Left,
        Action::Right,
        Action::Jump,
        Action::Ascend,
        Action::Descend,
        Action::ToggleFly,
        Action::Grab,
        Action::DragFarther,
        Action::DragCloser,
    ];
}

/// Action to key mapping. Missing fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: Vec<Key>,
    pub backward: Vec<Key>,
    pub left: Vec<Key>,
    pub right: Vec<Key>,
    pub jump: Vec<Key>,
    pub ascend: Vec<Key>,
    pub descend: Vec<Key>,
    pub toggle_fly: Vec<Key>,
    pub grab: Vec<Key>,
    pub drag_farther: Vec<Key>,
    pub drag_closer: Vec<Key>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: vec![Key::W, Key::ArrowUp],
            backward: vec![Key::S, Key::ArrowDown],
            left: vec![Key::A, Key::ArrowLeft],
            right: vec![Key::D, Key::ArrowRight],
            jump: vec![Key::Space],
            ascend: vec![Key::Space],
            descend: vec![Key::C, Key::Control],
            toggle_fly: vec![Key::F],
            grab: vec![Key::MouseLeft],
            // F and E adjust the drag distance only while a prop is held.
            drag_farther: vec![Key::F],
            drag_closer: vec![Key::E],
        }
    }
}

impl KeyBindings {
    /// Keys bound to `action`.
    pub fn keys(&self, action: Action) -> &[Key] {
        match action {
            Action::Forward => &self.forward,
            Action::Backward => &self.backward,
            Action::Left => &self.left,
            Action::Right => &self.right,
            Action::Jump => &self.jump,
            Action::Ascend => &self.ascend,
            Action::Descend => &self.descend,
            Action::ToggleFly => &self.toggle_fly,
            Action::Grab => &self.grab,
            Action::DragFarther => &self.drag_farther,
            Action::DragCloser => &self.drag_closer,
        }
    }

    /// Replace the keys for `action`.
    pub fn bind(&mut self, action: Action, keys: Vec<Key>) {
        let slot = match action {
            Action::Forward => &mut self.forward,
            Action::Backward => &mut self.backward,
            Action::Left => &mut self.left,
            Action::Right => &mut self.right,
            Action::Jump => &mut self.jump,
            Action::Ascend => &mut self.ascend,
            Action::Descend => &mut self.descend,
            Action::ToggleFly => &mut self.toggle_fly,
            Action::Grab => &mut self.grab,
            Action::DragFarther => &mut self.drag_farther,
            Action::DragCloser => &mut self.drag_closer,
        };
        *slot = keys;
    }

    /// Whether `key` triggers `action`.
    pub fn triggers(&self, key: Key, action: Action) -> bool {
        self.keys(action).contains(&key)
    }

    /// Every action `key` is bound to.
    pub fn actions_for(&self, key: Key) -> impl Iterator<Item = Action> + '_ {
        Action::ALL
            .into_iter()
            .filter(move |action| self.triggers(key, *action))
    }
}

/// Actions whose keys went down since the last drain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputEdges {
    actions: Vec<Action>,
}

impl InputEdges {
    pub fn pressed(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Held keys, pending press edges and accumulated pointer movement.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    bindings: KeyBindings,
    held: HashSet<Key>,
    pressed: Vec<Key>,
    look_delta: Vec2,
    pointer_captured: bool,
}

impl InputState {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            ..Default::default()
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// A key went down. OS auto-repeat of a key already held is ignored.
    /// Escape releases the pointer.
    pub fn key_down(&mut self, key: Key) {
        if key == Key::Escape {
            self.set_pointer_captured(false);
        }
        if self.held.insert(key) {
            self.pressed.push(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Pointer capture gained or lost. Losing it discards pending look.
    pub fn set_pointer_captured(&mut self, captured: bool) {
        self.pointer_captured = captured;
        if !captured {
            self.look_delta = Vec2::ZERO;
        }
    }

    pub fn pointer_captured(&self) -> bool {
        self.pointer_captured
    }

    /// Raw pointer movement, only honored while the pointer is captured.
    pub fn mouse_delta(&mut self, dx: f32, dy: f32) {
        if self.pointer_captured {
            self.look_delta += Vec2::new(dx, dy);
        }
    }

    /// Drain accumulated pointer movement.
    pub fn take_look_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.look_delta)
    }

    /// Drain press edges, mapped to actions.
    pub fn take_edges(&mut self) -> InputEdges {
        let mut actions = Vec::new();
        for key in self.pressed.drain(..) {
            for action in self.bindings.actions_for(key) {
                if !actions.contains(&action) {
                    actions.push(action);
                }
            }
        }
        InputEdges { actions }
    }

    /// Whether any key bound to `action` is down.
    pub fn is_held(&self, action: Action) -> bool {
        self.bindings.keys(action).iter().any(|k| self.held.contains(k))
    }

    /// Build this tick's movement command.
    ///
    /// A key pressed and released between two ticks still counts as held for
    /// jump, so a quick tap is never lost.
    pub fn to_command(&self, edges: &InputEdges, yaw: f32) -> ActorCommand {
        let axis = |positive: Action, negative: Action| -> f32 {
            let mut value = 0.0;
            if self.is_held(positive) {
                value += 1.0;
            }
            if self.is_held(negative) {
                value -= 1.0;
            }
            value
        };

        ActorCommand {
            forward_move: axis(Action::Forward, Action::Backward),
            right_move: axis(Action::Right, Action::Left),
            yaw,
            jump: self.is_held(Action::Jump) || edges.pressed(Action::Jump),
            ascend: self.is_held(Action::Ascend),
            descend: self.is_held(Action::Descend),
            toggle_fly: edges.pressed(Action::ToggleFly),
        }
    }

    /// Forget every held key, edge and pending look delta.
    pub fn reset(&mut self) {
        self.held.clear();
        self.pressed.clear();
        self.look_delta = Vec2::ZERO;
    }
}
