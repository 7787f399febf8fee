use winit::keyboard::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    StepUp,
    StepDown,
    StepLeft,
    StepRight,
    Levitate,
    Reshuffle,
    ResetView,
    ToggleFullscreen,
    ZoomIn,
    ZoomOut,
    Quit,
}

const ACTION_COUNT: usize = 15;

/// Key to action table. Several keys may share an action.
pub const KEY_BINDINGS: &[(KeyCode, InputAction)] = &[
    (KeyCode::KeyW, InputAction::MoveUp),
    (KeyCode::ArrowUp, InputAction::MoveUp),
    (KeyCode::KeyS, InputAction::MoveDown),
    (KeyCode::ArrowDown, InputAction::MoveDown),
    (KeyCode::KeyA, InputAction::MoveLeft),
    (KeyCode::ArrowLeft, InputAction::MoveLeft),
    (KeyCode::KeyD, InputAction::MoveRight),
    (KeyCode::ArrowRight, InputAction::MoveRight),
    (KeyCode::KeyI, InputAction::StepUp),
    (KeyCode::KeyK, InputAction::StepDown),
    (KeyCode::KeyJ, InputAction::StepLeft),
    (KeyCode::KeyL, InputAction::StepRight),
    (KeyCode::Space, InputAction::Levitate),
    (KeyCode::KeyR, InputAction::Reshuffle),
    (KeyCode::Home, InputAction::ResetView),
    (KeyCode::Digit0, InputAction::ResetView),
    (KeyCode::F11, InputAction::ToggleFullscreen),
    (KeyCode::Equal, InputAction::ZoomIn),
    (KeyCode::NumpadAdd, InputAction::ZoomIn),
    (KeyCode::Minus, InputAction::ZoomOut),
    (KeyCode::NumpadSubtract, InputAction::ZoomOut),
    (KeyCode::Escape, InputAction::Quit),
];

pub fn action_for_key(key: KeyCode) -> Option<InputAction> {
    KEY_BINDINGS
        .iter()
        .find(|(bound, _)| *bound == key)
        .map(|(_, action)| *action)
}

/// Held state plus press edges for every action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
    pressed: [bool; ACTION_COUNT],
}

impl ActionStates {
    /// Applies a key transition. Returns `true` on a fresh press, never on
    /// key repeat.
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) -> bool {
        let index = action.index();
        let fresh_press = is_down && !self.down[index];
        if fresh_press {
            self.pressed[index] = true;
        }
        self.down[index] = is_down;
        fresh_press
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub(crate) fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed[action.index()]
    }

    pub(crate) fn with_pressed(mut self, action: InputAction, pressed: bool) -> Self {
        self.pressed[action.index()] = pressed;
        self
    }

    pub(crate) fn clear_pressed(&mut self) {
        self.pressed = [false; ACTION_COUNT];
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::StepUp => 4,
            InputAction::StepDown => 5,
            InputAction::StepLeft => 6,
            InputAction::StepRight => 7,
            InputAction::Levitate => 8,
            InputAction::Reshuffle => 9,
            InputAction::ResetView => 10,
            InputAction::ToggleFullscreen => 11,
            InputAction::ZoomIn => 12,
            InputAction::ZoomOut => 13,
            InputAction::Quit => 14,
        }
    }
}
