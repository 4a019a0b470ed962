/// The four keys that steer the light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Up,
    Right,
    Down,
}

impl Key {
    /// Maps a `KeyboardEvent.key` value; anything else is ignored.
    pub fn from_name(name: &str) -> Option<Key> {
        match name {
            "ArrowLeft" | "Left" => Some(Key::Left),
            "ArrowUp" | "Up" => Some(Key::Up),
            "ArrowRight" | "Right" => Some(Key::Right),
            "ArrowDown" | "Down" => Some(Key::Down),
            _ => None,
        }
    }

    /// Legacy `KeyboardEvent.keyCode` values.
    pub fn from_key_code(code: u32) -> Option<Key> {
        match code {
            37 => Some(Key::Left),
            38 => Some(Key::Up),
            39 => Some(Key::Right),
            40 => Some(Key::Down),
            _ => None,
        }
    }
}
