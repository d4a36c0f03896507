//! Key binding configuration and parsing.
//!
//! Bindings use the `key:action+action` syntax, e.g. `ctrl-o:commit` or
//! `tab:down`. Keys are written as `[ctrl-][alt-][shift-]name`.

use std::{
    collections::HashMap,
    ops::{Deref, DerefMut},
};

use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::event::{self, Action};

/// A map of key events to their associated actions
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyMap(pub HashMap<KeyEvent, Vec<Action>>);

impl Deref for KeyMap {
    type Target = HashMap<KeyEvent, Vec<Action>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl DerefMut for KeyMap {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<&str> for KeyMap {
    fn from(value: &str) -> Self {
        parse_keymaps(value.split(','))
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        get_default_key_map()
    }
}

impl KeyMap {
    /// Adds keymaps from the source, parsing them using parse_keymap
    pub fn add_keymaps<'a, T>(&mut self, source: T)
    where
        T: Iterator<Item = &'a str>,
    {
        for map in source {
            if let Ok((key, action_chain)) = parse_keymap(map) {
                self.bind(key, action_chain)
                    .unwrap_or_else(|err| warn!("Failed to bind key {map}: {err}"));
            } else {
                warn!("Failed to parse key binding: {map}");
            }
        }
    }

    fn bind(&mut self, key: &str, action_chain: Vec<Action>) -> Result<()> {
        let key = parse_key(key)?;
        self.insert(key, action_chain);
        Ok(())
    }
}

/// Returns the default key bindings
#[rustfmt::skip]
pub fn get_default_key_map() -> KeyMap {
    let mut ret = HashMap::new();

    ret.insert(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE), vec![Action::Down(1)]);
    ret.insert(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE), vec![Action::Up(1)]);
    ret.insert(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), vec![Action::Commit]);
    ret.insert(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE), vec![Action::Dismiss]);
    ret.insert(KeyEvent::new(KeyCode::End, KeyModifiers::NONE), vec![Action::EndOfLine]);
    ret.insert(KeyEvent::new(KeyCode::Home, KeyModifiers::NONE), vec![Action::BeginningOfLine]);
    ret.insert(KeyEvent::new(KeyCode::Delete, KeyModifiers::NONE), vec![Action::DeleteChar]);
    ret.insert(KeyEvent::new(KeyCode::Left, KeyModifiers::NONE), vec![Action::BackwardChar]);
    ret.insert(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE), vec![Action::ForwardChar]);
    ret.insert(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE), vec![Action::BackwardDeleteChar]);

    ret.insert(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL), vec![Action::BeginningOfLine]);
    ret.insert(KeyEvent::new(KeyCode::Char('b'), KeyModifiers::CONTROL), vec![Action::BackwardChar]);
    ret.insert(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), vec![Action::Abort]);
    ret.insert(KeyEvent::new(KeyCode::Char('e'), KeyModifiers::CONTROL), vec![Action::EndOfLine]);
    ret.insert(KeyEvent::new(KeyCode::Char('f'), KeyModifiers::CONTROL), vec![Action::ForwardChar]);
    ret.insert(KeyEvent::new(KeyCode::Char('g'), KeyModifiers::CONTROL), vec![Action::Dismiss]);
    ret.insert(KeyEvent::new(KeyCode::Char('h'), KeyModifiers::CONTROL), vec![Action::BackwardDeleteChar]);
    ret.insert(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::CONTROL), vec![Action::Down(1)]);
    ret.insert(KeyEvent::new(KeyCode::Char('k'), KeyModifiers::CONTROL), vec![Action::Up(1)]);
    ret.insert(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL), vec![Action::Down(1)]);
    ret.insert(KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL), vec![Action::Up(1)]);
    ret.insert(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL), vec![Action::UnixLineDiscard]);
    ret.insert(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL), vec![Action::UnixWordRubout]);

    KeyMap(ret)
}

/// Parses a key str into a crossterm KeyEvent
pub fn parse_key(key: &str) -> Result<KeyEvent> {
    if key.is_empty() {
        return Err(eyre!("Cannot parse empty key"));
    }
    let (mod_strs, name) = match key.rsplit_once('-') {
        // `ctrl--` binds the minus key
        Some((mods, "")) => (mods.strip_suffix('-').unwrap_or(mods), "-"),
        Some((mods, name)) => (mods, name),
        None => ("", key),
    };

    let mut mods = KeyModifiers::NONE;
    for mod_str in mod_strs.split('-').filter(|s| !s.is_empty()) {
        mods |= match mod_str {
            "ctrl" => KeyModifiers::CONTROL,
            "alt" => KeyModifiers::ALT,
            "shift" => KeyModifiers::SHIFT,
            s => return Err(eyre!("Failed to parse {} as key modifier", s)),
        }
    }

    let mut chars = name.chars();
    let keycode = match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_uppercase() => {
            mods |= KeyModifiers::SHIFT;
            KeyCode::Char(c.to_lowercase().next().unwrap_or(c))
        }
        (Some(c), None) => KeyCode::Char(c),
        _ => match name.to_lowercase().as_str() {
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "bspace" | "bs" => KeyCode::Backspace,
            "del" | "delete" => KeyCode::Delete,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "tab" => KeyCode::Tab,
            "btab" => KeyCode::BackTab,
            "esc" => KeyCode::Esc,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pgup" => KeyCode::PageUp,
            "pgdown" => KeyCode::PageDown,
            s => match s.strip_prefix('f').map(str::parse::<u8>) {
                Some(Ok(n)) => KeyCode::F(n),
                _ => return Err(eyre!("Unknown key {}", s)),
            },
        },
    };

    Ok(KeyEvent::new(keycode, mods))
}

/// Parse an iterator of keymaps into a KeyMap, on top of the defaults
pub fn parse_keymaps<'a, T>(maps: T) -> KeyMap
where
    T: Iterator<Item = &'a str>,
{
    let mut res = KeyMap::default();
    res.add_keymaps(maps);
    res
}

/// Parses an action chain, separated by '+'s into the corresponding actions
pub fn parse_action_chain(action_chain: &str) -> Result<Vec<Action>> {
    let actions: Vec<Action> = action_chain.split('+').filter_map(event::parse_action).collect();
    if actions.is_empty() {
        Err(eyre!("Empty action chain or unknown action `{}`", action_chain))
    } else {
        Ok(actions)
    }
}

/// Parse a single keymap and return the key and action(s)
pub fn parse_keymap(key_action: &str) -> Result<(&str, Vec<Action>)> {
    if key_action.is_empty() {
        return Err(eyre!("Got an empty keybind, skipping"));
    }
    let (key, action_chain) = key_action
        .split_once(':')
        .ok_or(eyre!("Failed to parse {} as key and action", key_action))?;
    debug!("parsed key_action: {:?}: {:?}", key, action_chain);
    Ok((key, parse_action_chain(action_chain)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use event::Action::*;

    #[test]
    fn keys() {
        assert_eq!(
            parse_key("ctrl-o").unwrap(),
            KeyEvent::new(KeyCode::Char('o'), KeyModifiers::CONTROL)
        );
        assert_eq!(
            parse_key("ctrl-alt-up").unwrap(),
            KeyEvent::new(KeyCode::Up, KeyModifiers::CONTROL | KeyModifiers::ALT)
        );
        assert_eq!(parse_key("J").unwrap(), KeyEvent::new(KeyCode::Char('j'), KeyModifiers::SHIFT));
        assert_eq!(parse_key("f5").unwrap(), KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE));
        assert_eq!(parse_key("f").unwrap(), KeyEvent::new(KeyCode::Char('f'), KeyModifiers::NONE));
        assert_eq!(parse_key("ctrl--").unwrap(), KeyEvent::new(KeyCode::Char('-'), KeyModifiers::CONTROL));
        assert!(parse_key("hyper-x").is_err());
        assert!(parse_key("nope").is_err());
        assert!(parse_key("").is_err());
    }

    #[test]
    fn action_chain() {
        assert_eq!(
            parse_action_chain("unix-line-discard+set-query:octocat+down(2)").unwrap(),
            vec![UnixLineDiscard, SetQuery("octocat".into()), Down(2)]
        );
        assert!(parse_action_chain("frobnicate").is_err());
    }

    #[test]
    fn bindings_override_defaults() {
        let map = KeyMap::from("tab:down,enter:dismiss,bogus");
        assert_eq!(map.get(&KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)), Some(&vec![Down(1)]));
        assert_eq!(
            map.get(&KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            Some(&vec![Dismiss])
        );
        assert_eq!(
            map.get(&KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL)),
            Some(&vec![Up(1)])
        );
    }
}
