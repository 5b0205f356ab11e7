//! Scripted input for headless runs.
//!
//! One entry per line, `#` starts a comment:
//!
//! ```text
//! # ticks 0..120 hold W, jump on 60..62
//! 0-120 w
//! 60-62 space
//! # turn the camera while walking
//! 30-40 look 10 0
//! ```
//!
//! Ranges are half-open. Keys use the names accepted by [`Key::from_str`].

use std::collections::BTreeSet;
use std::ops::Range;
use std::str::FromStr;

use glam::Vec2;
use skyline_game::{InputState, Key};

#[derive(Debug, thiserror::Error)]
#[error("script line {line}: {reason}")]
pub struct ScriptError {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Action {
    Hold(Vec<Key>),
    Look(Vec2),
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    ticks: Range<u64>,
    action: Action,
}

/// Parsed input script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    entries: Vec<Entry>,
}

impl Script {
    pub fn parse(text: &str) -> Result<Self, ScriptError> {
        let mut entries = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw.split('#').next().unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }

            let error = |reason: String| ScriptError { line, reason };
            let mut words = content.split_whitespace();

            let range = words.next().unwrap_or_default();
            let ticks = parse_range(range).ok_or_else(|| error(format!("bad tick range '{}'", range)))?;

            let rest: Vec<&str> = words.collect();
            let action = match rest.as_slice() {
                [] => return Err(error("no keys given".to_string())),
                ["look", dx, dy] => {
                    let dx = dx.parse().map_err(|_| error(format!("bad look delta '{}'", dx)))?;
                    let dy = dy.parse().map_err(|_| error(format!("bad look delta '{}'", dy)))?;
                    Action::Look(Vec2::new(dx, dy))
                }
                ["look", ..] => return Err(error("look takes two numbers".to_string())),
                keys => Action::Hold(
                    keys.iter()
                        .map(|k| Key::from_str(k).map_err(|e| error(e.to_string())))
                        .collect::<Result<_, _>>()?,
                ),
            };

            entries.push(Entry { ticks, action });
        }

        Ok(Self { entries })
    }

    /// Keys held during `tick`.
    pub fn keys_at(&self, tick: u64) -> BTreeSet<Key> {
        self.active(tick)
            .filter_map(|action| match action {
                Action::Hold(keys) => Some(keys.iter().copied()),
                Action::Look(_) => None,
            })
            .flatten()
            .collect()
    }

    /// Pointer movement applied during `tick`.
    pub fn look_at(&self, tick: u64) -> Vec2 {
        self.active(tick)
            .filter_map(|action| match action {
                Action::Look(delta) => Some(*delta),
                Action::Hold(_) => None,
            })
            .sum()
    }

    /// Feed `tick`'s keys and pointer movement into `input`.
    ///
    /// `held` is the key set applied on the previous tick; only the
    /// difference is sent, so a key held across ticks produces one press.
    pub fn apply(&self, tick: u64, held: &mut BTreeSet<Key>, input: &mut InputState) {
        let wanted = self.keys_at(tick);
        for key in held.difference(&wanted) {
            input.key_up(*key);
        }
        for key in wanted.difference(held) {
            input.key_down(*key);
        }
        *held = wanted;

        let look = self.look_at(tick);
        if look != Vec2::ZERO {
            input.mouse_delta(look.x, look.y);
        }
    }

    /// Tick after the last scripted one.
    pub fn end(&self) -> u64 {
        self.entries.iter().map(|e| e.ticks.end).max().unwrap_or(0)
    }

    fn active(&self, tick: u64) -> impl Iterator<Item = &Action> {
        self.entries
            .iter()
            .filter(move |e| e.ticks.contains(&tick))
            .map(|e| &e.action)
    }
}

/// `START-END`, or a single `TICK`.
fn parse_range(text: &str) -> Option<Range<u64>> {
    match text.split_once('-') {
        Some((start, end)) => {
            let start: u64 = start.parse().ok()?;
            let end: u64 = end.parse().ok()?;
            (start < end).then_some(start..end)
        }
        None => {
            let tick: u64 = text.parse().ok()?;
            Some(tick..tick.checked_add(1)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyline_game::{LevelDefinition, LevelSession, SessionConfig, SessionEvent};

    #[test]
    fn test_parse_script() {
        let script = Script::parse(
            "# warmup\n\
             0-120 w\n\
             60-62 space d  # hop\n\
             30 look 10 -2\n",
        )
        .unwrap();

        assert_eq!(script.keys_at(0), BTreeSet::from([Key::W]));
        assert_eq!(script.keys_at(61), BTreeSet::from([Key::W, Key::Space, Key::D]));
        assert!(script.keys_at(120).is_empty());
        assert_eq!(script.look_at(30), Vec2::new(10.0, -2.0));
        assert_eq!(script.look_at(31), Vec2::ZERO);
        assert_eq!(script.end(), 120);
    }

    #[test]
    fn test_parse_errors_name_the_line() {
        let err = Script::parse("0-10 w\n10-5 w\n").unwrap_err();
        assert_eq!(err.line, 2);

        let err = Script::parse("0-10 jetpack\n").unwrap_err();
        assert_eq!(err.line, 1);

        assert!(Script::parse("0-10\n").is_err());
        assert!(Script::parse("0-10 look 1\n").is_err());
    }

    #[test]
    fn test_last_tick_does_not_overflow() {
        assert!(Script::parse(&format!("{} w\n", u64::MAX)).is_err());

        let script = Script::parse(&format!("{} w\n", u64::MAX - 1)).unwrap();
        assert_eq!(script.end(), u64::MAX);
    }

    #[test]
    fn test_apply_sends_only_changes() {
        let script = Script::parse("0-3 w\n1 look 4 0\n2-3 space\n").unwrap();
        let mut input = InputState::default();
        input.set_pointer_captured(true);
        let mut held = BTreeSet::new();

        script.apply(0, &mut held, &mut input);
        assert!(!input.take_edges().is_empty());

        script.apply(1, &mut held, &mut input);
        assert!(input.take_edges().is_empty());
        assert_eq!(input.take_look_delta(), Vec2::new(4.0, 0.0));

        script.apply(3, &mut held, &mut input);
        assert!(held.is_empty());
        assert!(!input.is_held(skyline_game::Action::Forward));
    }

    #[test]
    fn test_courtyard_script_reaches_goal() {
        let script = Script::parse(include_str!("../scripts/courtyard.txt")).unwrap();
        let level = LevelDefinition::from_toml_str(include_str!("../levels/courtyard.toml")).unwrap();
        let mut session = LevelSession::new(level, SessionConfig::default(), Box::new(|| {})).unwrap();

        let mut held = BTreeSet::new();
        let mut passed = Vec::new();
        let mut goal_at = None;
        for tick in 0..script.end() {
            script.apply(tick, &mut held, session.input_mut());
            for event in session.tick().events {
                match event {
                    SessionEvent::CheckpointPassed { ordinal, .. } => passed.push(ordinal),
                    SessionEvent::GoalReached => goal_at = Some(tick),
                    _ => {}
                }
            }
        }

        assert_eq!(passed, vec![0, 1]);
        assert_eq!(session.checkpoints_passed(), 2);
        assert!(goal_at.is_some());
    }
}
