//! Human-readable output lines emitted by the engine.

use crate::state::GameState;

pub const PROMPT: &str = "k7> ";

pub(crate) const RULE: &str = "==============================================================";

pub(crate) const ENDED_NOTICE: &str =
    "Game has ended. Type 'restart' or 'restart <seed>' to play again.";

const HELP_LINES: [&str; 11] = [
    "Commands:",
    "  scan",
    "  repair <subsystem>         e.g. repair antenna | repair cooling | repair ai",
    "  reroute <subsystem>        e.g. reroute antenna",
    "  rest",
    "  override",
    "  tx                         (only during external signal window)",
    "  status",
    "  restart [seed]",
    "",
    "Subsystem keywords: antenna, cooling, beacon, ai, docking",
];

pub(crate) fn push_intro(lines: &mut Vec<String>) {
    lines.extend(
        [
            RULE,
            " SIGNAL LOST: THE LAST RELAY",
            RULE,
            "You are the last field engineer at Relay Station K-7.",
            "Restore stability long enough to transmit, then attempt escape.",
            "",
            "Type 'help' for commands.",
            "",
        ]
        .map(String::from),
    );
}

pub(crate) fn push_help(lines: &mut Vec<String>) {
    lines.extend(HELP_LINES.map(String::from));
}

/// Status block, one entry per line.
#[must_use]
pub fn status_lines(state: &GameState) -> Vec<String> {
    let mut lines = vec![
        format!("Turn {} | Turns Left: {}", state.turn, state.turns_left),
        format!(
            "Power {} | Integrity {} | Focus {}",
            state.power, state.integrity, state.focus
        ),
        String::from("Subsystems:"),
    ];
    for name in &state.roster {
        if let Some(sub) = state.subsystem(*name) {
            let scanned = if sub.scanned { " (scanned)" } else { "" };
            lines.push(format!("  - {}: {}{scanned}", sub.name, sub.status));
        }
    }
    if state.external_window {
        lines.push(format!(
            "ALERT: EXTERNAL SIGNAL WINDOW OPEN ({} turn(s) remaining)",
            state.external_window_turns
        ));
    }
    lines
}

pub(crate) fn push_ending(lines: &mut Vec<String>, state: &GameState) {
    if let Some(text) = state.ending_text() {
        lines.push(String::new());
        lines.push(RULE.to_string());
        lines.push(text.to_string());
        lines.push(RULE.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endgame::Ending;
    use crate::session::new_game;

    #[test]
    fn status_block_lists_roster_in_order() {
        let state = new_game(42).state;
        let lines = status_lines(&state);
        assert_eq!(lines[0], "Turn 1 | Turns Left: 10");
        assert_eq!(lines[1], "Power 55 | Integrity 70 | Focus 60");
        assert_eq!(lines[2], "Subsystems:");
        assert_eq!(lines[3], "  - Antenna Array: Degraded");
        assert_eq!(lines[4], "  - AI Core: Degraded");
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn status_block_marks_scans_and_window() {
        let mut state = new_game(42).state;
        state.external_window = true;
        state.external_window_turns = 1;
        if let Some(ai) = state.subsystem_mut(crate::data::SubsystemName::AiCore) {
            ai.scanned = true;
        }
        let lines = status_lines(&state);
        assert_eq!(lines[4], "  - AI Core: Degraded (scanned)");
        assert_eq!(
            lines.last().map(String::as_str),
            Some("ALERT: EXTERNAL SIGNAL WINDOW OPEN (1 turn(s) remaining)")
        );
    }

    #[test]
    fn ending_banner_wraps_text() {
        let mut state = new_game(7).state;
        let mut lines = Vec::new();
        push_ending(&mut lines, &state);
        assert!(lines.is_empty());

        state.ended = true;
        state.ending = Some(Ending::FocusLost);
        push_ending(&mut lines, &state);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], RULE);
        assert_eq!(lines[2], Ending::FocusLost.text());
    }

    #[test]
    fn help_lists_every_command() {
        let mut lines = Vec::new();
        push_help(&mut lines);
        for verb in ["scan", "repair", "reroute", "rest", "override", "tx", "status", "restart"] {
            assert!(lines.iter().any(|line| line.trim_start().starts_with(verb)), "{verb}");
        }
        assert_eq!(RULE.len(), 62);
    }
}
