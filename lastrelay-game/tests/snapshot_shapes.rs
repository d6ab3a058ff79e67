use std::collections::BTreeSet;

use lastrelay_game::{
    Command, GameState, RelayCfg, RelayEngine, SnapshotError, SubsystemName, new_game, step,
};
use serde_json::Value;

fn advance(seed: u32, commands: &[Command]) -> GameState {
    commands.iter().fold(new_game(seed).state, |state, command| {
        step(&state, *command).expect("accepted").state
    })
}

#[test]
fn snapshot_exposes_every_field() {
    let state = advance(42, &[Command::Scan]);
    let value: Value = serde_json::from_str(&state.to_json().expect("encode")).expect("json");
    let keys: BTreeSet<&str> = value
        .as_object()
        .expect("object")
        .keys()
        .map(String::as_str)
        .collect();
    let expected: BTreeSet<&str> = [
        "seed",
        "turn",
        "turns_left",
        "power",
        "integrity",
        "focus",
        "subsystems",
        "roster",
        "external_window",
        "external_window_turns",
        "transmitted",
        "ai_mislead_counter",
        "ended",
        "ending",
    ]
    .into_iter()
    .collect();
    assert_eq!(keys, expected);

    let cooling = &value["subsystems"]["Cooling Loop"];
    assert_eq!(cooling["quirk"], "Feedback coupling");
    assert_eq!(cooling["status"], "Nominal");
    assert_eq!(cooling["scanned"], true);
    assert_eq!(value["roster"][0], "Antenna Array");
}

#[test]
fn restored_snapshot_continues_identically() {
    let prefix = [Command::Scan, Command::Override];
    let suffix = [
        Command::Reroute {
            target: SubsystemName::AntennaArray,
        },
        Command::Rest,
        Command::Tx,
    ];
    let midway = advance(1337, &prefix);
    let restored = GameState::from_json(&midway.to_json().expect("encode")).expect("decode");

    let direct = suffix.iter().fold(midway, |state, command| {
        step(&state, *command).expect("accepted").state
    });
    let resumed = suffix.iter().fold(restored, |state, command| {
        step(&state, *command).expect("accepted").state
    });
    assert_eq!(direct, resumed);
    assert_eq!(direct.fingerprint(), resumed.fingerprint());
}

#[test]
fn ended_snapshot_round_trips_with_ending() {
    let state = advance(6, &[Command::Rest, Command::Tx]);
    assert!(state.ended);
    let json = state.to_json().expect("encode");
    assert!(json.contains("\"ending\":\"success\""));
    let restored = GameState::from_json(&json).expect("decode");
    assert_eq!(restored.ending_text(), state.ending_text());
}

#[test]
fn tampered_snapshot_is_rejected() {
    let state = new_game(7).state;
    let mut value: Value = serde_json::to_value(&state).expect("value");
    value["power"] = Value::from(140);
    let err = GameState::from_json(&value.to_string()).unwrap_err();
    assert!(matches!(err, SnapshotError::ResourceOutOfRange { field: "power", value: 140 }));

    let mut value: Value = serde_json::to_value(&state).expect("value");
    value["subsystems"]["AI Core"]["quirk"] = Value::from("Ghost pings");
    let err = GameState::from_json(&value.to_string()).unwrap_err();
    assert!(matches!(err, SnapshotError::InconsistentSubsystem { .. }));
    assert!(err.to_string().contains("Ghost pings"));
}

#[test]
fn command_stream_round_trips() {
    let commands = vec![
        Command::Scan,
        Command::Repair {
            target: SubsystemName::DockingControl,
        },
        Command::Reroute {
            target: SubsystemName::NavigationBeacon,
        },
        Command::Rest,
        Command::Override,
        Command::Tx,
        Command::Status,
        Command::Help,
        Command::Restart { seed: Some(12) },
    ];
    let json = serde_json::to_string(&commands).expect("encode");
    let decoded: Vec<Command> = serde_json::from_str(&json).expect("decode");
    assert_eq!(decoded, commands);
}

#[test]
fn config_file_drives_engine() {
    let cfg = RelayCfg::from_json(
        r#"{ "starting_focus": 30, "turn_limit": 4, "signal_window_turns": 3 }"#,
    )
    .expect("valid");
    let engine = RelayEngine::new(cfg).expect("validated");
    let mut state = engine.new_game(6).state;
    assert_eq!(state.focus, 30);
    assert_eq!(state.turns_left, 4);

    // seed 6 opens a window on its first tick
    state = engine.step(&state, Command::Rest).expect("accepted").state;
    assert!(state.external_window);
    assert_eq!(state.external_window_turns, 2);
}
