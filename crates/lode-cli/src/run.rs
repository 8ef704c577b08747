use crate::protocol::{ProtocolReader, write_commands};
use anyhow::{Context, anyhow};
use lode_bot::{BotParams, HeuristicPolicy, TurnController};
use lode_core::game::config::BeliefConfig;
use lode_core::game::session::Session;
use lode_core::game::snapshot::SessionSnapshot;
use std::io::{BufRead, Write};
use tracing::{Level, event};

/// Plays a complete match over the given transport: handshake, then one
/// observation in and one command block out per turn until the feed ends.
pub fn run_match<R: BufRead, W: Write>(input: R, mut output: W) -> anyhow::Result<()> {
    let mut reader = ProtocolReader::new(input);
    let (width, height) = reader
        .read_handshake()
        .context("reading the board handshake")?;

    let mut session = Session::with_config(width, height, BeliefConfig::from_env());
    let mut controller = TurnController::new(HeuristicPolicy::new(), BotParams::from_env());

    loop {
        let Some(obs) = reader
            .read_turn(width, height)
            .context("reading a turn observation")?
        else {
            break;
        };

        let commands = controller
            .play_turn(&mut session, &obs)
            .map_err(|err| anyhow!("observation rejected by the world model: {err:?}"))?;

        write_commands(&mut output, &commands).context("writing turn commands")?;

        if tracing::enabled!(Level::DEBUG) {
            event!(
                target: "lode_cli::run",
                Level::DEBUG,
                turn = session.turn(),
                commands = commands.len(),
                score = session.my_score(),
            );
        }
    }

    if let Ok(summary) = SessionSnapshot::to_json(&session) {
        event!(target: "lode_cli::run", Level::INFO, %summary, "match finished");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run_match;

    #[test]
    fn scripted_match_produces_one_command_per_unit_per_turn() {
        // 4x3 board, one allied unit idling at home with everything hidden:
        // the opening move is always a radar request.
        let feed = "\
4 3
0 0
? 0 ? 0 ? 0 ? 0
? 0 ? 0 ? 0 ? 0
? 0 ? 0 ? 0 ? 0
1 0 0
0 0 0 0 -1
0 0
? 0 ? 0 ? 0 ? 0
? 0 ? 0 ? 0 ? 0
? 0 ? 0 ? 0 ? 0
1 5 0
0 0 0 0 2
";
        let mut out = Vec::new();
        run_match(feed.as_bytes(), &mut out).unwrap();

        let rendered = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "REQUEST RADAR");
        // Turn two the unit carries the radar and walks it to a lattice site.
        assert!(lines[1].starts_with("DIG "), "got {:?}", lines[1]);
    }

    #[test]
    fn malformed_feed_is_fatal() {
        let feed = "4 3\n0 0\n? 0 ? 0\n";
        let mut out = Vec::new();
        assert!(run_match(feed.as_bytes(), &mut out).is_err());
    }
}
