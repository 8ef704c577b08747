use lode_core::model::command::Command;
use lode_core::model::coord::Coord;
use lode_core::model::entity::{EntityId, EntityKind, Item};
use lode_core::model::observation::{CellReport, EntityRecord, OreToken, TurnObservation};
use std::io::{BufRead, Write};
use std::str::FromStr;
use thiserror::Error;

/// Errors in the line-based feed. All of them are fatal: the feed is
/// well-formed by contract, so no recovery is attempted.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("input ended while reading {context}")]
    UnexpectedEof { context: &'static str },
    #[error("failed to read {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{context}: expected {expected} tokens, found {actual}")]
    TokenCount {
        context: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{context}: invalid number {token:?}")]
    Numeric {
        context: &'static str,
        token: String,
    },
    #[error("unknown entity type code {0}")]
    UnknownEntityKind(i32),
    #[error("unknown item code {0}")]
    UnknownItem(i32),
}

/// Line-oriented reader for the match feed.
pub struct ProtocolReader<R> {
    input: R,
}

impl<R: BufRead> ProtocolReader<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    fn read_line(&mut self, context: &'static str) -> Result<Option<String>, ProtocolError> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|source| ProtocolError::Io { context, source })?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end().to_string()))
    }

    fn require_line(&mut self, context: &'static str) -> Result<String, ProtocolError> {
        self.read_line(context)?
            .ok_or(ProtocolError::UnexpectedEof { context })
    }

    /// Initial handshake: `width height`, fixed for the whole match.
    pub fn read_handshake(&mut self) -> Result<(u32, u32), ProtocolError> {
        let line = self.require_line("board dimensions")?;
        let tokens = expect_tokens(&line, 2, "board dimensions")?;
        let width = parse_num(tokens[0], "board dimensions")?;
        let height = parse_num(tokens[1], "board dimensions")?;
        Ok((width, height))
    }

    /// One full turn. `Ok(None)` means the feed ended cleanly at a turn
    /// boundary (match over); EOF anywhere else is an error.
    pub fn read_turn(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<Option<TurnObservation>, ProtocolError> {
        let Some(scores) = self.read_line("turn scores")? else {
            return Ok(None);
        };
        let tokens = expect_tokens(&scores, 2, "turn scores")?;
        let my_score = parse_num(tokens[0], "turn scores")?;
        let enemy_score = parse_num(tokens[1], "turn scores")?;

        let mut cells = Vec::with_capacity(height as usize);
        for _ in 0..height {
            let line = self.require_line("board row")?;
            cells.push(parse_row(&line, width as usize)?);
        }

        let status = self.require_line("entity header")?;
        let tokens = expect_tokens(&status, 3, "entity header")?;
        let entity_count: usize = parse_num(tokens[0], "entity header")?;
        let radar_cooldown = parse_num(tokens[1], "entity header")?;
        let trap_cooldown = parse_num(tokens[2], "entity header")?;

        let mut entities = Vec::with_capacity(entity_count);
        for _ in 0..entity_count {
            let line = self.require_line("entity record")?;
            entities.push(parse_entity(&line)?);
        }

        Ok(Some(TurnObservation {
            my_score,
            enemy_score,
            radar_cooldown,
            trap_cooldown,
            cells,
            entities,
        }))
    }
}

fn expect_tokens<'a>(
    line: &'a str,
    expected: usize,
    context: &'static str,
) -> Result<Vec<&'a str>, ProtocolError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != expected {
        return Err(ProtocolError::TokenCount {
            context,
            expected,
            actual: tokens.len(),
        });
    }
    Ok(tokens)
}

fn parse_num<T: FromStr>(token: &str, context: &'static str) -> Result<T, ProtocolError> {
    token.parse().map_err(|_| ProtocolError::Numeric {
        context,
        token: token.to_string(),
    })
}

/// A board row alternates ore tokens (`?` or an amount) and hole flags.
fn parse_row(line: &str, width: usize) -> Result<Vec<CellReport>, ProtocolError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 2 * width {
        return Err(ProtocolError::TokenCount {
            context: "board row",
            expected: 2 * width,
            actual: tokens.len(),
        });
    }

    let mut row = Vec::with_capacity(width);
    for pair in tokens.chunks_exact(2) {
        let ore = if pair[0] == "?" {
            OreToken::Unknown
        } else {
            OreToken::Amount(parse_num(pair[0], "board row")?)
        };
        let hole: u8 = parse_num(pair[1], "board row")?;
        row.push(CellReport {
            ore,
            hole: hole != 0,
        });
    }
    Ok(row)
}

fn parse_entity(line: &str) -> Result<EntityRecord, ProtocolError> {
    let tokens = expect_tokens(line, 5, "entity record")?;
    let id: u32 = parse_num(tokens[0], "entity record")?;
    let kind_code: i32 = parse_num(tokens[1], "entity record")?;
    let x = parse_num(tokens[2], "entity record")?;
    let y = parse_num(tokens[3], "entity record")?;
    let item_code: i32 = parse_num(tokens[4], "entity record")?;

    let kind = match kind_code {
        0 => EntityKind::Ally,
        1 => EntityKind::Enemy,
        2 => EntityKind::Radar,
        3 => EntityKind::Trap,
        other => return Err(ProtocolError::UnknownEntityKind(other)),
    };
    let item = match item_code {
        -1 => Item::None,
        2 => Item::Radar,
        3 => Item::Trap,
        4 => Item::Crystal,
        other => return Err(ProtocolError::UnknownItem(other)),
    };

    Ok(EntityRecord {
        id: EntityId(id),
        kind,
        pos: Coord::new(x, y),
        item,
    })
}

/// One command line per friendly unit, in decision order.
pub fn write_commands<W: Write>(
    out: &mut W,
    commands: &[(EntityId, Command)],
) -> std::io::Result<()> {
    for (_, command) in commands {
        writeln!(out, "{command}")?;
    }
    out.flush()
}
