use crate::model::coord::Coord;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    Radar,
    Trap,
}

/// One command per friendly unit per turn; rendered verbatim onto the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Wait,
    Move(Coord),
    Dig(Coord),
    Request(RequestKind),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Wait => f.write_str("WAIT"),
            Command::Move(at) => write!(f, "MOVE {} {}", at.x, at.y),
            Command::Dig(at) => write!(f, "DIG {} {}", at.x, at.y),
            Command::Request(RequestKind::Radar) => f.write_str("REQUEST RADAR"),
            Command::Request(RequestKind::Trap) => f.write_str("REQUEST TRAP"),
        }
    }
}
