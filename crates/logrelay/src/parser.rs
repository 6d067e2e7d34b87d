// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Classifier for Counter-Strike server log lines.
//!
//! Every line carries a `MM/DD/YYYY - HH:MM:SS: ` header followed by a body. The body is
//! matched against the grammar rules below in order and the first match wins. A body that
//! matches nothing still classifies, as [`EventKind::Unknown`].

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::errors::ParseError;
use crate::event::{Event, EventKind, Player, Position, Vector};

/// Quoted player with side: `"name<id><steam_id><side>"`. Four capture groups.
const PLAYER: &str = r#""(.+?)<(\d+)><([\[\]\w:]+)><(TERRORIST|CT|Unassigned|Spectator|)>""#;
/// Integer coordinates: `[x y z]`. Three capture groups.
const POSITION: &str = r"\[(-?\d+) (-?\d+) (-?\d+)\]";
const FLOAT: &str = r"(-?\d+\.\d+)";

type Builder = fn(&Captures<'_>) -> Result<EventKind, ParseError>;

struct Rule {
    regex: Regex,
    build: Builder,
}

#[allow(clippy::expect_used)]
fn pattern(body: &str) -> Regex {
    let body = body
        .replace("{P}", PLAYER)
        .replace("{POS}", POSITION)
        .replace("{F}", FLOAT);
    Regex::new(&format!("^{body}$")).expect("failed creating regex")
}

lazy_static! {
    static ref LOG_LINE: Regex = pattern(r"(?:.*?)(\d{2}/\d{2}/\d{4} - \d{2}:\d{2}:\d{2}): (.*)");

    static ref GRAMMAR: Vec<Rule> = vec![
        Rule {
            regex: pattern(r#"server_message: "(\w+)""#),
            build: |c| Ok(EventKind::ServerMessage { text: text(c, 1) }),
        },
        Rule {
            regex: pattern(r"Starting Freeze period"),
            build: |_| Ok(EventKind::FreezTimeStart),
        },
        Rule {
            regex: pattern(r#"World triggered "Match_Start" on "(\w+)""#),
            build: |c| Ok(EventKind::WorldMatchStart { map: text(c, 1) }),
        },
        Rule {
            regex: pattern(r#"World triggered "Round_Start""#),
            build: |_| Ok(EventKind::WorldRoundStart),
        },
        Rule {
            regex: pattern(r#"World triggered "Restart_Round_\((\d+)_seconds?\)""#),
            build: |c| {
                Ok(EventKind::WorldRoundRestart {
                    timeleft: number(c, 1, "timeleft")?,
                })
            },
        },
        Rule {
            regex: pattern(r#"World triggered "Round_End""#),
            build: |_| Ok(EventKind::WorldRoundEnd),
        },
        Rule {
            regex: pattern(r#"World triggered "Game_Commencing""#),
            build: |_| Ok(EventKind::WorldGameCommencing),
        },
        Rule {
            regex: pattern(r#"Team "(CT|TERRORIST)" scored "(\d+)" with "(\d+)" players"#),
            build: |c| {
                Ok(EventKind::TeamScored {
                    side: text(c, 1),
                    score: number(c, 2, "score")?,
                    players: number(c, 3, "players")?,
                })
            },
        },
        Rule {
            regex: pattern(r#"Team "(CT|TERRORIST)" triggered "(\w+)" \(CT "(\d+)"\) \(T "(\d+)"\)"#),
            build: |c| {
                Ok(EventKind::TeamNotice {
                    side: text(c, 1),
                    notice: text(c, 2),
                    score_ct: number(c, 3, "score_ct")?,
                    score_t: number(c, 4, "score_t")?,
                })
            },
        },
        Rule {
            regex: pattern(r#"{P} connected, address "(.*)""#),
            build: |c| {
                Ok(EventKind::PlayerConnected {
                    player: player(c, 1)?,
                    address: text(c, 5),
                })
            },
        },
        Rule {
            regex: pattern(r#"{P} disconnected \(reason "(.*)"\)"#),
            build: |c| {
                Ok(EventKind::PlayerDisconnected {
                    player: player(c, 1)?,
                    reason: text(c, 5),
                })
            },
        },
        Rule {
            regex: pattern(r"{P} entered the game"),
            build: |c| Ok(EventKind::PlayerEntered { player: player(c, 1)? }),
        },
        Rule {
            regex: pattern(r#"Banid: {P} was banned "([\w. ]+)" by "(\w+)""#),
            build: |c| {
                Ok(EventKind::PlayerBanned {
                    player: player(c, 1)?,
                    duration: text(c, 5),
                    by: text(c, 6),
                })
            },
        },
        Rule {
            // the side is not part of the player tag on team switches
            regex: pattern(r#""(.+?)<(\d+)><([\[\]\w:]+)>" switched from team <(\w+)> to <(\w+)>"#),
            build: |c| {
                Ok(EventKind::PlayerSwitched {
                    player: Player {
                        name: text(c, 1),
                        id: number(c, 2, "id")?,
                        steam_id: text(c, 3),
                        side: text(c, 5),
                    },
                    from: text(c, 4),
                    to: text(c, 5),
                })
            },
        },
        Rule {
            regex: pattern(r#"{P} say(_team)? "(.*)""#),
            build: |c| {
                Ok(EventKind::PlayerSay {
                    player: player(c, 1)?,
                    text: text(c, 6),
                    team: c.get(5).is_some(),
                })
            },
        },
        Rule {
            regex: pattern(r#"{P} purchased "(\w+)""#),
            build: |c| {
                Ok(EventKind::PlayerPurchase {
                    player: player(c, 1)?,
                    item: text(c, 5),
                })
            },
        },
        Rule {
            regex: pattern(
                r#"{P} {POS} killed {P} {POS} with "(\w+)"(?: \((headshot|penetrated|headshot penetrated)\))?"#,
            ),
            build: |c| {
                let modifiers = text(c, 16);
                Ok(EventKind::PlayerKill {
                    attacker: player(c, 1)?,
                    attacker_position: position(c, 5)?,
                    victim: player(c, 8)?,
                    victim_position: position(c, 12)?,
                    weapon: text(c, 15),
                    headshot: modifiers.contains("headshot"),
                    penetrated: modifiers.contains("penetrated"),
                })
            },
        },
        Rule {
            regex: pattern(r"{P} assisted killing {P}"),
            build: |c| {
                Ok(EventKind::PlayerKillAssist {
                    attacker: player(c, 1)?,
                    victim: player(c, 5)?,
                })
            },
        },
        Rule {
            regex: pattern(
                r#"{P} {POS} attacked {P} {POS} with "(\w*)" \(damage "(\d+)"\) \(damage_armor "(\d+)"\) \(health "(\d+)"\) \(armor "(\d+)"\) \(hitgroup "([\w ]+)"\)"#,
            ),
            build: |c| {
                Ok(EventKind::PlayerAttack {
                    attacker: player(c, 1)?,
                    attacker_position: position(c, 5)?,
                    victim: player(c, 8)?,
                    victim_position: position(c, 12)?,
                    weapon: text(c, 15),
                    damage: number(c, 16, "damage")?,
                    damage_armor: number(c, 17, "damage_armor")?,
                    health: number(c, 18, "health")?,
                    armor: number(c, 19, "armor")?,
                    hitgroup: text(c, 20),
                })
            },
        },
        Rule {
            regex: pattern(r"{P} {POS} was killed by the bomb\."),
            build: |c| {
                Ok(EventKind::PlayerKilledBomb {
                    player: player(c, 1)?,
                    position: position(c, 5)?,
                })
            },
        },
        Rule {
            regex: pattern(r#"{P} {POS} committed suicide with "(.*)""#),
            build: |c| {
                Ok(EventKind::PlayerKilledSuicide {
                    player: player(c, 1)?,
                    position: position(c, 5)?,
                    with: text(c, 8),
                })
            },
        },
        Rule {
            regex: pattern(r#"{P} picked up "(\w+)""#),
            build: |c| {
                Ok(EventKind::PlayerPickedUp {
                    player: player(c, 1)?,
                    item: text(c, 5),
                })
            },
        },
        Rule {
            regex: pattern(r#"{P} dropped "(\w+)""#),
            build: |c| {
                Ok(EventKind::PlayerDropped {
                    player: player(c, 1)?,
                    item: text(c, 5),
                })
            },
        },
        Rule {
            regex: pattern(
                r"{P} money change (\d+)([+-]\d+) = \$(\d+) \(tracked\)(?: \(purchase: (\w+)\))?",
            ),
            build: |c| {
                Ok(EventKind::PlayerMoneyChange {
                    player: player(c, 1)?,
                    previous: number(c, 5, "previous")?,
                    change: number(c, 6, "change")?,
                    result: number(c, 7, "result")?,
                    purchase: c.get(8).map(|m| m.as_str().to_string()),
                })
            },
        },
        Rule {
            regex: pattern(r#"{P} triggered "Got_The_Bomb""#),
            build: |c| Ok(EventKind::PlayerBombGot { player: player(c, 1)? }),
        },
        Rule {
            regex: pattern(r#"{P} triggered "Planted_The_Bomb""#),
            build: |c| Ok(EventKind::PlayerBombPlanted { player: player(c, 1)? }),
        },
        Rule {
            regex: pattern(r#"{P} triggered "Dropped_The_Bomb""#),
            build: |c| Ok(EventKind::PlayerBombDropped { player: player(c, 1)? }),
        },
        Rule {
            regex: pattern(r#"{P} triggered "Begin_Bomb_Defuse_With(out)?_Kit""#),
            build: |c| {
                Ok(EventKind::PlayerBombBeginDefuse {
                    player: player(c, 1)?,
                    kit: c.get(5).is_none(),
                })
            },
        },
        Rule {
            regex: pattern(r#"{P} triggered "Defused_The_Bomb""#),
            build: |c| Ok(EventKind::PlayerBombDefused { player: player(c, 1)? }),
        },
        Rule {
            // flashbangs carry a trailing "flashbang entindex N)" suffix, parenthesis included
            regex: pattern(r"{P} threw (\w+) {POS}(?: flashbang entindex (\d+)\))?"),
            build: |c| {
                Ok(EventKind::PlayerThrew {
                    player: player(c, 1)?,
                    grenade: text(c, 5),
                    position: position(c, 6)?,
                    entindex: c
                        .get(9)
                        .map(|m| parse_number(m.as_str(), "entindex"))
                        .transpose()?,
                })
            },
        },
        Rule {
            regex: pattern(r"{P} blinded for (\d+(?:\.\d+)?) by {P} from flashbang entindex (\d+) ?"),
            build: |c| {
                Ok(EventKind::PlayerBlinded {
                    victim: player(c, 1)?,
                    duration: finite(c, 5, "duration")?,
                    attacker: player(c, 6)?,
                    entindex: number(c, 10, "entindex")?,
                })
            },
        },
        Rule {
            regex: pattern(r"Molotov projectile spawned at {F} {F} {F}, velocity {F} {F} {F}"),
            build: |c| {
                Ok(EventKind::ProjectileSpawned {
                    position: vector(c, 1)?,
                    velocity: vector(c, 4)?,
                })
            },
        },
        Rule {
            regex: pattern(r"Game Over: (\w+) (\w+) (\w+) score (\d+):(\d+) after (\d+) min"),
            build: |c| {
                Ok(EventKind::GameOver {
                    mode: text(c, 1),
                    map_group: text(c, 2),
                    map: text(c, 3),
                    score_ct: number(c, 4, "score_ct")?,
                    score_t: number(c, 5, "score_t")?,
                    duration: number(c, 6, "duration")?,
                })
            },
        },
    ];
}

/// Classifies one raw log line.
///
/// Returns [`ParseError::NoMatch`] when the line has no log header. Trailing whitespace
/// (including the newline terminator) is ignored.
pub fn parse(line: &str) -> Result<Event, ParseError> {
    let header = LOG_LINE
        .captures(line.trim_end())
        .ok_or(ParseError::NoMatch)?;
    let time = parse_timestamp(&text(&header, 1))?;
    let body = text(&header, 2);

    let kind = match GRAMMAR.iter().find_map(|rule| {
        rule.regex
            .captures(&body)
            .map(|captures| (rule.build)(&captures))
    }) {
        Some(kind) => kind?,
        None => EventKind::Unknown { raw: body },
    };

    Ok(Event { time, kind })
}

fn parse_timestamp(value: &str) -> Result<OffsetDateTime, ParseError> {
    PrimitiveDateTime::parse(
        value,
        format_description!("[month]/[day]/[year] - [hour]:[minute]:[second]"),
    )
    .map(PrimitiveDateTime::assume_utc)
    .map_err(|_| ParseError::InvalidTimestamp(value.to_string()))
}

fn text(captures: &Captures<'_>, index: usize) -> String {
    captures
        .get(index)
        .map_or_else(String::new, |m| m.as_str().to_string())
}

fn number<T: FromStr>(
    captures: &Captures<'_>,
    index: usize,
    field: &'static str,
) -> Result<T, ParseError> {
    parse_number(captures.get(index).map_or("", |m| m.as_str()), field)
}

fn parse_number<T: FromStr>(value: &str, field: &'static str) -> Result<T, ParseError> {
    // explicit sign only ever appears on money deltas
    value
        .strip_prefix('+')
        .unwrap_or(value)
        .parse()
        .map_err(|_| ParseError::InvalidField {
            field,
            value: value.to_string(),
        })
}

/// Reads the four groups of a `PLAYER` fragment starting at `start`.
fn player(captures: &Captures<'_>, start: usize) -> Result<Player, ParseError> {
    Ok(Player {
        name: text(captures, start),
        id: number(captures, start + 1, "id")?,
        steam_id: text(captures, start + 2),
        side: text(captures, start + 3),
    })
}

fn position(captures: &Captures<'_>, start: usize) -> Result<Position, ParseError> {
    Ok(Position {
        x: number(captures, start, "x")?,
        y: number(captures, start + 1, "y")?,
        z: number(captures, start + 2, "z")?,
    })
}

fn vector(captures: &Captures<'_>, start: usize) -> Result<Vector, ParseError> {
    Ok(Vector {
        x: finite(captures, start, "x")?,
        y: finite(captures, start + 1, "y")?,
        z: finite(captures, start + 2, "z")?,
    })
}

/// Floats too long for `f64` parse to infinity, which JSON cannot carry.
fn finite(captures: &Captures<'_>, index: usize, field: &'static str) -> Result<f64, ParseError> {
    let value: f64 = number(captures, index, field)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParseError::InvalidField {
            field,
            value: text(captures, index),
        })
    }
}
