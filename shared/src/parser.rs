//! Versioned per-command parser table and the line parser built on it.

use crate::error::ParseError;
use crate::event::StructuredEvent;
use crate::extract::FieldExtractor;
use crate::extract::FieldExtractor::{Actor, Coordinates, Entity, HealthArmour, Int, Name, Team};
use crate::tokenizer::Tokens;
use crate::PROTOCOL_PREFIX;
use std::collections::HashMap;

/// One row of the built-in grammar: command, format version, field layout.
pub type ParserEntry = (&'static str, &'static str, &'static [FieldExtractor]);

const ORIGINATOR: &[FieldExtractor] = &[Actor("originator")];
const MAP: &[FieldExtractor] = &[Name("map")];
const NONE: &[FieldExtractor] = &[];

/// Every command the game server plugin emits.
pub const STANDARD_PARSERS: &[ParserEntry] = &[
    ("ammo_pickup", "1", ORIGINATOR),
    ("bullet_impact", "1", &[Actor("originator"), Coordinates("impact")]),
    ("buytime_ended", "1", NONE),
    ("bomb_abortplant", "1", ORIGINATOR),
    ("bomb_beep", "1", NONE),
    ("bomb_begindefuse", "1", ORIGINATOR),
    ("bomb_beginplant", "1", ORIGINATOR),
    ("bomb_exploded", "1", NONE),
    ("bomb_pickup", "1", ORIGINATOR),
    ("bomb_planted", "1", ORIGINATOR),
    ("bomb_defused", "1", ORIGINATOR),
    ("bomb_dropped", "1", ORIGINATOR),
    ("cs_pre_restart", "1", MAP),
    ("cs_win_panel_round", "1", MAP),
    ("cs_win_panel_match", "1", MAP),
    ("decoy_detonate", "1", &[Actor("originator"), Entity("decoy")]),
    ("decoy_firing", "1", &[Actor("originator"), Entity("decoy")]),
    ("decoy_started", "1", &[Actor("originator"), Entity("decoy")]),
    ("enter_bombzone", "1", ORIGINATOR),
    ("enter_buyzone", "1", ORIGINATOR),
    ("enter_rescue_zone", "1", ORIGINATOR),
    ("exit_bombzone", "1", ORIGINATOR),
    ("exit_buyzone", "1", ORIGINATOR),
    ("exit_rescue_zone", "1", ORIGINATOR),
    ("hostage_hurt", "1", ORIGINATOR),
    ("inferno_startburn", "1", &[Entity("inferno")]),
    ("inferno_expire", "1", &[Entity("inferno")]),
    (
        "flashbang_detonate",
        "1",
        &[Actor("originator"), Entity("flashbang_detonate")],
    ),
    (
        "grenade_bounce",
        "1",
        &[Actor("originator"), Entity("grenade_bounce")],
    ),
    ("grenade_thrown", "1", ORIGINATOR),
    (
        "hegrenade_detonate",
        "1",
        &[Actor("originator"), Entity("hegrenade_detonate")],
    ),
    ("item_equip", "1", ORIGINATOR),
    ("item_pickup", "1", ORIGINATOR),
    ("item_purchase", "1", ORIGINATOR),
    ("item_remove", "1", ORIGINATOR),
    (
        "molotov_detonate",
        "1",
        &[Actor("originator"), Entity("molotov_detonate")],
    ),
    ("player_activate", "1", ORIGINATOR),
    ("player_blind", "1", ORIGINATOR),
    (
        "player_death",
        "1",
        &[
            Actor("victim"),
            Team("victim"),
            Actor("attacker"),
            Team("attacker"),
            Name("victim"),
        ],
    ),
    ("player_falldamage", "1", ORIGINATOR),
    ("player_footstep", "1", ORIGINATOR),
    ("player_given_c4", "1", ORIGINATOR),
    (
        "player_hurt",
        "1",
        &[
            Actor("victim"),
            Team("victim"),
            Actor("attacker"),
            Team("attacker"),
            HealthArmour("remaining"),
            HealthArmour("damage"),
            Int("hitbox"),
            Name("victim"),
        ],
    ),
    ("player_jump", "1", ORIGINATOR),
    ("player_radio", "1", ORIGINATOR),
    ("player_spawned", "1", ORIGINATOR),
    ("round_announce_match_start", "1", MAP),
    ("round_announce_warmup", "1", MAP),
    ("round_end", "1", MAP),
    ("round_freeze_end", "1", MAP),
    ("round_poststart", "1", MAP),
    (
        "smokegrenade_detonate",
        "1",
        &[Actor("originator"), Entity("smokegrenade_detonate")],
    ),
    (
        "smokegrenade_expired",
        "1",
        &[Actor("originator"), Entity("smokegrenade_expired")],
    ),
    ("weapon_fire", "1", ORIGINATOR),
    ("weapon_reload", "1", ORIGINATOR),
    ("weapon_zoom", "1", ORIGINATOR),
];

/// Maps command name, then format version, to an ordered field layout.
#[derive(Debug, Clone, Default)]
pub struct ParserTable {
    parsers: HashMap<String, HashMap<String, Vec<FieldExtractor>>>,
}

impl ParserTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The table covering [`STANDARD_PARSERS`].
    pub fn standard() -> Self {
        let mut table = Self::new();
        for (command, version, fields) in STANDARD_PARSERS {
            table.register(command, version, fields.to_vec());
        }
        table
    }

    /// Adds or replaces the layout for one command version.
    pub fn register(&mut self, command: &str, version: &str, fields: Vec<FieldExtractor>) {
        self.parsers
            .entry(command.to_string())
            .or_default()
            .insert(version.to_string(), fields);
    }

    /// Whether any version of `command` is registered.
    pub fn knows_command(&self, command: &str) -> bool {
        self.parsers.contains_key(command)
    }

    /// Field layout for one command version.
    pub fn lookup(&self, command: &str, version: &str) -> Option<&[FieldExtractor]> {
        self.parsers
            .get(command)
            .and_then(|versions| versions.get(version))
            .map(Vec::as_slice)
    }

    /// Every registered `(command, version, layout)`.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &[FieldExtractor])> {
        self.parsers.iter().flat_map(|(command, versions)| {
            versions
                .iter()
                .map(move |(version, fields)| (command.as_str(), version.as_str(), fields.as_slice()))
        })
    }

    /// Number of registered command versions.
    pub fn len(&self) -> usize {
        self.parsers.values().map(HashMap::len).sum()
    }

    /// Returns true if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

/// Turns raw log lines into structured events.
#[derive(Debug, Clone)]
pub struct LineParser {
    prefix: String,
    table: ParserTable,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new(ParserTable::standard(), PROTOCOL_PREFIX)
    }
}

impl LineParser {
    /// Parser for lines carrying `prefix`, using `table` for layouts.
    pub fn new(table: ParserTable, prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            table,
        }
    }

    /// Layouts this parser resolves against.
    pub fn table(&self) -> &ParserTable {
        &self.table
    }

    /// Parses one line.
    ///
    /// The event starts as `{command}` and each extractor of the resolved
    /// layout is merged into it, left to right.
    pub fn parse(&self, line: &str) -> Result<StructuredEvent, ParseError> {
        let mut tokens = Tokens::with_prefix(line, &self.prefix)?;

        let command = tokens.next().unwrap_or_default();
        if !self.table.knows_command(command) {
            return Err(ParseError::ParserNotImplemented {
                command: command.to_string(),
                version: tokens.next().map(str::to_string),
            });
        }

        let version = tokens.next();
        let fields = version
            .and_then(|version| self.table.lookup(command, version))
            .ok_or_else(|| ParseError::ParserNotImplemented {
                command: command.to_string(),
                version: version.map(str::to_string),
            })?;

        let mut event = StructuredEvent::new(command);
        for field in fields {
            let fragment = field
                .extract(&mut tokens)
                .ok_or_else(|| ParseError::Truncated {
                    command: command.to_string(),
                    version: version.unwrap_or_default().to_string(),
                    field: field.label(),
                })?;
            event.merge(fragment);
        }
        Ok(event)
    }
}
