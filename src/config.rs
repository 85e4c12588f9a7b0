// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Command line and environment configuration for the `kanflow` binary.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::model::{BoardId, IdError, Scope, TeamId};
use crate::render::RenderOptions;
use crate::store::{WriteDurability, DEMO_BOARD_ID};

/// Store directory used when neither `--store` nor a positional directory is given.
pub const STORE_ENV: &str = "KANFLOW_STORE";
/// `tracing_subscriber::EnvFilter` directives, overridden by `--log`.
pub const LOG_ENV: &str = "KANFLOW_LOG";
pub const DEFAULT_LOG_FILTER: &str = "info";
/// Written in the working directory while the terminal editor owns the screen.
pub const LOG_FILE_NAME: &str = "kanflow.log";

pub fn usage(program: &str) -> String {
    format!(
        "Usage:\n  {program} [<store-dir>] (--board <id> | --team <id> [--team-board <id>] [--project-board <id>]) [options]\n  {program} --store <dir> --board <id> [options]\n  {program} --demo [options]\n\nOptions:\n  --print            render the diagram to stdout and exit\n  --edge-labels      write target names on edge lanes\n  --durable-writes   fsync records and renames where supported\n  --log <filter>     tracing filter (default: ${LOG_ENV} or {DEFAULT_LOG_FILTER})\n\nIf the store directory is omitted, ${STORE_ENV} or the current directory is used.\n--demo uses a built-in in-memory board and cannot be combined with a store directory."
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    HelpRequested,
    UnknownArgument { arg: String },
    DuplicateFlag { flag: &'static str },
    MissingValue { flag: &'static str },
    InvalidId {
        flag: &'static str,
        value: String,
        source: IdError,
    },
    Conflict { first: &'static str, second: &'static str },
    Requires { flag: &'static str, needs: &'static str },
    MissingScope,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HelpRequested => f.write_str("help requested"),
            Self::UnknownArgument { arg } => write!(f, "unknown argument {arg:?}"),
            Self::DuplicateFlag { flag } => write!(f, "{flag} given more than once"),
            Self::MissingValue { flag } => write!(f, "{flag} needs a value"),
            Self::InvalidId { flag, value, source } => {
                write!(f, "invalid id for {flag}: {value:?}: {source}")
            }
            Self::Conflict { first, second } => {
                write!(f, "{first} cannot be combined with {second}")
            }
            Self::Requires { flag, needs } => write!(f, "{flag} requires {needs}"),
            Self::MissingScope => f.write_str("pass --board <id> or --team <id>"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidId { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Flags as they appear on the command line, before env fallbacks and validation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub demo: bool,
    pub print: bool,
    pub durable_writes: bool,
    pub edge_labels: bool,
    pub store_dir: Option<String>,
    pub board: Option<String>,
    pub team: Option<String>,
    pub team_board: Option<String>,
    pub project_board: Option<String>,
    pub log: Option<String>,
}

fn set_flag(slot: &mut bool, flag: &'static str) -> Result<(), ConfigError> {
    if *slot {
        return Err(ConfigError::DuplicateFlag { flag });
    }
    *slot = true;
    Ok(())
}

fn set_value(
    slot: &mut Option<String>,
    flag: &'static str,
    args: &mut impl Iterator<Item = String>,
) -> Result<(), ConfigError> {
    if slot.is_some() {
        return Err(ConfigError::DuplicateFlag { flag });
    }
    *slot = Some(args.next().ok_or(ConfigError::MissingValue { flag })?);
    Ok(())
}

pub fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ConfigError> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Err(ConfigError::HelpRequested),
            "--demo" => set_flag(&mut options.demo, "--demo")?,
            "--print" => set_flag(&mut options.print, "--print")?,
            "--durable-writes" => set_flag(&mut options.durable_writes, "--durable-writes")?,
            "--edge-labels" => set_flag(&mut options.edge_labels, "--edge-labels")?,
            "--store" => set_value(&mut options.store_dir, "--store", &mut args)?,
            "--board" => set_value(&mut options.board, "--board", &mut args)?,
            "--team" => set_value(&mut options.team, "--team", &mut args)?,
            "--team-board" => set_value(&mut options.team_board, "--team-board", &mut args)?,
            "--project-board" => {
                set_value(&mut options.project_board, "--project-board", &mut args)?
            }
            "--log" => set_value(&mut options.log, "--log", &mut args)?,
            _ if arg.starts_with('-') => return Err(ConfigError::UnknownArgument { arg }),
            _ => {
                if options.store_dir.is_some() {
                    return Err(ConfigError::DuplicateFlag { flag: "--store" });
                }
                options.store_dir = Some(arg);
            }
        }
    }

    Ok(options)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSource {
    Folder(PathBuf),
    Demo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub store: StoreSource,
    pub scope: Scope,
    pub print: bool,
    pub durability: WriteDurability,
    pub log_filter: String,
    pub render: RenderOptions,
}

fn parse_id<T: FromStr<Err = IdError>>(flag: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|source| ConfigError::InvalidId {
        flag,
        value: value.to_owned(),
        source,
    })
}

fn resolve_scope(options: &CliOptions) -> Result<Option<Scope>, ConfigError> {
    if options.team.is_none() {
        if options.team_board.is_some() {
            return Err(ConfigError::Requires { flag: "--team-board", needs: "--team" });
        }
        if options.project_board.is_some() {
            return Err(ConfigError::Requires { flag: "--project-board", needs: "--team" });
        }
    }

    match (&options.board, &options.team) {
        (Some(_), Some(_)) => Err(ConfigError::Conflict { first: "--board", second: "--team" }),
        (Some(board), None) => Ok(Some(Scope::board(parse_id("--board", board)?))),
        (None, Some(team)) => {
            let team_id: TeamId = parse_id("--team", team)?;
            let team_board_id = options
                .team_board
                .as_deref()
                .map(|v| parse_id::<_>("--team-board", v))
                .transpose()?;
            let project_board_id = options
                .project_board
                .as_deref()
                .map(|v| parse_id::<_>("--project-board", v))
                .transpose()?;
            Ok(Some(Scope::Team { team_id, team_board_id, project_board_id }))
        }
        (None, None) => Ok(None),
    }
}

impl AppConfig {
    /// Validates parsed flags and fills the gaps from `env`.
    pub fn resolve(
        options: CliOptions,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if options.demo && options.store_dir.is_some() {
            return Err(ConfigError::Conflict { first: "--demo", second: "--store" });
        }
        if options.demo && options.durable_writes {
            return Err(ConfigError::Conflict { first: "--demo", second: "--durable-writes" });
        }

        let scope = match resolve_scope(&options)? {
            Some(scope) => scope,
            None if options.demo => Scope::board(parse_id::<_>("--board", DEMO_BOARD_ID)?),
            None => return Err(ConfigError::MissingScope),
        };

        let store = if options.demo {
            StoreSource::Demo
        } else {
            let dir = options
                .store_dir
                .or_else(|| env(STORE_ENV).filter(|v| !v.is_empty()))
                .unwrap_or_else(|| ".".to_owned());
            StoreSource::Folder(PathBuf::from(dir))
        };

        let log_filter = options
            .log
            .or_else(|| env(LOG_ENV).filter(|v| !v.is_empty()))
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned());

        Ok(Self {
            store,
            scope,
            print: options.print,
            durability: if options.durable_writes {
                WriteDurability::Durable
            } else {
                WriteDurability::BestEffort
            },
            log_filter,
            render: RenderOptions {
                show_edge_labels: options.edge_labels,
                ..RenderOptions::default()
            },
        })
    }
}
