// Copyright 2023 Xayn AG
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use serde::Serialize;

/// Serves the diverse selection of generated designs and learns from designer feedback.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub(super) struct Args {
    /// Host and port to bind to, overrides `net.bind_to`.
    #[arg(short, long)]
    pub(super) bind_to: Option<SocketAddr>,

    /// Additional json log file, overrides `logging.file`.
    #[arg(short, long)]
    pub(super) log_file: Option<PathBuf>,

    /// Log level filter like `debug`, overrides `logging.level`.
    #[arg(long)]
    pub(super) log_level: Option<String>,

    /// The toml config file, or the toml itself prefixed by `inline:`.
    #[arg(short, long)]
    pub(super) config: Option<String>,

    /// Prints the merged config as json and exits.
    #[arg(long)]
    pub(super) print_config: bool,
}

#[derive(Serialize)]
pub(super) struct Overrides {
    #[serde(skip_serializing_if = "NetOverrides::is_empty")]
    net: NetOverrides,
    #[serde(skip_serializing_if = "LoggingOverrides::is_empty")]
    logging: LoggingOverrides,
}

#[derive(Serialize)]
struct NetOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    bind_to: Option<SocketAddr>,
}

impl NetOverrides {
    fn is_empty(&self) -> bool {
        self.bind_to.is_none()
    }
}

#[derive(Serialize)]
struct LoggingOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<String>,
}

impl LoggingOverrides {
    fn is_empty(&self) -> bool {
        self.file.is_none() && self.level.is_none()
    }
}

impl Args {
    /// The config values set on the command line.
    pub(super) fn to_config_overrides(&self) -> Overrides {
        Overrides {
            net: NetOverrides {
                bind_to: self.bind_to,
            },
            logging: LoggingOverrides {
                file: self.log_file.clone(),
                level: self.log_level.clone(),
            },
        }
    }
}
