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

mod cli;

use std::{fmt::Display, path::Path, process::exit};

use anyhow::bail;
use clap::{CommandFactory, Parser};
use designer_bff_feedback::FeedbackConfig;
use designer_bff_selection::SelectionConfig;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use self::cli::Args;
use crate::{logging, net, routes};

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
#[cfg_attr(test, serde(deny_unknown_fields))]
pub struct WebApiConfig {
    pub(crate) logging: logging::Config,
    pub(crate) net: net::Config,
    pub(crate) selection: SelectionConfig,
    pub(crate) feedback: FeedbackConfig,
    pub(crate) api: routes::Config,
}

impl WebApiConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.selection.validate()?;
        self.feedback.validate()?;
        if self.api.max_k == 0 {
            bail!("api.max_k must be positive");
        }
        if self.api.default_k > self.api.max_k {
            bail!("api.default_k must not exceed api.max_k");
        }

        Ok(())
    }

    pub fn logging(&self) -> &logging::Config {
        &self.logging
    }
}

/// Loads the config.
///
/// # Panic/Program Exit
///
/// In case of `--help`, `--print-config` and failure this function will not return but terminate
/// the program instead.
pub fn load<C>(application_names: impl IntoIterator<Item = impl Display>) -> C
where
    C: Serialize + DeserializeOwned,
{
    load_with_parsed_args(application_names, Args::parse())
}

fn load_with_parsed_args<C>(
    application_names: impl IntoIterator<Item = impl Display>,
    mut cli_args: Args,
) -> C
where
    C: Serialize + DeserializeOwned,
{
    let config = cli_args.config.take();
    let config = match load_config(
        application_names,
        config.as_deref(),
        cli_args.to_config_overrides(),
    ) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            Args::command().print_help().ok();
            exit(1);
        }
    };

    if cli_args.print_config {
        match serde_json::to_string_pretty(&config) {
            Ok(config) => {
                println!("{config}");
                exit(0);
            }
            Err(err) => {
                eprintln!("Error: {err}");
                exit(1);
            }
        }
    }

    config
}

/// Loads the configuration into the given type.
///
/// # Load order/priority
///
/// This will by ascending priority load:
///
/// 1. `./config.toml` or the specified toml config file
/// 2. `./.env`
/// 3. `./.env.local`
/// 4. process environment
/// 5. options passed through `update_with`
///
/// Config values loaded from higher priority sources override such from lower priority sources.
///
/// # Env and .env
///
/// Environment variables from `.env` and `.env.local` are loaded into the process environment if
/// they don't already exist there.
///
/// Only environment variables which start with one of the `application_names` followed by `__`
/// are considered, earlier names take priority. The variable name is split at `__` into a config
/// path, e.g. `DESIGNER_BFF__FEEDBACK__EXPLORATION_RATE=0.1` is treated like the json
/// `{ "feedback": { "exploration_rate": 0.1 } }`.
fn load_config<C, U>(
    application_names: impl IntoIterator<Item = impl Display>,
    config: Option<&str>,
    update_with: U,
) -> Result<C, figment::Error>
where
    C: DeserializeOwned,
    U: Serialize,
{
    // the order must be from highest to lowest priority
    load_dotenv(".env.local")?;
    load_dotenv(".env")?;

    let mut figment = Figment::new().join(Serialized::defaults(update_with));

    for name in application_names {
        figment = figment.join(Env::prefixed(&format!("{name}__")).split("__"));
    }

    let provider = if let Some(content_or_path) = config {
        if let Some(content) = content_or_path.strip_prefix("inline:") {
            Toml::string(content)
        } else {
            let path = Path::new(content_or_path);
            if !path.is_file() {
                return Err(figment::Error::from(format!(
                    "Config file missing or not a file: {}",
                    path.display()
                )));
            }
            Toml::file(path)
        }
    } else {
        // not finding the default config is not an error
        Toml::file("config.toml")
    };

    figment.join(provider).extract()
}

fn load_dotenv(file_name: &str) -> Result<(), figment::Error> {
    match dotenvy::from_filename(file_name) {
        Err(error) if !error.not_found() => {
            Err(figment::Error::from(error.to_string()).with_path(file_name))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use designer_bff_test_utils::assert_approx_eq;
    use serde_json::{json, Value};

    use super::*;

    const NAMES: [&str; 1] = ["DESIGNER_BFF_TEST_CONFIG"];

    #[test]
    fn test_default_config_is_valid() {
        WebApiConfig::default().validate().unwrap();
    }

    #[test]
    fn test_inline_config() {
        let config = load_config::<WebApiConfig, _>(
            NAMES,
            Some(
                r#"inline:
                [feedback]
                exploration_rate = 0.05
                [feedback.rewards]
                like = 0.9
                [selection.schema]
                match_rule = "exact"
                [api]
                max_k = 20
                "#,
            ),
            json!({}),
        )
        .unwrap();

        assert_approx_eq!(f32, config.feedback.exploration_rate(), 0.05);
        assert_approx_eq!(f32, config.feedback.rewards().like, 0.9);
        assert_eq!(
            config.selection.schema().match_rule,
            designer_bff_selection::MatchRule::Exact,
        );
        assert_eq!(config.api.max_k, 20);
        assert_eq!(config.api.default_k, routes::Config::default().default_k);
    }

    #[test]
    fn test_cli_overrides_take_priority() {
        let args = Args::parse_from([
            "designer-bff-web-api",
            "--bind-to",
            "0.0.0.0:9000",
            "--config",
            "inline:[net]\nbind_to = \"127.0.0.1:8000\"",
        ]);
        let config = load_config::<WebApiConfig, _>(
            NAMES,
            args.config.as_deref(),
            args.to_config_overrides(),
        )
        .unwrap();

        assert_eq!(config.net.bind_to.to_string(), "0.0.0.0:9000");
    }

    #[test]
    fn test_missing_config_file() {
        let result = load_config::<Value, _>(NAMES, Some("./does/not/exist.toml"), json!({}));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_api_limits() {
        let mut config = WebApiConfig::default();
        config.api.default_k = config.api.max_k + 1;
        assert!(config.validate().is_err());
    }
}
