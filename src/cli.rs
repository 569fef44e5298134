use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct CliArgs {
    pub config_path: PathBuf,
    pub seed: Option<u32>,
    pub out_path: PathBuf,
    pub preview_path: Option<PathBuf>,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("map.json"),
            seed: None,
            out_path: PathBuf::from("tilemap.json"),
            preview_path: None,
        }
    }
}

impl CliArgs {
    pub fn from_env_args() -> Result<Self> {
        Self::from_iter(
            std::env::args_os().skip(1),
            std::env::var_os("TILEMAP_GEN_CONFIG"),
        )
    }

    fn from_iter<I>(args: I, env_config: Option<OsString>) -> Result<Self>
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut cli = Self::default();

        if let Some(path) = env_config.filter(|v| !v.is_empty()) {
            cli.config_path = PathBuf::from(path);
        }

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            let arg_str = arg.to_string_lossy();
            match arg_str.as_ref() {
                "--config" => cli.config_path = PathBuf::from(value(&mut iter, "--config")?),
                "--out" => cli.out_path = PathBuf::from(value(&mut iter, "--out")?),
                "--preview" => {
                    cli.preview_path = Some(PathBuf::from(value(&mut iter, "--preview")?))
                }
                "--seed" => {
                    let raw = value(&mut iter, "--seed")?;
                    let seed = raw
                        .to_string_lossy()
                        .parse::<u32>()
                        .with_context(|| format!("invalid --seed {:?}", raw))?;
                    cli.seed = Some(seed);
                }
                other => log::warn!("ignoring unknown argument {other}"),
            }
        }

        Ok(cli)
    }
}

fn value<I>(iter: &mut I, flag: &str) -> Result<OsString>
where
    I: Iterator<Item = OsString>,
{
    iter.next()
        .filter(|v| !v.is_empty() && !is_flag(v))
        .ok_or_else(|| anyhow!("{flag} requires a value"))
}

fn is_flag(value: &OsStr) -> bool {
    value.to_string_lossy().starts_with("--")
}
