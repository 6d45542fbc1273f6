use std::{
    io::ErrorKind as IoErrorKind,
    path::{Path, PathBuf},
};

use clap::{
    CommandFactory, FromArgMatches,
    error::{ErrorKind as ClapErrorKind, Result as ClapResult},
};
use serde::Deserialize;

/// The name of the optional config file in the output directory.
const CONFIG_FILE_NAME: &str = ".k6-clients.toml";

/// Characters that can't appear in an output file basename.
const BASENAME_FORBIDDEN: &[char] = &['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>', ' '];

#[derive(Debug)]
pub struct Main {
    pub verbose: bool,
    pub command: Command,
}

impl Main {
    pub fn parse() -> ClapResult<Main> {
        let mut cmd = MainArgs::command();
        let mut matches = cmd
            .try_get_matches_from_mut(std::env::args_os())
            .map_err(|err| err.format(&mut cmd))?;
        let args =
            MainArgs::from_arg_matches_mut(&mut matches).map_err(|err| err.format(&mut cmd))?;

        let command = match args.command {
            CommandArgs::Codegen(CodegenArgs {
                input,
                output,
                basename,
            }) => {
                let file: Option<ConfigFile> = {
                    let path = output.join(CONFIG_FILE_NAME);
                    match std::fs::read_to_string(&path) {
                        Ok(contents) => Some(toml::from_str(&contents).map_err(|err| {
                            cmd.error(
                                ClapErrorKind::ValueValidation,
                                format!("Failed to parse `{}`: {err}", path.display()),
                            )
                        })?),
                        Err(err) if err.kind() == IoErrorKind::NotFound => None,
                        Err(err) => {
                            return Err(cmd.error(
                                ClapErrorKind::Io,
                                format!("Failed to read `{}`: {err}", path.display()),
                            ));
                        }
                    }
                };

                let basename = resolve_basename(
                    &input,
                    basename.as_deref(),
                    file.as_ref().and_then(|file| file.basename.as_deref()),
                )
                .ok_or_else(|| {
                    cmd.error(
                        ClapErrorKind::ValueValidation,
                        format!(
                            "couldn't infer an output basename from `{}`; please specify one with `--basename`",
                            input.display()
                        ),
                    )
                })?;

                Command::Codegen(Codegen {
                    input,
                    output,
                    basename,
                })
            }
            CommandArgs::Validate(ValidateArgs { input }) => Command::Validate(Validate { input }),
        };

        Ok(Main {
            verbose: args.verbose,
            command,
        })
    }
}

#[derive(Debug)]
pub enum Command {
    Codegen(Codegen),
    Validate(Validate),
}

#[derive(Debug)]
pub struct Codegen {
    pub input: PathBuf,
    pub output: PathBuf,
    /// The file name for the generated files, without an extension.
    pub basename: String,
}

#[derive(Debug)]
pub struct Validate {
    pub input: PathBuf,
}

/// Picks the output basename: the command-line flag, then the config
/// file, then the input document's file stem.
fn resolve_basename(input: &Path, flag: Option<&str>, file: Option<&str>) -> Option<String> {
    flag.into_iter()
        .chain(file)
        .map(sanitize_basename)
        .find(|basename| !basename.is_empty())
        .or_else(|| Some(input.file_stem()?.to_string_lossy().into_owned()))
}

/// Strips characters that aren't allowed in file names.
fn sanitize_basename(basename: &str) -> String {
    basename.replace(BASENAME_FORBIDDEN, "")
}

#[derive(Debug, clap::Parser)]
#[command(version, about, long_about = None)]
struct MainArgs {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CommandArgs,
}

#[derive(Debug, clap::Subcommand)]
enum CommandArgs {
    /// Generate k6 clients and type definitions from an OpenAPI document.
    Codegen(CodegenArgs),
    /// Check that an OpenAPI document can be used for generation.
    Validate(ValidateArgs),
}

#[derive(Debug, clap::Args)]
struct CodegenArgs {
    /// The path to the OpenAPI document (`.yaml` or `.json`).
    input: PathBuf,

    /// The output directory for the generated files.
    #[arg(short, long = "output-dir", default_value = ".")]
    output: PathBuf,

    /// The generated file name, without an extension. Defaults to the
    /// document's file name.
    #[arg(short, long)]
    basename: Option<String>,
}

#[derive(Debug, clap::Args)]
struct ValidateArgs {
    /// The path to the OpenAPI document (`.yaml` or `.json`).
    input: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    basename: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::Parser;

    #[test]
    fn test_sanitize_basename() {
        assert_eq!(sanitize_basename("watering hole"), "wateringhole");
        assert_eq!(sanitize_basename("a/b\\c?d%e*f:g|h\"i<j>k"), "abcdefghijk");
        assert_eq!(sanitize_basename("petstore-v2"), "petstore-v2");
    }

    #[test]
    fn test_resolve_basename_precedence() {
        let input = Path::new("specs/watering-hole.yaml");
        assert_eq!(
            resolve_basename(input, Some("cli name"), Some("file")).as_deref(),
            Some("cliname")
        );
        assert_eq!(
            resolve_basename(input, None, Some("from-file")).as_deref(),
            Some("from-file")
        );
        assert_eq!(
            resolve_basename(input, None, None).as_deref(),
            Some("watering-hole")
        );
        assert_eq!(
            resolve_basename(input, Some("???"), None).as_deref(),
            Some("watering-hole")
        );
    }

    #[test]
    fn test_config_file() {
        let file: ConfigFile = toml::from_str("basename = \"api\"").unwrap();
        assert_eq!(file.basename.as_deref(), Some("api"));

        let file: ConfigFile = toml::from_str("").unwrap();
        assert_eq!(file.basename, None);
    }

    #[test]
    fn test_parse_codegen_args() {
        let args = MainArgs::try_parse_from([
            "oas-to-k6-clients",
            "codegen",
            "api.yaml",
            "-o",
            "out",
            "-b",
            "client",
            "-v",
        ])
        .unwrap();
        assert!(args.verbose);
        let CommandArgs::Codegen(codegen) = args.command else {
            panic!("expected `codegen`");
        };
        assert_eq!(codegen.input, Path::new("api.yaml"));
        assert_eq!(codegen.output, Path::new("out"));
        assert_eq!(codegen.basename.as_deref(), Some("client"));
    }

    #[test]
    fn test_parse_codegen_defaults() {
        let args = MainArgs::try_parse_from(["oas-to-k6-clients", "codegen", "api.json"]).unwrap();
        let CommandArgs::Codegen(codegen) = args.command else {
            panic!("expected `codegen`");
        };
        assert_eq!(codegen.output, Path::new("."));
        assert_eq!(codegen.basename, None);
    }

    #[test]
    fn test_command_is_valid() {
        MainArgs::command().debug_assert();
    }
}
