use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "coffer",
    about = "Inspect and convert Coffer collections",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Store configuration (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the members of a blob file or collection directory
    Ls(LsArgs),
    /// Convert a collection directory into a blob file
    Pack(PackArgs),
    /// Convert a blob file into a collection directory
    Unpack(UnpackArgs),
    /// Copy members from one store to another
    Copy(CopyArgs),
}

#[derive(Args)]
pub struct LsArgs {
    pub path: PathBuf,
    /// Only list these members
    #[arg(long = "only", value_name = "NAME")]
    pub only: Vec<String>,
}

#[derive(Args)]
pub struct PackArgs {
    pub dir: PathBuf,
    pub file: PathBuf,
}

#[derive(Args)]
pub struct UnpackArgs {
    pub file: PathBuf,
    pub dir: PathBuf,
    /// Merge into an existing directory
    #[arg(long)]
    pub append: bool,
}

#[derive(Args)]
pub struct CopyArgs {
    pub src: PathBuf,
    pub dst: PathBuf,
    /// Copy only these members (repeatable)
    #[arg(long = "only", value_name = "NAME")]
    pub only: Vec<String>,
    /// Merge into an existing destination
    #[arg(long)]
    pub append: bool,
    /// Write the destination as a blob file instead of a directory
    #[arg(long)]
    pub blob: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_ls() {
        let cli = Cli::try_parse_from(["coffer", "ls", "settings"]).unwrap();
        if let Command::Ls(args) = cli.command {
            assert_eq!(args.path, PathBuf::from("settings"));
            assert!(args.only.is_empty());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_unpack_append() {
        let cli = Cli::try_parse_from(["coffer", "unpack", "a.bin", "out", "--append"]).unwrap();
        if let Command::Unpack(args) = cli.command {
            assert!(args.append);
            assert_eq!(args.dir, PathBuf::from("out"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_copy_subset() {
        let cli = Cli::try_parse_from([
            "coffer", "copy", "src", "dst", "--only", "a", "--only", "b", "--blob",
        ])
        .unwrap();
        if let Command::Copy(args) = cli.command {
            assert_eq!(args.only, vec!["a", "b"]);
            assert!(args.blob);
            assert!(!args.append);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli =
            Cli::try_parse_from(["coffer", "pack", "d", "f", "-v", "--config", "coffer.toml"])
                .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("coffer.toml")));
    }
}
