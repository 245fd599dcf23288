use crate::cli::args::{Cli, Command};
use anyhow::Result;

pub mod sweep;

pub fn dispatch(cli: Cli) -> Result<i32> {
    match cli.cmd {
        Command::Sequential(args) => sweep::run(sweep::Preset::Sequential, args),
        Command::Mpi(args) => sweep::run(sweep::Preset::Mpi, args),
    }
}
