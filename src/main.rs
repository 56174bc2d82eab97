use anyhow::Result;
use clap::Parser;
use pnbound::{CLIArguments, analyse_main, batch_main, show_main};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("PNBOUND_LOG", "warn")).init();

    let args = CLIArguments::parse();

    match args {
        CLIArguments::Analyse(args) => analyse_main(args),
        CLIArguments::Batch(args) => batch_main(args),
        CLIArguments::Show(args) => show_main(args),
    }
}
