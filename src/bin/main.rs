use std::process;

use clap::Parser;

/// Parse command line arguments and dispatch to `rnafold_rs::run`.
fn main() {
    let parsed = cli::Cli::parse();
    logger::init_logger(parsed.verbose + u8::from(!parsed.quiet));

    if let Err(err) = parsed.serialize() {
        log::warn!("failed to serialize command line arguments: {err:?}");
    }

    match rnafold_rs::run(&parsed) {
        Ok(()) => (),
        Err(err) => {
            log::error!("{err:?}");
            process::exit(1);
        }
    }
}
