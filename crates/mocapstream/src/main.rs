mod exit;
mod logging;
mod options;
mod run;

use crate::options::{print_help, CommandLineOptions, PROGRAM_NAME};

fn main() {
    logging::init_from_env();

    let mut args = std::env::args_os();
    let program = args
        .next()
        .map(|arg| arg.to_string_lossy().into_owned())
        .unwrap_or_else(|| PROGRAM_NAME.to_string());

    let options = match CommandLineOptions::parse(args) {
        Ok(options) => options,
        Err(outcome) => {
            let code = print_help(&mut std::io::stderr().lock(), &program, &outcome)
                .unwrap_or(exit::FAILURE);
            std::process::exit(code);
        }
    };

    match run::run(&options) {
        Ok(report) => {
            println!("{report}");
            std::process::exit(exit::SUCCESS);
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
