use ttrack::cli;

fn main() {
    env_logger::init();

    if let Err(e) = cli::run() {
        cli::error::report_failure(&e);
        std::process::exit(cli::error::exit_code_for(&e));
    }
}
