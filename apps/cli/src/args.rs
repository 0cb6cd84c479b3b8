use std::path::PathBuf;

#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub debug: bool,
    pub help: bool,
}

pub fn parse_args() -> Result<CliArgs, String> {
    parse_from(std::env::args().skip(1))
}

fn parse_from(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut args = args.into_iter();
    let mut parsed = CliArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--port" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --port".to_string())?;
                let port = value
                    .parse::<u16>()
                    .map_err(|_| format!("invalid port value: {value}"))?;
                parsed.port = Some(port);
            }
            "--data-dir" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --data-dir".to_string())?;
                parsed.data_dir = Some(PathBuf::from(value));
            }
            "--debug" => {
                parsed.debug = true;
            }
            "--help" | "-h" => {
                parsed.help = true;
            }
            _ => {
                return Err(format!("unknown argument: {arg}"));
            }
        }
    }

    Ok(parsed)
}

pub fn print_help() {
    println!(
        "Hook Monitor\n\n\
Usage:\n  hook-monitor [--port <port>] [--data-dir <dir>] [--debug]\n\n\
Options:\n  --port <port>     Override the configured port for this run only\n  --data-dir <dir>  Directory holding events.db (default: ./.data)\n  --debug           Log at debug level\n  -h, --help        Show this help message\n"
    );
}
