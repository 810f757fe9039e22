use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "hyperlocal-server")]
#[command(about = "Real-time local disruption reporting chat server", long_about = None)]
pub struct Args {
    #[arg(
        short = 'b',
        long = "bind",
        help = "TCP address to bind (overrides HYPERLOCAL_BIND)"
    )]
    pub bind: Option<String>,

    #[arg(short = 'v', long = "verbose", help = "Log at debug level")]
    pub verbose: bool,
}
