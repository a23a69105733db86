use clap::Parser;
use proxycfg::output::{LineStyle, Ui};
use tracing_subscriber::EnvFilter;

fn main() {
    // 日志写到 stderr，stdout 只输出报告。
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = proxycfg::cli::Args::parse();
    if let Err(err) = proxycfg::run(args) {
        let _ = Ui::stderr().output(&err.to_string(), Some(LineStyle::Error));
        std::process::exit(err.exit_code());
    }
}
