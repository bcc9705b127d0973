//! Command-line entry point.

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let options = annotink_export::ExportOptions::from_args(std::env::args().skip(1))?;
    log::debug!("Export options: {:?}", options);
    annotink_export::run(&options)
}
