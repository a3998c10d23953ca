use std::env::args_os;
use std::process::ExitCode;

use chroma_subsampling::{convert_ppm, init_logger, CLIParser};

fn main() -> ExitCode {
    init_logger();
    let mut cli_parser = CLIParser::default();
    let arguments = cli_parser.parse(args_os());
    match convert_ppm(&arguments) {
        Ok(summary) => {
            println!("Original byte size: {}", summary.original_bytes);
            for report in &summary.reports {
                println!(
                    "{} byte size: {} (ratio {:.2})",
                    report.sampling_spec,
                    report.result.bytes(),
                    report.result.compression_ratio()
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Conversion failed because of: {}", e);
            ExitCode::FAILURE
        }
    }
}
