use crate::image::subsampling::ChromaSubsamplingPreset;
use crate::Arguments;
use clap::{
    arg, crate_authors, crate_description, crate_name, crate_version, value_parser, Arg,
    ArgAction, ArgMatches, Command, ValueEnum,
};
use std::ffi::OsString;
use std::path::PathBuf;
use std::{io, thread};

pub struct CLIParser {
    command: Command,
}

impl CLIParser {
    pub fn new() -> Self {
        let command = Self::create_base_command();
        let command = Self::register_arguments(command);
        CLIParser { command }
    }

    pub fn parse<I, T>(&mut self, itr: I) -> Arguments
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self
            .command
            .try_get_matches_from_mut(itr)
            .unwrap_or_else(|e| e.exit());
        Self::extract_arguments(&matches)
    }

    fn register_arguments(command: Command) -> Command {
        let command = Self::register_input_file_argument(command);
        let command = Self::register_output_directory_argument(command);
        let command = Self::register_chroma_subsampling_preset_argument(command);
        let command = Self::register_sampling_factor_arguments(command);
        Self::register_threads_argument(command)
    }

    fn register_input_file_argument(command: Command) -> Command {
        command.arg(Self::create_input_file_argument())
    }

    fn register_output_directory_argument(command: Command) -> Command {
        command.arg(Self::create_output_directory_argument())
    }

    fn register_chroma_subsampling_preset_argument(command: Command) -> Command {
        command.arg(Self::create_chroma_subsampling_preset_argument())
    }

    fn register_sampling_factor_arguments(command: Command) -> Command {
        command
            .arg(Self::create_first_row_samples_argument())
            .arg(Self::create_second_row_samples_argument())
    }

    fn register_threads_argument(command: Command) -> Command {
        command.arg(Self::create_threads_argument())
    }

    fn create_base_command() -> Command {
        Command::new(crate_name!())
            .version(crate_version!())
            .author(crate_authors!())
            .about(crate_description!())
    }

    fn create_input_file_argument() -> Arg {
        Arg::new("input_file")
            .help("Path to PPM input file")
            .value_parser(value_parser!(PathBuf))
            .required(true)
    }

    fn create_output_directory_argument() -> Arg {
        arg!(output_directory: -o --output_directory <DIRECTORY> "Directory for the reconstructed PPM images")
            .value_parser(value_parser!(PathBuf))
            .required(false)
    }

    fn create_chroma_subsampling_preset_argument() -> Arg {
        arg!(chroma_subsampling_preset: -p --chroma_subsampling_preset <PRESET> "Chroma subsampling preset, may be repeated. Defaults to all presets.")
            .action(ArgAction::Append)
            .required(false)
            .value_parser(value_parser!(ChromaSubsamplingPreset))
    }

    fn create_first_row_samples_argument() -> Arg {
        arg!(first_row_samples: -a <A> "Chroma samples in the first row of J:a:b")
            .value_parser(value_parser!(i32))
            .allow_negative_numbers(true)
            .required(false)
            .requires("second_row_samples")
            .conflicts_with("chroma_subsampling_preset")
    }

    fn create_second_row_samples_argument() -> Arg {
        arg!(second_row_samples: -b <B> "Chroma samples in the second row of J:a:b")
            .value_parser(value_parser!(i32))
            .allow_negative_numbers(true)
            .required(false)
            .requires("first_row_samples")
            .conflicts_with("chroma_subsampling_preset")
    }

    fn create_threads_argument() -> Arg {
        arg!(-t --threads <THREADS> "Number of Threads")
            .default_value(get_number_of_threads().unwrap_or(1).to_string())
            .required(false)
            .value_parser(value_parser!(usize))
    }

    fn extract_arguments(matches: &ArgMatches) -> Arguments {
        Arguments {
            input_file: Self::extract_input_file_argument(matches),
            output_directory: Self::extract_output_directory_argument(matches),
            sampling_factors: Self::extract_sampling_factors(matches),
            number_of_threads: Self::extract_threads_argument(matches),
        }
    }

    fn extract_input_file_argument(matches: &ArgMatches) -> PathBuf {
        matches
            .get_one::<PathBuf>("input_file")
            .expect("Required argument input_file not provided")
            .clone()
    }

    fn extract_output_directory_argument(matches: &ArgMatches) -> Option<PathBuf> {
        matches.get_one::<PathBuf>("output_directory").cloned()
    }

    fn extract_chroma_subsampling_preset_argument(
        matches: &ArgMatches,
    ) -> Vec<ChromaSubsamplingPreset> {
        matches
            .get_many::<ChromaSubsamplingPreset>("chroma_subsampling_preset")
            .map(|presets| presets.copied().collect())
            .unwrap_or_else(|| ChromaSubsamplingPreset::value_variants().to_vec())
    }

    /// Explicit `-a`/`-b` factors take precedence over presets. They are passed
    /// on unvalidated, so that invalid schemes are reported by the subsampler.
    fn extract_sampling_factors(matches: &ArgMatches) -> Vec<(i32, i32)> {
        let first_row_samples = matches.get_one::<i32>("first_row_samples");
        let second_row_samples = matches.get_one::<i32>("second_row_samples");
        if let (Some(&a), Some(&b)) = (first_row_samples, second_row_samples) {
            return vec![(a, b)];
        }
        Self::extract_chroma_subsampling_preset_argument(matches)
            .iter()
            .map(ChromaSubsamplingPreset::factors)
            .collect()
    }

    fn extract_threads_argument(matches: &ArgMatches) -> usize {
        matches
            .get_one::<usize>("threads")
            .expect("Required argument threads not provided")
            .to_owned()
    }
}

impl Default for CLIParser {
    fn default() -> Self {
        Self::new()
    }
}

fn get_number_of_threads() -> io::Result<usize> {
    Ok(thread::available_parallelism()?.get())
}
