use std::fmt::Display;

use crate::image::subsampling::{InvalidSamplingSpec, SamplingSpec};

#[derive(Debug)]
pub enum Error {
    InvalidSamplingSpec(InvalidSamplingSpec),
    SubsamplingWorkerFailed(SamplingSpec),
    PPMFileDoesNotContainRequiredToken(&'static str),
    ParsingOfTokenFailed(&'static str),
    UnsupportedPPMFormat(String),
    InvalidMaxValue(u16),
    ColorValueExceedsMaxValue(u16, u16),
    IncompletePixelParsed(usize),
    MismatchOfSizeBetweenHeaderAndValues,
    UnexpectedEndOfRaster,
    EmptyImage,
    ImageDimensionMismatch(usize, usize, usize),
    UnableToOpenInputFileForReading(String, std::io::Error),
    UnableToOpenOutputFileForWriting(String, std::io::Error),
    FailedToWriteImage(std::io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSamplingSpec(spec) => write!(f, "{}", spec),
            Self::SubsamplingWorkerFailed(spec) => {
                write!(f, "Worker subsampling with scheme {} did not finish", spec)
            }
            Self::PPMFileDoesNotContainRequiredToken(token_name) => {
                write!(f, "Expected token '{}' not found in PPM file", token_name)
            }
            Self::ParsingOfTokenFailed(token_name) => {
                write!(f, "Parsing of token '{}' failed", token_name)
            }
            Self::UnsupportedPPMFormat(magic) => {
                write!(
                    f,
                    "Unsupported PPM format '{}'. Expected 'P3' or 'P6'.",
                    magic
                )
            }
            Self::InvalidMaxValue(max_value) => {
                write!(
                    f,
                    "Max value {} is invalid. It must be in range 1 to 65535.",
                    max_value
                )
            }
            Self::ColorValueExceedsMaxValue(value, max_value) => {
                write!(
                    f,
                    "Color value {} is greater than max value of {}",
                    value, max_value
                )
            }
            Self::IncompletePixelParsed(number_of_tokens_parsed) => {
                write!(
                    f,
                    "Incomplete pixel parsed. Expected 3 components, but got {}.",
                    number_of_tokens_parsed
                )
            }
            Self::MismatchOfSizeBetweenHeaderAndValues => {
                write!(
                    f,
                    "Number of pixels does not match the size provided in header"
                )
            }
            Self::UnexpectedEndOfRaster => {
                write!(f, "Binary raster ended before all pixels were read")
            }
            Self::EmptyImage => write!(f, "Image width and height must not be zero"),
            Self::ImageDimensionMismatch(width, height, number_of_dots) => {
                write!(
                    f,
                    "Image of size {}x{} cannot hold {} pixels",
                    width, height, number_of_dots
                )
            }
            Self::UnableToOpenInputFileForReading(path, error) => {
                write!(
                    f,
                    "Unable to open input file '{}' for reading: {}",
                    path, error
                )
            }
            Self::UnableToOpenOutputFileForWriting(path, error) => {
                write!(
                    f,
                    "Unable to open output file '{}' for writing: {}",
                    path, error
                )
            }
            Self::FailedToWriteImage(error) => write!(f, "Failed to write image: {}", error),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidSamplingSpec(spec) => Some(spec),
            Self::UnableToOpenInputFileForReading(_, error)
            | Self::UnableToOpenOutputFileForWriting(_, error)
            | Self::FailedToWriteImage(error) => Some(error),
            _ => None,
        }
    }
}

impl From<InvalidSamplingSpec> for Error {
    fn from(value: InvalidSamplingSpec) -> Self {
        Self::InvalidSamplingSpec(value)
    }
}
