use std::{
    fs::{self, File, OpenOptions},
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
    sync::Arc,
};

pub use cli::CLIParser;
pub use logger::init_logger;
use error::Error;
use image::{
    reader::ppm::PPMImageReader,
    subsampling::SamplingSpec,
    transformer::{SchemeReport, SubsamplingTransformer},
    writer::ppm::PPMImageWriter,
    ImageReader, ImageWriter, YCbCrImage,
};
use threadpool::ThreadPool;

mod cli;
pub mod color;
pub mod error;
pub mod image;
mod logger;

pub type Result<T> = std::result::Result<T, error::Error>;

const LUMA_OUTPUT_FILE_NAME: &str = "luma.ppm";

pub struct Arguments {
    input_file: PathBuf,
    output_directory: Option<PathBuf>,
    sampling_factors: Vec<(i32, i32)>,
    number_of_threads: usize,
}

/// Byte sizes of the input image and of every requested scheme.
pub struct ConversionSummary {
    pub original_bytes: usize,
    pub reports: Vec<SchemeReport>,
}

fn open_input_file(file_path: &Path) -> Result<File> {
    File::open(file_path).map_err(|e| {
        Error::UnableToOpenInputFileForReading(file_path.display().to_string(), e)
    })
}

fn open_output_file(file_path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(file_path)
        .map_err(|e| {
            Error::UnableToOpenOutputFileForWriting(file_path.display().to_string(), e)
        })
}

fn create_output_directory(directory: &Path) -> Result<()> {
    fs::create_dir_all(directory).map_err(|e| {
        Error::UnableToOpenOutputFileForWriting(directory.display().to_string(), e)
    })
}

fn write_ppm<P: color::ColorComponents>(file_path: &Path, image: &image::Image<P>) -> Result<()> {
    let output_file = open_output_file(file_path)?;
    let mut writer = PPMImageWriter::new(BufWriter::new(output_file), image);
    writer.write_image()?;
    log::info!("Wrote {}", file_path.display());
    Ok(())
}

fn scheme_output_file_name(sampling_spec: &SamplingSpec) -> String {
    format!("ycbcr_4{}{}.ppm", sampling_spec.a(), sampling_spec.b())
}

fn write_outputs(
    directory: &Path,
    ycbcr_image: &YCbCrImage,
    reports: &[SchemeReport],
) -> Result<()> {
    create_output_directory(directory)?;
    write_ppm(
        &directory.join(LUMA_OUTPUT_FILE_NAME),
        &ycbcr_image.luma_visualization(),
    )?;
    for report in reports {
        let file_name = scheme_output_file_name(&report.sampling_spec);
        write_ppm(&directory.join(file_name), report.result.image())?;
    }
    Ok(())
}

/// Reads a PPM image, converts it to Y'CbCr and subsamples it with every
/// requested scheme. All schemes are validated before the image is read.
pub fn convert_ppm(arguments: &Arguments) -> Result<ConversionSummary> {
    let sampling_specs = arguments
        .sampling_factors
        .iter()
        .map(|&(a, b)| SamplingSpec::new(a, b))
        .collect::<std::result::Result<Vec<SamplingSpec>, _>>()
        .inspect_err(|e| log::error!("{}", e))?;

    let input_file = open_input_file(&arguments.input_file)?;
    let rgb_image = PPMImageReader::new(BufReader::new(input_file)).read_image()?;
    let original_bytes = rgb_image.byte_size();
    log::info!("Original byte size: {}", original_bytes);

    let ycbcr_image = Arc::new(YCbCrImage::from(&rgb_image));
    let threadpool = ThreadPool::new(arguments.number_of_threads.max(1));
    let transformer = SubsamplingTransformer::new(&threadpool);
    let reports = transformer.transform(&ycbcr_image, &sampling_specs)?;

    if let Some(directory) = &arguments.output_directory {
        write_outputs(directory, &ycbcr_image, &reports)?;
    }
    Ok(ConversionSummary {
        original_bytes,
        reports,
    })
}
