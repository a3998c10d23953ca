use std::io::Read;

use super::super::{Image, ImageReader, RGBImage};
use crate::color::{RGBColorFormat, RangeColorFormat};
use crate::Error;

/// Reads plain (`P3`) and raw (`P6`) portable pixmaps.
pub struct PPMImageReader<T: Read> {
    reader: T,
}

impl<T: Read> PPMImageReader<T> {
    pub fn new(reader: T) -> Self {
        Self { reader }
    }
}

impl<T: Read> ImageReader<RGBColorFormat<u8>> for PPMImageReader<T> {
    fn read_image(&mut self) -> crate::Result<RGBImage> {
        let mut tokenizer = PPMTokenizer::new(&mut self.reader);
        let mut parser = PPMParser::new(&mut tokenizer);
        let image = parser.parse_tokens()?;
        log::info!(
            "Read PPM image of size {}x{}",
            image.width(),
            image.height()
        );
        Ok(image)
    }
}

/// Splits the input into whitespace separated tokens and drops `#` comments.
/// After a token is returned the reader stands right behind the single
/// whitespace byte that ended it, which is where a `P6` raster starts.
struct PPMTokenizer<R: Read> {
    reader: R,
    buffer: Vec<u8>,
}

impl<R: Read> PPMTokenizer<R> {
    fn new(reader: R) -> Self {
        PPMTokenizer {
            reader,
            buffer: Vec::new(),
        }
    }
}

impl<R: Read> Iterator for PPMTokenizer<R> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.clear();
        let mut byte = [0; 1];
        let mut in_comment = false;

        while self.reader.read(&mut byte).unwrap_or(0) > 0 {
            if in_comment {
                if byte[0] == b'\n' {
                    in_comment = false;
                }
                continue;
            }
            if byte[0] == b'#' {
                in_comment = true;
                continue;
            }
            if byte[0].is_ascii_whitespace() {
                if !self.buffer.is_empty() {
                    break;
                }
            } else {
                self.buffer.push(byte[0]);
            }
        }

        if self.buffer.is_empty() {
            return None;
        }

        Some(String::from_utf8_lossy(&self.buffer).into_owned())
    }
}

const MAGIC_NUMBER_TOKEN_NAME: &str = "Magic Number";
const WIDTH_HEADER_TOKEN_NAME: &str = "Width Header";
const HEIGHT_HEADER_TOKEN_NAME: &str = "Height Header";
const MAX_VALUE_HEADER_TOKEN_NAME: &str = "Max Value Header";
const COLOR_COMPONENT_VALUE_TOKEN_NAME: &str = "Color Component Value";
const MAX_INITIAL_RASTER_CAPACITY: usize = 1 << 20;

#[derive(Clone, Copy, Debug, PartialEq)]
enum PPMFormat {
    Plain,
    Raw,
}

#[derive(Clone, Copy)]
struct Dot {
    buffer: [u16; 3],
    index: usize,
}

impl Dot {
    fn new() -> Self {
        Self {
            buffer: [u16::default(); 3],
            index: 0,
        }
    }

    fn push_color_component(&mut self, component: u16) {
        if self.is_complete() {
            return;
        }
        self.buffer[self.index] = component;
        self.index += 1;
    }

    fn is_complete(&self) -> bool {
        self.index == 3
    }

    fn reset(&mut self) {
        self.index = 0;
    }

    fn is_empty(&self) -> bool {
        self.index == 0
    }

    fn to_rgb(self, max_value: u16) -> crate::Result<RGBColorFormat<u8>> {
        let [red, green, blue] = self.buffer;
        RangeColorFormat::new(max_value, red, green, blue).map(RGBColorFormat::from)
    }
}

struct PPMParser<'a, R: Read> {
    tokenizer: &'a mut PPMTokenizer<R>,
}

impl<'a, R: Read> PPMParser<'a, R> {
    fn new(tokenizer: &'a mut PPMTokenizer<R>) -> Self {
        Self { tokenizer }
    }

    fn parse_tokens(&mut self) -> crate::Result<RGBImage> {
        let format = self.parse_magic_number()?;
        let width = self.parse_header_value(WIDTH_HEADER_TOKEN_NAME)?;
        let height = self.parse_header_value(HEIGHT_HEADER_TOKEN_NAME)?;
        let max_value = self.parse_max_value()?;
        let number_of_dots = width as usize * height as usize;
        let dots = match format {
            PPMFormat::Plain => {
                let dots = self.parse_all_dots()?;
                Self::check_parsed_dots_length_match_header_information(&dots, number_of_dots)?;
                dots
            }
            PPMFormat::Raw => self.read_raster(number_of_dots, max_value)?,
        };
        let dots = dots
            .into_iter()
            .map(|dot| dot.to_rgb(max_value))
            .collect::<crate::Result<Vec<RGBColorFormat<u8>>>>()?;
        Image::new(width as usize, height as usize, dots)
    }

    fn check_parsed_dots_length_match_header_information(
        dots: &[Dot],
        number_of_dots: usize,
    ) -> crate::Result<()> {
        if dots.len() != number_of_dots {
            return Err(Error::MismatchOfSizeBetweenHeaderAndValues);
        }
        Ok(())
    }

    fn parse_magic_number(&mut self) -> crate::Result<PPMFormat> {
        let magic_number = self
            .tokenizer
            .next()
            .ok_or(Error::PPMFileDoesNotContainRequiredToken(
                MAGIC_NUMBER_TOKEN_NAME,
            ))?;
        match magic_number.as_str() {
            "P3" => Ok(PPMFormat::Plain),
            "P6" => Ok(PPMFormat::Raw),
            _ => Err(Error::UnsupportedPPMFormat(magic_number)),
        }
    }

    fn parse_header_value(&mut self, token_name: &'static str) -> crate::Result<u16> {
        self.tokenizer
            .next()
            .ok_or(Error::PPMFileDoesNotContainRequiredToken(token_name))?
            .parse()
            .map_err(|_| Error::ParsingOfTokenFailed(token_name))
    }

    fn parse_max_value(&mut self) -> crate::Result<u16> {
        let max_value = self.parse_header_value(MAX_VALUE_HEADER_TOKEN_NAME)?;
        if max_value == 0 {
            return Err(Error::InvalidMaxValue(max_value));
        }
        Ok(max_value)
    }

    fn parse_all_dots(&mut self) -> crate::Result<Vec<Dot>> {
        let mut current_dot = Dot::new();
        let mut dots = Vec::new();
        for token in self.tokenizer.by_ref() {
            let component = Self::parse_color_value(&token)?;
            current_dot.push_color_component(component);
            if current_dot.is_complete() {
                dots.push(current_dot);
                current_dot.reset();
            }
        }
        Self::check_pixel_was_complete(&current_dot)?;
        Ok(dots)
    }

    /// Samples take one byte when the max value fits into a byte and two
    /// big-endian bytes otherwise.
    fn read_raster(&mut self, number_of_dots: usize, max_value: u16) -> crate::Result<Vec<Dot>> {
        let bytes_per_sample = if max_value < 256 { 1 } else { 2 };
        let expected_length = number_of_dots * 3 * bytes_per_sample;
        // the header alone must not decide how much memory is reserved
        let mut raster = Vec::with_capacity(expected_length.min(MAX_INITIAL_RASTER_CAPACITY));
        self.tokenizer
            .reader
            .by_ref()
            .take(expected_length as u64)
            .read_to_end(&mut raster)
            .map_err(|_| Error::UnexpectedEndOfRaster)?;
        if raster.len() != expected_length {
            return Err(Error::UnexpectedEndOfRaster);
        }
        let dots = raster
            .chunks_exact(3 * bytes_per_sample)
            .map(|chunk| {
                let mut dot = Dot::new();
                for sample in chunk.chunks_exact(bytes_per_sample) {
                    let component = match sample {
                        [value] => *value as u16,
                        [high, low] => u16::from_be_bytes([*high, *low]),
                        _ => unreachable!("samples are one or two bytes long"),
                    };
                    dot.push_color_component(component);
                }
                dot
            })
            .collect();
        Ok(dots)
    }

    fn check_pixel_was_complete(dot: &Dot) -> crate::Result<()> {
        if !dot.is_empty() {
            return Err(Error::IncompletePixelParsed(dot.index));
        }
        Ok(())
    }

    fn parse_color_value(token: &str) -> crate::Result<u16> {
        token
            .parse()
            .map_err(|_| Error::ParsingOfTokenFailed(COLOR_COMPONENT_VALUE_TOKEN_NAME))
    }
}
