use crate::color::{RGBColorFormat, YCbCrColorFormat};
use crate::error::Error;

pub mod padder;
pub mod reader;
pub mod subsampling;
pub mod transformer;
pub mod writer;

pub type RGBImage = Image<RGBColorFormat<u8>>;
pub type YCbCrImage = Image<YCbCrColorFormat<u8>>;

pub trait ImageReader<P> {
    fn read_image(&mut self) -> crate::Result<Image<P>>;
}

pub trait ImageWriter {
    fn write_image(&mut self) -> crate::Result<()>;
}

/// An interleaved pixel array of `height` rows with `width` dots each.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image<P> {
    width: usize,
    height: usize,
    dots: Vec<P>,
}

impl<P> Image<P> {
    pub fn new(width: usize, height: usize, dots: Vec<P>) -> crate::Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage);
        }
        if width * height != dots.len() {
            return Err(Error::ImageDimensionMismatch(width, height, dots.len()));
        }
        Ok(Self {
            width,
            height,
            dots,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dots(&self) -> &[P] {
        &self.dots
    }

    /// Size of the image in bytes with three 8 bit channels per dot.
    pub fn byte_size(&self) -> usize {
        self.dots.len() * 3
    }
}

impl<P: Copy> Image<P> {
    pub fn dot(&self, column_index: usize, row_index: usize) -> P {
        self.dots[column_index + row_index * self.width]
    }
}

impl From<&RGBImage> for YCbCrImage {
    fn from(value: &RGBImage) -> Self {
        Image {
            width: value.width,
            height: value.height,
            dots: value.dots.iter().map(YCbCrColorFormat::from).collect(),
        }
    }
}

impl YCbCrImage {
    pub fn from_channels(
        luma: ColorChannel<u8>,
        chroma_blue: ColorChannel<u8>,
        chroma_red: ColorChannel<u8>,
    ) -> crate::Result<Self> {
        let width = luma.width;
        let height = luma.height;
        for channel in [&chroma_blue, &chroma_red] {
            if channel.width != width || channel.height != height {
                return Err(Error::ImageDimensionMismatch(
                    width,
                    height,
                    channel.dots.len(),
                ));
            }
        }
        let dots = luma
            .dots
            .into_iter()
            .zip(chroma_blue.dots)
            .zip(chroma_red.dots)
            .map(|((luma, chroma_blue), chroma_red)| {
                YCbCrColorFormat::new(luma, chroma_blue, chroma_red)
            })
            .collect();
        Image::new(width, height, dots)
    }

    pub fn luma_channel(&self) -> ColorChannel<u8> {
        self.split_channel(|dot| dot.luma)
    }

    pub fn chroma_blue_channel(&self) -> ColorChannel<u8> {
        self.split_channel(|dot| dot.chroma_blue)
    }

    pub fn chroma_red_channel(&self) -> ColorChannel<u8> {
        self.split_channel(|dot| dot.chroma_red)
    }

    /// Grey image showing only the luma component, which is copied into all
    /// three channels.
    pub fn luma_visualization(&self) -> RGBImage {
        Image {
            width: self.width,
            height: self.height,
            dots: self
                .dots
                .iter()
                .map(|dot| RGBColorFormat::new(dot.luma, dot.luma, dot.luma))
                .collect(),
        }
    }

    fn split_channel(&self, component: impl Fn(&YCbCrColorFormat<u8>) -> u8) -> ColorChannel<u8> {
        ColorChannel {
            width: self.width,
            height: self.height,
            dots: self.dots.iter().map(component).collect(),
        }
    }
}

/// A single plane of an image, stored row by row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorChannel<T> {
    dots: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> ColorChannel<T> {
    pub fn new(width: usize, height: usize, dots: Vec<T>) -> Self {
        assert_eq!(
            width * height,
            dots.len(),
            "Number of dots does not match the channel size"
        );
        Self {
            dots,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dots(&self) -> &[T] {
        &self.dots
    }

    pub fn row(&self, row_index: usize) -> &[T] {
        let start = row_index * self.width;
        &self.dots[start..start + self.width]
    }
}

impl<T: Copy> ColorChannel<T> {
    pub fn dot(&self, column_index: usize, row_index: usize) -> T {
        self.dots[column_index + row_index * self.width]
    }

    /// Keeps the rows `row_start, row_start + row_step, ...` and within them the
    /// columns `0, column_step, 2 * column_step, ...`.
    pub fn strided(&self, row_start: usize, row_step: usize, column_step: usize) -> Self {
        let width = self.width.div_ceil(column_step);
        let height = self.height.saturating_sub(row_start).div_ceil(row_step);
        let mut dots = Vec::with_capacity(width * height);
        for row_index in (row_start..self.height).step_by(row_step) {
            dots.extend(self.row(row_index).iter().step_by(column_step));
        }
        Self {
            dots,
            width,
            height,
        }
    }

    /// Repeats every dot `factor` times along its row. The result is cut to
    /// `width`, or extended with the last dot of each row when it falls short.
    pub fn repeat_columns(&self, factor: usize, width: usize) -> Self {
        let mut dots = Vec::with_capacity(width * self.height);
        for row_index in 0..self.height {
            let row = self.row(row_index);
            let last_column_index = row.len() - 1;
            dots.extend((0..width).map(|x| row[(x / factor).min(last_column_index)]));
        }
        Self {
            dots,
            width,
            height: self.height,
        }
    }
}
