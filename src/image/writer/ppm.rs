use std::io::Write;

use crate::{
    color::ColorComponents,
    error::Error,
    image::{Image, ImageWriter},
};

/// Writes an image as raw (`P6`) portable pixmap with a max value of 255.
///
/// The channels are written in storage order, so a Y'CbCr image ends up with
/// luma in the first and chroma in the second and third channel.
pub struct PPMImageWriter<'a, T: Write, P> {
    writer: T,
    image: &'a Image<P>,
}

impl<'a, T: Write, P> PPMImageWriter<'a, T, P> {
    pub fn new(writer: T, image: &'a Image<P>) -> Self {
        Self { writer, image }
    }
}

impl<T: Write, P: ColorComponents> PPMImageWriter<'_, T, P> {
    fn write_header(&mut self) -> std::io::Result<()> {
        write!(
            self.writer,
            "P6\n{} {}\n255\n",
            self.image.width(),
            self.image.height()
        )
    }

    fn write_raster(&mut self) -> std::io::Result<()> {
        let raster: Vec<u8> = self
            .image
            .dots()
            .iter()
            .flat_map(|dot| dot.components())
            .collect();
        self.writer.write_all(&raster)
    }
}

impl<T: Write, P: ColorComponents> ImageWriter for PPMImageWriter<'_, T, P> {
    fn write_image(&mut self) -> crate::Result<()> {
        self.write_header().map_err(Error::FailedToWriteImage)?;
        self.write_raster().map_err(Error::FailedToWriteImage)?;
        self.writer.flush().map_err(Error::FailedToWriteImage)
    }
}
