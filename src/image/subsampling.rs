use std::fmt::Display;

use clap::{builder::PossibleValue, ValueEnum};

use super::{padder, ColorChannel, YCbCrImage};

/// Number of luma samples per row that J:a:b notation refers to.
pub const REFERENCE_WIDTH: i32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SamplingErrorReason {
    ExceedsMaximum,
    NotPositive,
    UnsupportedFactor,
}

/// The only way a subsampling request can fail. The reason tells which
/// precondition on `a` and `b` was violated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidSamplingSpec {
    pub a: i32,
    pub b: i32,
    pub reason: SamplingErrorReason,
}

impl Display for InvalidSamplingSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid sampling scheme 4:{}:{}: ", self.a, self.b)?;
        match self.reason {
            SamplingErrorReason::ExceedsMaximum => {
                write!(f, "the maximum horizontal sample size is 4")
            }
            SamplingErrorReason::NotPositive => {
                write!(f, "a cannot be zero or negative and b cannot be negative")
            }
            SamplingErrorReason::UnsupportedFactor => {
                write!(f, "3 is not a supported number of samples")
            }
        }
    }
}

impl std::error::Error for InvalidSamplingSpec {}

/// Horizontal decimation step for a row that carries `4 / step` chroma samples
/// per 4 luma samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DivideFactor {
    One,
    Two,
    Four,
}

impl DivideFactor {
    fn from_number_of_samples(samples: i32) -> Option<Self> {
        match samples {
            4 => Some(Self::One),
            2 => Some(Self::Two),
            1 => Some(Self::Four),
            _ => None,
        }
    }

    pub fn step(&self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
        }
    }
}

/// A validated J:a:b scheme with J = 4.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplingSpec {
    a: i32,
    b: i32,
    first_row_factor: DivideFactor,
    second_row_factor: Option<DivideFactor>,
}

impl SamplingSpec {
    pub fn new(a: i32, b: i32) -> Result<Self, InvalidSamplingSpec> {
        let invalid = |reason| InvalidSamplingSpec { a, b, reason };
        if a > REFERENCE_WIDTH || b > REFERENCE_WIDTH {
            return Err(invalid(SamplingErrorReason::ExceedsMaximum));
        }
        if a <= 0 || b < 0 {
            return Err(invalid(SamplingErrorReason::NotPositive));
        }
        let first_row_factor = DivideFactor::from_number_of_samples(a)
            .ok_or(invalid(SamplingErrorReason::UnsupportedFactor))?;
        let second_row_factor = match b {
            0 => None,
            b => Some(
                DivideFactor::from_number_of_samples(b)
                    .ok_or(invalid(SamplingErrorReason::UnsupportedFactor))?,
            ),
        };
        Ok(Self {
            a,
            b,
            first_row_factor,
            second_row_factor,
        })
    }

    pub fn a(&self) -> i32 {
        self.a
    }

    pub fn b(&self) -> i32 {
        self.b
    }

    pub fn first_row_factor(&self) -> DivideFactor {
        self.first_row_factor
    }

    /// `None` when the second row of each group reuses the first row's chroma.
    pub fn second_row_factor(&self) -> Option<DivideFactor> {
        self.second_row_factor
    }
}

impl Display for SamplingSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", REFERENCE_WIDTH, self.a, self.b)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChromaSubsamplingPreset {
    P444,
    P422,
    P420,
    P411,
    P410,
}

impl ValueEnum for ChromaSubsamplingPreset {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::P444, Self::P422, Self::P420, Self::P411, Self::P410]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        match self {
            Self::P444 => Some(PossibleValue::new("P444")),
            Self::P422 => Some(PossibleValue::new("P422")),
            Self::P420 => Some(PossibleValue::new("P420")),
            Self::P411 => Some(PossibleValue::new("P411")),
            Self::P410 => Some(PossibleValue::new("P410")),
        }
    }
}

impl ChromaSubsamplingPreset {
    pub fn factors(&self) -> (i32, i32) {
        match self {
            ChromaSubsamplingPreset::P444 => (4, 4),
            ChromaSubsamplingPreset::P422 => (2, 2),
            ChromaSubsamplingPreset::P420 => (2, 0),
            ChromaSubsamplingPreset::P411 => (1, 1),
            ChromaSubsamplingPreset::P410 => (1, 0),
        }
    }

    pub fn sampling_spec(&self) -> SamplingSpec {
        let (a, b) = self.factors();
        SamplingSpec::new(a, b).expect("Presets are valid sampling schemes")
    }
}

#[derive(Debug)]
pub struct SubsampleResult {
    bytes: usize,
    original_bytes: usize,
    image: YCbCrImage,
}

impl SubsampleResult {
    /// Number of samples kept after decimation: the full luma plane plus the
    /// reduced chroma planes.
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// Number of samples of the input at full resolution.
    pub fn original_bytes(&self) -> usize {
        self.original_bytes
    }

    pub fn compression_ratio(&self) -> f64 {
        self.original_bytes as f64 / self.bytes as f64
    }

    /// The reconstructed image at even-padded resolution.
    pub fn image(&self) -> &YCbCrImage {
        &self.image
    }

    pub fn into_image(self) -> YCbCrImage {
        self.image
    }
}

/// Decimated samples of one chroma channel, split into the even rows (group A)
/// and the odd rows (group B) of the source.
/// Each group carries the factor it was decimated with.
struct DecimatedChannel {
    first_rows: (ColorChannel<u8>, DivideFactor),
    second_rows: Option<(ColorChannel<u8>, DivideFactor)>,
}

impl DecimatedChannel {
    fn number_of_samples(&self) -> usize {
        let second = self
            .second_rows
            .as_ref()
            .map_or(0, |(rows, _)| rows.dots().len());
        self.first_rows.0.dots().len() + second
    }
}

pub struct ChromaSubsampler<'a> {
    image: &'a YCbCrImage,
    sampling_spec: SamplingSpec,
}

impl<'a> ChromaSubsampler<'a> {
    pub fn new(image: &'a YCbCrImage, sampling_spec: SamplingSpec) -> Self {
        Self {
            image,
            sampling_spec,
        }
    }

    pub fn subsample(&self) -> crate::Result<SubsampleResult> {
        let padded_width = padder::round_up_to_multiple(self.image.width(), 2);
        let padded_height = padder::round_up_to_multiple(self.image.height(), 2);

        let luma = self.image.luma_channel();
        let chroma_blue = self.decimate(&self.image.chroma_blue_channel());
        let chroma_red = self.decimate(&self.image.chroma_red_channel());
        let bytes = luma.dots().len()
            + chroma_blue.number_of_samples()
            + chroma_red.number_of_samples();

        let image = YCbCrImage::from_channels(
            padder::pad_by_replication(&luma, 2, 2),
            reconstruct(&chroma_blue, padded_width, padded_height),
            reconstruct(&chroma_red, padded_width, padded_height),
        )?;
        log::debug!(
            "Subsampled {}x{} image to {}: {} of {} bytes",
            self.image.width(),
            self.image.height(),
            self.sampling_spec,
            bytes,
            self.image.byte_size()
        );
        Ok(SubsampleResult {
            bytes,
            original_bytes: self.image.byte_size(),
            image,
        })
    }

    fn decimate(&self, channel: &ColorChannel<u8>) -> DecimatedChannel {
        let first_factor = self.sampling_spec.first_row_factor();
        let first_rows = (channel.strided(0, 2, first_factor.step()), first_factor);
        let second_rows = self
            .sampling_spec
            .second_row_factor()
            .map(|factor| (channel.strided(1, 2, factor.step()), factor));
        DecimatedChannel {
            first_rows,
            second_rows,
        }
    }

}

fn reconstruct(decimated: &DecimatedChannel, width: usize, height: usize) -> ColorChannel<u8> {
    let (first_rows, first_factor) = &decimated.first_rows;
    let first_rows = first_rows.repeat_columns(first_factor.step(), width);
    match &decimated.second_rows {
        Some((second_rows, second_factor)) => {
            let second_rows = second_rows.repeat_columns(second_factor.step(), width);
            interleave_rows(&first_rows, &second_rows, height)
        }
        None => duplicate_rows(&first_rows, height),
    }
}

/// Even output rows come from `first_rows`, odd ones from `second_rows`. An
/// odd row without a counterpart in `second_rows` repeats the row above it.
fn interleave_rows(
    first_rows: &ColorChannel<u8>,
    second_rows: &ColorChannel<u8>,
    height: usize,
) -> ColorChannel<u8> {
    let width = first_rows.width();
    let mut dots = Vec::with_capacity(width * height);
    for row_index in 0..height {
        let group_index = row_index / 2;
        if row_index % 2 == 1 && group_index < second_rows.height() {
            dots.extend(second_rows.row(group_index));
        } else {
            dots.extend(first_rows.row(group_index));
        }
    }
    ColorChannel::new(width, height, dots)
}

/// Every row of `first_rows` fills two consecutive output rows.
fn duplicate_rows(first_rows: &ColorChannel<u8>, height: usize) -> ColorChannel<u8> {
    let width = first_rows.width();
    let mut dots = Vec::with_capacity(width * height);
    for row_index in 0..height {
        dots.extend(first_rows.row(row_index / 2));
    }
    ColorChannel::new(width, height, dots)
}

/// Validates `a` and `b` and subsamples the chroma channels of `image` with the
/// 4:a:b scheme.
pub fn subsample(image: &YCbCrImage, a: i32, b: i32) -> crate::Result<SubsampleResult> {
    let sampling_spec = SamplingSpec::new(a, b).inspect_err(|e| log::error!("{}", e))?;
    ChromaSubsampler::new(image, sampling_spec).subsample()
}

#[cfg(test)]
mod test {
    use super::{
        reconstruct, subsample, ChromaSubsampler, ChromaSubsamplingPreset, DivideFactor,
        SamplingErrorReason, SamplingSpec,
    };
    use crate::image::ColorChannel;
    use crate::color::YCbCrColorFormat;
    use crate::error::Error;
    use crate::image::{Image, YCbCrImage};

    #[rustfmt::skip]
    const TEST_CHANNEL_ONE: &[u8] = &[
         1,  2,  3,  4,  5,  6,  7,  8,
         9, 10, 11, 12, 13, 14, 15, 16,
        17, 18, 19, 20, 21, 22, 23, 24,
        25, 26, 27, 28, 29, 30, 31, 32,
    ];

    #[rustfmt::skip]
    const TEST_CHANNEL_ODD: &[u8] = &[
        10, 20, 30,
        40, 50, 60,
        70, 80, 90,
    ];

    /// Builds an image whose chroma blue channel is `chroma`, chroma red is
    /// `chroma` shifted by 100 and luma counts up from 0.
    fn create_test_image(width: usize, height: usize, chroma: &[u8]) -> YCbCrImage {
        let dots = chroma
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                YCbCrColorFormat::new(index as u8, value, value.wrapping_add(100))
            })
            .collect();
        Image::new(width, height, dots).unwrap()
    }

    fn assert_rejected(a: i32, b: i32, expected_reason: SamplingErrorReason) {
        let image = create_test_image(8, 4, TEST_CHANNEL_ONE);
        match subsample(&image, a, b) {
            Err(Error::InvalidSamplingSpec(spec)) => {
                assert_eq!(spec.reason, expected_reason, "wrong reason for 4:{}:{}", a, b);
                assert_eq!((spec.a, spec.b), (a, b));
            }
            other => panic!("4:{}:{} was not rejected, got {:?}", a, b, other),
        }
    }

    #[test]
    fn reject_factor_above_four() {
        assert_rejected(5, 4, SamplingErrorReason::ExceedsMaximum);
        assert_rejected(4, 8, SamplingErrorReason::ExceedsMaximum);
    }

    #[test]
    fn reject_factor_three() {
        assert_rejected(4, 3, SamplingErrorReason::UnsupportedFactor);
        assert_rejected(3, 0, SamplingErrorReason::UnsupportedFactor);
    }

    #[test]
    fn reject_non_positive_factors() {
        assert_rejected(0, 2, SamplingErrorReason::NotPositive);
        assert_rejected(-1, 0, SamplingErrorReason::NotPositive);
        assert_rejected(2, -1, SamplingErrorReason::NotPositive);
    }

    #[test]
    fn maximum_is_checked_before_sign() {
        assert_rejected(5, -1, SamplingErrorReason::ExceedsMaximum);
    }

    #[test]
    fn divide_factors() {
        let spec = SamplingSpec::new(4, 0).unwrap();
        assert_eq!(spec.first_row_factor(), DivideFactor::One);
        assert_eq!(spec.second_row_factor(), None);
        let spec = SamplingSpec::new(1, 2).unwrap();
        assert_eq!(spec.first_row_factor(), DivideFactor::Four);
        assert_eq!(spec.second_row_factor(), Some(DivideFactor::Two));
        assert_eq!(spec.to_string(), "4:1:2");
    }

    #[test]
    fn presets_map_to_schemes() {
        let schemes: Vec<String> = [
            ChromaSubsamplingPreset::P444,
            ChromaSubsamplingPreset::P422,
            ChromaSubsamplingPreset::P420,
            ChromaSubsamplingPreset::P411,
            ChromaSubsamplingPreset::P410,
        ]
        .iter()
        .map(|preset| preset.sampling_spec().to_string())
        .collect();
        assert_eq!(schemes, ["4:4:4", "4:2:2", "4:2:0", "4:1:1", "4:1:0"]);
    }

    #[test]
    fn subsample_444_is_lossless() {
        let image = create_test_image(8, 4, TEST_CHANNEL_ONE);
        let result = subsample(&image, 4, 4).unwrap();
        assert_eq!(result.bytes(), 8 * 4 * 3);
        assert_eq!(result.image(), &image);
    }

    #[test]
    fn subsample_422() {
        let image = create_test_image(8, 4, TEST_CHANNEL_ONE);
        let result = subsample(&image, 2, 2).unwrap();
        assert_eq!(result.bytes(), 32 + 2 * 16);
        let chroma_blue = result.image().chroma_blue_channel();
        #[rustfmt::skip]
        let expected: &[u8] = &[
             1,  1,  3,  3,  5,  5,  7,  7,
             9,  9, 11, 11, 13, 13, 15, 15,
            17, 17, 19, 19, 21, 21, 23, 23,
            25, 25, 27, 27, 29, 29, 31, 31,
        ];
        assert_eq!(chroma_blue.dots(), expected);
        assert_ne!(
            chroma_blue.row(0),
            chroma_blue.row(1),
            "b = 2 samples the second row on its own"
        );
    }

    #[test]
    fn subsample_420_duplicates_rows() {
        let image = create_test_image(8, 4, TEST_CHANNEL_ONE);
        let result = subsample(&image, 2, 0).unwrap();
        assert_eq!(result.bytes(), 32 + 2 * 8);
        let chroma_red = result.image().chroma_red_channel();
        #[rustfmt::skip]
        let expected: &[u8] = &[
            101, 101, 103, 103, 105, 105, 107, 107,
            101, 101, 103, 103, 105, 105, 107, 107,
            117, 117, 119, 119, 121, 121, 123, 123,
            117, 117, 119, 119, 121, 121, 123, 123,
        ];
        assert_eq!(chroma_red.dots(), expected);
    }

    #[test]
    fn subsample_411() {
        let image = create_test_image(8, 4, TEST_CHANNEL_ONE);
        let result = subsample(&image, 1, 1).unwrap();
        assert_eq!(result.bytes(), 32 + 2 * 8);
        let chroma_blue = result.image().chroma_blue_channel();
        assert_eq!(chroma_blue.row(0), &[1, 1, 1, 1, 5, 5, 5, 5]);
        assert_eq!(chroma_blue.row(1), &[9, 9, 9, 9, 13, 13, 13, 13]);
    }

    #[test]
    fn subsample_410_rows_within_group_are_equal() {
        let image = create_test_image(8, 4, TEST_CHANNEL_ONE);
        let result = subsample(&image, 1, 0).unwrap();
        assert_eq!(result.bytes(), 32 + 2 * 4);
        for channel in [
            result.image().chroma_blue_channel(),
            result.image().chroma_red_channel(),
        ] {
            for group_index in 0..2 {
                assert_eq!(
                    channel.row(2 * group_index),
                    channel.row(2 * group_index + 1),
                    "rows of group {} differ",
                    group_index
                );
            }
        }
        assert_eq!(
            result.image().chroma_blue_channel().row(2),
            &[17, 17, 17, 17, 21, 21, 21, 21]
        );
    }

    #[test]
    fn mixed_rates_per_row() {
        let image = create_test_image(8, 4, TEST_CHANNEL_ONE);
        let result = subsample(&image, 1, 4).unwrap();
        assert_eq!(result.bytes(), 32 + 2 * (4 + 16));
        let chroma_blue = result.image().chroma_blue_channel();
        assert_eq!(chroma_blue.row(0), &[1, 1, 1, 1, 5, 5, 5, 5]);
        assert_eq!(chroma_blue.row(1), &[9, 10, 11, 12, 13, 14, 15, 16]);
    }

    #[test]
    fn luma_is_never_subsampled() {
        let image = create_test_image(8, 4, TEST_CHANNEL_ONE);
        let result = subsample(&image, 1, 0).unwrap();
        assert_eq!(result.image().luma_channel(), image.luma_channel());
    }

    #[test]
    fn byte_count_decreases_with_fewer_samples() {
        let image = create_test_image(8, 4, TEST_CHANNEL_ONE);
        let bytes = |a, b| subsample(&image, a, b).unwrap().bytes();
        assert!(bytes(2, 2) < bytes(4, 4));
        assert!(bytes(1, 0) <= bytes(2, 0));
        assert!(bytes(2, 0) <= bytes(4, 4));
    }

    #[test]
    fn compression_ratio() {
        let image = create_test_image(8, 4, TEST_CHANNEL_ONE);
        let result = subsample(&image, 2, 0).unwrap();
        assert_eq!(result.original_bytes(), 96);
        assert_eq!(result.compression_ratio(), 2.0);
    }

    #[test]
    fn odd_image_444_is_padded_by_replication() {
        let image = create_test_image(3, 3, TEST_CHANNEL_ODD);
        let result = subsample(&image, 4, 4).unwrap();
        assert_eq!(result.bytes(), 3 * 3 * 3);
        let reconstructed = result.image();
        assert_eq!(reconstructed.width(), 4);
        assert_eq!(reconstructed.height(), 4);
        #[rustfmt::skip]
        let expected_chroma: &[u8] = &[
            10, 20, 30, 30,
            40, 50, 60, 60,
            70, 80, 90, 90,
            70, 80, 90, 90,
        ];
        #[rustfmt::skip]
        let expected_luma: &[u8] = &[
            0, 1, 2, 2,
            3, 4, 5, 5,
            6, 7, 8, 8,
            6, 7, 8, 8,
        ];
        assert_eq!(reconstructed.chroma_blue_channel().dots(), expected_chroma);
        assert_eq!(reconstructed.luma_channel().dots(), expected_luma);
    }

    #[test]
    fn odd_image_422() {
        let image = create_test_image(3, 3, TEST_CHANNEL_ODD);
        let result = subsample(&image, 2, 2).unwrap();
        // luma 9, per chroma channel 2 rows * 2 + 1 row * 2 samples
        assert_eq!(result.bytes(), 9 + 2 * 6);
        #[rustfmt::skip]
        let expected: &[u8] = &[
            10, 10, 30, 30,
            40, 40, 60, 60,
            70, 70, 90, 90,
            70, 70, 90, 90,
        ];
        assert_eq!(result.image().chroma_blue_channel().dots(), expected);
    }

    #[test]
    fn odd_image_410() {
        let image = create_test_image(3, 3, TEST_CHANNEL_ODD);
        let result = subsample(&image, 1, 0).unwrap();
        assert_eq!(result.bytes(), 9 + 2 * 2);
        #[rustfmt::skip]
        let expected: &[u8] = &[
            10, 10, 10, 10,
            10, 10, 10, 10,
            70, 70, 70, 70,
            70, 70, 70, 70,
        ];
        assert_eq!(result.image().chroma_blue_channel().dots(), expected);
    }

    #[test]
    fn single_row_image() {
        let image = create_test_image(3, 1, &[5, 6, 7]);
        let result = subsample(&image, 4, 4).unwrap();
        assert_eq!(result.bytes(), 9);
        assert_eq!(
            result.image().chroma_blue_channel().dots(),
            &[5, 6, 7, 7, 5, 6, 7, 7]
        );
    }

    #[test]
    fn repeated_calls_yield_identical_results() {
        let image = create_test_image(3, 3, TEST_CHANNEL_ODD);
        let first = subsample(&image, 2, 0).unwrap();
        let second = subsample(&image, 2, 0).unwrap();
        assert_eq!(first.bytes(), second.bytes());
        assert_eq!(first.image(), second.image());
    }

    #[test]
    fn decimated_groups_keep_their_row_factor() {
        let image = create_test_image(4, 2, &[1, 2, 3, 4, 5, 6, 7, 8]);
        let channel = ColorChannel::new(4, 2, vec![1_u8, 2, 3, 4, 5, 6, 7, 8]);

        let spec = SamplingSpec::new(2, 0).unwrap();
        let decimated = ChromaSubsampler::new(&image, spec).decimate(&channel);
        assert_eq!(decimated.first_rows.1, DivideFactor::Two);
        assert_eq!(decimated.first_rows.0.dots(), &[1, 3]);
        assert!(decimated.second_rows.is_none());
        assert_eq!(
            reconstruct(&decimated, 4, 2).dots(),
            &[1, 1, 3, 3, 1, 1, 3, 3]
        );

        let spec = SamplingSpec::new(2, 1).unwrap();
        let decimated = ChromaSubsampler::new(&image, spec).decimate(&channel);
        let (second_rows, second_factor) = decimated.second_rows.as_ref().unwrap();
        assert_eq!(*second_factor, DivideFactor::Four);
        assert_eq!(second_rows.dots(), &[5]);
        assert_eq!(
            reconstruct(&decimated, 4, 2).dots(),
            &[1, 1, 3, 3, 5, 5, 5, 5]
        );
    }
}
