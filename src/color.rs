use crate::error::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RGBColorFormat<T> {
    pub red: T,
    pub green: T,
    pub blue: T,
}

/// A color sample as read from a file, where each component is relative to `max`.
pub struct RangeColorFormat<T> {
    max: T,
    red: T,
    green: T,
    blue: T,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct YCbCrColorFormat<T> {
    pub luma: T,
    pub chroma_blue: T,
    pub chroma_red: T,
}

impl<T> RGBColorFormat<T> {
    pub fn new(red: T, green: T, blue: T) -> Self {
        Self { red, green, blue }
    }
}

impl<T> YCbCrColorFormat<T> {
    pub fn new(luma: T, chroma_blue: T, chroma_red: T) -> Self {
        Self {
            luma,
            chroma_blue,
            chroma_red,
        }
    }
}

/// The three 8 bit channels of a dot in storage order.
pub trait ColorComponents {
    fn components(&self) -> [u8; 3];
}

impl ColorComponents for RGBColorFormat<u8> {
    fn components(&self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }
}

impl ColorComponents for YCbCrColorFormat<u8> {
    fn components(&self) -> [u8; 3] {
        [self.luma, self.chroma_blue, self.chroma_red]
    }
}

impl RangeColorFormat<u16> {
    pub fn new(max: u16, red: u16, green: u16, blue: u16) -> crate::Result<Self> {
        if max == 0 {
            return Err(Error::InvalidMaxValue(max));
        }
        if let Some(&value) = [red, green, blue].iter().find(|&&value| value > max) {
            return Err(Error::ColorValueExceedsMaxValue(value, max));
        }
        Ok(RangeColorFormat {
            max,
            red,
            green,
            blue,
        })
    }

    fn scale_to_u8(&self, value: u16) -> u8 {
        let max = self.max as u32;
        ((value as u32 * 255 + max / 2) / max) as u8
    }
}

impl From<&RangeColorFormat<u16>> for RGBColorFormat<u8> {
    fn from(value: &RangeColorFormat<u16>) -> Self {
        RGBColorFormat {
            red: value.scale_to_u8(value.red),
            green: value.scale_to_u8(value.green),
            blue: value.scale_to_u8(value.blue),
        }
    }
}

impl From<RangeColorFormat<u16>> for RGBColorFormat<u8> {
    fn from(value: RangeColorFormat<u16>) -> Self {
        RGBColorFormat::from(&value)
    }
}

/// Rounds half to even before clamping, so `x.5` ties go to the even neighbour.
fn round_and_clamp(value: f64) -> u8 {
    value.round_ties_even().clamp(0_f64, 255_f64) as u8
}

/// ITU-T T.871 with the simplified coefficients of the reference tables.
/// The luma weights sum to 1.03, so bright colors saturate at 255.
impl From<&RGBColorFormat<u8>> for YCbCrColorFormat<u8> {
    fn from(value: &RGBColorFormat<u8>) -> Self {
        let red = value.red as f64;
        let green = value.green as f64;
        let blue = value.blue as f64;

        let luma = 0.299 * red + 0.587 * green + 0.144 * blue;
        let chroma_blue = (-0.299 * red - 0.587 * green + 0.866 * blue) / 1.722 + 128_f64;
        let chroma_red = (0.701 * red - 0.587 * green - 0.144 * blue) / 1.402 + 128_f64;

        YCbCrColorFormat {
            luma: round_and_clamp(luma),
            chroma_blue: round_and_clamp(chroma_blue),
            chroma_red: round_and_clamp(chroma_red),
        }
    }
}

impl From<RGBColorFormat<u8>> for YCbCrColorFormat<u8> {
    fn from(value: RGBColorFormat<u8>) -> Self {
        YCbCrColorFormat::from(&value)
    }
}
