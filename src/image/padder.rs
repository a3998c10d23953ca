use crate::image::ColorChannel;

/// Rounds `value` up to the next multiple of `nearest`.
pub fn round_up_to_multiple(value: usize, nearest: usize) -> usize {
    value.div_ceil(nearest) * nearest
}

/// Grows a channel to the next multiple of the given sizes. New columns repeat
/// the last column of their row, new rows repeat the last row.
pub fn pad_by_replication<T: Copy>(
    channel: &ColorChannel<T>,
    pad_nearest_width: usize,
    pad_nearest_height: usize,
) -> ColorChannel<T> {
    let padded_width = round_up_to_multiple(channel.width(), pad_nearest_width);
    let padded_height = round_up_to_multiple(channel.height(), pad_nearest_height);
    // an empty channel has no edge to replicate
    if channel.dots().is_empty()
        || (padded_width == channel.width() && padded_height == channel.height())
    {
        return channel.clone();
    }

    let last_column_index = channel.width() - 1;
    let last_row_index = channel.height() - 1;
    let mut dots = Vec::with_capacity(padded_width * padded_height);
    for row_index in 0..padded_height {
        let row = channel.row(row_index.min(last_row_index));
        dots.extend(row);
        dots.extend((channel.width()..padded_width).map(|_| row[last_column_index]));
    }
    ColorChannel::new(padded_width, padded_height, dots)
}
