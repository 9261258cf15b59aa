use std::{error, fmt, io};

use crate::{stretcher::StretchStrategy, track::TrackType};

// -------------------------------------------------------------------------------------------------

/// Provides an enumeration of all possible errors reported by speedramp.
///
/// All errors are contract violations of the caller (wrong channel layout, wrong stretching
/// strategy for the given buffer sizes, timestamps fed out of order) or invalid configurations,
/// so none of them are worth retrying.
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    UnsupportedChannelLayout(usize),
    InvalidBufferSizeForStrategy {
        strategy: StretchStrategy,
        input_frames: usize,
        output_frames: usize,
    },
    OutOfOrderTimestamp {
        track: TrackType,
        last_time_us: i64,
        time_us: i64,
    },
    ParameterError(String),
    IoError(io::Error),
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedChannelLayout(channels) => {
                write!(f, "Unsupported channel layout: {channels} channels")
            }
            Self::InvalidBufferSizeForStrategy {
                strategy,
                input_frames,
                output_frames,
            } => write!(
                f,
                "Invalid buffer sizes for {strategy} stretching: {input_frames} input frames, \
                 {output_frames} output frames"
            ),
            Self::OutOfOrderTimestamp {
                track,
                last_time_us,
                time_us,
            } => write!(
                f,
                "Out of order {track} timestamp: {time_us}us after {last_time_us}us"
            ),
            Self::ParameterError(str) => write!(f, "Invalid parameter: {str}"),
            Self::IoError(err) => err.fmt(f),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}
