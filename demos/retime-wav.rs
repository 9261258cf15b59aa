//! An example showcasing how to retime an audio track with a speed ramp: retimes a WAV file
//! and writes the stretched audio into a new WAV file.

use std::{
    io::{self, Read},
    path::PathBuf,
};

use arg::{parse_args, Args};

use speedramp::{
    stretchers::{InsertAudioStretcher, InsertMode, Sample},
    utils::time::{frames_to_micros, TimeUs},
    AudioRetimer, CurveTimeInterpolator, Easing, Error, SpeedCurve, SpeedTimeInterpolator,
    TimeInterpolator, TrackMap,
};

// -------------------------------------------------------------------------------------------------

const DEFAULT_LOG_LEVEL: log::Level = if cfg!(debug_assertions) {
    log::Level::Debug
} else {
    log::Level::Warn
};

const CHUNK_FRAMES: usize = 1024;

// -------------------------------------------------------------------------------------------------

/// Arguments for the WAV retiming example.
#[derive(Args, Debug)]
struct Arguments {
    #[arg(short = "i", long = "input")]
    /// WAV file to retime. Must be 16 bit integer or 32 bit float mono or stereo.
    input_path: Option<PathBuf>,
    #[arg(short = "o", long = "output")]
    /// Target WAV file path (default: \"retimed.wav\")
    output_path: Option<PathBuf>,
    #[arg(long = "min-speed")]
    /// Speed at the start of the file (default: 0.1)
    min_speed: Option<f64>,
    #[arg(long = "max-speed")]
    /// Speed at the end of the file (default: 1.0)
    max_speed: Option<f64>,
    #[arg(short = "e", long = "easing")]
    /// Speed ramp: \"linear\", \"ease-in\", \"ease-out\" or \"ease-in-out\" (default: \"ease-in-out\")
    easing: Option<Easing>,
    #[arg(short = "m", long = "insert-mode")]
    /// How to fill gaps when slowing down: \"duplicate\" or \"noise\" (default: \"duplicate\")
    insert_mode: Option<InsertMode>,
    #[arg(short = "l", long = "log-level")]
    /// Set logging level to \"debug\", \"info\", \"warn\" or \"error\".
    /// By default \"debug\" in dev builds and \"warn\" in release builds.
    log_level: Option<log::Level>,
}

// -------------------------------------------------------------------------------------------------

fn wav_error(err: hound::Error) -> Error {
    match err {
        hound::Error::IoError(err) => Error::IoError(err),
        err => Error::IoError(io::Error::new(io::ErrorKind::InvalidData, err)),
    }
}

/// Retime all samples of the given reader into the given writer, chunk by chunk.
fn retime<S, R>(
    reader: &mut hound::WavReader<R>,
    writer: &mut hound::WavWriter<io::BufWriter<std::fs::File>>,
    interpolator: &mut dyn TimeInterpolator,
    retimer: &mut AudioRetimer,
) -> Result<TimeUs, Error>
where
    S: Sample + hound::Sample,
    R: Read,
{
    let channel_count = retimer.channel_count();
    let sample_rate = retimer.sample_rate();

    let mut input = Vec::with_capacity(CHUNK_FRAMES * channel_count);
    let mut output = Vec::new();
    let mut samples = reader.samples::<S>();
    let mut input_frames = 0u64;
    let mut last_time_us = 0;

    loop {
        input.clear();
        for sample in samples.by_ref().take(CHUNK_FRAMES * channel_count) {
            input.push(sample.map_err(wav_error)?);
        }
        if input.is_empty() {
            break;
        }

        let time_us = frames_to_micros(input_frames, sample_rate);
        let chunk = retimer.process(interpolator, time_us, &input, &mut output)?;
        for sample in &output {
            writer.write_sample(*sample).map_err(wav_error)?;
        }

        input_frames += (input.len() / channel_count) as u64;
        last_time_us = chunk.time_us + chunk.duration_us;
    }
    Ok(last_time_us)
}

// -------------------------------------------------------------------------------------------------

fn main() -> Result<(), Error> {
    // Parse arguments
    let args = parse_args::<Arguments>();

    // Init logger
    simple_logger::SimpleLogger::new()
        .with_level(args.log_level.unwrap_or(DEFAULT_LOG_LEVEL).to_level_filter())
        .init()
        .expect("Failed to set logger");

    let Some(input_path) = args.input_path else {
        return Err(Error::ParameterError(
            "Missing input file. Pass it via --input".to_string(),
        ));
    };
    let output_path = args
        .output_path
        .unwrap_or_else(|| PathBuf::from("retimed.wav"));

    // Open input and output files
    let mut reader = hound::WavReader::open(&input_path).map_err(wav_error)?;
    let spec = reader.spec();
    let channel_count = spec.channels as usize;
    let frame_count = reader.duration() as u64;
    let duration_us = frames_to_micros(frame_count, spec.sample_rate);
    log::info!(
        "Retiming '{}': {} channels, {}Hz, {}us",
        input_path.display(),
        channel_count,
        spec.sample_rate,
        duration_us
    );
    let mut writer = hound::WavWriter::create(&output_path, spec).map_err(wav_error)?;

    // Create the speed curve and interpolator
    let curve = SpeedCurve::new(
        args.easing.unwrap_or_default(),
        args.min_speed.unwrap_or(SpeedCurve::DEFAULT_MIN_SPEED),
        args.max_speed.unwrap_or(SpeedCurve::DEFAULT_MAX_SPEED),
    )?;
    let mut interpolator: Box<dyn TimeInterpolator> = if curve.is_constant() {
        Box::new(SpeedTimeInterpolator::new(curve.min_speed())?)
    } else {
        Box::new(CurveTimeInterpolator::new(
            curve,
            TrackMap::new(duration_us.max(1), duration_us.max(1)),
        )?)
    };

    // Retime
    let insert = InsertAudioStretcher::new(args.insert_mode.unwrap_or_default());
    let mut retimer = AudioRetimer::new(spec.sample_rate, channel_count, insert)?;
    let retimed_duration_us = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 16) => {
            retime::<i16, _>(&mut reader, &mut writer, interpolator.as_mut(), &mut retimer)?
        }
        (hound::SampleFormat::Float, 32) => {
            retime::<f32, _>(&mut reader, &mut writer, interpolator.as_mut(), &mut retimer)?
        }
        (format, bits) => {
            return Err(Error::ParameterError(format!(
                "Unsupported WAV sample format: {bits} bit {format:?}"
            )));
        }
    };
    writer.finalize().map_err(wav_error)?;

    log::info!(
        "Wrote '{}': {} frames, {}us",
        output_path.display(),
        retimer.output_frames(),
        retimed_duration_us
    );
    Ok(())
}
