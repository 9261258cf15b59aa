use std::ops::{Index, IndexMut};

use strum::{EnumCount, IntoEnumIterator};

// -------------------------------------------------------------------------------------------------

/// Identifies the independent timeline a timestamp or a track state belongs to.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::EnumCount,
)]
#[strum(serialize_all = "lowercase")]
pub enum TrackType {
    Audio,
    Video,
}

impl TrackType {
    const fn index(self) -> usize {
        match self {
            TrackType::Audio => 0,
            TrackType::Video => 1,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// A fixed size map holding one value per [`TrackType`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMap<T> {
    values: [T; TrackType::COUNT],
}

impl<T> TrackMap<T> {
    /// Create a new map from the given audio and video values.
    pub fn new(audio: T, video: T) -> Self {
        Self {
            values: [audio, video],
        }
    }

    /// Create a new map by calling `f` for each track type.
    pub fn from_fn<F: FnMut(TrackType) -> T>(mut f: F) -> Self {
        Self::new(f(TrackType::Audio), f(TrackType::Video))
    }

    pub fn get(&self, track: TrackType) -> &T {
        &self.values[track.index()]
    }

    pub fn get_mut(&mut self, track: TrackType) -> &mut T {
        &mut self.values[track.index()]
    }

    /// Iterate over all (track, value) pairs in track type order.
    pub fn iter(&self) -> impl Iterator<Item = (TrackType, &T)> {
        TrackType::iter().map(move |track| (track, self.get(track)))
    }

    /// Iterate mutably over all values in track type order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.values.iter_mut()
    }

    /// Map all values into a new map.
    pub fn map<U, F: FnMut(TrackType, &T) -> U>(&self, mut f: F) -> TrackMap<U> {
        TrackMap::from_fn(|track| f(track, self.get(track)))
    }
}

impl<T> Index<TrackType> for TrackMap<T> {
    type Output = T;

    fn index(&self, track: TrackType) -> &Self::Output {
        self.get(track)
    }
}

impl<T> IndexMut<TrackType> for TrackMap<T> {
    fn index_mut(&mut self, track: TrackType) -> &mut Self::Output {
        self.get_mut(track)
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn track_map_access() {
        let mut map = TrackMap::new(1, 2);
        assert_eq!(map[TrackType::Audio], 1);
        assert_eq!(map[TrackType::Video], 2);

        map[TrackType::Video] = 5;
        *map.get_mut(TrackType::Audio) += 1;
        assert_eq!(
            map.iter().collect::<Vec<_>>(),
            vec![(TrackType::Audio, &2), (TrackType::Video, &5)]
        );

        let doubled = map.map(|_, value| value * 2);
        assert_eq!(doubled, TrackMap::new(4, 10));

        let names = TrackMap::from_fn(|track| track.to_string());
        assert_eq!(names[TrackType::Audio], "audio");
        assert_eq!(names[TrackType::Video], "video");
    }

    #[test]
    fn track_type_parsing() {
        assert_eq!(TrackType::from_str("audio").unwrap(), TrackType::Audio);
        assert_eq!(TrackType::from_str("video").unwrap(), TrackType::Video);
        assert!(TrackType::from_str("subtitle").is_err());
    }
}
