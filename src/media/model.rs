use serde::Deserialize;

use crate::player::{Extent, Millis, Repeat};

/// A track as requested by the document author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MediaTrack {
    pub url: String,
    /// Where playback should begin inside the content.
    pub offset: Millis,
    /// How long to play from `offset`; 0 plays to the end of the content.
    pub duration: Millis,
    /// Extra passes after the first one. Negative loops forever.
    pub repeat_count: i32,
}

impl MediaTrack {
    /// Total number of passes over the playable window.
    pub fn repeat(&self) -> Repeat {
        match u32::try_from(self.repeat_count) {
            Ok(extra) => Repeat::Times(extra.saturating_add(1)),
            Err(_) => Repeat::Forever,
        }
    }
}

/// The fake content behind a track.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Content {
    /// Actual length of the content. Zero means nothing loads.
    pub length: Extent,
    pub initial_delay: Millis,
    pub fail_after: Option<Millis>,
}

impl Default for Content {
    fn default() -> Self {
        Self {
            length: Extent::Unbounded,
            initial_delay: 0,
            fail_after: None,
        }
    }
}

/// Start position and length of what can actually be played.
///
/// The requested range is clipped to the content. A range that starts past the
/// end of the content collapses to an empty window at the content end.
pub fn playable_window(track: &MediaTrack, content: &Content) -> (Millis, Extent) {
    match content.length {
        Extent::Finite(length) => {
            let start = track.offset.min(length);
            let end = if track.duration > 0 {
                start.saturating_add(track.duration).min(length)
            } else {
                length
            };
            (start, Extent::Finite(end - start))
        }
        Extent::Unbounded => {
            let duration = if track.duration > 0 {
                Extent::Finite(track.duration)
            } else {
                Extent::Unbounded
            };
            (track.offset, duration)
        }
    }
}
