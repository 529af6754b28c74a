//! Float parameter tracks - the keyframe mini-language used by particle
//! definitions.
//!
//! A track is a whitespace-separated list of keyframes:
//!
//! ```text
//! track      := entry*
//! entry      := value [ ',' time ] [ ' '* CURVE ]
//! value      := NUMBER | '[' NUMBER ']' | '[' NUMBER NUMBER ']' [ DISTRIBUTION ]
//! time       := NUMBER                     ; percent of the track, 0-100
//! NUMBER     := ['-'] digit+ ['.' digit+]
//! ```
//!
//! For example `"[0.5 1] Random,0 2 EaseOut 0,100"` is three keyframes: a
//! random value between 0.5 and 1 at the start, 2 at the midpoint (time
//! omitted, filled in by spacing), and 0 at the end.
//!
//! Keyframes without a time are spread evenly between their timed
//! neighbours; the first defaults to 0 and the last to 1.

use std::str::FromStr;

use thiserror::Error;

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Look up a variant by its exact (case-sensitive) name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($variant) => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// The name used in particle definitions.
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

pub(crate) use named_enum;

named_enum! {
    /// How a track's value moves from one keyframe to the next.
    pub enum CurveType {
        Constant,
        Linear,
        EaseIn,
        EaseOut,
        EaseInOut,
        EaseInOutWeak,
        FastInOut,
        FastInOutWeak,
        WeakFastInOut,
        Bounce,
        BounceFastMiddle,
        BounceSlowMiddle,
        SinWave,
        EaseSinWave,
    }
}

named_enum! {
    /// How a sample is drawn between a keyframe's low and high value.
    pub enum Distribution {
        Constant,
        Linear,
        Random,
        EaseIn,
        EaseOut,
        EaseInOut,
        EaseInOutWeak,
        FastInOut,
        FastInOutWeak,
        WeakFastInOut,
        Bounce,
        BounceFastMiddle,
        BounceSlowMiddle,
        SinWave,
        EaseSinWave,
    }
}

/// One keyframe of a [`ParameterTrack`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackNode {
    /// Normalized time in `[0, 1]`.
    pub time: f32,
    /// Lower bound of the value, or the value itself for a scalar.
    pub low: f32,
    /// Equal to `low` unless the keyframe is a range.
    pub high: f32,
    /// Interpolation from this keyframe to the next.
    pub curve: CurveType,
    /// How a sample is drawn between `low` and `high`.
    pub distribution: Distribution,
}

impl TrackNode {
    /// Whether the keyframe holds a single value rather than a range.
    pub fn is_scalar(&self) -> bool {
        self.low == self.high
    }
}

/// An animated scalar (or random range) over normalized time.
///
/// An empty track is a field that was present but blank.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterTrack {
    nodes: Vec<TrackNode>,
}

impl ParameterTrack {
    /// Keyframes in definition order.
    pub fn nodes(&self) -> &[TrackNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl FromStr for ParameterTrack {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_track(s)
    }
}

/// A parameter track that does not follow the grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at byte {position}")]
pub struct GrammarError {
    pub kind: GrammarErrorKind,
    /// Byte offset into the trimmed input where the problem was found.
    pub position: usize,
}

/// What went wrong in a [`GrammarError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarErrorKind {
    #[error("malformed number '{0}'")]
    MalformedNumber(String),
    #[error("unknown curve type '{0}'")]
    UnknownCurve(String),
    #[error("unknown distribution '{0}'")]
    UnknownDistribution(String),
    #[error("missing ']'")]
    MissingCloseBracket,
    #[error("no keyframes")]
    NoEntries,
}

/// Parse a parameter track.
///
/// Surrounding whitespace is ignored; a blank string yields an empty track.
pub fn parse_track(text: &str) -> Result<ParameterTrack, GrammarError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(ParameterTrack::default());
    }

    let mut cursor = Cursor::new(text);
    let mut raw = Vec::new();
    while !cursor.at_end() {
        raw.push(cursor.entry()?);
    }

    if raw.is_empty() {
        return Err(cursor.error(GrammarErrorKind::NoEntries));
    }

    Ok(ParameterTrack {
        nodes: fill_times(raw),
    })
}

/// A keyframe whose time may still be missing.
#[derive(Debug, Clone, Copy)]
struct RawNode {
    time: Option<f32>,
    low: f32,
    high: f32,
    curve: CurveType,
    distribution: Distribution,
}

/// Byte cursor over a trimmed track string.
///
/// The grammar is ASCII-only, so any non-ASCII byte simply fails to match.
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn eat(&mut self, want: u8) -> bool {
        if self.peek() == Some(want) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn at_letter(&self) -> bool {
        self.peek().is_some_and(|b| b.is_ascii_alphabetic())
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }

    fn error(&self, kind: GrammarErrorKind) -> GrammarError {
        GrammarError {
            kind,
            position: self.pos,
        }
    }

    /// Read a number: `['-'] digit+ ['.' digit+]`.
    ///
    /// The whole run of number-like characters is consumed and then
    /// validated, so `1.2.3` or `--1` are reported whole.
    fn number(&mut self) -> Result<f32, GrammarError> {
        let start = self.pos;
        let run = self.take_while(|b| b.is_ascii_digit() || b == b'.' || b == b'-');

        let digits = run.strip_prefix('-').unwrap_or(run);
        let (int, frac) = match digits.split_once('.') {
            Some((int, frac)) => (int, Some(frac)),
            None => (digits, None),
        };
        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

        if all_digits(int) && frac.is_none_or(all_digits) {
            if let Ok(v) = run.parse::<f32>() {
                return Ok(v);
            }
        }

        Err(GrammarError {
            kind: GrammarErrorKind::MalformedNumber(run.to_owned()),
            position: start,
        })
    }

    fn word(&mut self) -> (usize, &'a str) {
        let start = self.pos;
        (start, self.take_while(|b| b.is_ascii_alphabetic()))
    }

    /// Read one keyframe.
    fn entry(&mut self) -> Result<RawNode, GrammarError> {
        let mut distribution = Distribution::Linear;

        self.skip_whitespace();

        let (low, high) = if self.eat(b'[') {
            self.skip_whitespace();
            let low = self.number()?;
            self.skip_whitespace();

            if self.eat(b']') {
                distribution = Distribution::Constant;
                (low, low)
            } else {
                let high = self.number()?;
                self.skip_whitespace();
                if self.bump() != Some(b']') {
                    return Err(GrammarError {
                        kind: GrammarErrorKind::MissingCloseBracket,
                        position: self.pos.saturating_sub(1),
                    });
                }

                let after_bracket = self.pos;
                self.skip_whitespace();
                if self.at_letter() {
                    let (at, name) = self.word();
                    distribution = Distribution::from_name(name).ok_or_else(|| GrammarError {
                        kind: GrammarErrorKind::UnknownDistribution(name.to_owned()),
                        position: at,
                    })?;
                } else {
                    self.pos = after_bracket;
                }
                (low, high)
            }
        } else {
            let v = self.number()?;
            (v, v)
        };

        let time = if self.eat(b',') {
            Some(self.number()? / 100.0)
        } else {
            None
        };

        self.skip_whitespace();
        let mut curve = CurveType::Linear;
        if self.at_letter() {
            let (at, name) = self.word();
            curve = CurveType::from_name(name).ok_or_else(|| GrammarError {
                kind: GrammarErrorKind::UnknownCurve(name.to_owned()),
                position: at,
            })?;
        }

        Ok(RawNode {
            time,
            low,
            high,
            curve,
            distribution,
        })
    }
}

/// Assign a time to every keyframe that lacks one.
///
/// The first keyframe defaults to 0 and, when there is more than one, the
/// last to 1. Each run of untimed keyframes is spread evenly between the
/// timed keyframes around it.
fn fill_times(mut raw: Vec<RawNode>) -> Vec<TrackNode> {
    let len = raw.len();
    if let Some(first) = raw.first_mut() {
        first.time.get_or_insert(0.0);
    }
    if len > 1 {
        raw[len - 1].time.get_or_insert(1.0);
    }

    let mut last = 0.0f32;
    let mut nodes = Vec::with_capacity(len);
    for i in 0..len {
        let time = match raw[i].time {
            Some(t) => t,
            None => {
                // The last node is always timed, so a later timed node exists.
                // `last` belongs to node i - 1, leaving j - i + 1 steps.
                let (j, next) = raw[i + 1..]
                    .iter()
                    .enumerate()
                    .find_map(|(k, n)| n.time.map(|t| (i + 1 + k, t)))
                    .unwrap_or((len - 1, 1.0));
                last + (next - last) / (j - i + 1) as f32
            }
        };
        last = time;

        let n = &raw[i];
        nodes.push(TrackNode {
            time,
            low: n.low,
            high: n.high,
            curve: n.curve,
            distribution: n.distribution,
        });
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kind(text: &str) -> GrammarErrorKind {
        parse_track(text).unwrap_err().kind
    }

    #[test]
    fn blank_is_empty() {
        assert!(parse_track("").unwrap().is_empty());
        assert!(parse_track(" \t\n ").unwrap().is_empty());
    }

    #[test]
    fn single_scalar() {
        let track = parse_track("5").unwrap();
        assert_eq!(
            track.nodes(),
            &[TrackNode {
                time: 0.0,
                low: 5.0,
                high: 5.0,
                curve: CurveType::Linear,
                distribution: Distribution::Linear,
            }]
        );
    }

    #[test]
    fn two_nodes_default_ends() {
        let track = parse_track("0 1,100").unwrap();
        let n = track.nodes();
        assert_eq!(n.len(), 2);
        assert_eq!((n[0].time, n[0].low), (0.0, 0.0));
        assert_eq!((n[1].time, n[1].low), (1.0, 1.0));
    }

    #[test]
    fn middle_time_filled() {
        let n = parse_track("0,0 5 10,100").unwrap();
        let times: Vec<f32> = n.nodes().iter().map(|n| n.time).collect();
        assert_eq!(times, [0.0, 0.5, 1.0]);
        assert_eq!(n.nodes()[1].low, 5.0);
    }

    #[test]
    fn gap_is_evenly_spaced() {
        let n = parse_track("0 1 2 3 4").unwrap();
        let times: Vec<f32> = n.nodes().iter().map(|n| n.time).collect();
        assert_eq!(times, [0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn gap_starts_from_explicit_time() {
        let n = parse_track("0,20 1 2,80").unwrap();
        let times: Vec<f32> = n.nodes().iter().map(|n| n.time).collect();
        assert!((times[1] - 0.5).abs() < 1e-6);
        assert_eq!(times[0], 0.2);
        assert_eq!(times[2], 0.8);
    }

    #[test]
    fn untimed_first_before_timed() {
        let n = parse_track("1 2,50 3").unwrap();
        let times: Vec<f32> = n.nodes().iter().map(|n| n.time).collect();
        assert_eq!(times, [0.0, 0.5, 1.0]);
    }

    #[test]
    fn random_range() {
        let n = parse_track("[1 2]Random").unwrap().nodes()[0];
        assert_eq!((n.low, n.high), (1.0, 2.0));
        assert_eq!(n.distribution, Distribution::Random);
        assert_eq!(n.curve, CurveType::Linear);
    }

    #[test]
    fn single_bracket_is_constant() {
        let n = parse_track("[3]").unwrap().nodes()[0];
        assert_eq!((n.low, n.high), (3.0, 3.0));
        assert_eq!(n.distribution, Distribution::Constant);
        assert!(n.is_scalar());
    }

    #[test]
    fn range_without_distribution() {
        let n = parse_track("[ -1  2 ],50").unwrap().nodes()[0];
        assert_eq!((n.low, n.high), (-1.0, 2.0));
        assert_eq!(n.distribution, Distribution::Linear);
        assert_eq!(n.time, 0.5);
    }

    #[test]
    fn distribution_then_curve() {
        let track = parse_track("[0.5 1] Random EaseIn 0,100 Bounce").unwrap();
        let n = track.nodes();
        assert_eq!(n[0].distribution, Distribution::Random);
        assert_eq!(n[0].curve, CurveType::EaseIn);
        assert_eq!(n[1].curve, CurveType::Bounce);
        assert_eq!(n[1].time, 1.0);
    }

    #[test]
    fn curve_after_time() {
        let n = parse_track("10,25 EaseOut").unwrap().nodes()[0];
        assert_eq!(n.time, 0.25);
        assert_eq!(n.curve, CurveType::EaseOut);
    }

    #[test]
    fn curve_without_space() {
        let n = parse_track("7FastInOut").unwrap().nodes()[0];
        assert_eq!(n.low, 7.0);
        assert_eq!(n.curve, CurveType::FastInOut);
    }

    #[test]
    fn unknown_words_are_errors() {
        assert_eq!(kind("5 Wobbly"), GrammarErrorKind::UnknownCurve("Wobbly".into()));
        assert_eq!(
            kind("[1 2] Chaos"),
            GrammarErrorKind::UnknownDistribution("Chaos".into())
        );
        assert_eq!(kind("5 linear"), GrammarErrorKind::UnknownCurve("linear".into()));
        assert_eq!(kind("5 Random"), GrammarErrorKind::UnknownCurve("Random".into()));
    }

    #[test]
    fn malformed_numbers() {
        for text in ["-", ".5", "1.", "1.2.3", "--1", "+1", "1e5", "abc"] {
            let err = parse_track(text).unwrap_err();
            assert!(
                matches!(
                    err.kind,
                    GrammarErrorKind::MalformedNumber(_) | GrammarErrorKind::UnknownCurve(_)
                ),
                "{text}: {err}"
            );
        }
        assert_eq!(kind("1.2.3"), GrammarErrorKind::MalformedNumber("1.2.3".into()));
        assert_eq!(kind(".5"), GrammarErrorKind::MalformedNumber(".5".into()));
    }

    #[test]
    fn missing_close_bracket() {
        assert_eq!(kind("[1 2"), GrammarErrorKind::MissingCloseBracket);
        assert_eq!(kind("[1 2 3]"), GrammarErrorKind::MissingCloseBracket);
    }

    #[test]
    fn space_before_comma_is_not_a_time() {
        // The comma must follow the value directly.
        assert_eq!(kind("5 ,50"), GrammarErrorKind::MalformedNumber(String::new()));
    }

    #[test]
    fn error_position() {
        let err = parse_track("1 2 Nope").unwrap_err();
        assert_eq!(err.position, 4);
        assert_eq!(err.to_string(), "unknown curve type 'Nope' at byte 4");
    }

    #[test]
    fn from_str() {
        let track: ParameterTrack = "0 100".parse().unwrap();
        assert_eq!(track.len(), 2);
    }

    #[test]
    fn enum_names_round_trip() {
        for name in ["Constant", "EaseSinWave", "BounceSlowMiddle"] {
            assert_eq!(CurveType::from_name(name).unwrap().name(), name);
        }
        assert_eq!(Distribution::Random.to_string(), "Random");
        assert_eq!(CurveType::from_name("Random"), None);
    }

    proptest! {
        #[test]
        fn times_are_defined_and_ordered(values in proptest::collection::vec(-1000i32..1000, 1..12)) {
            let text = values.iter().map(i32::to_string).collect::<Vec<_>>().join(" ");
            let track = parse_track(&text).unwrap();
            prop_assert_eq!(track.len(), values.len());

            let times: Vec<f32> = track.nodes().iter().map(|n| n.time).collect();
            prop_assert_eq!(times[0], 0.0);
            if times.len() > 1 {
                prop_assert!((times[times.len() - 1] - 1.0).abs() < 1e-6);
            }
            for w in times.windows(2) {
                prop_assert!(w[0] <= w[1]);
            }
        }

        #[test]
        fn explicit_times_preserved(percents in proptest::collection::vec(0u32..=100, 2..8)) {
            let mut sorted = percents.clone();
            sorted.sort_unstable();
            let text = sorted
                .iter()
                .enumerate()
                .map(|(i, p)| format!("{i},{p}"))
                .collect::<Vec<_>>()
                .join(" ");
            let track = parse_track(&text).unwrap();
            for (node, p) in track.nodes().iter().zip(&sorted) {
                prop_assert_eq!(node.time, *p as f32 / 100.0);
            }
        }

        #[test]
        fn never_panics(text in "[-0-9.,\\[\\] a-zA-Z]{0,40}") {
            let _ = parse_track(&text);
        }
    }
}
