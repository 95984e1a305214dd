//! Parse-time measurement for emitted bundles.

use std::time::{Duration, Instant};

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use serde::{Deserialize, Serialize};

/// Parse timing of one bundle, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseTime {
    /// Time to parse a trivial script, for scale.
    pub base_parse_time: f64,
    pub script_parse_time: f64,
}

/// Measures how long a bundle takes to parse.
pub trait ParseTimer: Send + Sync {
    /// `None` when the bundle cannot be measured (for example non-UTF-8 output).
    fn parse_time(&self, source: &[u8]) -> Option<ParseTime>;
}

const BASELINE_SOURCE: &str = "var x = 1;";

/// Times oxc's parser, reporting the median of several trials.
#[derive(Debug, Clone, Copy)]
pub struct OxcParseTimer {
    trials: usize,
}

impl OxcParseTimer {
    pub const fn new(trials: usize) -> Self {
        Self {
            trials: if trials == 0 { 1 } else { trials },
        }
    }

    fn median_parse(&self, source: &str) -> Duration {
        let mut samples: Vec<Duration> = (0..self.trials).map(|_| parse_once(source)).collect();
        samples.sort();
        samples[samples.len() / 2]
    }
}

impl Default for OxcParseTimer {
    fn default() -> Self {
        Self::new(5)
    }
}

fn parse_once(source: &str) -> Duration {
    let allocator = Allocator::default();
    let start = Instant::now();
    let ret = Parser::new(&allocator, source, SourceType::cjs()).parse();
    let elapsed = start.elapsed();
    drop(ret);
    elapsed
}

fn as_millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

impl ParseTimer for OxcParseTimer {
    fn parse_time(&self, source: &[u8]) -> Option<ParseTime> {
        let source = std::str::from_utf8(source).ok()?;
        Some(ParseTime {
            base_parse_time: as_millis(self.median_parse(BASELINE_SOURCE)),
            script_parse_time: as_millis(self.median_parse(source)),
        })
    }
}
