//! Seeded random UTF-8 samples, mostly valid
//!
//! A sample is a run of code points drawn from an exponential distribution,
//! encoded as UTF-8, with occasional defects spliced in. Each kind of defect
//! happens with 2% probability, and again with 2% after that, so roughly 83%
//! of samples come out clean. The same seed always yields the same bytes.
//!
//! Defect offsets are 1-based: `+n` counts from the start, `-n` from the end,
//! so `+1` is before the first element and `-1` after the last.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::error::HarnessError;
use super::testset::TestItem;
use crate::core::config::RandomSettings;

const MEAN_CODE_POINT: f64 = 0x600 as f64;
const DEFECT_PROBABILITY: f64 = 0.02;
const OVERLONG_STOP_PROBABILITY: f64 = 0.4;
const MAX_ENCODED_LEN: usize = 6;
/// Byte mutations only apply to samples longer than this
const MUTATION_MIN_LEN: usize = 40;
/// Upper bound on the bytes reserved up front for one sample
const MAX_RESERVE: usize = 1 << 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodePointDefect {
    Surrogate,
    OutOfRange,
    Overlong,
    OverlongZero,
    OverlongSurrogate,
    OverlongOutOfRange,
}

impl CodePointDefect {
    const ALL: [CodePointDefect; 6] = [
        CodePointDefect::Surrogate,
        CodePointDefect::OutOfRange,
        CodePointDefect::Overlong,
        CodePointDefect::OverlongZero,
        CodePointDefect::OverlongSurrogate,
        CodePointDefect::OverlongOutOfRange,
    ];
}

/// A signed, 1-based position list for one defect kind.
#[derive(Debug, Default, Clone)]
struct Offsets(Vec<isize>);

impl Offsets {
    fn draw(rng: &mut StdRng, max: usize) -> Self {
        let mut offsets = Vec::new();
        while rng.random_bool(DEFECT_PROBABILITY) {
            let from_end = rng.random_bool(0.5);
            let r = rng.random_range(0..=max) as isize;
            offsets.push(if from_end { -1 - r } else { 1 + r });
        }
        Offsets(offsets)
    }

    /// True when a defect sits just before element `ofs` of `size`.
    fn hits(&self, size: usize, ofs: usize) -> bool {
        let from_start = ofs as isize + 1;
        let from_end = ofs as isize - size as isize - 1;
        self.0.iter().any(|&o| o == from_start || o == from_end)
    }

    /// Index into a buffer of `len` bytes. `gap` allows one past the end.
    fn index(ofs: isize, len: usize, gap: bool) -> usize {
        let limit = if gap { len } else { len.saturating_sub(1) };
        let index = if ofs < 0 {
            len.saturating_sub((-ofs - 1) as usize)
        } else {
            (ofs - 1) as usize
        };
        index.min(limit)
    }
}

/// One generated sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomSample {
    pub seed: u64,
    pub alignment: usize,
    pub align_end: bool,
    pub bytes: Vec<u8>,
}

impl RandomSample {
    /// Generate the sample for `seed` with a code point count in `min..=max`.
    pub fn generate(seed: u64, min_length: usize, max_length: usize, entirely_valid: bool) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let alignment = rng.random_range(0..=63usize);
        let align_end = rng.random_range(0..=63u32) & 1 == 1;
        let cp_count = rng.random_range(min_length..=max_length);

        let mut defects: Vec<(CodePointDefect, Offsets)> = Vec::new();
        if !entirely_valid {
            for kind in CodePointDefect::ALL {
                defects.push((kind, Offsets::draw(&mut rng, cp_count.saturating_sub(1))));
            }
        }

        let mut bytes = Vec::with_capacity(reservation(cp_count));
        // one pass more than the count, so a defect can land after the last code point
        for ofs in 0..=cp_count {
            for (kind, offsets) in &defects {
                if !offsets.hits(cp_count, ofs) {
                    continue;
                }
                let (value, extra) = match kind {
                    CodePointDefect::Surrogate => (surrogate(&mut rng), 0),
                    CodePointDefect::OutOfRange => (out_of_range(&mut rng), 0),
                    CodePointDefect::Overlong => {
                        let value = valid_code_point(&mut rng);
                        (value, extra_bytes(&mut rng))
                    }
                    CodePointDefect::OverlongZero => (0, extra_bytes(&mut rng)),
                    CodePointDefect::OverlongSurrogate => {
                        let value = surrogate(&mut rng);
                        (value, extra_bytes(&mut rng))
                    }
                    CodePointDefect::OverlongOutOfRange => {
                        let value = out_of_range(&mut rng);
                        (value, extra_bytes(&mut rng))
                    }
                };
                encode(value, extra, &mut bytes);
            }
            if ofs < cp_count {
                encode(valid_code_point(&mut rng), 0, &mut bytes);
            }
        }

        if !entirely_valid && bytes.len() > MUTATION_MIN_LEN {
            let max = bytes.len() - 20;
            let inserts = Offsets::draw(&mut rng, max);
            let replaces = Offsets::draw(&mut rng, max);
            let removes = Offsets::draw(&mut rng, max);

            for &ofs in &inserts.0 {
                let at = Offsets::index(ofs, bytes.len(), true);
                bytes.insert(at, rng.random());
            }
            for &ofs in &removes.0 {
                if !bytes.is_empty() {
                    let at = Offsets::index(ofs, bytes.len(), false);
                    bytes.remove(at);
                }
            }
            for &ofs in &replaces.0 {
                if !bytes.is_empty() {
                    let at = Offsets::index(ofs, bytes.len(), false);
                    bytes[at] = rng.random();
                }
            }
        }

        Self { seed, alignment, align_end, bytes }
    }

    pub fn description(&self) -> String {
        format!(
            "Random data, seed {}, {} bytes long, ofs {}{}.",
            self.seed,
            self.bytes.len(),
            if self.align_end { '-' } else { '+' },
            self.alignment
        )
    }

    pub fn into_item(self) -> TestItem {
        TestItem {
            description: self.description(),
            alignment: self.alignment,
            align_end: self.align_end,
            bytes: self.bytes,
        }
    }
}

/// Bytes to reserve for `cp_count` code points.
fn reservation(cp_count: usize) -> usize {
    cp_count.saturating_mul(4).min(MAX_RESERVE)
}

fn valid_code_point(rng: &mut StdRng) -> u32 {
    loop {
        let u: f64 = rng.random();
        let value = (-MEAN_CODE_POINT * (1.0 - u).ln()) as u32;
        if !(0xD800..=0xDFFF).contains(&value) && value <= 0x10FFFF {
            return value;
        }
    }
}

fn surrogate(rng: &mut StdRng) -> u32 {
    rng.random_range(0xD800..=0xDFFF)
}

fn out_of_range(rng: &mut StdRng) -> u32 {
    rng.random_range(0x110000..=0x7FFF_FFFF)
}

/// Failures before the first success, p = 0.4
fn extra_bytes(rng: &mut StdRng) -> usize {
    let mut extra = 0;
    while !rng.random_bool(OVERLONG_STOP_PROBABILITY) {
        extra += 1;
    }
    extra
}

/// Encode `value` in the UTF-8 bit pattern using `extra` more bytes than
/// needed, up to six bytes in total.
fn encode(mut value: u32, extra: usize, out: &mut Vec<u8>) {
    let natural = match value {
        0..=0x7F => 1,
        0x80..=0x7FF => 2,
        0x800..=0xFFFF => 3,
        0x1_0000..=0x1F_FFFF => 4,
        0x20_0000..=0x3FF_FFFF => 5,
        _ => 6,
    };
    let len = (natural + extra).min(MAX_ENCODED_LEN);

    if len == 1 {
        out.push(value as u8);
        return;
    }

    let start = out.len();
    out.resize(start + len, 0);
    for slot in out[start + 1..].iter_mut().rev() {
        *slot = 0x80 | (value & 0x3F) as u8;
        value >>= 6;
    }
    let prefix = (0xFF00u32 >> len) & 0xFF;
    out[start] = (value | prefix) as u8;
}

/// Iterator over random samples with consecutive seeds.
#[derive(Debug, Clone)]
pub struct RandomSet {
    next_seed: u64,
    remaining: Option<usize>,
    min_length: usize,
    max_length: usize,
    entirely_valid: bool,
}

impl RandomSet {
    /// Unlimited samples starting at `seed`.
    pub fn new(seed: u64, min_length: usize, max_length: usize) -> Result<Self, HarnessError> {
        if min_length > max_length {
            return Err(HarnessError::LengthRange { min: min_length, max: max_length });
        }
        Ok(Self {
            next_seed: seed,
            remaining: None,
            min_length,
            max_length,
            entirely_valid: false,
        })
    }

    pub fn from_settings(settings: &RandomSettings) -> Result<Self, HarnessError> {
        Ok(Self::new(settings.seed, settings.min_length, settings.max_length)?.with_limit(settings.count))
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.remaining = Some(limit);
        self
    }

    /// Only produce valid UTF-8.
    pub fn entirely_valid(mut self, valid: bool) -> Self {
        self.entirely_valid = valid;
        self
    }
}

impl Iterator for RandomSet {
    type Item = TestItem;

    fn next(&mut self) -> Option<TestItem> {
        match &mut self.remaining {
            Some(0) => return None,
            Some(n) => *n -= 1,
            None => {}
        }
        let seed = self.next_seed;
        self.next_seed = self.next_seed.wrapping_add(1);
        let sample = RandomSample::generate(seed, self.min_length, self.max_length, self.entirely_valid);
        tracing::trace!(seed, len = sample.bytes.len(), "generated random sample");
        Some(sample.into_item())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(value: u32, extra: usize) -> Vec<u8> {
        let mut out = Vec::new();
        encode(value, extra, &mut out);
        out
    }

    #[test]
    fn test_encode_matches_std_for_valid_code_points() {
        for c in ['\0', 'A', '\u{E9}', '\u{7FF}', '\u{800}', '\u{FFFD}', '\u{10000}', '\u{10FFFF}'] {
            let mut buf = [0u8; 4];
            assert_eq!(encoded(c as u32, 0), c.encode_utf8(&mut buf).as_bytes());
        }
    }

    #[test]
    fn test_reservation_never_overflows() {
        assert_eq!(reservation(10), 40);
        assert_eq!(reservation(usize::MAX), MAX_RESERVE);
        assert_eq!(reservation(usize::MAX / 4 + 1), MAX_RESERVE);
    }

    #[test]
    fn test_encode_overlong_and_out_of_range() {
        assert_eq!(encoded(0, 1), vec![0xC0, 0x80]);
        assert_eq!(encoded(b'/' as u32, 2), vec![0xE0, 0x80, 0xAF]);
        assert_eq!(encoded(0xD800, 0), vec![0xED, 0xA0, 0x80]);
        assert_eq!(encoded(0x110000, 0), vec![0xF4, 0x90, 0x80, 0x80]);
        assert_eq!(encoded(0x7FFF_FFFF, 0), vec![0xFD, 0xBF, 0xBF, 0xBF, 0xBF, 0xBF]);
        assert_eq!(encoded(0x41, 10).len(), MAX_ENCODED_LEN);
    }

    #[test]
    fn test_same_seed_same_sample() {
        let a = RandomSample::generate(17, 1, 2000, false);
        let b = RandomSample::generate(17, 1, 2000, false);
        assert_eq!(a, b);
        assert!(a.alignment < 64);
    }

    #[test]
    fn test_entirely_valid_samples_are_valid() {
        for seed in 0..50 {
            let sample = RandomSample::generate(seed, 1, 3000, true);
            assert!(std::str::from_utf8(&sample.bytes).is_ok(), "seed {}", seed);
        }
    }

    #[test]
    fn test_some_samples_are_damaged() {
        let damaged = (0..300)
            .map(|seed| RandomSample::generate(seed, 200, 2000, false))
            .filter(|s| std::str::from_utf8(&s.bytes).is_err())
            .count();
        assert!(damaged > 0);
        assert!(damaged < 300);
    }

    #[test]
    fn test_description_format() {
        let sample = RandomSample { seed: 9, alignment: 5, align_end: true, bytes: vec![b'a'; 12] };
        assert_eq!(sample.description(), "Random data, seed 9, 12 bytes long, ofs -5.");
    }

    #[test]
    fn test_set_limit_and_consecutive_seeds() {
        let items: Vec<TestItem> = RandomSet::new(100, 1, 50).unwrap().with_limit(3).collect();
        assert_eq!(items.len(), 3);
        assert!(items[0].description.starts_with("Random data, seed 100,"));
        assert!(items[2].description.starts_with("Random data, seed 102,"));
    }

    #[test]
    fn test_length_range_checked() {
        assert!(matches!(
            RandomSet::new(1, 10, 5),
            Err(HarnessError::LengthRange { min: 10, max: 5 })
        ));
    }

    #[test]
    fn test_offsets_hit_from_either_end() {
        let offsets = Offsets(vec![1, -1]);
        assert!(offsets.hits(10, 0));
        assert!(offsets.hits(10, 10));
        assert!(!offsets.hits(10, 5));
        assert_eq!(Offsets::index(-1, 10, true), 10);
        assert_eq!(Offsets::index(-1, 10, false), 9);
        assert_eq!(Offsets::index(3, 10, false), 2);
    }
}
