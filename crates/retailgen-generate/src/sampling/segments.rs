use rand::Rng;

use crate::errors::GenerationError;

/// One weighted record and the half-open range `[start, end)` it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment<T> {
    pub start: i64,
    pub end: i64,
    pub value: T,
}

/// Contiguous integer ranges proportional to per-record weights.
///
/// Ranges follow input order and cover `[0, total)` without gaps, so a
/// uniform draw over the total resolves to a weighted categorical sample.
#[derive(Debug, Clone)]
pub struct Segments<T> {
    segments: Vec<Segment<T>>,
    total: i64,
}

impl<T> Segments<T> {
    /// Assign ranges to `(record, weight)` pairs in iteration order.
    pub fn build<I>(items: I) -> Result<Self, GenerationError>
    where
        I: IntoIterator<Item = (T, i64)>,
    {
        let mut segments = Vec::new();
        let mut total: i64 = 0;

        for (value, weight) in items {
            if weight <= 0 {
                return Err(GenerationError::Asset(format!(
                    "segment weight must be positive, got {weight}"
                )));
            }
            let start = total;
            total = total.checked_add(weight).ok_or_else(|| {
                GenerationError::Asset("segment weights overflow".to_string())
            })?;
            segments.push(Segment {
                start,
                end: total,
                value,
            });
        }

        Ok(Self { segments, total })
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment<T>> {
        self.segments.iter()
    }

    /// Resolve `value` to the single record whose range contains it.
    pub fn lookup(&self, value: i64) -> Result<&T, GenerationError> {
        if value < 0 || value >= self.total {
            return Err(GenerationError::OutOfBounds {
                value,
                total: self.total,
            });
        }
        let index = self.segments.partition_point(|segment| segment.end <= value);
        self.segments
            .get(index)
            .map(|segment| &segment.value)
            .ok_or(GenerationError::OutOfBounds {
                value,
                total: self.total,
            })
    }

    /// Weighted categorical draw.
    pub fn sample(&self, rng: &mut impl Rng) -> Result<&T, GenerationError> {
        if self.total == 0 {
            return Err(GenerationError::OutOfBounds { value: 0, total: 0 });
        }
        self.lookup(rng.random_range(0..self.total))
    }
}
