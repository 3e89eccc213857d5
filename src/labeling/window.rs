//! Overlapping window generation.
//!
//! The boundary model scores at most `span_size` tokens at a time, so the flat
//! sequence is cut into windows that advance by `stride_size`. The sequence is
//! padded cyclically on both sides (its own tail before the start, its own head
//! after the end) so that windows at the edges still see real tokens:
//!
//! ```text
//! tokens:  a b c d e f          span 4, stride 2
//! padded:  e f | a b c d e f | a b c d
//! windows: [e f a b] [a b c d] [c d e f]
//! begin:     -2         0         2
//! ```

use super::types::LabelingError;

pub const DEFAULT_SPAN_SIZE: usize = 20;
pub const DEFAULT_STRIDE_SIZE: usize = 10;

/// Window width and advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    span_size: usize,
    stride_size: usize,
}

impl WindowConfig {
    /// Validate and build a window configuration. The stride must be non-zero
    /// and strictly smaller than the span.
    pub fn new(span_size: usize, stride_size: usize) -> Result<Self, LabelingError> {
        if stride_size == 0 {
            return Err(LabelingError::InvalidConfig(
                "stride_size must be at least 1".to_string(),
            ));
        }
        if stride_size >= span_size {
            return Err(LabelingError::InvalidConfig(format!(
                "stride_size ({}) must be less than span_size ({})",
                stride_size, span_size
            )));
        }
        Ok(Self {
            span_size,
            stride_size,
        })
    }

    pub fn span_size(&self) -> usize {
        self.span_size
    }

    pub fn stride_size(&self) -> usize {
        self.stride_size
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            span_size: DEFAULT_SPAN_SIZE,
            stride_size: DEFAULT_STRIDE_SIZE,
        }
    }
}

/// A half-open range `[begin, end)` in flat token coordinates. Edge windows
/// reach below 0 or past the last token; those positions hold padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    pub sequence_number: usize,
    pub begin: isize,
    pub end: isize,
}

impl Window {
    pub fn contains(&self, index: usize) -> bool {
        let i = index as isize;
        self.begin <= i && i < self.end
    }

    /// Distance of `index` from the window's center, doubled to stay integral.
    pub fn center_offset(&self, index: usize) -> usize {
        let i = index as isize;
        ((self.end - i) - (i - self.begin)).unsigned_abs()
    }

    /// Position of `index` inside the window.
    pub fn position_of(&self, index: usize) -> usize {
        (index as isize - self.begin) as usize
    }
}

/// Windows over one flat sequence and the forms each one holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowPlan {
    pub windows: Vec<Window>,
    pub spans: Vec<Vec<String>>,
}

impl WindowPlan {
    /// Cut `forms` into overlapping windows.
    ///
    /// Windows start every `stride_size` padded positions until the start
    /// passes the last token. When the stride is more than half the span that
    /// alone would leave the tail uncovered, so generation continues until the
    /// last window reaches the end of the sequence.
    pub fn generate(forms: &[String], config: WindowConfig) -> Self {
        let n = forms.len();
        let mut plan = Self::default();
        if n == 0 {
            return plan;
        }

        let span = config.span_size;
        let stride = config.stride_size;
        // Flat index of padded position `k`.
        let wrap = |k: usize| (k as isize - stride as isize).rem_euclid(n as isize) as usize;

        let mut offset = 0usize;
        loop {
            let begin = offset as isize - stride as isize;
            let end = begin + span as isize;

            plan.windows.push(Window {
                sequence_number: plan.windows.len(),
                begin,
                end,
            });
            plan.spans
                .push((offset..offset + span).map(|k| forms[wrap(k)].clone()).collect());

            offset += stride;
            if offset >= n && end >= n as isize {
                break;
            }
        }

        plan
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
