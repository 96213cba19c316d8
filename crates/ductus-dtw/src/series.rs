//! Validated multichannel feature sequences.

use crate::error::DtwError;

/// Owned, validated feature sequence: `steps × channels`, row-major.
///
/// Each row is one time step holding one value per channel. Guaranteed
/// non-empty, rectangular, and all-finite after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Vec<f64>,
    steps: usize,
    channels: usize,
}

impl FeatureMatrix {
    /// Build a feature matrix from per-step rows.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySeries`] | `rows` is empty |
    /// | [`DtwError::ZeroChannels`] | The first row is empty |
    /// | [`DtwError::RaggedSteps`] | A row has a different length than the first |
    /// | [`DtwError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, DtwError> {
        if rows.is_empty() {
            return Err(DtwError::EmptySeries);
        }
        let channels = rows[0].len();
        if channels == 0 {
            return Err(DtwError::ZeroChannels);
        }
        let mut data = Vec::with_capacity(rows.len() * channels);
        for (step, row) in rows.iter().enumerate() {
            if row.len() != channels {
                return Err(DtwError::RaggedSteps {
                    step,
                    expected: channels,
                    got: row.len(),
                });
            }
            if let Some(channel) = row.iter().position(|v| !v.is_finite()) {
                return Err(DtwError::NonFiniteValue { step, channel });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            steps: rows.len(),
            channels,
        })
    }

    /// Build a feature matrix from parallel per-channel columns.
    ///
    /// All columns must share the same length; this is the layout trace
    /// loaders naturally produce (one vector per channel).
    ///
    /// # Errors
    ///
    /// Same conditions as [`FeatureMatrix::from_rows`]; columns of unequal
    /// length surface as [`DtwError::RaggedSteps`] with the column index
    /// reported in `step`.
    pub fn from_channels(columns: &[&[f64]]) -> Result<Self, DtwError> {
        if columns.is_empty() {
            return Err(DtwError::ZeroChannels);
        }
        let steps = columns[0].len();
        if steps == 0 {
            return Err(DtwError::EmptySeries);
        }
        for (index, column) in columns.iter().enumerate() {
            if column.len() != steps {
                return Err(DtwError::RaggedSteps {
                    step: index,
                    expected: steps,
                    got: column.len(),
                });
            }
        }
        let channels = columns.len();
        let mut data = Vec::with_capacity(steps * channels);
        for step in 0..steps {
            for (channel, column) in columns.iter().enumerate() {
                let v = column[step];
                if !v.is_finite() {
                    return Err(DtwError::NonFiniteValue { step, channel });
                }
                data.push(v);
            }
        }
        Ok(Self {
            data,
            steps,
            channels,
        })
    }

    /// Borrow this matrix as a zero-copy view.
    #[must_use]
    pub fn as_view(&self) -> FeatureMatrixView<'_> {
        FeatureMatrixView {
            data: &self.data,
            steps: self.steps,
            channels: self.channels,
        }
    }

    /// Number of time steps.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of channels per time step.
    #[must_use]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// The channel values of one time step.
    ///
    /// # Panics
    ///
    /// Panics if `step >= self.steps()`.
    #[must_use]
    pub fn step(&self, step: usize) -> &[f64] {
        &self.data[step * self.channels..(step + 1) * self.channels]
    }
}

/// Borrowed view into a [`FeatureMatrix`]. Zero-copy, `Copy`.
#[derive(Debug, Clone, Copy)]
pub struct FeatureMatrixView<'a> {
    data: &'a [f64],
    steps: usize,
    channels: usize,
}

impl FeatureMatrixView<'_> {
    /// Number of time steps.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of channels per time step.
    #[must_use]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// The channel values of one time step.
    ///
    /// # Panics
    ///
    /// Panics if `step >= self.steps()`.
    #[must_use]
    pub fn step(&self, step: usize) -> &[f64] {
        &self.data[step * self.channels..(step + 1) * self.channels]
    }
}
