use ductus_verify::{Origin, Score, SignatureId};

/// One reference-vs-questioned pairing with its expected label, its
/// predicted score and an open-ended bag of diagnostic scalars.
///
/// The prediction follows the forgery convention: values near 1 mean the
/// questioned signature is likely forged. Classifier output uses the
/// opposite convention, so the scoring glue attaches the complement.
#[derive(Debug, Clone)]
pub struct Comparison {
    reference: SignatureId,
    questioned: SignatureId,
    expected: Origin,
    prediction: Option<Score>,
    metadata: Vec<(String, f64)>,
}

impl Comparison {
    pub fn new(reference: SignatureId, questioned: SignatureId, expected: Origin) -> Self {
        Self {
            reference,
            questioned,
            expected,
            prediction: None,
            metadata: Vec::new(),
        }
    }

    pub fn reference(&self) -> &SignatureId {
        &self.reference
    }

    pub fn questioned(&self) -> &SignatureId {
        &self.questioned
    }

    pub fn expected(&self) -> Origin {
        self.expected
    }

    pub fn prediction(&self) -> Option<Score> {
        self.prediction
    }

    pub fn set_prediction(&mut self, prediction: Score) {
        self.prediction = Some(prediction);
    }

    /// Attaches a named diagnostic scalar, replacing any previous value
    /// stored under the same key.
    pub fn add_metadata(&mut self, key: impl Into<String>, value: f64) {
        let key = key.into();
        match self.metadata.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.metadata.push((key, value)),
        }
    }

    pub fn metadata_value(&self, key: &str) -> Option<f64> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    pub fn metadata(&self) -> &[(String, f64)] {
        &self.metadata
    }
}

/// An ordered collection of comparisons together with the union of their
/// metadata keys, kept in first-seen order for stable tabular export.
#[derive(Debug, Clone, Default)]
pub struct ComparisonSet {
    comparisons: Vec<Comparison>,
    keys: Vec<String>,
}

impl ComparisonSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, comparison: Comparison) {
        for (key, _) in comparison.metadata() {
            if !self.keys.iter().any(|k| k == key) {
                self.keys.push(key.clone());
            }
        }
        self.comparisons.push(comparison);
    }

    pub fn len(&self) -> usize {
        self.comparisons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Comparison> {
        self.comparisons.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Comparison> {
        self.comparisons.iter_mut()
    }

    /// Re-scans all comparisons for metadata keys added after insertion.
    /// Call once after post-hoc metadata attachment, before export.
    pub fn refresh_keys(&mut self) {
        for comparison in &self.comparisons {
            for (key, _) in comparison.metadata() {
                if !self.keys.iter().any(|k| k == key) {
                    self.keys.push(key.clone());
                }
            }
        }
    }

    /// Metadata column names in first-seen order.
    pub fn header(&self) -> &[String] {
        &self.keys
    }

    /// Projects one comparison's metadata onto the header columns.
    /// Missing keys become NaN so column positions stay aligned.
    pub fn row(&self, comparison: &Comparison) -> Vec<f64> {
        self.keys
            .iter()
            .map(|key| comparison.metadata_value(key).unwrap_or(f64::NAN))
            .collect()
    }
}

impl FromIterator<Comparison> for ComparisonSet {
    fn from_iter<I: IntoIterator<Item = Comparison>>(iter: I) -> Self {
        let mut set = Self::new();
        for comparison in iter {
            set.push(comparison);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison(reference: &str, questioned: &str) -> Comparison {
        Comparison::new(
            SignatureId::new(reference),
            SignatureId::new(questioned),
            Origin::Genuine,
        )
    }

    #[test]
    fn metadata_keys_keep_first_seen_order() {
        let mut a = comparison("r1", "q1");
        a.add_metadata("distance", 1.5);
        a.add_metadata("genuine_threshold", 0.2);
        let mut b = comparison("r2", "q2");
        b.add_metadata("forgery_threshold", 9.0);
        b.add_metadata("distance", 2.5);

        let set: ComparisonSet = [a, b].into_iter().collect();
        assert_eq!(
            set.header(),
            &["distance", "genuine_threshold", "forgery_threshold"]
        );
    }

    #[test]
    fn row_projection_fills_missing_keys_with_nan() {
        let mut a = comparison("r1", "q1");
        a.add_metadata("distance", 1.5);
        let mut b = comparison("r2", "q2");
        b.add_metadata("scale", 5.0);

        let set: ComparisonSet = [a, b].into_iter().collect();
        let rows: Vec<Vec<f64>> = set.iter().map(|c| set.row(c)).collect();
        assert_eq!(rows[0][0], 1.5);
        assert!(rows[0][1].is_nan());
        assert!(rows[1][0].is_nan());
        assert_eq!(rows[1][1], 5.0);
    }

    #[test]
    fn add_metadata_replaces_existing_key() {
        let mut c = comparison("r", "q");
        c.add_metadata("distance", 1.0);
        c.add_metadata("distance", 2.0);
        assert_eq!(c.metadata().len(), 1);
        assert_eq!(c.metadata_value("distance"), Some(2.0));
    }
}
