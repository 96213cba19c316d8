//! Signature traces and their identifying metadata.

use std::fmt;
use std::str::FromStr;

use ductus_dtw::FeatureMatrix;

use crate::error::VerifyError;

/// Identifier of one recorded signature sample.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignatureId(String);

impl SignatureId {
    /// Create a signature id from a non-empty string.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        debug_assert!(!id.is_empty(), "signature id must not be empty");
        Self(id)
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a claimed signer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignerId(String);

impl SignerId {
    /// Create a signer id from a non-empty string.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        debug_assert!(!id.is_empty(), "signer id must not be empty");
        Self(id)
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The capture device a trace was recorded with.
///
/// Stylus traces carry a pressure channel; finger traces do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputDevice {
    /// Pen on a digitizer tablet, with pressure.
    Stylus,
    /// Finger on a touch screen, without pressure.
    Finger,
}

impl InputDevice {
    /// The channels a classifier uses for this device by default.
    #[must_use]
    pub fn default_channels(self) -> &'static [Channel] {
        match self {
            Self::Stylus => &[Channel::X, Channel::Y, Channel::Pressure],
            Self::Finger => &[Channel::X, Channel::Y],
        }
    }
}

impl fmt::Display for InputDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stylus => f.write_str("stylus"),
            Self::Finger => f.write_str("finger"),
        }
    }
}

impl FromStr for InputDevice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stylus" => Ok(Self::Stylus),
            "finger" => Ok(Self::Finger),
            other => Err(format!("unknown input device: {other}")),
        }
    }
}

/// Ground-truth origin of a questioned signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Produced by the claimed signer.
    Genuine,
    /// Produced by an impostor.
    Forged,
}

impl Origin {
    /// The 0/1 wire encoding used by comparison files (0 = genuine, 1 = forged).
    #[must_use]
    pub fn as_int(self) -> u8 {
        match self {
            Self::Genuine => 0,
            Self::Forged => 1,
        }
    }

    /// Decode the 0/1 wire encoding.
    #[must_use]
    pub fn from_int(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Genuine),
            1 => Some(Self::Forged),
            _ => None,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Genuine => f.write_str("genuine"),
            Self::Forged => f.write_str("forged"),
        }
    }
}

impl FromStr for Origin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "genuine" => Ok(Self::Genuine),
            "forged" => Ok(Self::Forged),
            other => Err(format!("unknown origin: {other}")),
        }
    }
}

/// A trace channel selectable for feature projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Horizontal pen position.
    X,
    /// Vertical pen position.
    Y,
    /// Pen pressure (stylus only).
    Pressure,
}

/// An online signature: per-sample coordinate, pressure, and timestamp
/// channels of equal length.
///
/// The `preprocessed` flag records whether the trace already passed
/// through a [`ConditionalSequence`](crate::ConditionalSequence), so
/// pipelines never apply twice.
#[derive(Debug, Clone)]
pub struct Signature {
    id: SignatureId,
    signer: SignerId,
    device: InputDevice,
    pub(crate) x: Vec<f64>,
    pub(crate) y: Vec<f64>,
    pub(crate) pressure: Option<Vec<f64>>,
    t: Vec<i64>,
    pub(crate) preprocessed: bool,
}

impl Signature {
    /// Build a signature, validating the channel-length invariant.
    ///
    /// Stylus traces must supply pressure; a pressure channel supplied
    /// with a finger trace is dropped.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`VerifyError::EmptyTrace`] | `x` is empty |
    /// | [`VerifyError::ChannelLengthMismatch`] | Any channel length differs from `x` |
    /// | [`VerifyError::MissingPressure`] | Stylus trace without pressure |
    pub fn new(
        id: SignatureId,
        signer: SignerId,
        device: InputDevice,
        x: Vec<f64>,
        y: Vec<f64>,
        pressure: Option<Vec<f64>>,
        t: Vec<i64>,
    ) -> Result<Self, VerifyError> {
        let len = x.len();
        if len == 0 {
            return Err(VerifyError::EmptyTrace);
        }
        if y.len() != len {
            return Err(VerifyError::ChannelLengthMismatch {
                channel: "y",
                expected: len,
                got: y.len(),
            });
        }
        if t.len() != len {
            return Err(VerifyError::ChannelLengthMismatch {
                channel: "t",
                expected: len,
                got: t.len(),
            });
        }
        let pressure = match (device, pressure) {
            (InputDevice::Stylus, Some(p)) => {
                if p.len() != len {
                    return Err(VerifyError::ChannelLengthMismatch {
                        channel: "pressure",
                        expected: len,
                        got: p.len(),
                    });
                }
                Some(p)
            }
            (InputDevice::Stylus, None) => {
                return Err(VerifyError::MissingPressure {
                    id: id.as_str().to_string(),
                });
            }
            (InputDevice::Finger, _) => None,
        };
        Ok(Self {
            id,
            signer,
            device,
            x,
            y,
            pressure,
            t,
            preprocessed: false,
        })
    }

    /// The signature id.
    #[must_use]
    pub fn id(&self) -> &SignatureId {
        &self.id
    }

    /// The claimed signer id.
    #[must_use]
    pub fn signer(&self) -> &SignerId {
        &self.signer
    }

    /// The capture device.
    #[must_use]
    pub fn device(&self) -> InputDevice {
        self.device
    }

    /// Number of sample points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always `false` for constructed signatures; provided for convention.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// The x channel.
    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// The y channel.
    #[must_use]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// The pressure channel, if the device records one.
    #[must_use]
    pub fn pressure(&self) -> Option<&[f64]> {
        self.pressure.as_deref()
    }

    /// The timestamp channel (milliseconds).
    #[must_use]
    pub fn timestamps(&self) -> &[i64] {
        &self.t
    }

    /// True once a preprocessing pipeline has run over this trace.
    #[must_use]
    pub fn is_preprocessed(&self) -> bool {
        self.preprocessed
    }

    /// Wall-clock duration of the trace in timestamp units.
    #[must_use]
    pub fn duration(&self) -> i64 {
        self.t[self.t.len() - 1] - self.t[0]
    }

    /// Project the trace onto the given channel subset.
    ///
    /// Produces a fresh array-of-tuples feature matrix per call; results
    /// are owned by the caller and never cached.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::MissingPressure`] when [`Channel::Pressure`]
    /// is requested for a finger trace, or a wrapped [`ductus_dtw::DtwError`]
    /// if the projection is empty.
    pub fn features(&self, channels: &[Channel]) -> Result<FeatureMatrix, VerifyError> {
        let mut columns: Vec<&[f64]> = Vec::with_capacity(channels.len());
        for channel in channels {
            match channel {
                Channel::X => columns.push(&self.x),
                Channel::Y => columns.push(&self.y),
                Channel::Pressure => match &self.pressure {
                    Some(p) => columns.push(p),
                    None => {
                        return Err(VerifyError::MissingPressure {
                            id: self.id.as_str().to_string(),
                        });
                    }
                },
            }
        }
        Ok(FeatureMatrix::from_channels(&columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stylus_signature() -> Signature {
        Signature::new(
            SignatureId::new("u1_s1"),
            SignerId::new("u1"),
            InputDevice::Stylus,
            vec![0.0, 1.0, 2.0],
            vec![0.0, 1.0, 0.0],
            Some(vec![0.5, 0.6, 0.7]),
            vec![0, 10, 20],
        )
        .unwrap()
    }

    #[test]
    fn rejects_empty_trace() {
        let result = Signature::new(
            SignatureId::new("s"),
            SignerId::new("u"),
            InputDevice::Finger,
            vec![],
            vec![],
            None,
            vec![],
        );
        assert!(matches!(result, Err(VerifyError::EmptyTrace)));
    }

    #[test]
    fn rejects_channel_length_mismatch() {
        let result = Signature::new(
            SignatureId::new("s"),
            SignerId::new("u"),
            InputDevice::Finger,
            vec![0.0, 1.0],
            vec![0.0],
            None,
            vec![0, 1],
        );
        assert!(matches!(
            result,
            Err(VerifyError::ChannelLengthMismatch {
                channel: "y",
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn stylus_requires_pressure() {
        let result = Signature::new(
            SignatureId::new("s"),
            SignerId::new("u"),
            InputDevice::Stylus,
            vec![0.0],
            vec![0.0],
            None,
            vec![0],
        );
        assert!(matches!(result, Err(VerifyError::MissingPressure { .. })));
    }

    #[test]
    fn finger_drops_supplied_pressure() {
        let sig = Signature::new(
            SignatureId::new("s"),
            SignerId::new("u"),
            InputDevice::Finger,
            vec![0.0],
            vec![0.0],
            Some(vec![1.0]),
            vec![0],
        )
        .unwrap();
        assert!(sig.pressure().is_none());
    }

    #[test]
    fn projection_layout() {
        let sig = stylus_signature();
        let features = sig
            .features(&[Channel::X, Channel::Y, Channel::Pressure])
            .unwrap();
        assert_eq!(features.steps(), 3);
        assert_eq!(features.channels(), 3);
        assert_eq!(features.step(1), &[1.0, 1.0, 0.6]);
    }

    #[test]
    fn pressure_projection_fails_for_finger() {
        let sig = Signature::new(
            SignatureId::new("s"),
            SignerId::new("u"),
            InputDevice::Finger,
            vec![0.0],
            vec![0.0],
            None,
            vec![0],
        )
        .unwrap();
        let result = sig.features(&[Channel::X, Channel::Pressure]);
        assert!(matches!(result, Err(VerifyError::MissingPressure { .. })));
    }

    #[test]
    fn duration_spans_timestamps() {
        assert_eq!(stylus_signature().duration(), 20);
    }

    #[test]
    fn origin_wire_encoding() {
        assert_eq!(Origin::Genuine.as_int(), 0);
        assert_eq!(Origin::Forged.as_int(), 1);
        assert_eq!(Origin::from_int(0), Some(Origin::Genuine));
        assert_eq!(Origin::from_int(1), Some(Origin::Forged));
        assert_eq!(Origin::from_int(2), None);
    }

    #[test]
    fn device_round_trips_through_str() {
        assert_eq!("stylus".parse::<InputDevice>().unwrap(), InputDevice::Stylus);
        assert_eq!(InputDevice::Finger.to_string(), "finger");
        assert!("tablet".parse::<InputDevice>().is_err());
    }

    #[test]
    fn default_channels_per_device() {
        assert_eq!(
            InputDevice::Stylus.default_channels(),
            &[Channel::X, Channel::Y, Channel::Pressure]
        );
        assert_eq!(
            InputDevice::Finger.default_channels(),
            &[Channel::X, Channel::Y]
        );
    }
}
