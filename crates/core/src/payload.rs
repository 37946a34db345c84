//! Job payloads and the batches that carry them.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{DispatchError, DispatchResult};

/// A single push-notification request.
///
/// Immutable once submitted: the dispatcher only ever borrows it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobPayload {
    phone_number: String,
    message: String,
}

impl JobPayload {
    pub fn new(phone_number: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            message: message.into(),
        }
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Ordered sequence of payloads.
///
/// Position in the batch is significant: it names the job submitted for each
/// payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobBatch(Vec<JobPayload>);

impl JobBatch {
    pub fn new(payloads: Vec<JobPayload>) -> Self {
        Self(payloads)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, JobPayload> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[JobPayload] {
        &self.0
    }
}

impl From<Vec<JobPayload>> for JobBatch {
    fn from(payloads: Vec<JobPayload>) -> Self {
        Self(payloads)
    }
}

impl FromIterator<JobPayload> for JobBatch {
    fn from_iter<I: IntoIterator<Item = JobPayload>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a JobBatch {
    type Item = &'a JobPayload;
    type IntoIter = core::slice::Iter<'a, JobPayload>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Validate an untyped value as a batch.
///
/// Only a JSON array is accepted; objects are rejected even though they can
/// be walked by key. Every element must be a well-formed payload.
impl TryFrom<&JsonValue> for JobBatch {
    type Error = DispatchError;

    fn try_from(value: &JsonValue) -> DispatchResult<Self> {
        let JsonValue::Array(items) = value else {
            return Err(DispatchError::not_an_array());
        };

        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                JobPayload::deserialize(item).map_err(|e| {
                    DispatchError::invalid_argument(format!(
                        "job at index {index} is not a valid payload: {e}"
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_uses_camel_case_fields() {
        let payload = JobPayload::new("44556677889", "Use the code 1982 to verify your account");
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "phoneNumber": "44556677889",
                "message": "Use the code 1982 to verify your account",
            })
        );
    }

    #[test]
    fn array_of_payloads_is_accepted_in_order() {
        let value = json!([
            { "phoneNumber": "1", "message": "a" },
            { "phoneNumber": "2", "message": "b" },
        ]);

        let batch = JobBatch::try_from(&value).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.as_slice()[0], JobPayload::new("1", "a"));
        assert_eq!(batch.as_slice()[1], JobPayload::new("2", "b"));
    }

    #[test]
    fn empty_array_is_an_empty_batch() {
        let batch = JobBatch::try_from(&json!([])).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn non_sequence_values_are_rejected() {
        for value in [
            json!({}),
            json!({ "phoneNumber": "1", "message": "a" }),
            json!("jobs"),
            json!(3),
            json!(null),
        ] {
            let err = JobBatch::try_from(&value).unwrap_err();
            assert_eq!(err, DispatchError::InvalidArgument("Jobs is not an array".to_string()));
        }
    }

    #[test]
    fn malformed_element_names_its_index() {
        let value = json!([
            { "phoneNumber": "1", "message": "a" },
            { "phoneNumber": "2" },
        ]);

        match JobBatch::try_from(&value).unwrap_err() {
            DispatchError::InvalidArgument(msg) => assert!(msg.starts_with("job at index 1")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let value = json!([{ "phoneNumber": "1", "message": "a", "priority": "high" }]);
        assert!(JobBatch::try_from(&value).is_err());
    }
}
