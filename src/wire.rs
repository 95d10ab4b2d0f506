//! Wire encoding used by the serialization benchmark.

use serde::Serialize;

pub type EncodeError = bincode::Error;

pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, EncodeError> {
    bincode::serialize(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset;

    #[test]
    fn encoded_size_grows_with_payload() {
        let small = encode(&dataset::performance_message(10, 1)).unwrap();
        let large = encode(&dataset::performance_message(100, 1)).unwrap();
        assert!(!small.is_empty());
        assert!(large.len() > small.len());
    }

    #[test]
    fn decode_recovers_message() {
        let msg = dataset::populated_performance_message(3, 11);
        let bytes = encode(&msg).unwrap();
        let back: crate::generated::PerformanceTestMessage = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, msg);
    }
}
