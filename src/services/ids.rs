use chrono::Utc;

/// Timestamp-derived id: `<unix-millis>-<seq>-<random>`.
///
/// `seq` distinguishes ids minted in the same millisecond by one batch.
pub fn generate_batch_id(seq: usize) -> String {
    let millis = Utc::now().timestamp_millis();
    let salt: u16 = rand::random();
    format!("{}-{}-{:04x}", millis, seq, salt)
}

pub fn generate_id() -> String {
    generate_batch_id(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn batch_ids_are_unique() {
        let ids: HashSet<String> = (0..500).map(generate_batch_id).collect();
        assert_eq!(ids.len(), 500);
    }
}
