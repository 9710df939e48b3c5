//! Document number generation (`PREFIX-YYYYMMDD-NNNN`)

use chrono::NaiveDate;
use rand::Rng;

/// Build a document number for `date` with a random 4-digit sequence.
pub fn document_number(prefix: &str, date: NaiveDate) -> String {
    let sequence: u16 = rand::rng().random_range(1000..=9999);
    format!("{}-{}-{}", prefix, date.format("%Y%m%d"), sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_number_shape() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        let number = document_number("INV", date);

        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "INV");
        assert_eq!(parts[1], "20250307");

        let sequence: u16 = parts[2].parse().unwrap();
        assert!((1000..=9999).contains(&sequence));
    }
}
